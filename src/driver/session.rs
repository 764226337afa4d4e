use crate::{ds::RingBuffer, gym::hop::TickEvents};

/// Running counters of one training session
///
/// Per-episode values reset at every episode boundary, historical aggregates only when a new
/// session is created.
#[derive(Debug, Clone)]
pub struct SimulationSession {
    episodes: u32,
    games: u32,
    ticks: u64,
    score: u32,
    total_score: u64,
    high_score: u32,
    positive_rewards: f64,
    negative_rewards: f64,
    recent_scores: RingBuffer<u32>,
}

impl SimulationSession {
    /// **Panics** if `recent_window` is zero
    pub fn new(recent_window: usize) -> Self {
        Self {
            episodes: 0,
            games: 0,
            ticks: 0,
            score: 0,
            total_score: 0,
            high_score: 0,
            positive_rewards: 0.0,
            negative_rewards: 0.0,
            recent_scores: RingBuffer::new(recent_window),
        }
    }

    pub fn record_tick(&mut self, events: &TickEvents) {
        self.ticks += 1;
        self.score += events.points;
        self.positive_rewards += f64::from(events.gained);
        self.negative_rewards += f64::from(events.lost);
    }

    /// Close the current episode and return its score
    ///
    /// Only `completed` episodes, the ones that reached a terminal condition, count as games
    /// and feed the score averages. Every episode can set the high score.
    pub fn end_episode(&mut self, completed: bool) -> u32 {
        let score = std::mem::take(&mut self.score);
        self.episodes += 1;
        self.high_score = self.high_score.max(score);
        if completed {
            self.games += 1;
            self.total_score += u64::from(score);
            self.recent_scores.push(score);
        }
        score
    }

    /// Episodes ended for any reason
    pub fn episodes(&self) -> u32 {
        self.episodes
    }

    /// Episodes ended by a terminal condition
    pub fn games(&self) -> u32 {
        self.games
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Score of the running episode
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn positive_rewards(&self) -> f64 {
        self.positive_rewards
    }

    /// Magnitude of all penalties received
    pub fn negative_rewards(&self) -> f64 {
        self.negative_rewards
    }

    pub fn average_score(&self) -> f64 {
        self.total_score as f64 / f64::from(self.games.max(1))
    }

    /// Average over the most recent games, `None` before the first one
    pub fn recent_average(&self) -> Option<f64> {
        self.recent_scores.mean()
    }
}
