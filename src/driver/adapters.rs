use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::gym::hop::{Body, HopConfig, Obstacle};

/// Single-slot mailbox for a human jump request
///
/// Any number of requests between two ticks collapse into one pending jump. Clones share the
/// same slot, so an input thread can hold one handle while the driver holds another.
#[derive(Debug, Clone, Default)]
pub struct PendingJump(Arc<AtomicBool>);

impl PendingJump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume the pending request, if any
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Read-only view of everything needed to draw a frame
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub config: &'a HopConfig,
    pub body: &'a Body,
    pub obstacles: &'a [Obstacle],
    /// Height the body is rewarded for holding
    pub target: f32,
    pub score: u32,
    pub high_score: u32,
}

/// Snapshot of the session counters and agent hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub episodes: u32,
    pub games: u32,
    pub ticks: u64,
    pub score: u32,
    pub high_score: u32,
    pub average_score: f64,
    pub recent_average: Option<f64>,
    pub positive_rewards: f64,
    pub negative_rewards: f64,
    pub epsilon: f32,
    pub alpha: f32,
    pub gamma: f32,
    /// Height of the body's center, growing downwards
    pub y: f32,
    /// Offset of the body from the target height
    pub dy: f32,
    pub table_entries: usize,
    pub table_states: usize,
}

/// Draws the simulation
pub trait Renderer {
    fn render(&mut self, scene: &Scene<'_>) -> io::Result<()>;
}

/// Presents session metrics
pub trait MetricsDisplay {
    fn display(&mut self, metrics: &Metrics) -> io::Result<()>;
}

impl Renderer for () {
    fn render(&mut self, _: &Scene<'_>) -> io::Result<()> {
        Ok(())
    }
}

impl MetricsDisplay for () {
    fn display(&mut self, _: &Metrics) -> io::Result<()> {
        Ok(())
    }
}

/// Logs a summary line at `info` every `every` episodes
#[derive(Debug, Clone)]
pub struct LogMetrics {
    every: u32,
    last: u32,
}

impl LogMetrics {
    /// **Panics** if `every` is zero
    pub fn new(every: u32) -> Self {
        assert!(every > 0, "LogMetrics interval must be positive");
        Self { every, last: 0 }
    }

    /// Whether `episodes` crossed a multiple of the interval since the last call
    fn due(&mut self, episodes: u32) -> bool {
        let due = episodes / self.every > self.last / self.every;
        self.last = episodes;
        due
    }
}

impl MetricsDisplay for LogMetrics {
    fn display(&mut self, m: &Metrics) -> io::Result<()> {
        if self.due(m.episodes) {
            log::info!(
                "episode {} | high {} | avg {:.2} | recent {} | eps {:.3} | states {} \
                 | +{:.1} -{:.1}",
                m.episodes,
                m.high_score,
                m.average_score,
                m.recent_average
                    .map_or_else(|| "-".to_string(), |avg| format!("{avg:.2}")),
                m.epsilon,
                m.table_states,
                m.positive_rewards,
                m.negative_rewards,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn pending_jump_collapses() {
        let pending = PendingJump::new();
        assert!(!pending.take(), "Nothing requested");

        pending.request();
        pending.request();
        pending.request();
        assert!(pending.is_pending());
        assert!(pending.take(), "Requests collapse into one");
        assert!(!pending.take(), "Cleared once consumed");
    }

    #[test]
    fn pending_jump_crosses_threads() {
        let pending = PendingJump::new();
        let input = pending.clone();
        thread::spawn(move || input.request())
            .join()
            .expect("input thread panicked");
        assert!(pending.take(), "Request from another handle is visible");
    }

    #[test]
    fn log_metrics_every_interval() {
        let mut log = LogMetrics::new(10);
        assert!(
            (0..10).all(|episodes| !log.due(episodes)),
            "Nothing logged before the first interval"
        );
        assert!(log.due(10), "Logged on reaching the interval");
        assert!(!log.due(10), "Logged once per interval, not once per frame");
        assert!(!log.due(19));
        assert!(log.due(25), "Skipping past a multiple still logs");
        assert!(!log.due(29));

        let mut log = LogMetrics::new(1);
        assert!(!log.due(0));
        assert!(log.due(1) && log.due(2), "Interval of one logs every episode");
    }
}
