//! Per-frame loop tying the [`Hop`] environment, the [`StateEncoder`] and a [`QTableAgent`]
//! together.
//!
//! One [`Driver::tick`] per frame: observe, encode, act, step, encode, learn, then close the
//! episode if the step was terminal.

use std::io;

use crate::{
    algo::tabular::{QTableAgent, QTableAgentConfig},
    decay::{self, Decay},
    env::{DiscreteActionSpace, Environment, Step},
    error::{ConfigError, Result},
    gym::hop::{EncoderConfig, Hop, HopAction, HopConfig, StateEncoder, StateKey},
    memory::Exp,
    util::{ensure_finite, ensure_interval},
};

mod adapters;
mod clock;
mod session;

pub use adapters::{LogMetrics, Metrics, MetricsDisplay, PendingJump, Renderer, Scene};
pub use clock::{FixedClock, FrameClock, FrameTimer, RealtimeClock};
pub use session::SimulationSession;

pub type HopAgent<D> = QTableAgent<StateKey, HopAction, D>;

/// Everything needed to start a training session
#[derive(Debug, Clone)]
pub struct SessionConfig<D: Decay> {
    pub hop: HopConfig,
    pub encoder: EncoderConfig,
    pub agent: QTableAgentConfig<HopAction, D>,
    /// Skip the Q update on ticks where the agent stayed and no reward was granted
    pub skip_idle_updates: bool,
    /// Longest frame delta handed to physics, in seconds
    pub max_frame_delta: f32,
    /// Number of recent games in [`SimulationSession::recent_average`]
    pub recent_window: usize,
}

impl Default for SessionConfig<decay::Constant> {
    fn default() -> Self {
        Self {
            hop: HopConfig::default(),
            encoder: EncoderConfig::default(),
            agent: QTableAgentConfig {
                unseen_values: vec![(HopAction::Jump, f32::NEG_INFINITY)],
                ..Default::default()
            },
            skip_idle_updates: true,
            max_frame_delta: 0.1,
            recent_window: 100,
        }
    }
}

impl<D: Decay> SessionConfig<D> {
    /// Checks the driver's own settings; the environment, encoder and agent validate theirs
    /// when built
    pub fn validate(&self) -> Result<()> {
        let Self {
            max_frame_delta,
            recent_window,
            ..
        } = *self;
        ensure_finite("max_frame_delta", max_frame_delta)?;
        ensure_interval!(max_frame_delta, > 0.0, f64::MAX);
        if recent_window == 0 {
            return Err(ConfigError::inconsistent("`recent_window` must hold at least one game"));
        }
        Ok(())
    }
}

/// What happened during one [`Driver::tick`]
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// Seconds handed to physics
    pub dt: f32,
    pub state: StateKey,
    /// The executed action, a human request overrides the agent
    pub action: HopAction,
    pub next_state: StateKey,
    pub reward: f32,
    /// Whether the Q-table was updated
    pub learned: bool,
    pub terminal: bool,
    /// Set when this tick closed an episode
    pub episode: Option<EpisodeSummary>,
}

/// Per-episode values reported when an episode closes
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    /// 1-based index of the episode that just ended
    pub episode: u32,
    pub score: u32,
    /// Whether the episode ended on a terminal condition rather than a manual reset
    pub completed: bool,
    /// The environment report, in the order of [`Driver::report_keys`]
    pub values: Vec<f64>,
}

/// Owns the environment, the agent and the session counters
pub struct Driver<D: Decay> {
    env: Hop,
    encoder: StateEncoder,
    agent: HopAgent<D>,
    actions: Vec<HopAction>,
    session: SimulationSession,
    timer: FrameTimer,
    pending: PendingJump,
    skip_idle_updates: bool,
}

impl<D: Decay> Driver<D> {
    /// Build every component, failing fast on any invalid setting
    pub fn new(config: SessionConfig<D>) -> Result<Self> {
        config.validate()?;
        let SessionConfig {
            hop,
            encoder,
            agent,
            skip_idle_updates,
            max_frame_delta,
            recent_window,
        } = config;

        let timer = FrameTimer::new(1.0 / hop.reference_fps, max_frame_delta);
        let env = Hop::new(hop)?;
        let encoder = StateEncoder::new(encoder)?;
        let agent = QTableAgent::new(agent)?;

        Ok(Self {
            actions: env.actions(),
            env,
            encoder,
            agent,
            session: SimulationSession::new(recent_window),
            timer,
            pending: PendingJump::new(),
            skip_idle_updates,
        })
    }

    /// Advance the simulation by one frame stamped `timestamp` milliseconds
    pub fn tick(&mut self, timestamp: f64) -> TickSummary {
        let dt = self.timer.delta(timestamp);
        let state = self.encoder.encode(&self.env.observe());
        let action = if self.pending.take() {
            HopAction::Jump
        } else {
            self.agent.act(&state, &self.actions)
        };

        let Step {
            next_state,
            reward,
            terminal,
        } = self.env.step(action, dt);
        let next_state = self.encoder.encode(&next_state);

        let learned = !self.skip_idle_updates || action == HopAction::Jump || reward != 0.0;
        if learned {
            self.agent.learn(
                Exp {
                    state,
                    action,
                    next_state,
                    reward,
                },
                &self.actions,
            );
        }
        self.agent.decay_epsilon();
        self.session.record_tick(self.env.last_events());

        let episode = terminal.then(|| self.close_episode(true));
        TickSummary {
            dt,
            state,
            action,
            next_state,
            reward,
            learned,
            terminal,
            episode,
        }
    }

    /// Run `frames` ticks, drawing and reporting after each one
    pub fn run<C, R, M>(
        &mut self,
        clock: &mut C,
        renderer: &mut R,
        metrics: &mut M,
        frames: u64,
    ) -> io::Result<()>
    where
        C: FrameClock + ?Sized,
        R: Renderer + ?Sized,
        M: MetricsDisplay + ?Sized,
    {
        for _ in 0..frames {
            self.tick(clock.next_frame());
            renderer.render(&self.scene())?;
            metrics.display(&self.metrics())?;
        }
        Ok(())
    }

    /// Abandon the running episode
    ///
    /// The episode is counted, but not as a game, so it does not move the score averages.
    /// The Q-table and the exploration schedule are kept.
    pub fn reset_episode(&mut self) -> EpisodeSummary {
        self.close_episode(false)
    }

    fn close_episode(&mut self, completed: bool) -> EpisodeSummary {
        let score = self.session.end_episode(completed);
        let values = self.env.report.take();
        self.env.reset();

        let episode = self.session.episodes();
        log::debug!(
            "episode {episode} {} with score {score} (high {}, epsilon {:.3})",
            if completed { "ended" } else { "reset" },
            self.session.high_score(),
            self.agent.epsilon()
        );

        EpisodeSummary {
            episode,
            score,
            completed,
            values,
        }
    }

    /// Handle for requesting a jump on the next tick
    pub fn pending_jump(&self) -> PendingJump {
        self.pending.clone()
    }

    /// Names of the values in [`EpisodeSummary::values`]
    pub fn report_keys(&self) -> &[&'static str] {
        self.env.report.keys()
    }

    pub fn env(&self) -> &Hop {
        &self.env
    }

    pub fn agent(&self) -> &HopAgent<D> {
        &self.agent
    }

    pub fn session(&self) -> &SimulationSession {
        &self.session
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            config: self.env.config(),
            body: self.env.body(),
            obstacles: self.env.obstacles(),
            target: self.env.target(),
            score: self.session.score(),
            high_score: self.session.high_score(),
        }
    }

    pub fn metrics(&self) -> Metrics {
        let s = &self.session;
        let table = self.agent.q_table();
        Metrics {
            episodes: s.episodes(),
            games: s.games(),
            ticks: s.ticks(),
            score: s.score(),
            high_score: s.high_score(),
            average_score: s.average_score(),
            recent_average: s.recent_average(),
            positive_rewards: s.positive_rewards(),
            negative_rewards: s.negative_rewards(),
            epsilon: self.agent.epsilon(),
            alpha: self.agent.alpha(),
            gamma: self.agent.gamma(),
            y: self.env.body().y,
            dy: self.env.body().y - self.env.target(),
            table_entries: table.len(),
            table_states: table.states(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{exploration::EpsilonGreedy, gym::hop::GapConfig};

    /// Greedy agent that never jumps on its own
    fn config() -> SessionConfig<decay::Constant> {
        let mut config = SessionConfig::default();
        config.agent.exploration = EpsilonGreedy::new(decay::Constant::new(0.0));
        config.hop.seed = Some(7);
        config
    }

    fn driver(config: SessionConfig<decay::Constant>) -> Driver<decay::Constant> {
        Driver::new(config).expect("valid config")
    }

    #[test]
    fn first_tick_uses_nominal_delta() {
        let mut driver = driver(config());
        let summary = driver.tick(12_345.0);
        assert_eq!(summary.dt, 1.0 / 60.0, "No previous frame");

        let summary = driver.tick(12_345.0);
        assert_eq!(summary.dt, 1.0 / 60.0, "Zero delta");

        let summary = driver.tick(99_999.0);
        assert_eq!(summary.dt, 0.1, "Stall capped at max_frame_delta");
    }

    #[test]
    fn idle_ticks_are_not_learned() {
        let mut driver = driver(config());
        let summary = driver.tick(0.0);
        assert_eq!(summary.action, HopAction::Stay, "Unseen jump is biased away");
        assert_eq!(summary.reward, 0.0, "Falling through open space");
        assert!(!summary.learned, "Stay with zero reward is skipped");
        assert!(driver.agent().q_table().is_empty());

        let metrics = driver.metrics();
        assert_eq!(metrics.y, driver.env().body().y, "Absolute height reported");
        assert!(
            (metrics.y - metrics.dy - driver.env().target()).abs() < 1e-3,
            "Offset measured from the target"
        );

        let mut driver = self::driver(SessionConfig {
            skip_idle_updates: false,
            ..config()
        });
        assert!(driver.tick(0.0).learned, "Skipping disabled");
        assert_eq!(driver.agent().q_table().len(), 1);
    }

    #[test]
    fn human_jump_overrides_and_is_learned() {
        let mut driver = driver(config());
        let input = driver.pending_jump();
        input.request();
        input.request();

        let summary = driver.tick(0.0);
        assert_eq!(summary.action, HopAction::Jump, "Request overrides the agent");
        assert!(summary.learned, "Jumps are always learned");
        assert!(
            driver.agent().q_table().contains(&summary.state, HopAction::Jump),
            "The executed action is the one updated"
        );

        let summary = driver.tick(1000.0 / 60.0);
        assert_eq!(summary.action, HopAction::Stay, "Both requests collapsed into one jump");
    }

    #[test]
    fn terminal_tick_closes_the_episode() {
        let mut driver = driver(config());
        let mut clock = FixedClock::new(60.0);

        let summary = (0..1000)
            .map(|_| driver.tick(clock.next_frame()))
            .find(|summary| summary.terminal)
            .expect("falling body reaches the floor");

        assert_eq!(summary.reward, -20.0, "Floor breach");
        assert!(summary.learned, "Non-zero reward is learned");
        let episode = summary.episode.expect("terminal tick reports the episode");
        assert_eq!(episode.episode, 1);
        assert!(episode.completed);
        assert_eq!(episode.score, 0, "Never entered the center band");
        assert_eq!(episode.values.len(), driver.report_keys().len());

        let session = driver.session();
        assert_eq!(session.episodes(), 1);
        assert_eq!(session.games(), 1);
        assert_eq!(session.score(), 0);
        assert_eq!(
            driver.env().body().y,
            driver.env().config().start_y,
            "Body reset for the next episode"
        );
        assert_eq!(driver.env().body().velocity, 0.0);
    }

    #[test]
    fn manual_reset_is_not_a_game() {
        let mut driver = driver(config());
        driver.tick(0.0);
        let episode = driver.reset_episode();
        assert!(!episode.completed);
        assert_eq!(driver.session().episodes(), 1);
        assert_eq!(driver.session().games(), 0);
    }

    #[test]
    fn run_renders_every_frame() {
        struct Count(u64);
        impl Renderer for Count {
            fn render(&mut self, scene: &Scene<'_>) -> io::Result<()> {
                assert!(scene.obstacles.len() <= 2);
                self.0 += 1;
                Ok(())
            }
        }

        let mut driver = driver(SessionConfig {
            hop: HopConfig {
                gaps: Some(GapConfig::default()),
                seed: Some(3),
                ..Default::default()
            },
            ..config()
        });
        let mut renderer = Count(0);
        driver
            .run(&mut FixedClock::new(60.0), &mut renderer, &mut (), 250)
            .expect("no io");
        assert_eq!(renderer.0, 250);
        assert_eq!(driver.session().ticks(), 250);
        assert!(driver.session().episodes() > 0, "Untrained agent falls repeatedly");
        assert_eq!(driver.metrics().ticks, 250);
    }

    #[test]
    fn rejects_bad_driver_settings() {
        assert!(Driver::new(SessionConfig {
            max_frame_delta: 0.0,
            ..config()
        })
        .is_err());
        assert!(Driver::new(SessionConfig {
            recent_window: 0,
            ..config()
        })
        .is_err());
        assert!(Driver::new(SessionConfig {
            hop: HopConfig {
                gravity: f32::NAN,
                ..Default::default()
            },
            ..config()
        })
        .is_err());
    }
}
