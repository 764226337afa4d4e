//! A circle that falls under gravity and survives by jumping.
//!
//! Without obstacles the task is to hover around a horizontal center line. With
//! [`GapConfig`] set, rectangles with a vertical gap scroll in from the right and the
//! body has to thread each gap.

use rand::{rngs::StdRng, Rng, SeedableRng};
use strum::{EnumIter, VariantArray};

use crate::{
    env::{DiscreteActionSpace, Environment, Report, Step},
    error::{ConfigError, Result},
    util::{ensure_finite, ensure_interval},
};

mod body;
pub mod encoder;
mod obstacle;

pub use body::Body;
pub use encoder::{EncoderConfig, StateEncoder, StateKey};
pub use obstacle::Obstacle;

/// Actions for the [`Hop`] environment
///
/// `Stay` is listed first so greedy ties resolve to doing nothing.
#[derive(EnumIter, VariantArray, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum HopAction {
    Stay,
    Jump,
}

/// Size of a shaping bonus granted within tolerance of the target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Proximity {
    /// The full bonus anywhere within tolerance
    Flat(f32),
    /// The bonus scaled by `1 - distance / tolerance`
    Scaled(f32),
}

impl Proximity {
    fn bonus(self, distance: f32, tolerance: f32) -> f32 {
        match self {
            Self::Flat(bonus) => bonus,
            Self::Scaled(bonus) if tolerance > 0.0 => bonus * (1.0 - distance / tolerance),
            Self::Scaled(bonus) => bonus,
        }
    }

    fn magnitude(self) -> f32 {
        match self {
            Self::Flat(bonus) | Self::Scaled(bonus) => bonus,
        }
    }
}

/// Reward components; penalties are negative numbers
#[derive(Debug, Clone, PartialEq)]
pub struct RewardConfig {
    pub floor_breach: f32,
    pub ceiling_breach: f32,
    /// Granted every tick the body is within `ceiling_margin` of the ceiling
    pub near_ceiling: f32,
    /// Distance from the target (center line or gap center) that earns the bonus
    pub target_tolerance: f32,
    pub target_bonus: Proximity,
    /// Jumping while already moving upward
    pub rising_jump: f32,
    /// Jumps closer together than this many seconds are penalized
    pub jump_cooldown: f32,
    pub cooldown_jump: f32,
    pub collision: f32,
    pub pass: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            floor_breach: -20.0,
            ceiling_breach: -5.0,
            near_ceiling: -0.1,
            target_tolerance: 10.0,
            target_bonus: Proximity::Flat(10.0),
            rising_jump: -10.0,
            jump_cooldown: 0.5,
            cooldown_jump: -5.0,
            collision: -50.0,
            pass: 10.0,
        }
    }
}

/// Scrolling gap obstacles
#[derive(Debug, Clone, PartialEq)]
pub struct GapConfig {
    /// Obstacles on screen at once, spaced evenly
    pub count: usize,
    pub width: f32,
    /// Vertical size of each gap
    pub gap: f32,
    /// Leftward speed in pixels per reference frame
    pub speed: f32,
    /// Minimum distance from a gap to the top or bottom of the canvas
    pub margin: f32,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            count: 2,
            width: 52.0,
            gap: 120.0,
            speed: 2.0,
            margin: 20.0,
        }
    }
}

/// Configuration for the [`Hop`] environment. Lengths are in pixels, `y` grows downward.
#[derive(Debug, Clone, PartialEq)]
pub struct HopConfig {
    pub width: f32,
    pub height: f32,
    pub center_line: f32,
    pub radius: f32,
    pub start_y: f32,
    /// Added to the velocity every reference frame
    pub gravity: f32,
    /// Velocity set by a jump, negative is upward
    pub jump_velocity: f32,
    /// Frame rate the per-frame constants are tuned for
    pub reference_fps: f32,
    pub ceiling_margin: f32,
    pub floor_margin: f32,
    /// Half-height of the band around the center line considered safe
    pub safe_zone: f32,
    pub rewards: RewardConfig,
    pub gaps: Option<GapConfig>,
    /// Whether hitting an obstacle ends the episode
    pub end_on_collision: bool,
    /// Seed for gap placement, `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for HopConfig {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 480.0,
            center_line: 240.0,
            radius: 10.0,
            start_y: 460.0,
            gravity: 0.6,
            jump_velocity: -5.0,
            reference_fps: 60.0,
            ceiling_margin: 50.0,
            floor_margin: 50.0,
            safe_zone: 50.0,
            rewards: RewardConfig::default(),
            gaps: None,
            end_on_collision: true,
            seed: None,
        }
    }
}

impl HopConfig {
    pub fn validate(&self) -> Result<()> {
        let &Self {
            width,
            height,
            center_line,
            radius,
            start_y,
            gravity,
            jump_velocity,
            reference_fps,
            ceiling_margin,
            floor_margin,
            safe_zone,
            ..
        } = self;

        for (name, value) in [
            ("width", width),
            ("height", height),
            ("gravity", gravity),
            ("jump_velocity", jump_velocity),
        ] {
            ensure_finite(name, value)?;
        }
        ensure_interval!(width, > 0.0, f64::MAX);
        ensure_interval!(radius, > 0.0, f64::from(height / 2.0));
        ensure_interval!(reference_fps, > 0.0, f64::MAX);
        let (ceiling, floor) = (f64::from(radius), f64::from(height - radius));
        ensure_interval!(center_line, ceiling, floor);
        ensure_interval!(start_y, ceiling, floor);
        ensure_interval!(ceiling_margin, 0.0, f64::from(height));
        ensure_interval!(floor_margin, 0.0, f64::from(height));
        ensure_interval!(safe_zone, 0.0, f64::from(height));

        let r = &self.rewards;
        for (name, value) in [
            ("floor_breach", r.floor_breach),
            ("ceiling_breach", r.ceiling_breach),
            ("near_ceiling", r.near_ceiling),
            ("target_bonus", r.target_bonus.magnitude()),
            ("rising_jump", r.rising_jump),
            ("cooldown_jump", r.cooldown_jump),
            ("collision", r.collision),
            ("pass", r.pass),
        ] {
            ensure_finite(name, value)?;
        }
        let (target_tolerance, jump_cooldown) = (r.target_tolerance, r.jump_cooldown);
        ensure_interval!(target_tolerance, 0.0, f64::from(height));
        ensure_interval!(jump_cooldown, 0.0, f64::MAX);

        if let Some(gaps) = &self.gaps {
            if gaps.count == 0 {
                return Err(ConfigError::inconsistent("at least one obstacle is required"));
            }
            let GapConfig {
                width: obstacle_width,
                gap,
                speed,
                margin,
                ..
            } = *gaps;
            ensure_interval!(obstacle_width, > 0.0, f64::from(width));
            ensure_interval!(speed, > 0.0, f64::from(width));
            ensure_interval!(margin, 0.0, f64::from(height));
            ensure_finite("gap", gap)?;
            if gap <= 2.0 * radius || gap + 2.0 * margin > height {
                return Err(ConfigError::inconsistent(format!(
                    "a gap of {gap} must fit the body (diameter {}) \
                     and the canvas (height {height}, margin {margin})",
                    2.0 * radius
                )));
            }
        }

        Ok(())
    }

    fn floor(&self) -> f32 {
        self.height - self.radius
    }

    fn ceiling(&self) -> f32 {
        self.radius
    }
}

/// Continuous snapshot of the environment, the input of a [`StateEncoder`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub y: f32,
    /// Offset from the current target: the center line, or the next gap's center
    pub dy: f32,
    pub velocity: f32,
    /// Horizontal distance from the body to the next obstacle's leading edge
    pub obstacle_dx: Option<f32>,
    /// Seconds since the last jump
    pub since_jump: f32,
    pub near_ceiling: bool,
    pub near_floor: bool,
    pub in_safe_zone: bool,
    pub rising: bool,
}

/// Which bound the body crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Floor,
    Ceiling,
}

/// Everything the last tick did, beyond the summed reward
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    /// Score earned: center-line ticks, or obstacles passed
    pub points: u32,
    /// Sum of the positive reward components
    pub gained: f32,
    /// Sum of the magnitudes of the negative reward components
    pub lost: f32,
    pub breach: Option<Boundary>,
    pub collision: bool,
    pub jumped: bool,
    pub(crate) reward: f32,
}

impl TickEvents {
    fn grant(&mut self, reward: f32) {
        if reward >= 0.0 {
            self.gained += reward;
        } else {
            self.lost -= reward;
        }
        self.reward += reward;
    }

    pub fn reward(&self) -> f32 {
        self.reward
    }
}

/// The hopping-circle environment
///
/// Intended for use with a [`QTableAgent`](crate::algo::tabular::QTableAgent) through a
/// [`StateEncoder`]
pub struct Hop {
    config: HopConfig,
    body: Body,
    obstacles: Vec<Obstacle>,
    since_jump: f32,
    rng: StdRng,
    last: TickEvents,
    pub report: Report,
}

impl Hop {
    pub fn new(config: HopConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut hop = Self {
            body: Body::new(config.width / 2.0, config.start_y, config.radius),
            config,
            obstacles: Vec::new(),
            since_jump: 0.0,
            rng,
            last: TickEvents::default(),
            report: Report::new(vec!["score", "reward", "ticks"]),
        };
        hop.reset();
        Ok(hop)
    }

    pub fn config(&self) -> &HopConfig {
        &self.config
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Events of the most recent [`step`](Environment::step)
    pub fn last_events(&self) -> &TickEvents {
        &self.last
    }

    /// The nearest obstacle the body has not yet cleared
    pub fn next_obstacle(&self) -> Option<&Obstacle> {
        self.obstacles
            .iter()
            .filter(|o| o.is_ahead_of(&self.body))
            .min_by(|a, b| a.x.total_cmp(&b.x))
    }

    /// The height the body is rewarded for being near
    pub fn target(&self) -> f32 {
        match (&self.config.gaps, self.next_obstacle()) {
            (Some(_), Some(obstacle)) => obstacle.gap_center(),
            _ => self.config.center_line,
        }
    }

    fn spacing(&self, gaps: &GapConfig) -> f32 {
        (self.config.width + gaps.width) / gaps.count as f32
    }

    fn random_gap_top(&mut self, gaps: &GapConfig) -> f32 {
        let low = gaps.margin;
        let high = self.config.height - gaps.margin - gaps.gap;
        self.rng.gen_range(low..=high)
    }

    /// Proximity bonus for hovering near the target
    ///
    /// Around the center line it is paid every tick. Around a gap center it is paid once per
    /// obstacle cycle.
    fn shape(&mut self, tick: &mut TickEvents) {
        let RewardConfig {
            target_tolerance,
            target_bonus,
            ..
        } = self.config.rewards;

        if self.config.gaps.is_none() {
            let distance = (self.body.y - self.config.center_line).abs();
            if distance <= target_tolerance {
                tick.grant(target_bonus.bonus(distance, target_tolerance));
                tick.points += 1;
            }
            return;
        }

        let body = self.body;
        let next = self
            .obstacles
            .iter_mut()
            .filter(|o| o.is_ahead_of(&body))
            .min_by(|a, b| a.x.total_cmp(&b.x));
        if let Some(obstacle) = next {
            let distance = (body.y - obstacle.gap_center()).abs();
            if !obstacle.proximity_granted && distance <= target_tolerance {
                obstacle.proximity_granted = true;
                tick.grant(target_bonus.bonus(distance, target_tolerance));
            }
        }
    }

    /// Scroll, collide, pass and recycle obstacles
    fn advance_obstacles(&mut self, scale: f32, tick: &mut TickEvents) {
        let Some(gaps) = self.config.gaps.clone() else {
            return;
        };
        let RewardConfig {
            collision, pass, ..
        } = self.config.rewards;
        let (body, height) = (self.body, self.config.height);

        for obstacle in &mut self.obstacles {
            obstacle.x -= gaps.speed * scale;

            if !obstacle.collided && obstacle.collides(&body, height) {
                obstacle.collided = true;
                tick.collision = true;
                tick.grant(collision);
            }

            if !obstacle.passed
                && !obstacle.collided
                && body.trailing_edge() > obstacle.trailing_edge()
            {
                obstacle.passed = true;
                tick.points += 1;
                tick.grant(pass);
            }
        }

        for i in 0..self.obstacles.len() {
            if self.obstacles[i].is_off_screen() {
                let gap_top = self.random_gap_top(&gaps);
                self.obstacles[i].respawn(self.config.width, gap_top);
                log::trace!("obstacle recycled with gap at {gap_top:.1}");
            }
        }
    }

    fn finish(&mut self, tick: TickEvents, terminal: bool) -> Step<Observation> {
        self.report.add("score", tick.points.into());
        self.report.add("reward", tick.reward.into());
        self.report.add("ticks", 1.0);
        let reward = tick.reward;
        self.last = tick;
        Step {
            next_state: self.observe(),
            reward,
            terminal,
        }
    }
}

impl Environment for Hop {
    type State = Observation;
    type Action = HopAction;

    fn observe(&self) -> Self::State {
        let c = &self.config;
        let y = self.body.y;
        Observation {
            y,
            dy: y - self.target(),
            velocity: self.body.velocity,
            obstacle_dx: self.next_obstacle().map(|o| o.x - self.body.x),
            since_jump: self.since_jump,
            near_ceiling: y < c.ceiling() + c.ceiling_margin,
            near_floor: y > c.floor() - c.floor_margin,
            in_safe_zone: (y - c.center_line).abs() < c.safe_zone,
            rising: self.body.is_rising(),
        }
    }

    fn step(&mut self, action: Self::Action, dt: f32) -> Step<Self::State> {
        let scale = dt * self.config.reference_fps;
        let rewards = self.config.rewards.clone();
        let (ceiling, floor) = (self.config.ceiling(), self.config.floor());
        let mut tick = TickEvents::default();

        // Boundaries
        if self.body.y < ceiling + self.config.ceiling_margin {
            tick.grant(rewards.near_ceiling);
        }
        if self.body.y > floor {
            self.body.y = floor;
            self.body.velocity = 0.0;
            tick.grant(rewards.floor_breach);
            tick.breach = Some(Boundary::Floor);
        } else if self.body.y < ceiling {
            self.body.y = ceiling;
            self.body.velocity = 0.0;
            tick.grant(rewards.ceiling_breach);
            tick.breach = Some(Boundary::Ceiling);
        }

        self.shape(&mut tick);

        if tick.breach.is_some() {
            return self.finish(tick, true);
        }

        if action == HopAction::Jump {
            if self.body.is_rising() {
                tick.grant(rewards.rising_jump);
            }
            if self.since_jump < rewards.jump_cooldown {
                tick.grant(rewards.cooldown_jump);
            }
            self.body.velocity = self.config.jump_velocity;
            self.since_jump = 0.0;
            tick.jumped = true;
        }

        self.body.integrate(self.config.gravity, scale);
        self.since_jump += dt;

        self.advance_obstacles(scale, &mut tick);

        let terminal = tick.collision && self.config.end_on_collision;
        self.finish(tick, terminal)
    }

    fn reset(&mut self) -> Self::State {
        self.body = Body::new(self.config.width / 2.0, self.config.start_y, self.config.radius);
        self.since_jump = 0.0;
        self.last = TickEvents::default();

        self.obstacles.clear();
        if let Some(gaps) = self.config.gaps.clone() {
            let spacing = self.spacing(&gaps);
            for i in 0..gaps.count {
                let gap_top = self.random_gap_top(&gaps);
                let x = self.config.width + i as f32 * spacing;
                self.obstacles.push(Obstacle::new(x, gaps.width, gap_top, gaps.gap));
            }
        }

        self.observe()
    }
}

impl DiscreteActionSpace for Hop {
    fn actions(&self) -> Vec<Self::Action> {
        HopAction::VARIANTS.to_vec()
    }
}
