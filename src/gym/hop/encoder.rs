use crate::{
    error::{ConfigError, Result},
    util::ensure_finite,
};

use super::Observation;

/// How continuous observations are binned into a [`StateKey`]
///
/// Every width is a bucket size: a component `v` becomes `floor(v / width)`.
/// A width of `1.0` is plain flooring.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    /// Bucket width for the offset from the target and for the absolute height, in pixels
    pub position_bin: f32,
    /// Include the absolute height alongside the offset from the target
    pub include_height: bool,
    /// Bucket width for vertical velocity, `None` leaves velocity out
    pub velocity_bin: Option<f32>,
    /// Include the near-ceiling, near-floor, safe-zone and rising flags
    pub include_flags: bool,
    /// Bucket width for the horizontal distance to the next obstacle, `None` leaves it out
    pub obstacle_bin: Option<f32>,
    /// Bucket width for the time since the last jump, in seconds, `None` leaves it out
    pub since_jump_bin: Option<f32>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            position_bin: 1.0,
            include_height: true,
            velocity_bin: None,
            include_flags: false,
            obstacle_bin: Some(20.0),
            since_jump_bin: Some(0.5),
        }
    }
}

/// Discrete key identifying a state in the Q-table
///
/// The arity is fixed: components switched off in the [`EncoderConfig`] are always `0`
/// (or `None` for the obstacle distance), so keys from one configuration never collide
/// with a different binning of the same observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateKey {
    pub dy: i32,
    pub height: i32,
    pub velocity: i32,
    pub flags: u8,
    pub obstacle: Option<i32>,
    pub since_jump: i32,
}

impl StateKey {
    pub const NEAR_CEILING: u8 = 1;
    pub const NEAR_FLOOR: u8 = 1 << 1;
    pub const SAFE_ZONE: u8 = 1 << 2;
    pub const RISING: u8 = 1 << 3;
}

/// Maps an [`Observation`] to a [`StateKey`]
///
/// The same encoder must be used for both ends of a transition.
#[derive(Debug, Clone)]
pub struct StateEncoder {
    config: EncoderConfig,
}

impl StateEncoder {
    /// **Errors** if any bucket width is not a positive finite number
    pub fn new(config: EncoderConfig) -> Result<Self> {
        check_width("position_bin", config.position_bin)?;
        for (name, width) in [
            ("velocity_bin", config.velocity_bin),
            ("obstacle_bin", config.obstacle_bin),
            ("since_jump_bin", config.since_jump_bin),
        ] {
            if let Some(width) = width {
                check_width(name, width)?;
            }
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn encode(&self, observation: &Observation) -> StateKey {
        let c = &self.config;

        let flags = if c.include_flags {
            [
                (observation.near_ceiling, StateKey::NEAR_CEILING),
                (observation.near_floor, StateKey::NEAR_FLOOR),
                (observation.in_safe_zone, StateKey::SAFE_ZONE),
                (observation.rising, StateKey::RISING),
            ]
            .into_iter()
            .filter(|(set, _)| *set)
            .fold(0, |acc, (_, bit)| acc | bit)
        } else {
            0
        };

        StateKey {
            dy: bin(observation.dy, c.position_bin),
            height: if c.include_height {
                bin(observation.y, c.position_bin)
            } else {
                0
            },
            velocity: c.velocity_bin.map_or(0, |w| bin(observation.velocity, w)),
            flags,
            obstacle: c
                .obstacle_bin
                .and_then(|w| observation.obstacle_dx.map(|dx| bin(dx, w))),
            since_jump: c.since_jump_bin.map_or(0, |w| bin(observation.since_jump, w)),
        }
    }
}

fn check_width(name: &'static str, width: f32) -> Result<()> {
    ensure_finite(name, width)?;
    if width <= 0.0 {
        return Err(ConfigError::inconsistent(format!(
            "`{name}` must be a positive bucket width, got {width}"
        )));
    }
    Ok(())
}

/// `floor(value / width)`, saturating at the `i32` range; NaN maps to `0`
fn bin(value: f32, width: f32) -> i32 {
    (value / width).floor() as i32
}
