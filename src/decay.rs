use crate::{
    error::{ConfigError, Result},
    util::ensure_interval,
};

/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f32) -> f32;
}

/// A constant value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constant {
    value: f32,
}

impl Constant {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl Decay for Constant {
    fn evaluate(&self, _t: f32) -> f32 {
        self.value
    }
}

/// v(t) = max(v<sub>i</sub> * r<sup>t</sup>, v<sub>f</sub>)
///
/// One multiplication by `factor` per elapsed tick, never dropping below the floor.
#[derive(Debug, Clone, PartialEq)]
pub struct Multiplicative {
    factor: f32,
    vi: f32,
    vf: f32,
}

impl Multiplicative {
    pub fn new(factor: f32, vi: f32, vf: f32) -> Result<Self> {
        ensure_interval!(factor, > 0.0, 1.0);
        if factor == 1.0 {
            return Err(ConfigError::inconsistent(
                "a decay factor of 1 never decays, use `Constant` instead",
            ));
        }
        if vf > vi {
            return Err(ConfigError::inconsistent(format!(
                "decay floor {vf} is above the starting value {vi}"
            )));
        }
        Ok(Self { factor, vi, vf })
    }
}

impl Decay for Multiplicative {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { factor, vi, vf } = self;
        (vi * factor.powf(t)).max(vf)
    }
}
