use rand::{thread_rng, Rng};

use crate::{decay::Decay, error::Result, util::ensure_interval};

use super::Choice;

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// Epsilon at time `t`
    pub fn epsilon(&self, t: u32) -> f32 {
        self.epsilon.evaluate(t as f32)
    }

    /// Check that epsilon is a probability both at the start of the schedule and in its limit
    pub fn validate(&self) -> Result<()> {
        let initial_epsilon = self.epsilon.evaluate(0.0);
        let final_epsilon = self.epsilon.evaluate(f32::INFINITY);
        ensure_interval!(initial_epsilon, 0.0, 1.0);
        ensure_interval!(final_epsilon, 0.0, 1.0);
        Ok(())
    }

    /// Invoke epsilon greedy policy at time `t`
    pub fn choose(&self, t: u32) -> Choice {
        self.choose_with(t, &mut thread_rng())
    }

    pub fn choose_with<R: Rng + ?Sized>(&self, t: u32, rng: &mut R) -> Choice {
        if rng.gen::<f32>() < self.epsilon(t) {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}
