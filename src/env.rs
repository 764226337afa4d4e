use std::ops::Index;

use rand::{seq::IteratorRandom, thread_rng};

/// The result of advancing an environment by one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S> {
    /// The observable state after the tick
    pub next_state: S,
    /// Sum of every reward component granted during the tick
    pub reward: f32,
    /// Whether the tick ended the episode
    pub terminal: bool,
}

/// Represents a real-time environment in which an agent acts once per simulation tick.
///
/// Unlike a turn-based MDP, each step is given the wall-clock time `dt` (in seconds)
/// that elapsed since the previous tick, so the dynamics stay independent of the frame rate.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State;

    /// A representation of an action that an agent can take to affect the environment
    type Action;

    /// Observe the current state without advancing time
    fn observe(&self) -> Self::State;

    /// Update the environment in response to an action taken by an agent, advancing time by `dt`
    fn step(&mut self, action: Self::Action, dt: f32) -> Step<Self::State>;

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;
}

/// An environment with a finite action space
pub trait DiscreteActionSpace: Environment {
    /// Get the available actions
    ///
    /// The returned vec should never be empty, instead specify an action that represents doing
    /// nothing if necessary.
    fn actions(&self) -> Vec<Self::Action>;

    /// Choose an action uniformly at random
    fn random_action(&self) -> Self::Action {
        self.actions()
            .into_iter()
            .choose(&mut thread_rng())
            .expect("action space is not empty")
    }
}

/// Per-episode accumulator of named metrics, kept in insertion order
#[derive(Debug, Clone)]
pub struct Report {
    keys: Vec<&'static str>,
    values: Vec<f64>,
}

impl Report {
    pub fn new(keys: Vec<&'static str>) -> Self {
        let values = vec![0.0; keys.len()];
        Self { keys, values }
    }

    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    /// Add `delta` to the metric named `key`
    ///
    /// **Panics** if `key` was not registered
    pub fn add(&mut self, key: &str, delta: f64) {
        let i = self.position(key);
        self.values[i] += delta;
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.keys
            .iter()
            .position(|k| *k == key)
            .map(|i| self.values[i])
    }

    /// Values in key order, resetting every metric to zero
    pub fn take(&mut self) -> Vec<f64> {
        std::mem::replace(&mut self.values, vec![0.0; self.keys.len()])
    }

    fn position(&self, key: &str) -> usize {
        self.keys
            .iter()
            .position(|k| *k == key)
            .unwrap_or_else(|| panic!("`{key}` is not a registered report key"))
    }
}

impl Index<&str> for Report {
    type Output = f64;

    fn index(&self, key: &str) -> &Self::Output {
        &self.values[self.position(key)]
    }
}
