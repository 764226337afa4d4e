//! A tabular Q-learning agent that learns, in real time, to keep a falling circle alive.
//!
//! The [`gym::Hop`] environment simulates the circle, a [`gym::hop::StateEncoder`] discretizes
//! what it observes, an [`algo::tabular::QTableAgent`] picks actions and learns from every
//! transition, and a [`driver::Driver`] runs the loop once per frame.

/// Implemented RL algorithms
pub mod algo;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Data structures
pub mod ds;

/// Frame loop and session bookkeeping
pub mod driver;

/// Environment
pub mod env;

/// Configuration errors
pub mod error;

/// Exploration policies
pub mod exploration;

/// Transitions
pub mod memory;

/// Simulated environments
pub mod gym;

/// Terminal front end
#[cfg(feature = "viz")]
pub mod viz;

mod util;
