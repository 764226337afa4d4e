pub mod hop;

pub use hop::{Hop, HopAction, HopConfig};
