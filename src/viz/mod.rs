//! Terminal front end for watching the agent learn.
//!
//! The [`App`] draws the arena, per-episode plots and captured logs. Records reach the Logs tab
//! through `tui_logger`, which the binary installs as the `log` sink with [`init_logging`].

mod app;
mod components;
mod input;
pub mod tui;

pub use app::{App, Flow};
pub use components::log::init_logging;
