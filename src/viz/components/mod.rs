mod arena;
pub mod help;
pub mod log;
mod metrics;
pub mod plot;

use crossterm::event::KeyCode;
use ratatui::widgets::WidgetRef;

pub use arena::Arena;
pub use log::Logs;
pub use metrics::MetricsPanel;
pub use plot::Plots;

pub trait Component: WidgetRef {
    /// Handle a key the app itself has no binding for
    ///
    /// **Returns** whether the key was consumed
    fn handle_key(&mut self, key: KeyCode) -> bool;
}
