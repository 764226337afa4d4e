use crossterm::event::KeyCode;
use log::LevelFilter;
use ratatui::{prelude::*, widgets::WidgetRef};
use tui_logger::{TuiLoggerSmartWidget, TuiWidgetEvent, TuiWidgetState};

use super::Component;

/// Log targets of this crate and the level each one is captured and shown at
///
/// Q updates log every tick, so they are captured but hidden until raised with `→`.
const TARGETS: [(&str, LevelFilter, LevelFilter); 4] = [
    ("hopper::driver", LevelFilter::Debug, LevelFilter::Debug),
    ("hopper::algo::tabular::q_table", LevelFilter::Trace, LevelFilter::Off),
    ("hopper::gym::hop", LevelFilter::Trace, LevelFilter::Trace),
    ("hopper::util", LevelFilter::Warn, LevelFilter::Warn),
];

/// Install `tui_logger` as the `log` sink with per-target capture levels
///
/// Must run once, before the first record is logged.
pub fn init_logging() -> Result<(), log::SetLoggerError> {
    tui_logger::init_logger(LevelFilter::Trace)?;
    tui_logger::set_default_level(LevelFilter::Info);
    for (target, capture, _) in TARGETS {
        tui_logger::set_level_for_target(target, capture);
    }
    Ok(())
}

/// Episode boundaries, Q updates, obstacle recycling and rejected settings
pub struct Logs {
    state: TuiWidgetState,
}

impl Logs {
    pub fn new() -> Self {
        let state = TARGETS.iter().fold(
            TuiWidgetState::new().set_default_display_level(LevelFilter::Info),
            |state, &(target, _, display)| state.set_level_for_target(target, display),
        );
        Self { state }
    }
}

impl WidgetRef for Logs {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        TuiLoggerSmartWidget::default()
            .title_target("Targets")
            .title_log("Log")
            .style(Style::default().white())
            .style_error(Style::default().light_red())
            .style_warn(Style::default().light_yellow())
            .style_info(Style::default().cyan())
            .style_debug(Style::default().light_green())
            .style_trace(Style::default().dark_gray())
            .output_separator(' ')
            .output_file(false)
            .output_line(false)
            .state(&self.state)
            .render(area, buf);
    }
}

impl Component for Logs {
    fn handle_key(&mut self, key: KeyCode) -> bool {
        let widget_event = match key {
            KeyCode::Char('t') => TuiWidgetEvent::SpaceKey,
            KeyCode::Esc => TuiWidgetEvent::EscapeKey,
            KeyCode::PageUp => TuiWidgetEvent::PrevPageKey,
            KeyCode::PageDown => TuiWidgetEvent::NextPageKey,
            KeyCode::Char('k') => TuiWidgetEvent::UpKey,
            KeyCode::Down | KeyCode::Char('j') => TuiWidgetEvent::DownKey,
            KeyCode::Left => TuiWidgetEvent::LeftKey,
            KeyCode::Right => TuiWidgetEvent::RightKey,
            KeyCode::Char('=') | KeyCode::Char('+') => TuiWidgetEvent::PlusKey,
            KeyCode::Char('-') | KeyCode::Char('_') => TuiWidgetEvent::MinusKey,
            KeyCode::Char('s') => TuiWidgetEvent::HideKey,
            KeyCode::Char('f') => TuiWidgetEvent::FocusKey,
            _ => return false,
        };

        self.state.transition(widget_event);
        true
    }
}
