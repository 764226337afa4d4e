use std::{io, time::Duration};

use crossterm::event::{self, Event};
use ratatui::{prelude::*, widgets::*};

use super::{
    components::{help::render_help, Arena, Component, Logs, MetricsPanel, Plots},
    input::Command,
    tui::{self, Tui},
};
use crate::driver::{EpisodeSummary, Metrics, MetricsDisplay, PendingJump, Renderer, Scene};

const TABS: [&str; 3] = ["Arena", "Plots", "Logs"];

/// What the frame loop should do after input was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    ResetEpisode,
    Quit,
}

/// Everything drawn in a frame, kept apart from the terminal so both can be borrowed at once
struct View {
    selected_tab: usize,
    show_help: bool,
    arena: Option<Arena>,
    metrics: Option<Metrics>,
    plots: Plots,
    logs: Logs,
}

/// The root TUI component: owns the terminal and draws the simulation
///
/// Acts as both [`Renderer`] and [`MetricsDisplay`] for a [`Driver`](crate::driver::Driver).
pub struct App {
    terminal: Tui,
    view: View,
    pending: PendingJump,
}

impl App {
    /// Initialize the terminal
    ///
    /// `plots` names the per-episode values passed to [`record_episode`](App::record_episode)
    pub fn new(plots: &[&'static str], pending: PendingJump) -> io::Result<Self> {
        Ok(Self {
            terminal: tui::init()?,
            view: View {
                selected_tab: 0,
                show_help: false,
                arena: None,
                metrics: None,
                plots: Plots::new(plots),
                logs: Logs::new(),
            },
            pending,
        })
    }

    pub fn record_episode(&mut self, episode: &EpisodeSummary) {
        self.view.plots.record(episode.episode, &episode.values);
    }

    /// Drain every queued terminal event without blocking
    pub fn handle_events(&mut self) -> io::Result<Flow> {
        let mut flow = Flow::Continue;
        while event::poll(Duration::ZERO)? {
            let event = event::read()?;
            match self.handle_event(&event) {
                Flow::Continue => {}
                Flow::ResetEpisode if flow == Flow::Quit => {}
                other => flow = other,
            }
        }
        Ok(flow)
    }

    fn handle_event(&mut self, event: &Event) -> Flow {
        let Some(command) = Command::from_event(event) else {
            return Flow::Continue;
        };
        let view = &mut self.view;

        match command {
            Command::Quit => return Flow::Quit,
            Command::ResetEpisode => return Flow::ResetEpisode,
            Command::Jump => self.pending.request(),
            Command::ToggleHelp => view.show_help = !view.show_help,
            Command::NextTab => view.selected_tab = (view.selected_tab + 1) % TABS.len(),
            Command::Forward(key) => {
                match view.selected_tab {
                    1 => view.plots.handle_key(key),
                    2 => view.logs.handle_key(key),
                    _ => false,
                };
            }
        }
        Flow::Continue
    }

    fn draw(&mut self) -> io::Result<()> {
        let view = &self.view;
        self.terminal
            .draw(|frame| frame.render_widget(view, frame.size()))?;
        Ok(())
    }

    /// Restore the terminal to its original state
    pub fn close(self) -> io::Result<()> {
        tui::restore()
    }
}

impl Renderer for App {
    fn render(&mut self, scene: &Scene<'_>) -> io::Result<()> {
        self.view.arena = Some(Arena::capture(scene));
        self.draw()
    }
}

impl MetricsDisplay for App {
    fn display(&mut self, metrics: &Metrics) -> io::Result<()> {
        self.view.metrics = Some(metrics.clone());
        Ok(())
    }
}

impl Widget for &View {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Layout
        let [menu_area, main_area, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        // Menu
        Tabs::new(TABS)
            .block(Block::default().padding(Padding::uniform(1)))
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.selected_tab)
            .render(menu_area, buf);

        // Main
        match self.selected_tab {
            0 => {
                let [arena_area, metrics_area] =
                    Layout::horizontal([Constraint::Fill(2), Constraint::Length(32)])
                        .areas(main_area);
                if let Some(arena) = &self.arena {
                    arena.render(arena_area, buf);
                }
                if let Some(metrics) = &self.metrics {
                    MetricsPanel(metrics).render(metrics_area, buf);
                }
            }
            1 => self.plots.render_ref(main_area, buf),
            2 => self.logs.render_ref(main_area, buf),
            _ => {}
        }

        // Exploration rate
        let epsilon = self.metrics.as_ref().map_or(0.0, |m| m.epsilon);
        Gauge::default()
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title("Exploration"),
            )
            .gauge_style(Color::Cyan)
            .ratio(epsilon.clamp(0.0, 1.0).into())
            .label(format!("epsilon {epsilon:.3}"))
            .render(status_area, buf);

        if self.show_help {
            render_help(area, buf, self.selected_tab);
        }
    }
}
