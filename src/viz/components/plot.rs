use crossterm::event::KeyCode;
use ratatui::{prelude::*, style::Stylize, widgets::*};


use super::Component;

/// Scatter plot of one metric against the episode number
pub struct Plot {
    pub x_title: String,
    pub y_title: String,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    x_labels: Vec<String>,
    y_labels: Vec<String>,
    data: Vec<(f64, f64)>,
}

impl Plot {
    pub fn new(y_label: &str) -> Self {
        Self {
            x_title: String::from("Episode"),
            y_title: String::from(y_label),
            x_bounds: [f64::MAX, f64::MIN],
            y_bounds: [f64::MAX, f64::MIN],
            x_labels: Vec::new(),
            y_labels: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Provide initial x bounds
    pub fn with_x_bounds(mut self, x_bounds: [f64; 2]) -> Self {
        self.x_bounds = x_bounds;
        self.x_labels = labels(self.x_bounds);
        self
    }

    pub fn update(&mut self, (x, y): (f64, f64)) {
        if widen(&mut self.x_bounds, x) {
            self.x_labels = labels(self.x_bounds);
        }
        if widen(&mut self.y_bounds, y) {
            self.y_labels = labels(self.y_bounds);
        }
        self.data.push((x, y));
    }
}

/// Grow `bounds` to include `value`, **returns** whether they changed
fn widen(bounds: &mut [f64; 2], value: f64) -> bool {
    let mut changed = false;
    if value < bounds[0] {
        bounds[0] = value;
        changed = true;
    }
    if value > bounds[1] {
        bounds[1] = value;
        changed = true;
    }
    changed
}

fn labels(bounds: [f64; 2]) -> Vec<String> {
    bounds.iter().map(|x| format!("{x:.2}")).collect()
}

impl Widget for &Plot {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Scatter)
            .cyan()
            .data(&self.data);

        let axis = |title: &str, labels: &[String], bounds| {
            Axis::default()
                .title(title.to_string())
                .dark_gray()
                .labels(labels.iter().map(|l| l.clone().bold()).collect())
                .bounds(bounds)
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title("Plots")
            .padding(Padding::uniform(4));

        Chart::new(vec![dataset])
            .block(block)
            .x_axis(axis(&self.x_title, &self.x_labels, self.x_bounds))
            .y_axis(axis(&self.y_title, &self.y_labels, self.y_bounds))
            .render(area, buf);
    }
}

/// One [`Plot`] per episode report key, with a selector
pub struct Plots {
    plot_names: Vec<&'static str>,
    plots: Vec<Plot>,
    selected: usize,
}

impl Plots {
    pub fn new(names: &[&'static str]) -> Self {
        let plots = names
            .iter()
            .map(|k| Plot::new(k).with_x_bounds([0.0, 1.0]))
            .collect();
        Self {
            plot_names: names.to_vec(),
            plots,
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.plot_names.len()
    }

    pub fn next_plot(&mut self) {
        if self.len() > 0 {
            self.selected = (self.selected + 1) % self.len()
        }
    }

    pub fn prev_plot(&mut self) {
        let len = self.len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Add one point per plot, `values` ordered like the plot names
    pub fn record(&mut self, episode: u32, values: &[f64]) {
        for (plot, value) in self.plots.iter_mut().zip(values) {
            plot.update((episode.into(), *value));
        }
    }
}

impl WidgetRef for Plots {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        Tabs::new(self.plot_names.iter().copied())
            .block(Block::default().padding(Padding::uniform(2)))
            .white()
            .highlight_style(Style::default().light_green())
            .select(self.selected)
            .render(area, buf);

        if let Some(plot) = self.plots.get(self.selected) {
            plot.render(area, buf);
        }
    }
}

impl Component for Plots {
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Left => self.prev_plot(),
            KeyCode::Right => self.next_plot(),
            _ => return false,
        }
        true
    }
}
