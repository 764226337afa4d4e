use ratatui::{prelude::*, widgets::*};

use crate::driver::Metrics;

/// Text panel of session counters and agent hyperparameters
pub struct MetricsPanel<'a>(pub &'a Metrics);

impl Widget for MetricsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let m = self.0;
        let row = |label: &'static str, value: String| {
            Line::from(vec![
                Span::from(format!("{label:<10}")).light_cyan().bold(),
                Span::raw(value),
            ])
        };
        let recent = m
            .recent_average
            .map_or_else(|| String::from("-"), |avg| format!("{avg:.2}"));

        let lines = vec![
            row("Episode", m.episodes.to_string()),
            row("Games", m.games.to_string()),
            row("Ticks", m.ticks.to_string()),
            row("Score", m.score.to_string()),
            row("High", m.high_score.to_string()),
            row("Average", format!("{:.2}", m.average_score)),
            row("Recent", recent),
            Line::default(),
            row("Rewards", format!("+{:.1}", m.positive_rewards)),
            row("Penalties", format!("-{:.1}", m.negative_rewards)),
            row("y", format!("{:.1}", m.y)),
            row("dy", format!("{:.1}", m.dy)),
            Line::default(),
            row("epsilon", format!("{:.3}", m.epsilon)),
            row("alpha", format!("{:.2}", m.alpha)),
            row("gamma", format!("{:.2}", m.gamma)),
            row("States", m.table_states.to_string()),
            row("Entries", m.table_entries.to_string()),
        ];

        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .padding(Padding::horizontal(1))
                    .title("Metrics"),
            )
            .render(area, buf);
    }
}
