use ratatui::{prelude::*, widgets::*};

fn key(label: &'static str, text: &'static str) -> Vec<Span<'static>> {
    vec![Span::from(label).light_cyan().bold(), Span::raw(text)]
}

pub fn render_help(area: Rect, buf: &mut Buffer, selected_tab: usize) {
    let lines = vec![
        key("q / ^C", " : Stop the simulation and exit"),
        key("  h  ", " : Toggle help popup"),
        key(" Tab ", " : Switch tabs"),
        key("Space / ⬆", " : Jump on the next frame"),
        key("  r  ", " : Reset the running episode"),
    ];

    let additional_lines = match selected_tab {
        1 => vec![key("⬅ / ➡", " : Switch plots")],
        2 => vec![
            key("  t  ", " : Hide targets whose display level is off, like Q updates"),
            key("  s  ", " : Toggles target selector widget hidden/visible"),
            key("  f  ", " : Toggle focus on the selected target only"),
            key("k / j", " : Switch log target"),
            key("⬅ / ➡", " : Reduce/increase shown log messages by one level"),
            key("- / +", " : Reduce/increase captured log messages by one level"),
            key("PgUp ", " : Enter Page Mode and scroll approx. half page up in log history"),
            key("PgDn ", " : Only in page mode, scroll 10 events down in log history"),
            key(" Esc ", " : Exit page mode and go back to scrolling mode"),
        ],
        _ => vec![],
    };

    let lines = [lines, additional_lines]
        .concat()
        .into_iter()
        .map(Line::from)
        .collect::<Vec<_>>();

    let [_, center_vert, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length((lines.len() + 4) as u16),
        Constraint::Fill(1),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(90),
        Constraint::Fill(1),
    ])
    .areas(center_vert);

    Clear.render(center, buf);

    Paragraph::new(lines)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .padding(Padding::proportional(1))
                .title("Help"),
        )
        .wrap(Wrap { trim: false })
        .render(center, buf);
}
