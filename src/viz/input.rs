use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

/// What a key press asks the [`App`](super::App) to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Command {
    Quit,
    ResetEpisode,
    Jump,
    ToggleHelp,
    NextTab,
    /// Not an app-level key, handed to the component of the selected tab
    Forward(KeyCode),
}

impl Command {
    /// Only key presses map to commands; releases, repeats, mouse and resize events are ignored
    pub(super) fn from_event(event: &Event) -> Option<Self> {
        let Event::Key(key) = event else {
            return None;
        };
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let command = match key.code {
            // Raw mode swallows SIGINT
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Self::Quit,
            KeyCode::Char('q') => Self::Quit,
            KeyCode::Char('r') => Self::ResetEpisode,
            KeyCode::Char(' ') | KeyCode::Up => Self::Jump,
            KeyCode::Char('h') => Self::ToggleHelp,
            KeyCode::Tab => Self::NextTab,
            code => Self::Forward(code),
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEvent;

    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn app_keys() {
        assert_eq!(Command::from_event(&press(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(Command::from_event(&press(KeyCode::Char(' '))), Some(Command::Jump));
        assert_eq!(Command::from_event(&press(KeyCode::Up)), Some(Command::Jump));
        assert_eq!(
            Command::from_event(&press(KeyCode::Char('r'))),
            Some(Command::ResetEpisode)
        );
        assert_eq!(Command::from_event(&press(KeyCode::Tab)), Some(Command::NextTab));
        assert_eq!(
            Command::from_event(&Event::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL
            ))),
            Some(Command::Quit),
            "Ctrl-C quits in raw mode"
        );
    }

    #[test]
    fn other_keys_are_forwarded() {
        assert_eq!(
            Command::from_event(&press(KeyCode::Left)),
            Some(Command::Forward(KeyCode::Left)),
            "Plot and log navigation belongs to the selected tab"
        );
        assert_eq!(
            Command::from_event(&press(KeyCode::Char('c'))),
            Some(Command::Forward(KeyCode::Char('c')))
        );
    }

    #[test]
    fn only_presses_count() {
        let release = Event::Key(KeyEvent::new_with_kind(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert_eq!(Command::from_event(&release), None, "Releasing space is not a second jump");
        assert_eq!(Command::from_event(&Event::Resize(80, 24)), None);
    }
}
