//! Key bindings

use crossterm::event::KeyCode;

/// Launcher actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    PageUp,
    PageDown,
    NextCategory,
    NextPlatform,
    Favorite,
    Ignore,
    Run,
    Quit,
}

/// Map a key to its action
pub fn action_for(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Up => Some(Action::Up),
        KeyCode::Down => Some(Action::Down),
        KeyCode::Left | KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::Right | KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::Tab => Some(Action::NextCategory),
        KeyCode::Char('e') => Some(Action::NextPlatform),
        KeyCode::Char('f') => Some(Action::Favorite),
        KeyCode::Char('i') => Some(Action::Ignore),
        KeyCode::Enter => Some(Action::Run),
        KeyCode::Esc | KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}
