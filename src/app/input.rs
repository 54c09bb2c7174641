//! Key mapping

use crossterm::event::KeyCode;

/// Actions that can be taken in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Select,
    /// Pick an answer option directly
    Choose(usize),
    Back,
    Quit,
}

/// Map a key press to an action
pub fn key_to_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('j') | KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::Up),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Select),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char(c) => option_index(c).map(Action::Choose),
        _ => None,
    }
}

/// Option index for `1`-`4` or `a`-`d`
fn option_index(c: char) -> Option<usize> {
    match c.to_ascii_lowercase() {
        c @ '1'..='4' => Some(c as usize - '1' as usize),
        c @ 'a'..='d' => Some(c as usize - 'a' as usize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vim_keys_move_selection() {
        assert_eq!(key_to_action(KeyCode::Char('j')), Some(Action::Down));
        assert_eq!(key_to_action(KeyCode::Char('k')), Some(Action::Up));
    }

    #[test]
    fn digits_and_letters_choose_options() {
        assert_eq!(key_to_action(KeyCode::Char('1')), Some(Action::Choose(0)));
        assert_eq!(key_to_action(KeyCode::Char('4')), Some(Action::Choose(3)));
        assert_eq!(key_to_action(KeyCode::Char('b')), Some(Action::Choose(1)));
        assert_eq!(key_to_action(KeyCode::Char('D')), Some(Action::Choose(3)));
    }

    #[test]
    fn q_quits_and_unknown_keys_do_nothing() {
        assert_eq!(key_to_action(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(key_to_action(KeyCode::Char('5')), None);
        assert_eq!(key_to_action(KeyCode::Char('x')), None);
        assert_eq!(key_to_action(KeyCode::Tab), None);
    }
}
