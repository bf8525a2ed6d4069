use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::session::GamePhase;

/// What a key press means for the game in its current phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    Hit(char),
    Start,
    Reset,
    Quit,
    Ignore,
}

pub fn map_key(key: KeyEvent, phase: GamePhase) -> InputAction {
    // Windows reports releases as separate events
    if key.kind == KeyEventKind::Release {
        return InputAction::Ignore;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return InputAction::Quit;
    }

    match phase {
        GamePhase::Playing => match key.code {
            KeyCode::Esc => InputAction::Quit,
            KeyCode::Char(c) if c.is_ascii_alphabetic() => {
                InputAction::Hit(c.to_ascii_uppercase())
            }
            _ => InputAction::Ignore,
        },
        GamePhase::Idle | GamePhase::GameOver => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => InputAction::Start,
            KeyCode::Char('r') | KeyCode::Char('R') if phase == GamePhase::GameOver => {
                InputAction::Reset
            }
            KeyCode::Esc | KeyCode::Char('q') => InputAction::Quit,
            _ => InputAction::Ignore,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn letters_are_hits_while_playing() {
        assert_eq!(
            map_key(press(KeyCode::Char('g')), GamePhase::Playing),
            InputAction::Hit('G')
        );
        assert_eq!(
            map_key(press(KeyCode::Char('G')), GamePhase::Playing),
            InputAction::Hit('G')
        );
    }

    #[test]
    fn non_letters_are_ignored_while_playing() {
        for code in [
            KeyCode::Char('1'),
            KeyCode::Char(' '),
            KeyCode::Char(';'),
            KeyCode::Enter,
            KeyCode::Backspace,
            KeyCode::Left,
        ] {
            assert_eq!(map_key(press(code), GamePhase::Playing), InputAction::Ignore);
        }
    }

    #[test]
    fn letters_do_nothing_outside_play() {
        assert_eq!(
            map_key(press(KeyCode::Char('a')), GamePhase::Idle),
            InputAction::Ignore
        );
        assert_eq!(
            map_key(press(KeyCode::Char('a')), GamePhase::GameOver),
            InputAction::Ignore
        );
    }

    #[test]
    fn start_reset_and_quit_keys() {
        assert_eq!(map_key(press(KeyCode::Enter), GamePhase::Idle), InputAction::Start);
        assert_eq!(
            map_key(press(KeyCode::Char(' ')), GamePhase::GameOver),
            InputAction::Start
        );
        assert_eq!(
            map_key(press(KeyCode::Char('r')), GamePhase::GameOver),
            InputAction::Reset
        );
        assert_eq!(
            map_key(press(KeyCode::Char('r')), GamePhase::Idle),
            InputAction::Ignore
        );
        assert_eq!(map_key(press(KeyCode::Esc), GamePhase::Playing), InputAction::Quit);
        assert_eq!(map_key(press(KeyCode::Char('q')), GamePhase::Idle), InputAction::Quit);
    }

    #[test]
    fn ctrl_c_quits_in_every_phase() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for phase in [GamePhase::Idle, GamePhase::Playing, GamePhase::GameOver] {
            assert_eq!(map_key(ctrl_c, phase), InputAction::Quit);
        }
    }
}
