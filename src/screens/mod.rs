//! Interactive screens: connection dialog, project workspace (sidebar plus
//! transcript editor), chat and upload.

pub mod chat;
pub mod connect;
pub mod project;
pub mod upload;

use crossterm::event::{KeyCode, KeyModifiers};
use tui_input::InputRequest;

/// Map a key press to a single-line text input request. Returns `None` for
/// keys the input field does not consume.
pub(crate) fn to_input_request(key: KeyCode, modifiers: KeyModifiers) -> Option<InputRequest> {
    match key {
        KeyCode::Char(c) if modifiers.contains(KeyModifiers::CONTROL) => match c {
            'u' => Some(InputRequest::DeleteLine),
            'w' => Some(InputRequest::DeletePrevWord),
            'a' => Some(InputRequest::GoToStart),
            'e' => Some(InputRequest::GoToEnd),
            _ => None,
        },
        KeyCode::Char(c) => Some(InputRequest::InsertChar(c)),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_input::Input;

    fn feed(input: &mut Input, key: KeyCode, modifiers: KeyModifiers) {
        if let Some(req) = to_input_request(key, modifiers) {
            input.handle(req);
        }
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = Input::default();
        feed(&mut input, KeyCode::Char('h'), KeyModifiers::NONE);
        feed(&mut input, KeyCode::Char('i'), KeyModifiers::NONE);
        feed(&mut input, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(input.value(), "h");
    }

    #[test]
    fn test_ctrl_u_clears_line() {
        let mut input = Input::default().with_value("some text".to_string());
        feed(&mut input, KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_unhandled_keys_are_ignored() {
        assert!(to_input_request(KeyCode::F(5), KeyModifiers::NONE).is_none());
        assert!(to_input_request(KeyCode::Enter, KeyModifiers::NONE).is_none());
    }
}
