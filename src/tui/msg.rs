//! TEA Message Types for the picker
//!
//! Every key the picker reacts to becomes a `Msg`. Messages describe what the
//! user did; `App::update` decides what that means for the trail.

use crossterm::event::{KeyCode, KeyModifiers};

/// All possible messages/actions in the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    // === Input ===
    /// Character typed into the input (filters the choice list)
    Input(char),
    /// Backspace: edit the input, or retreat when it is already empty
    Backspace,
    /// Enter: decide with the active choice or the typed text
    Submit,

    // === Choice list ===
    /// Move the active choice up
    MoveUp,
    /// Move the active choice down
    MoveDown,
    /// Close the choice list
    HideChoices,

    // === Trail segments ===
    /// Focus the segment left of the current focus
    FocusPrev,
    /// Focus the segment right of the current focus (or the input)
    FocusNext,
    /// Delete the focused segment and everything after it
    DeleteFromHere,
    /// Clear the whole trail
    Reset,

    // === Lifecycle ===
    /// Quit the picker
    Quit,
    /// No operation (for unhandled keys)
    Noop,
}

/// Convert a key event to a message
///
/// Pure: the only state it needs is whether the choice list is open, which
/// decides what Esc means.
pub fn key_to_msg(code: KeyCode, modifiers: KeyModifiers, choices_open: bool) -> Msg {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Msg::Quit,
            KeyCode::Char('r') => Msg::Reset,
            KeyCode::Char('p') => Msg::MoveUp,
            KeyCode::Char('n') => Msg::MoveDown,
            _ => Msg::Noop,
        };
    }

    match code {
        KeyCode::Esc if choices_open => Msg::HideChoices,
        KeyCode::Esc => Msg::Quit,
        KeyCode::Enter | KeyCode::Tab => Msg::Submit,
        KeyCode::Backspace => Msg::Backspace,
        KeyCode::Delete => Msg::DeleteFromHere,
        KeyCode::Up => Msg::MoveUp,
        KeyCode::Down => Msg::MoveDown,
        KeyCode::Left => Msg::FocusPrev,
        KeyCode::Right => Msg::FocusNext,
        KeyCode::Char(c) => Msg::Input(c),
        _ => Msg::Noop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_to_msg_typing() {
        assert_eq!(
            key_to_msg(KeyCode::Char('r'), KeyModifiers::NONE, true),
            Msg::Input('r')
        );
        assert_eq!(
            key_to_msg(KeyCode::Char('R'), KeyModifiers::SHIFT, true),
            Msg::Input('R')
        );
        assert_eq!(
            key_to_msg(KeyCode::Backspace, KeyModifiers::NONE, true),
            Msg::Backspace
        );
        assert_eq!(
            key_to_msg(KeyCode::Enter, KeyModifiers::NONE, true),
            Msg::Submit
        );
        assert_eq!(
            key_to_msg(KeyCode::Tab, KeyModifiers::NONE, false),
            Msg::Submit
        );
    }

    #[test]
    fn test_key_to_msg_escape_depends_on_list() {
        assert_eq!(
            key_to_msg(KeyCode::Esc, KeyModifiers::NONE, true),
            Msg::HideChoices
        );
        assert_eq!(
            key_to_msg(KeyCode::Esc, KeyModifiers::NONE, false),
            Msg::Quit
        );
    }

    #[test]
    fn test_key_to_msg_control_chords() {
        assert_eq!(
            key_to_msg(KeyCode::Char('c'), KeyModifiers::CONTROL, true),
            Msg::Quit
        );
        assert_eq!(
            key_to_msg(KeyCode::Char('r'), KeyModifiers::CONTROL, true),
            Msg::Reset
        );
        assert_eq!(
            key_to_msg(KeyCode::Char('n'), KeyModifiers::CONTROL, true),
            Msg::MoveDown
        );
        assert_eq!(
            key_to_msg(KeyCode::Char('z'), KeyModifiers::CONTROL, true),
            Msg::Noop
        );
    }

    #[test]
    fn test_key_to_msg_segments() {
        assert_eq!(
            key_to_msg(KeyCode::Left, KeyModifiers::NONE, true),
            Msg::FocusPrev
        );
        assert_eq!(
            key_to_msg(KeyCode::Right, KeyModifiers::NONE, true),
            Msg::FocusNext
        );
        assert_eq!(
            key_to_msg(KeyCode::Delete, KeyModifiers::NONE, true),
            Msg::DeleteFromHere
        );
    }
}
