//! Key bindings (normal and vim-style) and the queue that carries intents to the engine.

use crate::trivia::Answer;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::VecDeque;

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    /// Rotate in play, "up" in menus.
    Rotate,
    /// Soft drop in play, "down" in menus.
    SoftDrop,
    HardDrop,
    Confirm,
    Answer(Answer),
    Pause,
    Quit,
    None,
}

/// Map key event to action. Supports both normal (arrows, space) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p' | 'P') => Action::Pause,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') => Action::Rotate,
        KeyCode::Down | KeyCode::Char('j') => Action::SoftDrop,
        KeyCode::Char(' ') => Action::HardDrop,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Char('a' | 'A' | '1') => Action::Answer(Answer::A),
        KeyCode::Char('b' | 'B' | '2') => Action::Answer(Answer::B),
        KeyCode::Char('c' | 'C' | '3') => Action::Answer(Answer::C),
        KeyCode::Char('d' | 'D' | '4') => Action::Answer(Answer::D),
        _ => Action::None,
    }
}

/// FIFO of pending intents. Input handlers only push; the app drains once
/// per frame and is the only caller of engine mutators.
#[derive(Debug, Default)]
pub struct IntentQueue {
    pending: VecDeque<Action>,
}

impl IntentQueue {
    pub fn push(&mut self, action: Action) {
        if action != Action::None {
            self.pending.push_back(action);
        }
    }

    pub fn pop(&mut self) -> Option<Action> {
        self.pending.pop_front()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_and_vim_bindings_agree() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('h'))), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Right)), Action::MoveRight);
        assert_eq!(key_to_action(key(KeyCode::Char('l'))), Action::MoveRight);
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::Rotate);
        assert_eq!(key_to_action(key(KeyCode::Char('k'))), Action::Rotate);
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::SoftDrop);
        assert_eq!(key_to_action(key(KeyCode::Char('j'))), Action::SoftDrop);
    }

    #[test]
    fn test_answer_keys() {
        assert_eq!(key_to_action(key(KeyCode::Char('a'))), Action::Answer(Answer::A));
        assert_eq!(key_to_action(key(KeyCode::Char('4'))), Action::Answer(Answer::D));
    }

    #[test]
    fn test_ctrl_c_quits_and_other_modifiers_ignored() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_c), Action::Quit);
        let alt_h = KeyEvent::new(KeyCode::Char('h'), KeyModifiers::ALT);
        assert_eq!(key_to_action(alt_h), Action::None);
    }

    #[test]
    fn test_queue_is_fifo_and_skips_none() {
        let mut queue = IntentQueue::default();
        queue.push(Action::MoveLeft);
        queue.push(Action::None);
        queue.push(Action::HardDrop);
        assert_eq!(queue.pop(), Some(Action::MoveLeft));
        assert_eq!(queue.pop(), Some(Action::HardDrop));
        assert_eq!(queue.pop(), None);
    }
}
