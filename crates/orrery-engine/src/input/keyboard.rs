//! Held-key state tracker.
//!
//! [`KeyboardState`] folds key-down/key-up events into the set of keys that
//! are currently held, which is all that continuous movement needs.

use std::collections::HashSet;
use crate::input::queue::InputEvent;

/// DOM `keyCode` values used by the engine's consumers.
pub mod codes {
    pub const SHIFT: u32 = 16;
    pub const ESCAPE: u32 = 27;
    pub const A: u32 = 65;
    pub const D: u32 = 68;
    pub const Q: u32 = 81;
    pub const R: u32 = 82;
    pub const S: u32 = 83;
    pub const W: u32 = 87;
}

#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<u32>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one input event into the held set. Non-key events are ignored.
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown { key_code } => {
                self.pressed.insert(key_code);
            }
            InputEvent::KeyUp { key_code } => {
                self.pressed.remove(&key_code);
            }
            _ => {}
        }
    }

    pub fn is_pressed(&self, key_code: u32) -> bool {
        self.pressed.contains(&key_code)
    }

    /// Forget every held key. Key-up events for them may never arrive.
    pub fn release_all(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut kb = KeyboardState::new();
        kb.apply(&InputEvent::KeyDown { key_code: codes::W });
        kb.apply(&InputEvent::KeyDown { key_code: codes::SHIFT });
        assert!(kb.is_pressed(codes::W));
        kb.apply(&InputEvent::KeyUp { key_code: codes::W });
        assert!(!kb.is_pressed(codes::W));
        assert!(kb.is_pressed(codes::SHIFT));
    }

    #[test]
    fn mouse_events_do_not_touch_keys() {
        let mut kb = KeyboardState::new();
        kb.apply(&InputEvent::MouseDelta { dx: 1.0, dy: 1.0 });
        kb.apply(&InputEvent::PointerLock { locked: true });
        assert!(!kb.is_pressed(codes::W));
    }

    #[test]
    fn release_all_clears() {
        let mut kb = KeyboardState::new();
        kb.apply(&InputEvent::KeyDown { key_code: codes::D });
        kb.release_all();
        assert!(!kb.is_pressed(codes::D));
    }
}
