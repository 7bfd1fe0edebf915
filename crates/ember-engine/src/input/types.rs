/// Keyboard key identifier.
///
/// This is intentionally minimal: the runtime maps platform keycodes into
/// these variants where possible. For unsupported keys, use `Key::Unknown`
/// with a stable platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    /// Platform-dependent key not represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// A single key transition delivered to the application.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub state: KeyState,

    /// True for OS auto-repeat events while the key is held.
    pub repeat: bool,
}

impl KeyEvent {
    /// Convenience predicate for initial (non-repeat) presses.
    #[inline]
    pub fn is_press(&self) -> bool {
        self.state == KeyState::Pressed && !self.repeat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_presses_are_not_initial_presses() {
        let press = KeyEvent { key: Key::Space, state: KeyState::Pressed, repeat: false };
        let repeat = KeyEvent { key: Key::Space, state: KeyState::Pressed, repeat: true };
        let release = KeyEvent { key: Key::Space, state: KeyState::Released, repeat: false };

        assert!(press.is_press());
        assert!(!repeat.is_press());
        assert!(!release.is_press());
    }
}
