//! Raw input events delivered by the host

/// Scroll gesture phase (for trackpad/touchpad scrolling)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScrollPhase {
    Started,
    #[default]
    Moved,
    Ended,
}

/// Input events
#[derive(Clone, Debug)]
pub enum InputEvent {
    /// Mouse event
    Mouse(MouseEvent),
    /// Keyboard event
    Keyboard(KeyboardEvent),
    /// Scroll/wheel event at the last known pointer position
    Scroll {
        /// Horizontal scroll delta
        delta_x: f32,
        /// Vertical scroll delta
        delta_y: f32,
        /// Scroll phase (for trackpad gestures)
        phase: ScrollPhase,
    },
    /// Committed text input
    Text(char),
}

// ============================================================================
// Mouse Events
// ============================================================================

/// Mouse events, positions in window client coordinates
#[derive(Clone, Debug)]
pub enum MouseEvent {
    Moved {
        x: f32,
        y: f32,
    },
    ButtonPressed {
        button: MouseButton,
        x: f32,
        y: f32,
    },
    ButtonReleased {
        button: MouseButton,
        x: f32,
        y: f32,
    },
    /// Pointer entered the client area
    Entered,
    /// Pointer left the client area
    Left,
}

/// Mouse buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

// ============================================================================
// Keyboard Events
// ============================================================================

/// Keyboard event
#[derive(Clone, Debug)]
pub struct KeyboardEvent {
    /// The key that was pressed or released
    pub key: Key,
    /// Whether the key was pressed or released
    pub state: KeyState,
    /// Modifier keys held during this event
    pub modifiers: Modifiers,
}

impl KeyboardEvent {
    pub fn pressed(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
        }
    }

    pub fn released(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Released,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Key press/release state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Modifier key state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Command on macOS, Windows key on Windows
    pub meta: bool,
}

impl Modifiers {
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Check if no modifiers are held
    pub fn is_empty(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt && !self.meta
    }

    /// Check if only shift is held
    pub fn shift_only(&self) -> bool {
        self.shift && !self.ctrl && !self.alt && !self.meta
    }
}

/// Key codes
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Enter,
    Escape,
    Backspace,
    Tab,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    Left,
    Right,
    Up,
    Down,

    Shift,
    Ctrl,
    Alt,
    Meta,

    /// Function key F1..F24
    Function(u8),

    /// Printable character key
    Char(char),

    Unknown,
}
