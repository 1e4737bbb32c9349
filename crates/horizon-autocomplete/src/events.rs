//! Input event types routed to autocompletion controllers.
//!
//! Hosts translate their native input stream into these events and hand them
//! to [`AutocompleteRegistry::dispatch`](crate::registry::AutocompleteRegistry::dispatch).
//! The controller reacts to key releases, mirroring platforms where the edit
//! control processes the key first and autocompletion observes the result.
//!
//! Every handler reports a [`DispatchResult`] telling the host whether to
//! swallow the event or continue native processing.

use crate::geometry::Point;
use crate::host::ControlId;

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held (Cmd on macOS).
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held (Windows key, Cmd on macOS).
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        shift: false,
        control: true,
        alt: false,
        meta: false,
    };

    /// Alt modifier only.
    pub const ALT: Self = Self {
        shift: false,
        control: false,
        alt: true,
        meta: false,
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }

    /// Check if no modifiers are pressed.
    pub fn none(&self) -> bool {
        !self.any()
    }
}

/// Keys a text field's release handler distinguishes.
///
/// Character-producing keys arrive as [`Key::Char`]; the controller never
/// inspects the character itself, only the fact that the field text changed.
/// Unmapped platform keys arrive as [`Key::Unknown`] and take the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    // Navigation
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,

    // Editing
    Backspace,
    Delete,
    Enter,
    Tab,

    // Control
    Escape,

    /// A character-producing key, carrying the character it produced.
    Char(char),

    /// Unknown/unmapped key.
    Unknown(u16),
}

/// Key release event, sent after the field has processed the key natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyReleaseEvent {
    /// The key that was released.
    pub key: Key,
    /// Keyboard modifiers held during the event.
    pub modifiers: KeyboardModifiers,
}

impl KeyReleaseEvent {
    /// Create a new key release event.
    pub fn new(key: Key, modifiers: KeyboardModifiers) -> Self {
        Self { key, modifiers }
    }

    /// Create a key release event with no modifiers held.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyboardModifiers::NONE,
        }
    }
}

/// Events a host routes to the autocompletion layer.
///
/// Key, focus, and destroy notifications target the bound text field;
/// pointer notifications target the suggestion list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// A key was released in the text field.
    KeyRelease(KeyReleaseEvent),
    /// The pointer moved over the suggestion list.
    PointerMove(Point),
    /// The primary pointer button was pressed over the suggestion list.
    PointerPress,
    /// The text field lost keyboard focus.
    FocusLost {
        /// The control that received focus, if any.
        new_focus: Option<ControlId>,
    },
    /// The text field is being destroyed.
    Destroyed,
}

/// Result of dispatching an event to a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// The event was consumed; the host must not process it further.
    Consumed,
    /// The event was not (fully) handled; native processing continues.
    Forward,
}

impl DispatchResult {
    /// Check if the event was consumed.
    pub fn was_consumed(&self) -> bool {
        matches!(self, Self::Consumed)
    }
}
