//! Input events delivered by the windowing shell.
//!
//! The shell owns the actual key bindings; the controller only sees these
//! discrete events with world-pixel coordinates.

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Primary button: mine.
    Left,
    /// Secondary button: use or place.
    Right,
}

/// Logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Walk left.
    MoveLeft,
    /// Walk right.
    MoveRight,
    /// Drop down.
    MoveDown,
    /// Jump.
    Jump,
    /// Open the basic 2x2 crafting bench.
    OpenCrafting,
    /// Select a hotbar slot; `1..=9` map to slots 0..=8, `0` to slot 9.
    Digit(u8),
}

/// A single input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to a world-pixel position.
    PointerMove {
        /// Pointer x in pixels.
        x: f32,
        /// Pointer y in pixels.
        y: f32,
    },
    /// Pointer button pressed at a world-pixel position.
    PointerClick {
        /// Which button.
        button: Button,
        /// Pointer x in pixels.
        x: f32,
        /// Pointer y in pixels.
        y: f32,
    },
    /// Pointer left the play surface.
    PointerLeave,
    /// Key pressed.
    KeyPress(Key),
}
