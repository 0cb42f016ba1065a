//! Keyboard input decoding
//!
//! Turns the raw byte stream coming from the terminal into logical key
//! events. Most keys arrive as a single byte; cursor and editing keys arrive
//! as short escape sequences (`ESC [ A`, `ESC [ 3 ~`, `ESC O H`, ...) which
//! the [`Decoder`] reassembles.

mod decoder;

pub use decoder::Decoder;

/// The escape byte that introduces multi-byte key sequences
pub const ESC: u8 = 0x1b;

/// Byte produced by the Backspace key in most terminals
pub const DEL: u8 = 0x7f;

/// Map a letter to the byte its Ctrl chord produces (`ctrl(b'q')` == 0x11)
pub const fn ctrl(byte: u8) -> u8 {
    byte & 0x1f
}

/// A decoded key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable byte (0x20..=0x7e and anything above 0x7f)
    Char(u8),
    /// A C0 control byte other than ESC (Ctrl chords, Tab, Enter)
    Control(u8),
    /// A lone Escape press, or an escape sequence we do not recognize
    Escape,

    // Cursor keys
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Navigation
    Home,
    End,
    PageUp,
    PageDown,

    // Editing
    Delete,
    Backspace,
}

impl Key {
    /// Classify a single byte that is not part of an escape sequence
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            ESC => Key::Escape,
            DEL => Key::Backspace,
            0x00..=0x1f => Key::Control(byte),
            _ => Key::Char(byte),
        }
    }

    /// Whether this is the Ctrl chord for `letter`
    pub fn is_ctrl(self, letter: u8) -> bool {
        self == Key::Control(ctrl(letter))
    }
}
