//! Escape sequence decoder
//!
//! A small finite-state decoder for the key sequences a VT100/xterm sends.
//! After an ESC byte the decoder accumulates follow-up bytes and looks the
//! accumulated sequence up in a table that either asks for another byte or
//! produces a key. Every entry resolves within three follow-up bytes, so a
//! garbled sequence can never block the editor.
//!
//! A read timeout in the middle of a sequence means the user pressed Escape
//! on its own: terminals send whole sequences in one burst, while a human
//! cannot type ESC and `[` within the ~100ms read window.
//!
//! Recognized sequences:
//!
//! | Bytes          | Key        |
//! |----------------|------------|
//! | `ESC [ A..D`   | arrows     |
//! | `ESC [ H`/`F`  | Home/End   |
//! | `ESC O H`/`F`  | Home/End   |
//! | `ESC [ 1 ~`, `ESC [ 7 ~` | Home |
//! | `ESC [ 4 ~`, `ESC [ 8 ~` | End  |
//! | `ESC [ 3 ~`    | Delete     |
//! | `ESC [ 5 ~`    | PageUp     |
//! | `ESC [ 6 ~`    | PageDown   |

use std::collections::VecDeque;
use std::io;

use super::{Key, ESC};
use crate::terminal::ByteSource;

/// Result of looking up the bytes gathered after ESC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The sequence may still grow into something we know
    Need,
    /// The sequence is complete (or hopeless)
    Emit(Key),
}

/// Decoder transition table, keyed by the bytes read after ESC
fn step(seq: &[u8]) -> Step {
    match *seq {
        // Always read two bytes before deciding
        [] | [_] => Step::Need,
        [b'[', digit] if digit.is_ascii_digit() => Step::Need,

        [b'[', digit, b'~'] => Step::Emit(match digit {
            b'1' | b'7' => Key::Home,
            b'3' => Key::Delete,
            b'4' | b'8' => Key::End,
            b'5' => Key::PageUp,
            b'6' => Key::PageDown,
            _ => Key::Escape,
        }),

        [b'[', b'A'] => Step::Emit(Key::ArrowUp),
        [b'[', b'B'] => Step::Emit(Key::ArrowDown),
        [b'[', b'C'] => Step::Emit(Key::ArrowRight),
        [b'[', b'D'] => Step::Emit(Key::ArrowLeft),
        [b'[', b'H'] | [b'O', b'H'] => Step::Emit(Key::Home),
        [b'[', b'F'] | [b'O', b'F'] => Step::Emit(Key::End),

        _ => Step::Emit(Key::Escape),
    }
}

/// Stateful key decoder
#[derive(Debug)]
pub struct Decoder {
    /// Bytes read after the current ESC
    seq: Vec<u8>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self {
            seq: Vec::with_capacity(4),
        }
    }

    /// Read the next key from `source`.
    ///
    /// Returns `Ok(None)` when the read times out before any byte arrives.
    /// Read errors other than a timeout are passed through unchanged.
    pub fn next_key<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> io::Result<Option<Key>> {
        let Some(byte) = source.read_byte()? else {
            return Ok(None);
        };

        if byte != ESC {
            return Ok(Some(Key::from_byte(byte)));
        }

        self.seq.clear();
        loop {
            match step(&self.seq) {
                Step::Emit(key) => {
                    if key == Key::Escape && !self.seq.is_empty() {
                        tracing::trace!("unrecognized escape sequence {:?}", self.seq);
                    }
                    return Ok(Some(key));
                },
                Step::Need => match source.read_byte()? {
                    Some(next) => self.seq.push(next),
                    None => return Ok(Some(Key::Escape)),
                },
            }
        }
    }

    /// Decode a complete chunk of bytes. The end of the chunk is treated as
    /// a read timeout.
    pub fn decode(&mut self, bytes: &[u8]) -> Vec<Key> {
        let mut source: VecDeque<u8> = bytes.iter().copied().collect();
        let mut keys = Vec::new();

        // Reading from memory cannot fail
        while let Ok(Some(key)) = self.next_key(&mut source) {
            keys.push(key);
        }

        keys
    }
}
