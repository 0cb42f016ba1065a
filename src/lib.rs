//! Quill Editor Library
//!
//! A small text editor that drives the terminal directly, without any
//! terminal UI library. This crate provides:
//!
//! - `terminal`: raw mode, keystroke input, window size discovery
//! - `input`: decoding of keystroke bytes and escape sequences into keys
//! - `buffer`: the edited document (rows, cursor, persistence)
//! - `view`: viewport scrolling and frame rendering
//! - `editor`: the event loop tying everything together
//! - `app`: configuration and logging

pub mod app;
pub mod buffer;
pub mod editor;
pub mod input;
pub mod terminal;
pub mod view;

pub use buffer::{Cursor, Movement, PersistenceError, Row, TextBuffer};
pub use editor::{Control, Editor, EditorError, EditorResult};
pub use input::{Decoder, Key};
pub use terminal::{ByteSource, RawMode, TerminalError, TtyInput, TtyOutput, WindowSize};
pub use view::{Renderer, Viewport};
