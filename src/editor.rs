//! Editor controller
//!
//! Ties the pieces together: reads one decoded key, applies it to the
//! buffer, and redraws. The editor is generic over its byte source and
//! output sink so the whole loop can be driven from memory in tests.

use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::app::{Config, ConfigError};
use crate::buffer::{Movement, TextBuffer};
use crate::input::{Decoder, Key};
use crate::terminal::{ByteSource, TerminalError, WindowSize};
use crate::view::{Renderer, StatusMessage, Viewport};

/// Message shown when the editor starts
pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit";

/// Fatal editor errors. Anything that reaches `main` ends the session.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("terminal error: {0}")]
    Terminal(#[from] TerminalError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;

/// What the event loop should do after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The editor: buffer, viewport and terminal I/O
pub struct Editor<I, W> {
    buffer: TextBuffer,
    viewport: Viewport,
    renderer: Renderer,
    decoder: Decoder,
    input: I,
    output: W,
    status: StatusMessage,
    message_timeout: Duration,
    /// Quit presses required while dirty
    quit_times: u32,
    /// Quit presses left before a dirty buffer is discarded
    quit_remaining: u32,
}

impl<I: ByteSource, W: Write> Editor<I, W> {
    /// Create an editor for a terminal of `size`
    pub fn new(input: I, output: W, size: WindowSize, config: &Config) -> Self {
        let quit_times = config.quit_times.max(1);
        let mut status = StatusMessage::default();
        status.set(HELP_MESSAGE);

        Self {
            buffer: TextBuffer::new(config.tab_stop),
            viewport: Viewport::for_terminal(size.rows, size.cols),
            renderer: Renderer::new(),
            decoder: Decoder::new(),
            input,
            output,
            status,
            message_timeout: config.message_timeout(),
            quit_times,
            quit_remaining: quit_times,
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// The current status message, expired or not
    pub fn status_message(&self) -> &str {
        self.status.text()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status.set(message);
    }

    /// Load a file into the buffer
    pub fn open(&mut self, path: impl AsRef<Path>) -> EditorResult<()> {
        self.buffer.open(path)?;
        Ok(())
    }

    /// Run until the user quits
    pub fn run(&mut self) -> EditorResult<()> {
        loop {
            self.refresh_screen()?;
            if self.process_keypress()? == Control::Quit {
                tracing::info!("quit requested");
                return Ok(());
            }
        }
    }

    /// Bring the cursor into view and draw one frame
    pub fn refresh_screen(&mut self) -> io::Result<()> {
        self.scroll();
        let message = self.status.visible_at(Instant::now(), self.message_timeout);
        self.renderer
            .render_frame(&mut self.output, &self.buffer, &self.viewport, message)
    }

    /// Wait for one key (up to the read timeout) and handle it
    pub fn process_keypress(&mut self) -> EditorResult<Control> {
        match self.decoder.next_key(&mut self.input)? {
            Some(key) => self.handle_key(key),
            None => Ok(Control::Continue),
        }
    }

    /// Apply a single key
    pub fn handle_key(&mut self, key: Key) -> EditorResult<Control> {
        if key.is_ctrl(b'q') {
            return Ok(self.request_quit());
        }

        match key {
            k if k.is_ctrl(b's') => self.save()?,
            // Ctrl-L would redraw, which happens after every key anyway
            k if k.is_ctrl(b'l') => {},
            k if k.is_ctrl(b'h') => self.buffer.delete_char_before_cursor(),
            Key::Control(b'\r') => self.buffer.insert_newline(),
            Key::Control(b'\t') => self.buffer.insert_char(b'\t'),
            Key::Control(_) | Key::Escape => {},
            Key::Char(byte) => self.buffer.insert_char(byte),

            Key::Backspace => self.buffer.delete_char_before_cursor(),
            Key::Delete => self.buffer.delete_char_at_cursor(),

            Key::ArrowUp => self.buffer.move_cursor(Movement::Up),
            Key::ArrowDown => self.buffer.move_cursor(Movement::Down),
            Key::ArrowLeft => self.buffer.move_cursor(Movement::Left),
            Key::ArrowRight => self.buffer.move_cursor(Movement::Right),
            Key::Home => self.buffer.move_cursor(Movement::LineStart),
            Key::End => self.buffer.move_cursor(Movement::LineEnd),
            Key::PageUp | Key::PageDown => self.page(key),
        }

        self.quit_remaining = self.quit_times;
        Ok(Control::Continue)
    }

    fn scroll(&mut self) {
        let cy = self.buffer.cursor().cy;
        let rx = self.buffer.render_x();
        self.viewport.scroll_to_cursor(cy, rx);
    }

    /// A quit press. Clean buffers quit at once; dirty ones need
    /// `quit_times` presses in a row.
    fn request_quit(&mut self) -> Control {
        if self.buffer.is_dirty() {
            self.quit_remaining = self.quit_remaining.saturating_sub(1);
            if self.quit_remaining > 0 {
                let times = if self.quit_remaining == 1 { "time" } else { "times" };
                self.set_status(format!(
                    "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more {} to quit.",
                    self.quit_remaining, times
                ));
                return Control::Continue;
            }
            tracing::info!("discarding {} unsaved edits", self.buffer.dirty_count());
        }
        Control::Quit
    }

    /// PageUp jumps to the top of the screen and then a screenful up;
    /// PageDown jumps to the bottom of the screen and then a screenful down
    fn page(&mut self, key: Key) {
        self.scroll();
        let rows = self.viewport.rows();

        let movement = if key == Key::PageUp {
            self.buffer.set_cursor_row(self.viewport.row_offset);
            Movement::Up
        } else {
            self.buffer
                .set_cursor_row(self.viewport.row_offset + rows - 1);
            Movement::Down
        };

        for _ in 0..rows {
            self.buffer.move_cursor(movement);
        }
    }

    /// Save to disk, asking for a name first if the buffer has none.
    /// Failures are reported on the message bar and leave the buffer dirty.
    fn save(&mut self) -> EditorResult<()> {
        if self.buffer.filename().is_none() {
            match self.prompt("Save as: ")? {
                Some(name) => self.buffer.set_filename(name),
                None => {
                    self.set_status("Save aborted");
                    return Ok(());
                },
            }
        }

        match self.buffer.save() {
            Ok(bytes) => self.set_status(format!("{} bytes written to disk", bytes)),
            Err(e) => {
                tracing::warn!("save failed: {}", e);
                self.set_status(format!("Can't save! {}", e));
            },
        }
        Ok(())
    }

    /// Read a line of input on the message bar. Enter accepts a non-empty
    /// answer, Escape cancels.
    fn prompt(&mut self, label: &str) -> EditorResult<Option<String>> {
        let mut answer = String::new();

        loop {
            self.set_status(format!("{}{} (ESC to cancel)", label, answer));
            self.refresh_screen()?;

            let Some(key) = self.decoder.next_key(&mut self.input)? else {
                continue;
            };

            match key {
                Key::Escape => {
                    self.set_status("");
                    return Ok(None);
                },
                Key::Control(b'\r') if !answer.is_empty() => {
                    self.set_status("");
                    return Ok(Some(answer));
                },
                k if k == Key::Backspace || k == Key::Delete || k.is_ctrl(b'h') => {
                    answer.pop();
                },
                Key::Char(byte) if byte.is_ascii() => answer.push(char::from(byte)),
                _ => {},
            }
        }
    }
}
