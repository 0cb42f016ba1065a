//! Viewport and screen rendering
//!
//! The viewport is the window of the buffer that fits on screen. Its offsets
//! follow the cursor and nothing else: [`Viewport::scroll_to_cursor`] is the
//! only place they change.

mod output;
mod render;

use std::time::{Duration, Instant};

pub use output::OutputBuffer;
pub use render::Renderer;

/// Rows reserved below the text area (status bar and message bar)
pub const CHROME_ROWS: u16 = 2;

/// Visible region of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible file row
    pub row_offset: usize,
    /// First visible render column
    pub col_offset: usize,
    /// Text rows on screen
    rows: usize,
    /// Text columns on screen
    cols: usize,
}

impl Viewport {
    /// Create a viewport showing `rows` x `cols` cells of text
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
            rows: rows.max(1),
            cols: cols.max(1),
        }
    }

    /// Viewport for a terminal of the given size, leaving room for the
    /// status and message bars
    pub fn for_terminal(rows: u16, cols: u16) -> Self {
        Self::new(rows.saturating_sub(CHROME_ROWS) as usize, cols as usize)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shift the offsets just enough that file row `cy` and render column
    /// `rx` are on screen. A visible cursor leaves the offsets untouched.
    pub fn scroll_to_cursor(&mut self, cy: usize, rx: usize) {
        if cy < self.row_offset {
            self.row_offset = cy;
        }
        if cy >= self.row_offset + self.rows {
            self.row_offset = cy + 1 - self.rows;
        }
        if rx < self.col_offset {
            self.col_offset = rx;
        }
        if rx >= self.col_offset + self.cols {
            self.col_offset = rx + 1 - self.cols;
        }
    }
}

/// The message shown in the bottom bar
#[derive(Debug, Clone)]
pub struct StatusMessage {
    text: String,
    set_at: Instant,
}

impl Default for StatusMessage {
    fn default() -> Self {
        Self {
            text: String::new(),
            set_at: Instant::now(),
        }
    }
}

impl StatusMessage {
    /// Replace the message and restart its timer
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.set_at = Instant::now();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The message if it is still fresh at `now`
    pub fn visible_at(&self, now: Instant, timeout: Duration) -> Option<&str> {
        let fresh = now.saturating_duration_since(self.set_at) < timeout;
        (fresh && !self.text.is_empty()).then_some(self.text.as_str())
    }
}
