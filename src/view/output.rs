//! `OutputBuffer`: single-write frame buffer for ANSI sequences.

use std::io::{self, Write};

/// Growable buffer a whole frame is composed into.
///
/// Nothing reaches the terminal until [`OutputBuffer::flush_to`], which hands
/// the frame over in one `write_all` so the screen never shows a half-drawn
/// frame.
#[derive(Debug)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Append `n` spaces.
    #[inline]
    pub fn pad(&mut self, n: usize) {
        self.data.resize(self.data.len() + n, b' ');
    }

    /// Move cursor to a 0-indexed (row, col); ANSI is 1-indexed.
    #[inline]
    pub fn cursor_move(&mut self, row: usize, col: usize) {
        self.write_str(&format!("\x1b[{};{}H", row + 1, col + 1));
    }

    /// Home the cursor.
    #[inline]
    pub fn cursor_home(&mut self) {
        self.data.extend_from_slice(b"\x1b[H");
    }

    #[inline]
    pub fn cursor_hide(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25l");
    }

    #[inline]
    pub fn cursor_show(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25h");
    }

    /// Erase from the cursor to the end of the line.
    #[inline]
    pub fn clear_line(&mut self) {
        self.data.extend_from_slice(b"\x1b[K");
    }

    /// Switch to inverted colors.
    #[inline]
    pub fn invert(&mut self) {
        self.data.extend_from_slice(b"\x1b[7m");
    }

    /// Reset all attributes.
    #[inline]
    pub fn reset_attrs(&mut self) {
        self.data.extend_from_slice(b"\x1b[m");
    }

    /// Raw-mode line break (OPOST is off, so `\n` alone does not return).
    #[inline]
    pub fn newline(&mut self) {
        self.data.extend_from_slice(b"\r\n");
    }

    /// Flush to a writer in a single write.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}
