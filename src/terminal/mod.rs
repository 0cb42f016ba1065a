//! Terminal session handling for Linux/Unix
//!
//! This module owns everything that touches the controlling terminal:
//! switching stdin into raw mode (and back), reading raw keystroke bytes,
//! and discovering the window geometry.

mod raw;
mod size;

use std::collections::VecDeque;
use std::io;
use std::os::fd::RawFd;

use nix::errno::Errno;
use nix::libc;
use nix::unistd;

pub use raw::{restore_saved_mode, RawMode};
pub use size::{cursor_position, parse_cursor_report, probe_window_size, query_window_size};

/// Error type for terminal session operations
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("Failed to read terminal attributes: {0}")]
    GetAttributes(#[source] nix::Error),

    #[error("Failed to set terminal attributes: {0}")]
    SetAttributes(#[source] nix::Error),

    #[error("Failed to install signal handler: {0}")]
    Signal(#[source] nix::Error),

    #[error("Failed to determine window size: {0}")]
    CursorProbe(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for terminal session operations
pub type TerminalResult<T> = Result<T, TerminalError>;

/// Visible terminal dimensions in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
}

impl WindowSize {
    /// Create a new window size
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(24, 80)
    }
}

/// A stream of raw keystroke bytes.
///
/// `read_byte` returns `Ok(None)` when the read timeout elapses without any
/// input arriving. That timeout is what separates a lone Escape keypress from
/// the start of an escape sequence.
pub trait ByteSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Reads keystrokes from stdin.
///
/// Meant to be used while [`RawMode`] is active, where VMIN=0/VTIME=1 makes
/// every read return within roughly 100ms.
#[derive(Debug, Default)]
pub struct TtyInput;

impl ByteSource for TtyInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match unistd::read(libc::STDIN_FILENO, &mut buf) {
            Ok(1) => Ok(Some(buf[0])),
            Ok(_) => Ok(None),
            // "No data yet" is not an error in raw mode
            Err(Errno::EAGAIN) | Err(Errno::EINTR) => Ok(None),
            Err(e) => Err(io::Error::from(e)),
        }
    }
}

/// In-memory byte source; an empty queue behaves like a read timeout.
impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.pop_front())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

/// Unbuffered terminal writer.
///
/// `io::Stdout` is line buffered, which would split a frame at its last
/// `\r\n`. Each `write` here is one `write(2)` on the descriptor, so a frame
/// handed over with `write_all` reaches the terminal in one piece.
#[derive(Debug, Clone, Copy)]
pub struct TtyOutput {
    fd: RawFd,
}

impl TtyOutput {
    /// Writer for the process's standard output
    pub fn stdout() -> Self {
        Self::from_raw_fd(libc::STDOUT_FILENO)
    }

    /// Writer for an already open descriptor. The descriptor is not closed
    /// when the writer is dropped.
    pub fn from_raw_fd(fd: RawFd) -> Self {
        Self { fd }
    }
}

impl io::Write for TtyOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        unistd::write(self.fd, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Clear the whole screen and home the cursor
pub fn clear_screen<W: io::Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[2J\x1b[H")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size() {
        let size = WindowSize::new(24, 80);
        assert_eq!(size.rows, 24);
        assert_eq!(size.cols, 80);
        assert_eq!(WindowSize::default(), size);
    }

    #[test]
    fn test_queue_source_times_out_when_empty() {
        let mut source: VecDeque<u8> = VecDeque::from(vec![b'a']);
        assert_eq!(source.read_byte().unwrap(), Some(b'a'));
        assert_eq!(source.read_byte().unwrap(), None);
    }

    #[test]
    fn test_tty_output_writes_whole_frame_at_once() {
        use std::io::{Read, Seek, Write};
        use std::os::fd::AsRawFd;

        let mut file = tempfile::tempfile().unwrap();
        let mut out = TtyOutput::from_raw_fd(file.as_raw_fd());

        // Line breaks in the middle must not split the write
        let frame = b"\x1b[?25l\x1b[Hrow\x1b[K\r\nstatus\r\nmessage\x1b[1;1H\x1b[?25h";
        assert_eq!(out.write(frame).unwrap(), frame.len());

        // Nothing is held back waiting for a flush
        let mut written = Vec::new();
        file.rewind().unwrap();
        file.read_to_end(&mut written).unwrap();
        assert_eq!(written, frame);
    }

    #[test]
    fn test_clear_screen_sequence() {
        let mut out = Vec::new();
        clear_screen(&mut out).unwrap();
        assert_eq!(out, b"\x1b[2J\x1b[H");
    }
}
