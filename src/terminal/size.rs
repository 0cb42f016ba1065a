//! Window size discovery
//!
//! The size normally comes from `TIOCGWINSZ`. Some terminals answer that
//! ioctl with an error or zero columns; for those we push the cursor to the
//! bottom-right corner and ask the terminal where it ended up (DSR 6).
//!
//! # References
//!
//! - tty_ioctl(4): https://man7.org/linux/man-pages/man4/tty_ioctl.4.html
//! - DSR: https://vt100.net/docs/vt100-ug/chapter3.html#DSR

use std::io::Write;

use nix::libc;

use super::{ByteSource, TerminalError, TerminalResult, WindowSize};

/// Longest cursor position report we are willing to read
const REPORT_MAX_LEN: usize = 32;

/// Query the terminal size, falling back to the cursor probe when the
/// ioctl is unavailable
pub fn query_window_size<S, W>(input: &mut S, output: &mut W) -> TerminalResult<WindowSize>
where
    S: ByteSource + ?Sized,
    W: Write + ?Sized,
{
    match ioctl_window_size() {
        Some(size) => Ok(size),
        None => {
            tracing::info!("TIOCGWINSZ unavailable, probing cursor position");
            probe_window_size(input, output)
        },
    }
}

/// Get the window size of stdout using ioctl
fn ioctl_window_size() -> Option<WindowSize> {
    let mut ws = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCGWINSZ is a valid ioctl for getting window size
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == -1 || ws.ws_col == 0 {
        None
    } else {
        Some(WindowSize::new(ws.ws_row, ws.ws_col))
    }
}

/// Move the cursor as far down and right as it goes, then read back where
/// it landed
pub fn probe_window_size<S, W>(input: &mut S, output: &mut W) -> TerminalResult<WindowSize>
where
    S: ByteSource + ?Sized,
    W: Write + ?Sized,
{
    // CUF/CUD stop at the screen edge, unlike CUP which is unspecified
    // past it
    output.write_all(b"\x1b[999C\x1b[999B")?;
    cursor_position(input, output)
}

/// Request a cursor position report and parse the reply
pub fn cursor_position<S, W>(input: &mut S, output: &mut W) -> TerminalResult<WindowSize>
where
    S: ByteSource + ?Sized,
    W: Write + ?Sized,
{
    output.write_all(b"\x1b[6n")?;
    output.flush()?;

    let mut reply = Vec::with_capacity(REPORT_MAX_LEN);
    while reply.len() < REPORT_MAX_LEN - 1 {
        match input.read_byte()? {
            Some(b'R') => break,
            Some(byte) => reply.push(byte),
            None => break,
        }
    }

    parse_cursor_report(&reply).ok_or_else(|| {
        TerminalError::CursorProbe(format!(
            "malformed cursor position report {:?}",
            String::from_utf8_lossy(&reply)
        ))
    })
}

/// Parse `ESC [ rows ; cols` (the trailing `R` is optional)
pub fn parse_cursor_report(reply: &[u8]) -> Option<WindowSize> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let body = body.strip_suffix(b"R").unwrap_or(body);
    let body = std::str::from_utf8(body).ok()?;

    let (rows, cols) = body.split_once(';')?;
    let rows = rows.parse().ok()?;
    let cols = cols.parse().ok()?;

    Some(WindowSize::new(rows, cols))
}
