//! Frame composition
//!
//! A frame is: hide cursor, home, one line per text row (each followed by
//! erase-to-end-of-line), the inverted status bar, the message bar, cursor
//! placement, show cursor. All of it is built in one [`OutputBuffer`] and
//! written in a single call.

use std::io::{self, Write};

use super::{OutputBuffer, Viewport};
use crate::buffer::TextBuffer;

/// Longest file name shown in the status bar
const STATUS_NAME_MAX: usize = 20;

/// Placeholder for rows past the end of the buffer
const EMPTY_ROW: &[u8] = b"~";

/// Builds and writes frames
#[derive(Debug)]
pub struct Renderer {
    out: OutputBuffer,
    welcome: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            out: OutputBuffer::with_capacity(16 * 1024),
            welcome: format!("Quill editor -- version {}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Compose a frame for `buffer` as seen through `viewport` and return
    /// its bytes
    pub fn compose(
        &mut self,
        buffer: &TextBuffer,
        viewport: &Viewport,
        message: Option<&str>,
    ) -> &[u8] {
        self.out.clear();
        self.out.cursor_hide();
        self.out.cursor_home();

        self.draw_rows(buffer, viewport);
        self.draw_status_bar(buffer, viewport);
        self.draw_message_bar(viewport, message);

        let cursor = buffer.cursor();
        let screen_row = cursor.cy.saturating_sub(viewport.row_offset);
        let screen_col = buffer.render_x().saturating_sub(viewport.col_offset);
        self.out.cursor_move(screen_row, screen_col);
        self.out.cursor_show();

        self.out.as_bytes()
    }

    /// Compose a frame and hand it to `writer` in one write
    pub fn render_frame<W: Write + ?Sized>(
        &mut self,
        writer: &mut W,
        buffer: &TextBuffer,
        viewport: &Viewport,
        message: Option<&str>,
    ) -> io::Result<()> {
        self.compose(buffer, viewport, message);
        self.out.flush_to(writer)
    }

    fn draw_rows(&mut self, buffer: &TextBuffer, viewport: &Viewport) {
        let cols = viewport.cols();

        for y in 0..viewport.rows() {
            let file_row = y + viewport.row_offset;

            match buffer.row(file_row) {
                Some(row) => {
                    let render = row.render();
                    let start = viewport.col_offset.min(render.len());
                    let end = (viewport.col_offset + cols).min(render.len());
                    self.out.write_raw(&render[start..end]);
                },
                None if buffer.is_empty() && y == viewport.rows() / 3 => {
                    self.draw_welcome(cols);
                },
                None => self.out.write_raw(EMPTY_ROW),
            }

            self.out.clear_line();
            self.out.newline();
        }
    }

    fn draw_welcome(&mut self, cols: usize) {
        let banner = &self.welcome.as_bytes()[..self.welcome.len().min(cols)];
        let mut padding = (cols - banner.len()) / 2;

        if padding > 0 {
            self.out.write_raw(EMPTY_ROW);
            padding -= 1;
        }
        self.out.pad(padding);
        self.out.write_raw(banner);
    }

    fn draw_status_bar(&mut self, buffer: &TextBuffer, viewport: &Viewport) {
        let cols = viewport.cols();

        let name = buffer
            .filename()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "[No Name]".to_string());
        let name: String = name.chars().take(STATUS_NAME_MAX).collect();

        let left = format!(
            "{} - {} lines{}",
            name,
            buffer.len(),
            if buffer.is_dirty() { " (modified)" } else { "" }
        );
        let right = format!("{}/{}", buffer.cursor().cy + 1, buffer.len());

        let left = &left.as_bytes()[..left.len().min(cols)];

        self.out.invert();
        self.out.write_raw(left);

        let remaining = cols - left.len();
        if remaining >= right.len() {
            self.out.pad(remaining - right.len());
            self.out.write_str(&right);
        } else {
            self.out.pad(remaining);
        }

        self.out.reset_attrs();
        self.out.newline();
    }

    fn draw_message_bar(&mut self, viewport: &Viewport, message: Option<&str>) {
        self.out.clear_line();
        if let Some(message) = message {
            let bytes = message.as_bytes();
            self.out.write_raw(&bytes[..bytes.len().min(viewport.cols())]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Cursor;

    fn buffer(lines: &[&str]) -> TextBuffer {
        let mut buf = TextBuffer::new(8);
        buf.load(lines.iter().map(|l| l.as_bytes().to_vec()));
        buf
    }

    fn frame(buf: &TextBuffer, vp: &Viewport, message: Option<&str>) -> String {
        let mut renderer = Renderer::new();
        String::from_utf8(renderer.compose(buf, vp, message).to_vec()).unwrap()
    }

    /// Text rows of a frame, with the leading hide/home and per-row erase
    /// sequences stripped
    fn text_rows(frame: &str, rows: usize) -> Vec<String> {
        frame
            .trim_start_matches("\x1b[?25l\x1b[H")
            .split("\r\n")
            .take(rows)
            .map(|line| line.trim_end_matches("\x1b[K").to_string())
            .collect()
    }

    #[test]
    fn test_frame_envelope() {
        let buf = buffer(&["hello"]);
        let vp = Viewport::new(3, 20);
        let frame = frame(&buf, &vp, None);

        assert!(frame.starts_with("\x1b[?25l\x1b[H"));
        assert!(frame.ends_with("\x1b[1;1H\x1b[?25h"));
        // Three text rows plus the status bar
        assert_eq!(frame.matches("\r\n").count(), 4);
        // Every text row and the message bar erase to end of line
        assert_eq!(frame.matches("\x1b[K").count(), 4);
    }

    #[test]
    fn test_rows_and_placeholders() {
        let buf = buffer(&["one", "two"]);
        let vp = Viewport::new(4, 20);
        let rows = text_rows(&frame(&buf, &vp, None), 4);
        assert_eq!(rows, vec!["one", "two", "~", "~"]);
    }

    #[test]
    fn test_horizontal_clipping() {
        let buf = buffer(&["0123456789", "ab"]);
        let mut vp = Viewport::new(2, 4);
        vp.col_offset = 3;
        let rows = text_rows(&frame(&buf, &vp, None), 2);
        assert_eq!(rows, vec!["3456", ""]);
    }

    #[test]
    fn test_tabs_are_rendered_as_spaces() {
        let buf = buffer(&["\tx"]);
        let vp = Viewport::new(1, 20);
        let rows = text_rows(&frame(&buf, &vp, None), 1);
        assert_eq!(rows, vec!["        x"]);
    }

    #[test]
    fn test_welcome_banner_only_for_empty_buffer() {
        let vp = Viewport::new(9, 80);

        let empty = frame(&TextBuffer::new(8), &vp, None);
        let rows = text_rows(&empty, 9);
        assert!(rows[3].starts_with('~'));
        assert!(rows[3].contains("Quill editor -- version"));
        assert_eq!(rows[2], "~");

        let full = frame(&buffer(&["x"]), &vp, None);
        assert!(!full.contains("Quill editor"));
    }

    #[test]
    fn test_status_bar() {
        let mut buf = buffer(&["a", "b", "c"]);
        buf.set_filename("notes.txt");
        buf.set_cursor(Cursor::new(0, 1));
        buf.insert_char(b'x');
        let vp = Viewport::new(1, 40);

        let frame = frame(&buf, &vp, None);
        let status = frame
            .split("\x1b[7m")
            .nth(1)
            .and_then(|s| s.split("\x1b[m").next())
            .unwrap();

        assert_eq!(status.len(), 40);
        assert!(status.starts_with("notes.txt - 3 lines (modified)"));
        assert!(status.ends_with("2/3"));
    }

    #[test]
    fn test_status_bar_unnamed() {
        let buf = buffer(&[]);
        let vp = Viewport::new(1, 30);
        let frame = frame(&buf, &vp, None);
        assert!(frame.contains("\x1b[7m[No Name] - 0 lines"));
    }

    #[test]
    fn test_message_bar() {
        let buf = buffer(&["a"]);
        let vp = Viewport::new(1, 10);
        let frame = frame(&buf, &vp, Some("a long status message"));
        assert!(frame.contains("\x1b[Ka long sta\x1b[1;1H"));
    }

    #[test]
    fn test_cursor_placed_in_render_space() {
        let mut buf = buffer(&["\tab", "x"]);
        buf.set_cursor(Cursor::new(2, 0));
        let mut vp = Viewport::new(5, 20);
        vp.scroll_to_cursor(buf.cursor().cy, buf.render_x());

        let frame = frame(&buf, &vp, None);
        assert!(frame.ends_with("\x1b[1;10H\x1b[?25h"));
    }

    #[test]
    fn test_render_frame_single_write() {
        struct CountingWriter {
            writes: usize,
            bytes: Vec<u8>,
        }

        impl Write for CountingWriter {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.writes += 1;
                self.bytes.extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let buf = buffer(&["hello", "world"]);
        let vp = Viewport::new(10, 40);
        let mut writer = CountingWriter {
            writes: 0,
            bytes: Vec::new(),
        };

        Renderer::new()
            .render_frame(&mut writer, &buf, &vp, Some("hi"))
            .unwrap();

        assert_eq!(writer.writes, 1);
        assert!(writer.bytes.starts_with(b"\x1b[?25l"));
    }
}
