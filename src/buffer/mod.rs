//! Text buffer
//!
//! The in-memory document: an ordered list of [`Row`]s, the cursor, the
//! dirty counter and the file name. Nothing here knows about terminals; the
//! renderer only reads from it.
//!
//! The cursor may sit one row past the last line. That position is a
//! virtual empty line: typing there materializes a real row first.

mod file;
mod row;

use std::path::{Path, PathBuf};

pub use file::PersistenceError;
pub use row::{render_column, Row};

/// Default distance between tab stops
pub const DEFAULT_TAB_STOP: usize = 8;

/// Cursor position in file space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Byte column within the row
    pub cx: usize,
    /// Row index; equal to the row count on the virtual trailing line
    pub cy: usize,
}

impl Cursor {
    pub fn new(cx: usize, cy: usize) -> Self {
        Self { cx, cy }
    }
}

/// Single-step cursor movements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
}

/// The document being edited
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rows: Vec<Row>,
    cursor: Cursor,
    /// Number of edits since the last load or save
    dirty: usize,
    filename: Option<PathBuf>,
    tab_stop: usize,
    /// Row created by typing on the virtual trailing line, until another
    /// structural edit
    materialized: Option<usize>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_STOP)
    }
}

impl TextBuffer {
    /// Create an empty, unnamed buffer
    pub fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            cursor: Cursor::default(),
            dirty: 0,
            filename: None,
            tab_stop: tab_stop.max(1),
            materialized: None,
        }
    }

    /// Replace the contents with `lines`. The cursor goes home and the
    /// buffer is clean afterwards.
    pub fn load<I, L>(&mut self, lines: I)
    where
        I: IntoIterator<Item = L>,
        L: Into<Vec<u8>>,
    {
        let tab_stop = self.tab_stop;
        self.rows = lines
            .into_iter()
            .map(|line| Row::new(line.into(), tab_stop))
            .collect();
        self.cursor = Cursor::default();
        self.dirty = 0;
        self.materialized = None;
    }

    /// Replace the contents with the lines of `text`. Each line loses its
    /// trailing `\n` or `\r\n`.
    pub fn load_bytes(&mut self, text: &[u8]) {
        self.load(split_lines(text));
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Number of real rows (the virtual trailing line is not counted)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Render-space column of the cursor on its current row
    pub fn render_x(&self) -> usize {
        self.rows
            .get(self.cursor.cy)
            .map_or(0, |row| row.cx_to_rx(self.cursor.cx, self.tab_stop))
    }

    /// Whether there are unsaved edits
    pub fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    /// Number of edits since the last load or save
    pub fn dirty_count(&self) -> usize {
        self.dirty
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, path: impl Into<PathBuf>) {
        self.filename = Some(path.into());
    }

    /// Render column of file column `cx` on row `index`
    pub fn row_to_render_column(&self, index: usize, cx: usize) -> usize {
        self.rows
            .get(index)
            .map_or(cx, |row| row.cx_to_rx(cx, self.tab_stop))
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Insert `byte` at the cursor and advance past it
    pub fn insert_char(&mut self, byte: u8) {
        if self.cursor.cy == self.rows.len() {
            self.rows.push(Row::new(Vec::new(), self.tab_stop));
            self.materialized = Some(self.cursor.cy);
        }

        let Cursor { cx, cy } = self.cursor;
        self.rows[cy].insert(cx, byte, self.tab_stop);
        self.cursor.cx += 1;
        self.dirty += 1;
    }

    /// Break the current line at the cursor. The cursor moves to the start
    /// of the new line.
    pub fn insert_newline(&mut self) {
        let Cursor { cx, cy } = self.cursor;

        if cx == 0 || cy >= self.rows.len() {
            let at = cy.min(self.rows.len());
            self.rows.insert(at, Row::new(Vec::new(), self.tab_stop));
        } else {
            let tail = self.rows[cy].split_off(cx, self.tab_stop);
            self.rows.insert(cy + 1, Row::new(tail, self.tab_stop));
        }

        self.cursor = Cursor::new(0, cy + 1);
        self.materialized = None;
        self.dirty += 1;
    }

    /// Backspace: remove the byte before the cursor.
    ///
    /// At the start of a line the line is joined onto the previous one.
    /// Does nothing at the very start of the buffer or on the virtual
    /// trailing line. Emptying a last row that was created by typing on the
    /// virtual line removes it again, leaving the cursor on the virtual line.
    pub fn delete_char_before_cursor(&mut self) {
        let Cursor { cx, cy } = self.cursor;
        if cy >= self.rows.len() || (cx == 0 && cy == 0) {
            return;
        }

        if cx > 0 {
            self.rows[cy].remove(cx - 1, self.tab_stop);
            self.cursor.cx -= 1;

            let last = self.rows.len() - 1;
            if self.materialized == Some(cy) && cy == last && self.rows[cy].is_empty() {
                self.rows.pop();
                self.materialized = None;
            }
        } else {
            let row = self.rows.remove(cy);
            let prev = &mut self.rows[cy - 1];
            let join_at = prev.len();
            prev.append(row.chars(), self.tab_stop);
            self.cursor = Cursor::new(join_at, cy - 1);
            self.materialized = None;
        }

        self.dirty += 1;
    }

    /// Delete: remove the byte under the cursor.
    ///
    /// At the end of a line the next line is joined onto this one. Does
    /// nothing at the end of the buffer.
    pub fn delete_char_at_cursor(&mut self) {
        let Cursor { cx, cy } = self.cursor;
        let Some(row) = self.rows.get(cy) else {
            return;
        };

        if cx < row.len() {
            self.rows[cy].remove(cx, self.tab_stop);
        } else if cy + 1 < self.rows.len() {
            let next = self.rows.remove(cy + 1);
            self.rows[cy].append(next.chars(), self.tab_stop);
            self.materialized = None;
        } else {
            return;
        }

        self.dirty += 1;
    }

    // ========================================================================
    // Cursor movement
    // ========================================================================

    /// Move the cursor one step. Horizontal moves wrap across line ends;
    /// vertical moves clamp the column to the destination line.
    pub fn move_cursor(&mut self, movement: Movement) {
        let Cursor { cx, cy } = self.cursor;
        let row_len = self.rows.get(cy).map(Row::len);

        match movement {
            Movement::Left => {
                if cx > 0 {
                    self.cursor.cx -= 1;
                } else if cy > 0 {
                    self.cursor.cy -= 1;
                    self.cursor.cx = self.rows[cy - 1].len();
                }
            },
            Movement::Right => match row_len {
                Some(len) if cx < len => self.cursor.cx += 1,
                Some(_) => self.cursor = Cursor::new(0, cy + 1),
                None => {},
            },
            Movement::Up => self.cursor.cy = cy.saturating_sub(1),
            Movement::Down => {
                if cy < self.rows.len() {
                    self.cursor.cy += 1;
                }
            },
            Movement::LineStart => self.cursor.cx = 0,
            Movement::LineEnd => self.cursor.cx = row_len.unwrap_or(0),
        }

        self.clamp_cursor_column();
    }

    /// Put the cursor on row `cy` (clamped to the virtual trailing line),
    /// keeping the column where the row allows it
    pub fn set_cursor_row(&mut self, cy: usize) {
        self.cursor.cy = cy.min(self.rows.len());
        self.clamp_cursor_column();
    }

    /// Place the cursor, clamping both coordinates into range
    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor.cx = cursor.cx;
        self.set_cursor_row(cursor.cy);
    }

    fn clamp_cursor_column(&mut self) {
        let len = self.rows.get(self.cursor.cy).map_or(0, Row::len);
        self.cursor.cx = self.cursor.cx.min(len);
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// All rows joined with a `\n` after each one
    pub fn serialize(&self) -> Vec<u8> {
        let total: usize = self.rows.iter().map(|row| row.len() + 1).sum();
        let mut out = Vec::with_capacity(total);
        for row in &self.rows {
            out.extend_from_slice(row.chars());
            out.push(b'\n');
        }
        out
    }

    /// Forget pending edits after the contents reached disk
    pub fn mark_saved(&mut self) {
        self.dirty = 0;
    }
}

/// Split file contents into lines, dropping `\n`/`\r\n` terminators. A final
/// line without a terminator is kept; a trailing terminator does not create
/// an extra empty line.
pub fn split_lines(text: &[u8]) -> Vec<Vec<u8>> {
    if text.is_empty() {
        return Vec::new();
    }

    let text = text.strip_suffix(b"\n").unwrap_or(text);
    text.split(|&b| b == b'\n')
        .map(|line| {
            let mut end = line.len();
            while end > 0 && (line[end - 1] == b'\r' || line[end - 1] == b'\n') {
                end -= 1;
            }
            line[..end].to_vec()
        })
        .collect()
}
