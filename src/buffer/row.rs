//! A single line of text
//!
//! A row stores the bytes of one file line plus its render form, in which
//! every tab is expanded to spaces up to the next tab stop. The render form
//! is rebuilt by every mutating method before it returns, so readers never
//! see a stale cache.

/// One line of the buffer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    /// Stored bytes, without the line terminator
    chars: Vec<u8>,
    /// Display form with tabs expanded
    render: Vec<u8>,
}

impl Row {
    /// Create a row from file bytes
    pub fn new(chars: Vec<u8>, tab_stop: usize) -> Self {
        let mut row = Self {
            chars,
            render: Vec::new(),
        };
        row.update(tab_stop);
        row
    }

    /// Number of stored bytes
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The stored bytes
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// The tab-expanded display bytes
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// Width of the display form in columns
    pub fn render_len(&self) -> usize {
        self.render.len()
    }

    /// Convert a file-space column into a render-space column
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        render_column(&self.chars, cx, tab_stop)
    }

    /// Insert a byte at `at` (clamped to the row length)
    pub(crate) fn insert(&mut self, at: usize, byte: u8, tab_stop: usize) {
        let at = at.min(self.chars.len());
        self.chars.insert(at, byte);
        self.update(tab_stop);
    }

    /// Remove the byte at `at`, if there is one
    pub(crate) fn remove(&mut self, at: usize, tab_stop: usize) -> Option<u8> {
        if at >= self.chars.len() {
            return None;
        }
        let byte = self.chars.remove(at);
        self.update(tab_stop);
        Some(byte)
    }

    /// Append bytes to the end of the row
    pub(crate) fn append(&mut self, bytes: &[u8], tab_stop: usize) {
        self.chars.extend_from_slice(bytes);
        self.update(tab_stop);
    }

    /// Cut the row at `at`, returning everything from `at` onwards
    pub(crate) fn split_off(&mut self, at: usize, tab_stop: usize) -> Vec<u8> {
        let at = at.min(self.chars.len());
        let tail = self.chars.split_off(at);
        self.update(tab_stop);
        tail
    }

    /// Rebuild the render cache from the stored bytes
    fn update(&mut self, tab_stop: usize) {
        let tab_stop = tab_stop.max(1);
        self.render.clear();

        for &byte in &self.chars {
            if byte == b'\t' {
                self.render.push(b' ');
                while self.render.len() % tab_stop != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(byte);
            }
        }
    }
}

/// Render column of file column `cx` in `chars`.
///
/// Each tab advances to the next multiple of `tab_stop`; every other byte
/// takes one column. Columns past the end count one each.
pub fn render_column(chars: &[u8], cx: usize, tab_stop: usize) -> usize {
    let tab_stop = tab_stop.max(1);
    let mut rx = 0;

    for &byte in chars.iter().take(cx) {
        if byte == b'\t' {
            rx += (tab_stop - 1) - (rx % tab_stop);
        }
        rx += 1;
    }

    rx + cx.saturating_sub(chars.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_without_tabs() {
        let row = Row::new(b"hello".to_vec(), 8);
        assert_eq!(row.len(), 5);
        assert_eq!(row.render(), b"hello");
        assert_eq!(row.render_len(), 5);
    }

    #[test]
    fn test_tab_expansion() {
        let row = Row::new(b"\tx".to_vec(), 8);
        assert_eq!(row.render(), b"        x");

        let row = Row::new(b"ab\tc".to_vec(), 4);
        assert_eq!(row.render(), b"ab  c");

        // A tab exactly at a stop still advances a full stop
        let row = Row::new(b"abcd\te".to_vec(), 4);
        assert_eq!(row.render(), b"abcd    e");
    }

    #[test]
    fn test_render_column() {
        assert_eq!(render_column(b"\tx", 0, 8), 0);
        assert_eq!(render_column(b"\tx", 1, 8), 8);
        assert_eq!(render_column(b"\tx", 2, 8), 9);
        assert_eq!(render_column(b"ab\tc", 3, 4), 4);
        assert_eq!(render_column(b"abc", 3, 8), 3);
    }

    #[test]
    fn test_render_column_matches_render_cache() {
        let row = Row::new(b"a\tbc\t\td".to_vec(), 8);
        assert_eq!(row.cx_to_rx(row.len(), 8), row.render_len());
    }

    #[test]
    fn test_insert_refreshes_cache() {
        let mut row = Row::new(b"ab".to_vec(), 8);
        row.insert(1, b'\t', 8);
        assert_eq!(row.chars(), b"a\tb");
        assert_eq!(row.render(), b"a       b");

        // Past-the-end inserts append
        row.insert(99, b'!', 8);
        assert_eq!(row.chars(), b"a\tb!");
    }

    #[test]
    fn test_remove() {
        let mut row = Row::new(b"a\tb".to_vec(), 8);
        assert_eq!(row.remove(1, 8), Some(b'\t'));
        assert_eq!(row.render(), b"ab");
        assert_eq!(row.remove(5, 8), None);
    }

    #[test]
    fn test_append_and_split() {
        let mut row = Row::new(b"ab".to_vec(), 8);
        row.append(b"cd", 8);
        assert_eq!(row.render(), b"abcd");

        let tail = row.split_off(1, 8);
        assert_eq!(tail, b"bcd");
        assert_eq!(row.chars(), b"a");
        assert_eq!(row.render(), b"a");
    }
}
