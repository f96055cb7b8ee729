//! Text buffer: an ordered sequence of lines.
//!
//! A [`TextBuffer`] is a `Vec` of [`Line`]s with the four editing
//! operations the controller dispatches to: insert a character, delete
//! the character before a position (joining lines at column 0), split a
//! line, and the accessors. Nothing here touches the OS; file contents
//! cross this boundary as plain collections of line strings.
//!
//! # Design choices
//!
//! - **Columns are char offsets**, not byte offsets. Column 3 of `"café"`
//!   is `'é'`. [`Line`] owns the char-to-byte conversion and byte offsets
//!   never leak out of it.
//!
//! - **The buffer is never empty.** An empty document is one empty line.
//!   Every operation preserves `row_count() >= 1`, and removal always
//!   shortens the sequence, it never leaves a hole.
//!
//! - **Join and split return the cursor position the caller must adopt.**
//!   The controller never computes its own deltas for Enter or Backspace;
//!   it takes the position the buffer hands back. That keeps the cursor
//!   invariants in one place.
//!
//! - **Out-of-range rows are a programmer error.** The controller is the
//!   sole caller and keeps the cursor inside the buffer, so a bad row
//!   panics rather than becoming a recoverable error that hides silent
//!   data corruption.

use crate::position::Position;

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// One buffer-resident text line. Never contains `\n` or `\r`.
///
/// Columns index chars. The wrapped `String` is an implementation detail;
/// every public operation converts through [`byte_of`](Self::byte_of).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    text: String,
}

impl Line {
    /// An empty line.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Build a line from text.
    ///
    /// # Panics
    ///
    /// Panics if the text contains a line-ending character.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        assert!(
            !text.contains(['\n', '\r']),
            "a Line never holds a line-ending character"
        );
        Self {
            text: text.to_owned(),
        }
    }

    /// The line's text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of chars in this line.
    #[inline]
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// True when the line holds no text.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset of the char at `col`, or the end of the string when
    /// `col` is past the last char.
    fn byte_of(&self, col: usize) -> usize {
        self.text
            .char_indices()
            .nth(col)
            .map_or(self.text.len(), |(i, _)| i)
    }

    /// Insert `ch` before the char at `col`. A `col` past the end appends.
    ///
    /// # Panics
    ///
    /// Panics if `ch` is a line-ending character; line breaks go through
    /// [`TextBuffer::split_line`].
    pub fn insert_char(&mut self, col: usize, ch: char) {
        assert!(
            ch != '\n' && ch != '\r',
            "a Line never holds a line-ending character"
        );
        let at = self.byte_of(col);
        self.text.insert(at, ch);
    }

    /// Remove and return the char at `col`.
    ///
    /// # Panics
    ///
    /// Panics if `col` is past the last char.
    pub fn remove_char(&mut self, col: usize) -> char {
        assert!(col < self.char_len(), "column {col} out of range");
        self.text.remove(self.byte_of(col))
    }

    /// Split the line at `col`, keeping `[0, col)` and returning the tail.
    #[must_use]
    pub fn split_off(&mut self, col: usize) -> Self {
        let at = self.byte_of(col);
        Self {
            text: self.text.split_off(at),
        }
    }

    /// Append another line's text to this one.
    pub fn append(&mut self, other: &Self) {
        self.text.push_str(&other.text);
    }
}

// ---------------------------------------------------------------------------
// TextBuffer
// ---------------------------------------------------------------------------

/// The document: a 0-indexed sequence of [`Line`]s, never empty.
///
/// Mutations set the modified flag; [`mark_saved`](Self::mark_saved)
/// clears it after a successful write. The flag feeds the status bar's
/// `[+]` marker and the pristine check for the welcome banner.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rows: Vec<Line>,
    modified: bool,
}

impl TextBuffer {
    // -- Construction -------------------------------------------------------

    /// Create a buffer holding one empty line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: vec![Line::new()],
            modified: false,
        }
    }

    /// Build a buffer from externally loaded lines.
    ///
    /// An empty collection still produces the single-empty-line document,
    /// keeping the row-count invariant.
    ///
    /// # Panics
    ///
    /// Panics if any line contains a line-ending character.
    #[must_use]
    pub fn from_lines(lines: &[String]) -> Self {
        let mut buf = Self::new();
        buf.replace_lines(lines);
        buf.modified = false;
        buf
    }

    /// Replace the whole row sequence with externally loaded lines.
    ///
    /// # Panics
    ///
    /// Panics if any line contains a line-ending character.
    pub fn replace_lines(&mut self, lines: &[String]) {
        self.rows = if lines.is_empty() {
            vec![Line::new()]
        } else {
            lines.iter().map(|l| Line::from_text(l)).collect()
        };
        self.modified = true;
    }

    // -- Accessors ----------------------------------------------------------

    /// Number of rows. Always at least 1.
    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Char length of the given row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn line_len(&self, row: usize) -> usize {
        self.rows[row].char_len()
    }

    /// Text of the given row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn line(&self, row: usize) -> &str {
        self.rows[row].as_str()
    }

    /// Iterate over the rows as string slices, for saving.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(Line::as_str)
    }

    /// The whole document as one string, rows joined with `\n`.
    #[must_use]
    pub fn contents(&self) -> String {
        let mut out = String::new();
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(row.as_str());
        }
        out
    }

    /// True if the buffer has been modified since creation or last save.
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clear the modified flag after a successful save.
    #[inline]
    pub const fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// True while the buffer is still the untouched single-empty-line
    /// startup state. Drives the welcome banner.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        !self.modified && self.rows.len() == 1 && self.rows[0].is_empty()
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `ch` at `(row, col)`.
    ///
    /// `col` is clamped to the row's char length first. A `row` past the
    /// end grows the buffer with empty rows until it exists; the
    /// controller never needs that, but the operation must not fault.
    /// Moving the cursor right afterwards is the caller's job.
    ///
    /// # Panics
    ///
    /// Panics if `ch` is a line-ending character.
    pub fn insert_char(&mut self, row: usize, col: usize, ch: char) {
        while row >= self.rows.len() {
            self.rows.push(Line::new());
        }
        let line = &mut self.rows[row];
        let col = col.min(line.char_len());
        line.insert_char(col, ch);
        self.modified = true;
    }

    /// Delete the character before `(row, col)`.
    ///
    /// - `col > 0`: removes the char at `col - 1`.
    /// - `col == 0, row > 0`: joins the row onto the end of the previous
    ///   row; the row sequence gets shorter.
    /// - `(0, 0)`: no-op.
    ///
    /// Returns the position the cursor must adopt: one column left, or the
    /// old end of the previous line after a join.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range or `col` is past the row's end;
    /// the controller keeps the cursor inside the buffer.
    pub fn delete_char_before(&mut self, row: usize, col: usize) -> Position {
        assert!(row < self.rows.len(), "row {row} out of range");
        assert!(
            col <= self.rows[row].char_len(),
            "column {col} past end of row {row}"
        );

        if col > 0 {
            self.rows[row].remove_char(col - 1);
            self.modified = true;
            Position::new(row, col - 1)
        } else if row > 0 {
            let tail = self.rows.remove(row);
            let join_col = self.rows[row - 1].char_len();
            self.rows[row - 1].append(&tail);
            self.modified = true;
            Position::new(row - 1, join_col)
        } else {
            Position::ZERO
        }
    }

    /// Split the row at `col`, the Enter operation.
    ///
    /// - `col == 0`: inserts a new empty row at `row`, pushing the
    ///   existing one down (a blank line above).
    /// - otherwise: truncates the row to `[0, col)` and inserts the tail
    ///   as a new row right after it.
    ///
    /// Returns the position the cursor must adopt: the start of the row
    /// below.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range or `col` is past the row's end.
    pub fn split_line(&mut self, row: usize, col: usize) -> Position {
        assert!(row < self.rows.len(), "row {row} out of range");
        assert!(
            col <= self.rows[row].char_len(),
            "column {col} past end of row {row}"
        );

        if col == 0 {
            self.rows.insert(row, Line::new());
        } else {
            let tail = self.rows[row].split_off(col);
            self.rows.insert(row + 1, tail);
        }
        self.modified = true;
        Position::new(row + 1, 0)
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(lines: &[&str]) -> TextBuffer {
        let owned: Vec<String> = lines.iter().map(|s| (*s).to_owned()).collect();
        TextBuffer::from_lines(&owned)
    }

    fn rows(b: &TextBuffer) -> Vec<&str> {
        b.lines().collect()
    }

    // -- Line ---------------------------------------------------------------

    #[test]
    fn line_char_len_counts_chars_not_bytes() {
        let line = Line::from_text("café");
        assert_eq!(line.char_len(), 4);
        assert_eq!(line.as_str().len(), 5); // bytes
    }

    #[test]
    fn line_insert_char_at_char_column() {
        let mut line = Line::from_text("café");
        line.insert_char(3, 'x');
        assert_eq!(line.as_str(), "cafxé");
    }

    #[test]
    fn line_insert_past_end_appends() {
        let mut line = Line::from_text("ab");
        line.insert_char(99, 'c');
        assert_eq!(line.as_str(), "abc");
    }

    #[test]
    fn line_remove_char_returns_it() {
        let mut line = Line::from_text("café");
        assert_eq!(line.remove_char(3), 'é');
        assert_eq!(line.as_str(), "caf");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn line_remove_past_end_panics() {
        let mut line = Line::from_text("ab");
        let _ = line.remove_char(2);
    }

    #[test]
    fn line_split_off_multibyte() {
        let mut line = Line::from_text("naïve");
        let tail = line.split_off(3);
        assert_eq!(line.as_str(), "naï");
        assert_eq!(tail.as_str(), "ve");
    }

    #[test]
    #[should_panic(expected = "line-ending")]
    fn line_rejects_newline() {
        let _ = Line::from_text("a\nb");
    }

    #[test]
    #[should_panic(expected = "line-ending")]
    fn line_rejects_inserted_newline() {
        let mut line = Line::new();
        line.insert_char(0, '\n');
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn new_buffer_is_one_empty_line() {
        let b = TextBuffer::new();
        assert_eq!(b.row_count(), 1);
        assert_eq!(b.line_len(0), 0);
        assert!(!b.is_modified());
        assert!(b.is_pristine());
    }

    #[test]
    fn from_lines_empty_collection_keeps_invariant() {
        let b = TextBuffer::from_lines(&[]);
        assert_eq!(b.row_count(), 1);
        assert_eq!(b.line(0), "");
    }

    #[test]
    fn from_lines_is_unmodified() {
        let b = buf(&["hello", "world"]);
        assert_eq!(rows(&b), vec!["hello", "world"]);
        assert!(!b.is_modified());
        assert!(!b.is_pristine());
    }

    #[test]
    fn replace_lines_swaps_wholesale() {
        let mut b = buf(&["old"]);
        b.replace_lines(&["a".to_owned(), "b".to_owned()]);
        assert_eq!(rows(&b), vec!["a", "b"]);
    }

    #[test]
    fn contents_joins_with_newlines() {
        assert_eq!(buf(&["a", "b", "c"]).contents(), "a\nb\nc");
        assert_eq!(TextBuffer::new().contents(), "");
    }

    // -- insert_char --------------------------------------------------------

    #[test]
    fn insert_char_mid_line() {
        let mut b = buf(&["helo"]);
        b.insert_char(0, 2, 'l');
        assert_eq!(b.line(0), "hello");
        assert!(b.is_modified());
    }

    #[test]
    fn insert_char_clamps_column() {
        let mut b = buf(&["ab"]);
        b.insert_char(0, 99, 'c');
        assert_eq!(b.line(0), "abc");
    }

    #[test]
    fn insert_char_grows_missing_rows() {
        let mut b = TextBuffer::new();
        b.insert_char(2, 0, 'x');
        assert_eq!(rows(&b), vec!["", "", "x"]);
    }

    #[test]
    fn insert_multibyte_char() {
        let mut b = buf(&["cafe"]);
        b.insert_char(0, 3, 'é');
        assert_eq!(b.line(0), "cafée");
        assert_eq!(b.line_len(0), 5);
    }

    // -- delete_char_before -------------------------------------------------

    #[test]
    fn delete_mid_line_returns_position_left() {
        let mut b = buf(&["hello"]);
        let pos = b.delete_char_before(0, 3);
        assert_eq!(b.line(0), "helo");
        assert_eq!(pos, Position::new(0, 2));
    }

    #[test]
    fn delete_at_line_start_joins_previous() {
        let mut b = buf(&["hello", "world"]);
        let pos = b.delete_char_before(1, 0);
        assert_eq!(rows(&b), vec!["helloworld"]);
        assert_eq!(pos, Position::new(0, 5));
    }

    #[test]
    fn delete_at_origin_is_noop() {
        let mut b = buf(&["hello"]);
        let pos = b.delete_char_before(0, 0);
        assert_eq!(b.line(0), "hello");
        assert_eq!(pos, Position::ZERO);
        assert!(!b.is_modified());
    }

    #[test]
    fn delete_join_never_empties_buffer() {
        let mut b = buf(&["", ""]);
        let _ = b.delete_char_before(1, 0);
        assert_eq!(b.row_count(), 1);
    }

    #[test]
    fn delete_multibyte_char() {
        let mut b = buf(&["café"]);
        let pos = b.delete_char_before(0, 4);
        assert_eq!(b.line(0), "caf");
        assert_eq!(pos, Position::new(0, 3));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn delete_bad_row_panics() {
        let mut b = TextBuffer::new();
        let _ = b.delete_char_before(5, 0);
    }

    // -- split_line ---------------------------------------------------------

    #[test]
    fn split_at_line_end_inserts_empty_row_below() {
        let mut b = buf(&["hello", "world"]);
        let pos = b.split_line(0, 5);
        assert_eq!(rows(&b), vec!["hello", "", "world"]);
        assert_eq!(pos, Position::new(1, 0));
    }

    #[test]
    fn split_at_column_zero_inserts_blank_above() {
        let mut b = buf(&["hello"]);
        let pos = b.split_line(0, 0);
        assert_eq!(rows(&b), vec!["", "hello"]);
        assert_eq!(pos, Position::new(1, 0));
    }

    #[test]
    fn split_mid_line() {
        let mut b = buf(&["hello"]);
        let pos = b.split_line(0, 2);
        assert_eq!(rows(&b), vec!["he", "llo"]);
        assert_eq!(pos, Position::new(1, 0));
    }

    #[test]
    fn split_mid_multibyte_line() {
        let mut b = buf(&["naïve"]);
        let pos = b.split_line(0, 3);
        assert_eq!(rows(&b), vec!["naï", "ve"]);
        assert_eq!(pos, Position::new(1, 0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn split_bad_row_panics() {
        let mut b = TextBuffer::new();
        let _ = b.split_line(3, 0);
    }

    // -- Round-trip ---------------------------------------------------------

    #[test]
    fn split_then_delete_restores_line() {
        // Join is the inverse of split, for any valid column.
        for col in 0..="hello".len() {
            let mut b = buf(&["hello", "world"]);
            let pos = b.split_line(0, col);
            let back = b.delete_char_before(pos.line, pos.col);
            assert_eq!(rows(&b), vec!["hello", "world"], "col {col}");
            assert_eq!(back, Position::new(0, col), "col {col}");
        }
    }

    #[test]
    fn split_then_delete_restores_multibyte_line() {
        let mut b = buf(&["héllo"]);
        let pos = b.split_line(0, 2);
        let back = b.delete_char_before(pos.line, pos.col);
        assert_eq!(rows(&b), vec!["héllo"]);
        assert_eq!(back, Position::new(0, 2));
    }

    // -- Modified / pristine state ------------------------------------------

    #[test]
    fn mark_saved_clears_modified() {
        let mut b = buf(&["x"]);
        b.insert_char(0, 1, 'y');
        assert!(b.is_modified());
        b.mark_saved();
        assert!(!b.is_modified());
    }

    #[test]
    fn pristine_ends_after_first_edit() {
        let mut b = TextBuffer::new();
        assert!(b.is_pristine());
        b.insert_char(0, 0, 'a');
        assert!(!b.is_pristine());
        // Deleting the char back does not restore pristine state.
        let _ = b.delete_char_before(0, 1);
        assert!(!b.is_pristine());
    }
}
