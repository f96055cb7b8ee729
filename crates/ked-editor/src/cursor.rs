//! Cursor: a buffer position with clamped movement.
//!
//! The cursor does not own or reference the buffer; movement methods take
//! it as a parameter and clamp against its geometry. Vertical movement is
//! bounded by the row count (the cursor may sit on the last row, never
//! past it) and horizontal movement by the current row's char length (the
//! cursor may sit one past the last char, never further).
//!
//! # Sticky column
//!
//! Vertical movement remembers the column it started from. Moving down
//! through a short line clamps the visible column, but reaching a longer
//! line again restores the remembered one. Horizontal movement and
//! buffer-driven repositioning (Enter, Backspace, insert) reset it.

use crate::buffer::TextBuffer;
use crate::position::Position;

/// A cursor in a text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Current position, always valid for the buffer it moves over.
    pos: Position,

    /// Remembered column for vertical movement.
    sticky_col: usize,
}

impl Cursor {
    /// Create a cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            sticky_col: 0,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// Current position.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    /// Current line (0-indexed).
    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos.line
    }

    /// Current column (0-indexed, char offset).
    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    // -- Buffer-driven repositioning ----------------------------------------

    /// Adopt a position returned by a buffer operation.
    ///
    /// Enter, Backspace, and insertion never apply their own deltas; they
    /// take the position [`TextBuffer`] hands back. Resets the sticky
    /// column.
    pub const fn set(&mut self, pos: Position) {
        self.pos = pos;
        self.sticky_col = pos.col;
    }

    // -- Movement -----------------------------------------------------------

    /// Move one row up. No-op on the first row.
    pub fn move_up(&mut self, buf: &TextBuffer) {
        if self.pos.line > 0 {
            self.pos.line -= 1;
            self.reclamp_col(buf);
        }
    }

    /// Move one row down. No-op on the last row.
    pub fn move_down(&mut self, buf: &TextBuffer) {
        if self.pos.line + 1 < buf.row_count() {
            self.pos.line += 1;
            self.reclamp_col(buf);
        }
    }

    /// Move one column left. No-op at column 0.
    pub fn move_left(&mut self, _buf: &TextBuffer) {
        if self.pos.col > 0 {
            self.pos.col -= 1;
            self.sticky_col = self.pos.col;
        }
    }

    /// Move one column right. No-op one past the row's last char.
    pub fn move_right(&mut self, buf: &TextBuffer) {
        if self.pos.col < buf.line_len(self.pos.line) {
            self.pos.col += 1;
            self.sticky_col = self.pos.col;
        }
    }

    /// After a vertical move the column may hang past the end of a
    /// shorter row; clamp it, but aim for the sticky column.
    fn reclamp_col(&mut self, buf: &TextBuffer) {
        self.pos.col = self.sticky_col.min(buf.line_len(self.pos.line));
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
