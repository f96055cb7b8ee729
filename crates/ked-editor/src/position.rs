//! Text position type.
//!
//! All coordinates are **0-indexed**. Line 0 is the first line, column 0 is
//! the first character. Columns count Unicode scalar values (chars), not
//! bytes: column 3 of `"café"` is `'é'`, never a byte inside its UTF-8
//! encoding. Byte offsets stay private to [`crate::buffer::Line`].
//!
//! Display layers (the status bar) convert to 1-indexed for the user; that
//! conversion never belongs here.

use std::fmt;

/// A position in a text buffer: (line, column), both 0-indexed.
///
/// `col` may equal the line's char length, the cursor-after-last-char
/// position used while inserting at the end of a line. It is never larger.
///
/// # Ordering
///
/// Positions are ordered lexicographically: line first, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// The origin: line 0, column 0.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    /// Create a new position.
    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// True when both line and col are zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.line == 0 && self.col == 0
    }
}

// Natural ordering: line first, then column.
impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line.cmp(&other.line).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed for human display.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_constant() {
        let p = Position::ZERO;
        assert_eq!(p.line, 0);
        assert_eq!(p.col, 0);
        assert!(p.is_zero());
    }

    #[test]
    fn new_sets_fields() {
        let p = Position::new(3, 7);
        assert_eq!(p.line, 3);
        assert_eq!(p.col, 7);
        assert!(!p.is_zero());
    }

    #[test]
    fn ordering_is_line_first() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 5));
        assert_eq!(Position::new(4, 4), Position::new(4, 4));
    }

    #[test]
    fn display_is_one_indexed() {
        assert_eq!(Position::ZERO.to_string(), "1:1");
        assert_eq!(Position::new(9, 4).to_string(), "10:5");
    }

    #[test]
    fn debug_is_zero_indexed() {
        assert_eq!(format!("{:?}", Position::new(9, 4)), "Pos(9:4)");
    }
}
