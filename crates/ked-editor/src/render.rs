//! Render compositor: buffer state in, one terminal frame out.
//!
//! [`compose`] serializes the visible window, the status bar, and the
//! cursor position into a byte payload of ANSI sequences. It reads the
//! buffer, cursor, and viewport and mutates none of them, so it is safe
//! to call every cycle whether or not anything changed. Each call
//! regenerates the whole frame; there is no diffing layer.
//!
//! Frame layout, in emission order:
//!
//! 1. hide cursor, home
//! 2. per text row: clear-line, then the row's visible slice, a `~`
//!    placeholder past the end of the document, or the welcome banner
//! 3. status bar: clear-line, inverse video, file name and position, reset
//! 4. cursor moved to its window position (1-indexed on the wire), shown
//!
//! Rows are clipped to the viewport in char columns, then additionally by
//! display width so a wide glyph never spills past the window edge.

use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

use ked_term::ansi;
use ked_term::output::OutputBuffer;

use crate::buffer::TextBuffer;
use crate::position::Position;
use crate::viewport::Viewport;

/// Version string baked into the welcome banner.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the status bar shows besides the cursor position.
#[derive(Debug, Clone, Copy)]
pub struct StatusInfo<'a> {
    /// File name for the left side, `"[No Name]"` for a scratch buffer.
    pub file_name: &'a str,
    /// Whether the buffer has unsaved changes (`[+]` marker).
    pub modified: bool,
    /// Transient message (save reports, key notices). Empty for none.
    pub message: &'a str,
}

/// Serialize one frame into `out`.
///
/// `cursor` must already be inside the viewport; call
/// [`Viewport::recompute`] first. The viewport's height is the text area
/// only, so the emitted frame is `height + 1` terminal rows.
///
/// # Errors
///
/// Propagates writer errors; writing into [`OutputBuffer`] never fails.
pub fn compose(
    buffer: &TextBuffer,
    cursor: Position,
    vp: &Viewport,
    status: &StatusInfo<'_>,
    out: &mut OutputBuffer,
) -> io::Result<()> {
    ansi::cursor_hide(out)?;
    ansi::cursor_home(out)?;

    for screen_row in 0..vp.height() {
        ansi::clear_line(out)?;

        let buf_row = vp.row_offset() + screen_row;
        if buf_row < buffer.row_count() {
            write_clipped_row(out, buffer.line(buf_row), vp.col_offset(), vp.width())?;
        } else if buffer.is_pristine() && screen_row == vp.height() / 3 {
            write_welcome(out, vp.width())?;
        } else {
            out.write_all(b"~")?;
        }

        out.write_all(b"\r\n")?;
    }

    // The status row sits right below the text area.
    #[allow(clippy::cast_possible_truncation)]
    ansi::cursor_to(out, 0, vp.height() as u16)?;
    write_status_bar(out, cursor, vp.width(), status)?;

    let (x, y) = vp.to_screen(cursor);
    // Window coordinates fit in u16: they are bounded by the terminal
    // size, which the OS reports as u16.
    #[allow(clippy::cast_possible_truncation)]
    ansi::cursor_to(out, x as u16, y as u16)?;
    ansi::cursor_show(out)?;

    Ok(())
}

/// Emit the slice of `line` that falls inside the window.
///
/// Skips `col_offset` chars, then emits chars until the next one would
/// not fit in `width` display columns. A row entirely left of the window
/// renders as empty.
fn write_clipped_row(
    out: &mut OutputBuffer,
    line: &str,
    col_offset: usize,
    width: usize,
) -> io::Result<()> {
    let mut used = 0;
    for ch in line.chars().skip(col_offset) {
        let w = ch.width().unwrap_or(1);
        if used + w > width {
            break;
        }
        used += w;
        write!(out, "{ch}")?;
    }
    Ok(())
}

/// Emit the centered welcome banner for the pristine startup buffer.
fn write_welcome(out: &mut OutputBuffer, width: usize) -> io::Result<()> {
    let banner = format!("ked editor -- version {VERSION}");
    let shown: String = banner.chars().take(width).collect();

    let padding = (width - shown.chars().count()) / 2;
    if padding > 0 {
        out.write_all(b"~")?;
        for _ in 1..padding {
            out.write_all(b" ")?;
        }
    }
    write!(out, "{shown}")
}

/// Emit the inverse-video status bar (no trailing newline).
///
/// Left side: file name, `[+]` when modified, then the transient message.
/// Right side: the cursor's buffer position, 1-indexed for display. The
/// middle is padded to the full width so the inverse band spans the row.
fn write_status_bar(
    out: &mut OutputBuffer,
    cursor: Position,
    width: usize,
    status: &StatusInfo<'_>,
) -> io::Result<()> {
    ansi::clear_line(out)?;
    ansi::inverse(out)?;

    let mut left = format!(
        " {}{}",
        status.file_name,
        if status.modified { " [+]" } else { "" }
    );
    if !status.message.is_empty() {
        left.push_str("  ");
        left.push_str(status.message);
    }
    let right = format!(" {cursor} ");

    let left_len = left.chars().count();
    let right_len = right.chars().count();

    if left_len + right_len <= width {
        write!(out, "{left}")?;
        for _ in 0..width - left_len - right_len {
            out.write_all(b" ")?;
        }
        write!(out, "{right}")?;
    } else {
        // Too narrow for both: keep as much of the left side as fits.
        let shown: String = left.chars().take(width).collect();
        write!(out, "{shown}")?;
        for _ in 0..width.saturating_sub(left_len) {
            out.write_all(b" ")?;
        }
    }

    ansi::reset(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
