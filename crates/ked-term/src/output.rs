// SPDX-License-Identifier: MIT
//
// Output buffering.
//
// `OutputBuffer` accumulates all the bytes of one frame in memory so the
// entire frame can be written with a single write() syscall. Writing escape
// sequences piecemeal lets the terminal display a half-painted frame between
// writes; batching is what keeps the redraw flicker-free.

use std::io::{self, Write};

/// A byte buffer that accumulates one frame of ANSI output.
///
/// The compositor writes the whole frame into this buffer, then
/// [`flush_to`](Self::flush_to) hands it to the terminal in one write.
///
/// Default capacity: 8 KB, enough for a full 80x24 frame with escapes
/// without reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 8192;

impl OutputBuffer {
    /// Create an empty buffer with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Discard the accumulated bytes, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write the accumulated frame to `w` in a single call, then clear.
    ///
    /// # Errors
    ///
    /// Propagates any error from the underlying writer.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&self.buf)?;
        w.flush()?;
        self.buf.clear();
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
