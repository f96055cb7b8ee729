// SPDX-License-Identifier: MIT
//
// Key decoding: raw terminal bytes in, one logical key event out.
//
// The decoder hides multi-byte escape sequences from everything downstream.
// It pulls bytes through the [`ByteSource`] abstraction: `next_byte` blocks
// until input arrives, `peek_byte` answers "is a byte already available"
// with zero additional wait. That split is what resolves the classic ESC
// ambiguity: a lone ESC byte with nothing pending is the Escape key, while
// ESC with `[` already buffered is the start of a CSI sequence.
//
// The escape path runs an explicit two-stage machine (await the bracket,
// then await the finalizer byte) rather than reaching into any particular
// reader's buffer. Any source that can peek without consuming works.
//
// UTF-8 continuation bytes are read with blocking calls; they belong to
// the same keypress as the lead byte and arrive together.

// ─── Events ─────────────────────────────────────────────────────────────────

/// A decoded logical key, abstracted away from raw bytes.
///
/// Produced once per keypress by [`decode_next`], consumed once by the
/// controller's dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character (Unicode scalar, not a byte).
    Char(char),
    /// A control chord: `Ctrl('q')` for the 0x11 byte, and so on.
    Ctrl(char),
    /// Arrow keys (CSI `A`/`B`/`C`/`D`).
    Up,
    Down,
    Left,
    Right,
    /// Carriage return (0x0D).
    Enter,
    /// DEL (0x7F).
    Backspace,
    /// A lone ESC byte with no sequence following it.
    Escape,
    /// Input the decoder does not map to any key. Never silently dropped;
    /// the controller decides what to do with it.
    Unrecognized,
}

// ─── Byte source ────────────────────────────────────────────────────────────

/// A byte-oriented input stream with one-byte lookahead.
///
/// The decoder is written against this trait so it never depends on how
/// the bytes are buffered. [`crate::reader::ChannelBytes`] is the
/// production implementation; tests use an in-memory queue.
pub trait ByteSource {
    /// Block until a byte is available and consume it.
    /// `None` means the stream is closed; no more bytes will ever arrive.
    fn next_byte(&mut self) -> Option<u8>;

    /// Return the next byte without consuming it, if one is *already*
    /// available. Must not wait: `None` means "nothing pending right now",
    /// not "stream closed".
    fn peek_byte(&mut self) -> Option<u8>;
}

// ─── Decoding ───────────────────────────────────────────────────────────────

/// Decode the next logical key from the stream.
///
/// Blocks until at least one byte is available. Returns `None` when the
/// stream closes, which is the controller's signal to stop its cycle.
pub fn decode_next(src: &mut impl ByteSource) -> Option<Key> {
    let byte = src.next_byte()?;

    Some(match byte {
        0x0D => Key::Enter,
        0x7F => Key::Backspace,
        0x1B => decode_escape(src),
        // Control range: a letter masked with 0x1F. Recover the lower-case
        // letter with `| 0x60`.
        b @ 0x01..=0x1A => Key::Ctrl((b | 0x60) as char),
        b @ 0x20..=0x7E => Key::Char(b as char),
        // UTF-8 lead byte (or a stray continuation byte).
        b @ 0x80..=0xFF => decode_utf8(src, b),
        // Remaining C0 bytes (0x00, 0x1C..=0x1F): not printable, not in
        // the control-letter range.
        _ => Key::Unrecognized,
    })
}

/// States of the escape-sequence machine. The ESC byte itself has already
/// been consumed when this runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeState {
    /// Waiting for `[` to confirm a CSI sequence.
    AwaitBracket,
    /// `[` consumed, waiting for the finalizer byte.
    AwaitFinalizer,
}

/// Decode the tail of an escape sequence, or a lone Escape.
///
/// Both stages use the zero-wait peek: if the terminal sent a real escape
/// sequence, its bytes are already pending; if the user pressed the Escape
/// key, nothing is. A sequence truncated by end-of-stream degrades to
/// [`Key::Unrecognized`] without blocking.
fn decode_escape(src: &mut impl ByteSource) -> Key {
    let mut state = EscapeState::AwaitBracket;

    loop {
        match state {
            EscapeState::AwaitBracket => match src.peek_byte() {
                // Nothing pending: the ESC stands alone.
                None => return Key::Escape,
                Some(b'[') => {
                    let _ = src.next_byte();
                    state = EscapeState::AwaitFinalizer;
                }
                // Some other sequence. Report it unrecognized and leave
                // the lookahead byte for the next decode cycle.
                Some(_) => return Key::Unrecognized,
            },
            EscapeState::AwaitFinalizer => {
                if src.peek_byte().is_none() {
                    // Truncated CSI: `ESC [` then silence.
                    return Key::Unrecognized;
                }
                return match src.next_byte() {
                    Some(b'A') => Key::Up,
                    Some(b'B') => Key::Down,
                    Some(b'C') => Key::Right,
                    Some(b'D') => Key::Left,
                    _ => Key::Unrecognized,
                };
            }
        }
    }
}

/// Assemble a multi-byte UTF-8 character starting from its lead byte.
///
/// Continuation bytes are pulled with blocking reads. Invalid leads,
/// invalid continuations, and end-of-stream mid-character all decode to
/// [`Key::Unrecognized`].
fn decode_utf8(src: &mut impl ByteSource, lead: u8) -> Key {
    let len = match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        // 0x80..=0xBF is a continuation with no lead; 0xC0/0xC1 and
        // 0xF5..=0xFF are never valid in UTF-8.
        _ => return Key::Unrecognized,
    };

    let mut buf = [lead, 0, 0, 0];
    for slot in buf.iter_mut().take(len).skip(1) {
        match src.next_byte() {
            Some(b @ 0x80..=0xBF) => *slot = b,
            _ => return Key::Unrecognized,
        }
    }

    match std::str::from_utf8(&buf[..len]) {
        Ok(s) => s.chars().next().map_or(Key::Unrecognized, Key::Char),
        Err(_) => Key::Unrecognized,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    /// In-memory byte source. `peek_byte` sees exactly the queued bytes,
    /// mirroring a terminal that has already delivered the whole sequence.
    struct Bytes {
        queue: VecDeque<u8>,
    }

    impl Bytes {
        fn from(bytes: &[u8]) -> Self {
            Self {
                queue: bytes.iter().copied().collect(),
            }
        }
    }

    impl ByteSource for Bytes {
        fn next_byte(&mut self) -> Option<u8> {
            self.queue.pop_front()
        }

        fn peek_byte(&mut self) -> Option<u8> {
            self.queue.front().copied()
        }
    }

    fn decode_one(bytes: &[u8]) -> Key {
        decode_next(&mut Bytes::from(bytes)).expect("stream closed")
    }

    // ── Plain characters ────────────────────────────────────────────────

    #[test]
    fn ascii_char() {
        assert_eq!(decode_one(b"a"), Key::Char('a'));
        assert_eq!(decode_one(b"Z"), Key::Char('Z'));
        assert_eq!(decode_one(b" "), Key::Char(' '));
        assert_eq!(decode_one(b"~"), Key::Char('~'));
    }

    #[test]
    fn utf8_two_byte_char() {
        assert_eq!(decode_one("é".as_bytes()), Key::Char('é'));
    }

    #[test]
    fn utf8_three_byte_char() {
        assert_eq!(decode_one("漢".as_bytes()), Key::Char('漢'));
    }

    #[test]
    fn utf8_four_byte_char() {
        assert_eq!(decode_one("🦀".as_bytes()), Key::Char('🦀'));
    }

    #[test]
    fn utf8_truncated_char_is_unrecognized() {
        // Lead byte of a 2-byte char, then the stream ends.
        assert_eq!(decode_one(&[0xC3]), Key::Unrecognized);
    }

    #[test]
    fn utf8_bad_continuation_is_unrecognized() {
        assert_eq!(decode_one(&[0xC3, 0x41]), Key::Unrecognized);
    }

    #[test]
    fn stray_continuation_byte_is_unrecognized() {
        assert_eq!(decode_one(&[0x80]), Key::Unrecognized);
    }

    // ── Named keys ──────────────────────────────────────────────────────

    #[test]
    fn enter_is_carriage_return() {
        assert_eq!(decode_one(b"\r"), Key::Enter);
    }

    #[test]
    fn backspace_is_del() {
        assert_eq!(decode_one(&[0x7F]), Key::Backspace);
    }

    // ── Control chords ──────────────────────────────────────────────────

    #[test]
    fn ctrl_q() {
        assert_eq!(decode_one(&[0x11]), Key::Ctrl('q'));
    }

    #[test]
    fn ctrl_s() {
        assert_eq!(decode_one(&[0x13]), Key::Ctrl('s'));
    }

    #[test]
    fn ctrl_a_and_ctrl_z_bound_the_range() {
        assert_eq!(decode_one(&[0x01]), Key::Ctrl('a'));
        assert_eq!(decode_one(&[0x1A]), Key::Ctrl('z'));
    }

    #[test]
    fn line_feed_is_ctrl_j() {
        // Only 0x0D maps to Enter; 0x0A stays in the control range.
        assert_eq!(decode_one(b"\n"), Key::Ctrl('j'));
    }

    #[test]
    fn leftover_c0_bytes_are_unrecognized() {
        assert_eq!(decode_one(&[0x00]), Key::Unrecognized);
        assert_eq!(decode_one(&[0x1C]), Key::Unrecognized);
        assert_eq!(decode_one(&[0x1F]), Key::Unrecognized);
    }

    // ── Escape sequences ────────────────────────────────────────────────

    #[test]
    fn arrow_right_consumes_all_three_bytes() {
        let mut src = Bytes::from(b"\x1b[C");
        assert_eq!(decode_next(&mut src), Some(Key::Right));
        assert!(src.queue.is_empty(), "all three bytes consumed");
    }

    #[test]
    fn all_four_arrows() {
        assert_eq!(decode_one(b"\x1b[A"), Key::Up);
        assert_eq!(decode_one(b"\x1b[B"), Key::Down);
        assert_eq!(decode_one(b"\x1b[C"), Key::Right);
        assert_eq!(decode_one(b"\x1b[D"), Key::Left);
    }

    #[test]
    fn lone_escape_with_nothing_pending() {
        // A bare ESC with the stream then quiet.
        let mut src = Bytes::from(&[0x1B]);
        assert_eq!(decode_next(&mut src), Some(Key::Escape));
        assert!(src.queue.is_empty());
    }

    #[test]
    fn unknown_finalizer_is_unrecognized() {
        assert_eq!(decode_one(b"\x1b[Z"), Key::Unrecognized);
    }

    #[test]
    fn truncated_csi_is_unrecognized() {
        // ESC [ and then the stream goes quiet.
        assert_eq!(decode_one(b"\x1b["), Key::Unrecognized);
    }

    #[test]
    fn esc_with_other_lookahead_leaves_byte_unconsumed() {
        let mut src = Bytes::from(b"\x1bx");
        assert_eq!(decode_next(&mut src), Some(Key::Unrecognized));
        // The lookahead byte is still there for the next cycle.
        assert_eq!(decode_next(&mut src), Some(Key::Char('x')));
    }

    #[test]
    fn arrow_followed_by_text_decodes_in_order() {
        let mut src = Bytes::from(b"\x1b[Bhi");
        assert_eq!(decode_next(&mut src), Some(Key::Down));
        assert_eq!(decode_next(&mut src), Some(Key::Char('h')));
        assert_eq!(decode_next(&mut src), Some(Key::Char('i')));
        assert_eq!(decode_next(&mut src), None);
    }

    // ── Stream end ──────────────────────────────────────────────────────

    #[test]
    fn closed_stream_is_none() {
        assert_eq!(decode_next(&mut Bytes::from(b"")), None);
    }

    #[test]
    fn decoding_consumes_one_key_per_call() {
        let mut src = Bytes::from(b"ab");
        assert_eq!(decode_next(&mut src), Some(Key::Char('a')));
        assert_eq!(decode_next(&mut src), Some(Key::Char('b')));
        assert_eq!(decode_next(&mut src), None);
    }
}
