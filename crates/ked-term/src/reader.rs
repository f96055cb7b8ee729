// SPDX-License-Identifier: MIT
//
// Background stdin reader plus the channel-backed byte source.
//
// A dedicated thread reads stdin in blocking mode and sends byte chunks
// through a standard channel. `ChannelBytes` adapts the receiving end to
// the decoder's [`ByteSource`] contract: a blocking `next_byte` that keeps
// checking the cancellation flag, and a zero-wait `peek_byte`.
//
// Why a thread at all, when the editor loop is synchronous? Because a
// blocking `read()` on stdin cannot be interrupted cooperatively. With the
// read parked in its own thread, the editor side blocks on the channel
// with a timeout instead, so a SIGINT/SIGTERM can stop the loop within
// one timeout interval even if no key is ever pressed.
//
// Shutdown: the reader thread uses `poll()` with a short timeout on
// stdin's file descriptor, checking an `AtomicBool` stop flag between
// polls. This lets us shut down cleanly without leaving the thread stuck
// in a blocking `read()`.
#![allow(unsafe_code)]

#[cfg(unix)]
use std::io;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::input::ByteSource;
use crate::signal;

/// Byte chunk read from stdin.
///
/// Sized for typical terminal input: a single keypress is 1-6 bytes,
/// a paste can be kilobytes. 4 KB handles both without waste.
const READ_BUF_SIZE: usize = 4096;

/// How often the reader thread checks the stop flag (milliseconds).
const POLL_TIMEOUT_MS: i32 = 50;

/// How long `ChannelBytes::next_byte` blocks between cancellation checks.
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(50);

// ─── StdinReader ────────────────────────────────────────────────────────────

/// Background stdin reader thread.
///
/// Spawns a thread that reads raw bytes from stdin and sends them through
/// a channel. The thread runs until [`stop`](Self::stop) is called (or the
/// `StdinReader` is dropped).
pub struct StdinReader {
    /// The reader thread handle. `None` after `stop()` joins it.
    handle: Option<JoinHandle<()>>,
    /// Shared flag to signal the thread to exit.
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Spawn the background reader thread.
    ///
    /// Returns the reader handle and a channel receiver for byte chunks.
    /// Each received `Vec<u8>` is a non-empty chunk of raw stdin data.
    /// The channel closes when the reader is stopped or stdin hits EOF.
    ///
    /// # Panics
    ///
    /// Panics if the OS cannot spawn a new thread.
    #[must_use]
    pub fn spawn() -> (Self, Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || {
                Self::reader_loop(&tx, &stop_flag);
            })
            .expect("failed to spawn stdin reader thread");

        (
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        )
    }

    /// Signal the reader thread to stop and wait for it to exit.
    ///
    /// Idempotent: calling `stop()` after the thread has already exited
    /// is a no-op.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// The reader thread's main loop.
    ///
    /// Polls stdin with a short timeout, reads available bytes, and sends
    /// them through the channel. Exits when the stop flag is set, stdin
    /// reaches EOF, or the channel is disconnected.
    #[cfg(unix)]
    fn reader_loop(tx: &mpsc::Sender<Vec<u8>>, stop: &AtomicBool) {
        use std::os::unix::io::AsRawFd;

        let stdin_fd = io::stdin().as_raw_fd();
        let mut buf = [0u8; READ_BUF_SIZE];

        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }

            // Poll stdin for readability with a timeout.
            let ready = unsafe {
                let mut pfd = libc::pollfd {
                    fd: stdin_fd,
                    events: libc::POLLIN,
                    revents: 0,
                };
                libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
            };

            // Timeout or error: loop back to check the stop flag.
            if ready <= 0 {
                continue;
            }

            // Data available, read it.
            let n = unsafe { libc::read(stdin_fd, buf.as_mut_ptr().cast(), buf.len()) };

            if n <= 0 {
                // EOF or error, exit the thread.
                break;
            }

            #[allow(clippy::cast_sign_loss)] // n > 0 guaranteed above.
            let chunk = buf[..n as usize].to_vec();

            if tx.send(chunk).is_err() {
                // Receiver dropped, nobody's listening.
                break;
            }
        }
    }

    /// Non-unix fallback using blocking reads with no poll.
    ///
    /// Less graceful shutdown (the thread can stay parked in read), but
    /// functional.
    #[cfg(not(unix))]
    fn reader_loop(tx: &mpsc::Sender<Vec<u8>>, stop: &AtomicBool) {
        use std::io::Read;

        let stdin = std::io::stdin();
        let mut buf = [0u8; READ_BUF_SIZE];

        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }

            match stdin.lock().read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── ChannelBytes ───────────────────────────────────────────────────────────

/// [`ByteSource`] over the reader's channel.
///
/// Owns a small pending queue so that a received chunk can be consumed
/// one byte at a time, and so `peek_byte` can look at a byte without
/// losing it.
pub struct ChannelBytes {
    rx: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
}

impl ChannelBytes {
    /// Wrap a chunk receiver.
    #[must_use]
    pub fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            pending: VecDeque::new(),
        }
    }
}

impl ByteSource for ChannelBytes {
    /// Block until a byte is available.
    ///
    /// Blocks in `recv_timeout` slices so the process-wide cancellation
    /// flag is observed even when no input ever arrives. Returns `None`
    /// on cancellation or when the reader side has closed the channel.
    fn next_byte(&mut self) -> Option<u8> {
        if let Some(b) = self.pending.pop_front() {
            return Some(b);
        }

        loop {
            if signal::cancelled() {
                return None;
            }
            match self.rx.recv_timeout(CANCEL_CHECK_INTERVAL) {
                Ok(chunk) => {
                    self.pending.extend(chunk);
                    if let Some(b) = self.pending.pop_front() {
                        return Some(b);
                    }
                    // Chunks are never empty, but an empty one would just
                    // loop back to recv.
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// One-shot lookahead: a single `try_recv`, no waiting.
    ///
    /// `None` means nothing is pending *right now*. The distinction from
    /// a closed stream does not matter here: both resolve the ESC
    /// ambiguity the same way.
    fn peek_byte(&mut self) -> Option<u8> {
        if let Some(&b) = self.pending.front() {
            return Some(b);
        }
        match self.rx.try_recv() {
            Ok(chunk) => {
                self.pending.extend(chunk);
                self.pending.front().copied()
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn read_buf_size_reasonable() {
        assert!(READ_BUF_SIZE >= 1024);
        assert!(READ_BUF_SIZE <= 65536);
    }

    #[test]
    fn poll_timeout_reasonable() {
        assert!(POLL_TIMEOUT_MS >= 10);
        assert!(POLL_TIMEOUT_MS <= 500);
    }

    #[test]
    fn spawn_and_stop() {
        // Spawn the reader. It won't read anything useful in tests (stdin
        // is not a terminal), but it must not panic or hang.
        let (mut reader, _rx) = StdinReader::spawn();
        reader.stop();
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut reader, _rx) = StdinReader::spawn();
        reader.stop();
        reader.stop(); // Second call must not panic.
    }

    #[test]
    fn drop_stops_reader() {
        let (reader, _rx) = StdinReader::spawn();
        drop(reader); // Must not hang.
    }

    // ── ChannelBytes ────────────────────────────────────────────────

    #[test]
    fn next_byte_drains_chunks_in_order() {
        let (tx, rx) = mpsc::channel();
        tx.send(vec![b'a', b'b']).unwrap();
        tx.send(vec![b'c']).unwrap();

        let mut src = ChannelBytes::new(rx);
        assert_eq!(src.next_byte(), Some(b'a'));
        assert_eq!(src.next_byte(), Some(b'b'));
        assert_eq!(src.next_byte(), Some(b'c'));
    }

    #[test]
    fn next_byte_none_on_disconnect() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        drop(tx);
        let mut src = ChannelBytes::new(rx);
        assert_eq!(src.next_byte(), None);
    }

    #[test]
    fn peek_does_not_consume() {
        let (tx, rx) = mpsc::channel();
        tx.send(vec![b'x']).unwrap();

        let mut src = ChannelBytes::new(rx);
        assert_eq!(src.peek_byte(), Some(b'x'));
        assert_eq!(src.peek_byte(), Some(b'x'));
        assert_eq!(src.next_byte(), Some(b'x'));
    }

    #[test]
    fn peek_is_zero_wait_when_channel_empty() {
        let (_tx, rx) = mpsc::channel::<Vec<u8>>();
        let mut src = ChannelBytes::new(rx);
        // Sender alive but nothing queued: must answer None immediately.
        assert_eq!(src.peek_byte(), None);
    }

    #[test]
    fn peek_pulls_a_pending_chunk() {
        let (tx, rx) = mpsc::channel();
        let mut src = ChannelBytes::new(rx);
        assert_eq!(src.peek_byte(), None);

        tx.send(vec![b'[', b'C']).unwrap();
        assert_eq!(src.peek_byte(), Some(b'['));
        assert_eq!(src.next_byte(), Some(b'['));
        assert_eq!(src.next_byte(), Some(b'C'));
    }

    #[test]
    fn decodes_arrow_through_channel() {
        use crate::input::{decode_next, Key};

        let (tx, rx) = mpsc::channel();
        tx.send(vec![0x1B, b'[', b'C']).unwrap();

        let mut src = ChannelBytes::new(rx);
        assert_eq!(decode_next(&mut src), Some(Key::Right));
        drop(tx);
        assert_eq!(decode_next(&mut src), None);
    }
}
