// SPDX-License-Identifier: MIT
//
// ked: a minimal terminal line editor.
//
// This is the binary that wires together the two crates:
//
//   ked-term   -> raw mode, signals, stdin reader, key decoding, ANSI
//   ked-editor -> line buffer, cursor, viewport, frame compositor
//
// The Editor struct owns all editing state and is driven by one
// synchronous loop. Each cycle flows:
//
//   render frame -> stdout (one write)
//   block on decode_next -> logical key
//   dispatch -> buffer/cursor mutation
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  <- rows - 1 (viewport height)
//   ├──────────────────────────────┤
//   │ status bar (inverse)         │  <- 1 row
//   └──────────────────────────────┘
//
// Everything recoverable is handled here, at the orchestration boundary:
// a failed load keeps the prior (or pristine) buffer, a failed save is
// reported in the status bar, stream end and signals stop the loop after
// the cycle completes. The core crates only clamp or panic.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ked_editor::buffer::TextBuffer;
use ked_editor::cursor::Cursor;
use ked_editor::position::Position;
use ked_editor::render::{self, StatusInfo};
use ked_editor::viewport::Viewport;

use ked_term::ansi;
use ked_term::input::{decode_next, Key};
use ked_term::output::OutputBuffer;
use ked_term::reader::{ChannelBytes, StdinReader};
use ked_term::signal;
use ked_term::terminal::{self, Size, Terminal};

// ─── Editor ─────────────────────────────────────────────────────────────────

/// What the editor tells the loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Keep running.
    Continue,
    /// Exit the loop cleanly.
    Quit,
}

/// All editing state, owned by the controller loop and nothing else.
struct Editor {
    buffer: TextBuffer,
    cursor: Cursor,
    viewport: Viewport,
    /// File backing the buffer. Set even when the initial load failed,
    /// so Ctrl+S can create the file.
    path: Option<PathBuf>,
    /// Transient status message, replaced on the next keypress.
    message: String,
}

impl Editor {
    fn new(size: Size) -> Self {
        Self {
            buffer: TextBuffer::new(),
            cursor: Cursor::new(),
            viewport: viewport_for(size),
            path: None,
            message: String::new(),
        }
    }

    /// Load a file into the buffer.
    ///
    /// A missing or unreadable file leaves the buffer in its prior valid
    /// state and reports the error in the status bar; the path is kept so
    /// a later save creates the file.
    fn open(&mut self, path: PathBuf) {
        match load_lines(&path) {
            Ok(lines) => {
                self.buffer = TextBuffer::from_lines(&lines);
            }
            Err(err) => {
                self.message = format!("could not open {}: {err}", path.display());
            }
        }
        self.path = Some(path);
    }

    /// Adopt a new terminal size and realign the scroll immediately.
    fn resize(&mut self, size: Size) {
        let mut vp = viewport_for(size);
        vp.recompute(self.cursor.position());
        self.viewport = vp;
    }

    /// Dispatch one decoded key.
    fn handle_key(&mut self, key: Key) -> Action {
        self.message.clear();

        match key {
            Key::Ctrl('q') => return Action::Quit,
            Key::Ctrl('s') => self.save(),

            Key::Up => self.cursor.move_up(&self.buffer),
            Key::Down => self.cursor.move_down(&self.buffer),
            Key::Left => self.cursor.move_left(&self.buffer),
            Key::Right => self.cursor.move_right(&self.buffer),

            Key::Enter => {
                let pos = self.buffer.split_line(self.cursor.line(), self.cursor.col());
                self.cursor.set(pos);
            }
            Key::Backspace => {
                let pos = self
                    .buffer
                    .delete_char_before(self.cursor.line(), self.cursor.col());
                self.cursor.set(pos);
            }
            Key::Char(ch) => {
                let (row, col) = (self.cursor.line(), self.cursor.col());
                self.buffer.insert_char(row, col, ch);
                self.cursor.set(Position::new(row, col + 1));
            }

            // Reported, never silently swallowed.
            Key::Escape => self.message = "ESC".to_owned(),
            Key::Ctrl(other) => {
                self.message = format!("Ctrl-{} is not bound", other.to_uppercase());
            }
            Key::Unrecognized => self.message = "unrecognized input".to_owned(),
        }

        Action::Continue
    }

    /// Write the buffer to its file, reporting the outcome in the status
    /// bar. Never takes the editing session down.
    fn save(&mut self) {
        let Some(path) = self.path.clone() else {
            self.message = "no file name".to_owned();
            return;
        };

        match save_lines(&path, &self.buffer) {
            Ok(()) => {
                self.buffer.mark_saved();
                let rows = self.buffer.row_count();
                let plural = if rows == 1 { "" } else { "s" };
                self.message = format!("saved {rows} line{plural}");
            }
            Err(err) => self.message = format!("save failed: {err}"),
        }
    }

    /// Compose the current frame into `out`.
    fn frame(&mut self, out: &mut OutputBuffer) -> io::Result<()> {
        self.viewport.recompute(self.cursor.position());

        let status = StatusInfo {
            file_name: self.file_label(),
            modified: self.buffer.is_modified(),
            message: &self.message,
        };
        render::compose(
            &self.buffer,
            self.cursor.position(),
            &self.viewport,
            &status,
            out,
        )
    }

    fn file_label(&self) -> &str {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .unwrap_or("[No Name]")
    }
}

/// Text-area viewport for a terminal size: full width, one row reserved
/// for the status bar.
fn viewport_for(size: Size) -> Viewport {
    Viewport::new(usize::from(size.cols), usize::from(size.rows.max(1) - 1))
}

// ─── File I/O collaborators ─────────────────────────────────────────────────

/// Split file contents into buffer lines on `\n`, tolerating CRLF.
fn load_lines(path: &Path) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_owned())
        .collect())
}

/// Join buffer lines with `\n` and write the whole file.
fn save_lines(path: &Path, buffer: &TextBuffer) -> io::Result<()> {
    fs::write(path, buffer.contents())
}

// ─── Main loop ──────────────────────────────────────────────────────────────

/// The decode -> mutate -> render cycle.
///
/// The only suspension point is `decode_next`; everything else runs to
/// completion before the loop comes back around, so a cancellation signal
/// can never leave the buffer mid-operation.
fn run(editor: &mut Editor, term: &mut Terminal, keys: &mut ChannelBytes) -> io::Result<()> {
    let mut out = OutputBuffer::new();
    let mut stdout = io::stdout();

    loop {
        if signal::take_resize() {
            editor.resize(term.refresh_size());
        }

        editor.frame(&mut out)?;
        out.flush_to(&mut stdout)?;

        if signal::cancelled() {
            return Ok(());
        }

        // Blocks until a key arrives; `None` is stream end or cancellation.
        let Some(key) = decode_next(keys) else {
            return Ok(());
        };

        match editor.handle_key(key) {
            Action::Continue => {}
            Action::Quit => {
                // Leave a clean screen behind, not the last frame.
                ansi::clear_screen(&mut stdout)?;
                ansi::cursor_home(&mut stdout)?;
                stdout.flush()?;
                return Ok(());
            }
        }
    }
}

fn main() -> ExitCode {
    if !terminal::is_tty() {
        eprintln!("ked: stdin is not a terminal");
        return ExitCode::FAILURE;
    }

    let mut term = match Terminal::new() {
        Ok(term) => term,
        Err(err) => {
            eprintln!("ked: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = term.enter() {
        eprintln!("ked: failed to enter raw mode: {err}");
        return ExitCode::FAILURE;
    }

    signal::install();

    let (mut reader, rx) = StdinReader::spawn();
    let mut keys = ChannelBytes::new(rx);

    let mut editor = Editor::new(term.size());
    if let Some(path) = env::args_os().nth(1).map(PathBuf::from) {
        editor.open(path);
    }

    let result = run(&mut editor, &mut term, &mut keys);

    // Restore order: stop the reader first, then give the terminal back.
    reader.stop();
    let leave = term.leave();

    match result.and(leave) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ked: {err}");
            ExitCode::FAILURE
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
