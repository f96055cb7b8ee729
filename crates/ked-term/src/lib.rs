// SPDX-License-Identifier: MIT
//
// ked-term: the terminal layer for ked.
//
// Raw mode, size queries, signal flags, a background stdin reader, key
// decoding, and ANSI escape emission. This crate intentionally avoids
// external TUI frameworks (ratatui, crossterm) in favor of direct terminal
// control: the editor's wire protocol is a handful of escape sequences,
// and every byte sent to the terminal is accounted for.
//
// The editing core (ked-editor) depends on this crate only for escape
// emission and the output buffer; everything OS-facing stays behind the
// binary's orchestration layer.

pub mod ansi;
pub mod input;
pub mod output;
pub mod reader;
pub mod signal;
pub mod terminal;
