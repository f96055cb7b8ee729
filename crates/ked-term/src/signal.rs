// SPDX-License-Identifier: MIT
//
// Process signal flags: cooperative cancellation and resize notification.
//
// Signal handlers here do exactly one thing: store to an `AtomicBool`.
// That is one of the few operations permitted inside a signal handler.
// The controller loop checks the flags once per cycle, so a signal never
// interrupts a buffer mutation mid-operation; the loop finishes its
// current cycle, then the orchestration layer restores the terminal.
//
// SIGINT / SIGTERM set the cancellation flag. SIGWINCH sets the resize
// flag. Raw mode disables ISIG, so SIGINT only arrives from outside the
// terminal (e.g. `kill`), but the flag path is the same either way.
#![allow(unsafe_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

/// Set by SIGINT / SIGTERM. Once true, it stays true.
static CANCEL_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Set by SIGWINCH, cleared by [`take_resize`].
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Handler installation guard.
static HANDLERS_INSTALLED: Once = Once::new();

#[cfg(unix)]
extern "C" fn cancel_handler(_sig: libc::c_int) {
    CANCEL_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

/// Install the SIGINT, SIGTERM, and SIGWINCH handlers. Idempotent.
#[cfg(unix)]
pub fn install() {
    HANDLERS_INSTALLED.call_once(|| unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);

        sa.sa_sigaction = cancel_handler as *const () as usize;
        libc::sigaction(libc::SIGINT, &raw const sa, std::ptr::null_mut());
        libc::sigaction(libc::SIGTERM, &raw const sa, std::ptr::null_mut());

        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    });
}

#[cfg(not(unix))]
pub fn install() {}

/// Whether cancellation has been requested.
#[must_use]
pub fn cancelled() -> bool {
    CANCEL_RECEIVED.load(Ordering::Relaxed)
}

/// Consume a pending resize notification. Returns `true` at most once per
/// SIGWINCH delivery.
#[must_use]
pub fn take_resize() -> bool {
    SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
