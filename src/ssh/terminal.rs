//! Local terminal raw-mode handling for interactive remote commands
//!
//! While a remote PTY command runs (e.g. `sudo` prompting for a password),
//! the local terminal must be in raw mode so the remote side controls echo
//! and receives keystrokes unbuffered. The guard restores the previous
//! terminal state on drop, which covers every exit path including panics.

use std::io::IsTerminal;
use std::os::fd::AsFd;

use nix::sys::termios::{self, SetArg, Termios};
use tracing::debug;

/// RAII guard that holds stdin in raw mode until dropped.
///
/// Construction returns `None` when stdin is not a terminal (piped input,
/// CI); callers proceed without raw mode in that case.
pub struct RawModeGuard {
    saved: Termios,
}

impl RawModeGuard {
    pub fn new() -> Option<Self> {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return None;
        }

        let saved = termios::tcgetattr(stdin.as_fd()).ok()?;
        let mut raw = saved.clone();
        termios::cfmakeraw(&mut raw);
        if termios::tcsetattr(stdin.as_fd(), SetArg::TCSANOW, &raw).is_err() {
            return None;
        }
        debug!("local terminal switched to raw mode");
        Some(Self { saved })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let stdin = std::io::stdin();
        let _ = termios::tcsetattr(stdin.as_fd(), SetArg::TCSANOW, &self.saved);
        debug!("local terminal restored");
    }
}
