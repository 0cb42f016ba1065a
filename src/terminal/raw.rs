//! Raw mode guard
//!
//! Switches stdin into raw mode and guarantees the original attributes come
//! back on every way out of the process: normal return (`restore` or `Drop`),
//! panic (via [`restore_saved_mode`] from a panic hook) and termination
//! signals (via the handlers installed here).
//!
//! # References
//!
//! - termios(3): https://man7.org/linux/man-pages/man3/termios.3.html

use std::io;
use std::sync::OnceLock;

use nix::libc;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::sys::termios::{
    self, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg, SpecialCharacterIndices,
    Termios,
};

use super::{TerminalError, TerminalResult};

/// Attributes captured when raw mode was entered, kept for the signal and
/// panic paths which cannot reach the guard itself.
static SAVED_MODE: OnceLock<libc::termios> = OnceLock::new();

/// Signals that restore the terminal before terminating the process
const RESTORE_SIGNALS: [Signal; 4] = [
    Signal::SIGTERM,
    Signal::SIGHUP,
    Signal::SIGINT,
    Signal::SIGQUIT,
];

/// RAII guard for raw terminal mode
#[derive(Debug)]
pub struct RawMode {
    original: Termios,
    restored: bool,
}

impl RawMode {
    /// Enter raw mode on stdin.
    ///
    /// Disables canonical line buffering, echo, signal and extended input
    /// characters, output post-processing, and the break/CR/parity/strip/flow
    /// input filters. Reads return after at most 100ms with zero bytes
    /// required (VMIN=0, VTIME=1).
    pub fn enter() -> TerminalResult<Self> {
        let original = termios::tcgetattr(io::stdin()).map_err(TerminalError::GetAttributes)?;

        let _ = SAVED_MODE.set(libc::termios::from(original.clone()));
        install_signal_handlers()?;

        let mut raw = original.clone();
        raw.input_flags &= !(InputFlags::BRKINT
            | InputFlags::ICRNL
            | InputFlags::INPCK
            | InputFlags::ISTRIP
            | InputFlags::IXON);
        raw.output_flags &= !OutputFlags::OPOST;
        raw.control_flags |= ControlFlags::CS8;
        raw.local_flags &=
            !(LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::IEXTEN | LocalFlags::ISIG);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 1;

        termios::tcsetattr(io::stdin(), SetArg::TCSAFLUSH, &raw)
            .map_err(TerminalError::SetAttributes)?;

        tracing::debug!("entered raw mode");

        Ok(Self {
            original,
            restored: false,
        })
    }

    /// Restore the attributes captured by [`RawMode::enter`].
    ///
    /// Only the first successful call touches the terminal.
    pub fn restore(&mut self) -> TerminalResult<()> {
        if self.restored {
            return Ok(());
        }

        termios::tcsetattr(io::stdin(), SetArg::TCSAFLUSH, &self.original)
            .map_err(TerminalError::SetAttributes)?;
        self.restored = true;

        tracing::debug!("restored original terminal mode");
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::error!("Failed to restore terminal: {}", e);
        }
    }
}

/// Best-effort restore from contexts without access to the guard (panic
/// hooks, signal handlers). Does nothing if raw mode was never entered.
pub fn restore_saved_mode() {
    if let Some(mode) = SAVED_MODE.get() {
        // SAFETY: `mode` points to a fully initialized termios captured by
        // tcgetattr; tcsetattr is async-signal-safe.
        unsafe {
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, mode);
        }
    }
}

extern "C" fn restore_and_exit(signum: libc::c_int) {
    restore_saved_mode();
    // SAFETY: _exit is async-signal-safe and never returns
    unsafe { libc::_exit(128 + signum) }
}

fn install_signal_handlers() -> TerminalResult<()> {
    let action = SigAction::new(
        SigHandler::Handler(restore_and_exit),
        SaFlags::empty(),
        SigSet::empty(),
    );

    for sig in RESTORE_SIGNALS {
        // SAFETY: the handler only calls async-signal-safe functions
        unsafe { signal::sigaction(sig, &action) }.map_err(TerminalError::Signal)?;
    }

    Ok(())
}
