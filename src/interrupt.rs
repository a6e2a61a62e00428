//! User interruption (Ctrl-C) handling
//!
//! A SIGINT handler only flips a flag. The dialogs poll the flag while they
//! wait for an answer and the bisect loop checks it between steps, so an
//! interrupt always unwinds through normal error propagation and the
//! snapshot gets restored on the way out.

use anyhow::Result;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Marker error carried through `anyhow` when the user interrupts the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "interrupted by user")
    }
}

impl std::error::Error for Interrupted {}

#[cfg(unix)]
extern "C" fn handle_sigint(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Install the SIGINT handler
#[cfg(unix)]
pub fn install_handler() -> Result<()> {
    // # Safety
    //
    // `handle_sigint` only performs an atomic store, which is async-signal-safe.
    // The return value is checked against SIG_ERR.
    let previous = unsafe {
        libc::signal(
            libc::SIGINT,
            handle_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t,
        )
    };

    if previous == libc::SIG_ERR {
        anyhow::bail!(
            "Failed to install interrupt handler: {}",
            std::io::Error::last_os_error()
        );
    }

    tracing::debug!("SIGINT handler installed");
    Ok(())
}

/// Install the SIGINT handler (non-unix stub)
///
/// Raw-mode dialogs still see Ctrl-C as a key press there.
#[cfg(not(unix))]
pub fn install_handler() -> Result<()> {
    Ok(())
}

/// Whether an interrupt has been received
pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Fail with [`Interrupted`] if an interrupt has been received
pub fn check() -> Result<()> {
    if is_interrupted() {
        return Err(Interrupted.into());
    }
    Ok(())
}
