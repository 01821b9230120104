//! Subprocess runner used by every tool in the crate.
//!
//! The builder mirrors `std::process::Command` but adds the conveniences the
//! automation scripts lean on: captured output that is simultaneously teed
//! to the terminal and an optional log file, kill-on-output, a process-wide
//! dry-run switch, and background spawning.

mod background;
mod builder;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicBool, Ordering};

pub use background::Background;
pub use builder::{exec, shell, Exec, RunOutput};

static DRY_RUN: AtomicBool = AtomicBool::new(false);

/// Toggles dry-run mode for the whole process. While enabled, [`Exec::run`]
/// only announces the command and reports success without spawning anything.
pub fn set_dry_run(enabled: bool) {
    DRY_RUN.store(enabled, Ordering::SeqCst);
}

/// Whether dry-run mode is currently enabled.
pub fn dry_run() -> bool {
    DRY_RUN.load(Ordering::SeqCst)
}
