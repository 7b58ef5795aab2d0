//! Interaction contract between the workflow services and the frontend.
//!
//! The quick-slice orchestrator blocks on the user at each dialog step; this
//! module defines those seams so the orchestrator stays framework-agnostic.
//! [`NativeInteraction`] is the production implementation backed by `rfd`.

pub mod dialogs;

pub use dialogs::NativeInteraction;

use camino::{Utf8Path, Utf8PathBuf};

/// A live progress indicator for one long-running job.
///
/// Dismissal is tied to `Drop`: holding the handle in the job's scope
/// guarantees the indicator is released on success, cancellation, and
/// failure alike.
pub trait ProgressHandle {
    /// Non-blocking update; called from inside the engine, so it must return
    /// promptly and must not perform file I/O.
    fn update(&mut self, percent: u8, message: &str);
}

/// Blocking user interaction points of the workflow.
///
/// Pickers return `None` when the user cancels; cancellation is an outcome,
/// not an error.
pub trait Interaction {
    /// Prompt for an input model file.
    fn pick_input_file(&self, start_dir: Option<&Utf8Path>) -> Option<Utf8PathBuf>;

    /// Prompt for an output destination, proposing `suggested` (which already
    /// carries the forced extension for the requested output kind).
    fn pick_output_file(&self, suggested: &Utf8Path, extension: &str) -> Option<Utf8PathBuf>;

    /// Blocking informational message.
    fn notify(&self, message: &str);

    /// Show a progress indicator until the returned handle is dropped.
    fn begin_progress(&self, title: &str) -> Box<dyn ProgressHandle>;
}
