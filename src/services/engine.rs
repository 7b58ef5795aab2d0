use crate::models::Config;
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// A config failed the engine's category-specific constraint checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid configuration: {0}")]
pub struct ValidationError(pub String);

/// The engine failed while producing output.
#[derive(Error, Debug)]
#[error("slicing failed: {0}")]
pub struct EngineError(pub String);

/// One slice request handed to the engine.
#[derive(Debug, Clone)]
pub struct SliceJob {
    pub input_path: Utf8PathBuf,
    pub config: Config,
    pub output_path: Utf8PathBuf,
}

/// Contract with the external slicing engine.
///
/// The engine owns geometry, G-code generation, and the output-path policy
/// (print-bed defaults, configured output directory); this crate only
/// sequences calls into it. `on_progress` and `on_warning` must return
/// promptly and must not perform file I/O: they are invoked from inside the
/// engine as it makes progress. Warnings are collected by the caller and
/// reported in a batch after the job succeeds, never surfaced as failures.
pub trait SlicingEngine {
    /// Check a config against category-specific domain rules.
    fn validate(&self, config: &Config) -> Result<(), ValidationError>;

    /// Default output path for an input file under the engine's output
    /// policy. `export_svg` selects vector output instead of machine code.
    fn default_output_path(
        &self,
        input_path: &Utf8Path,
        config: &Config,
        export_svg: bool,
    ) -> Utf8PathBuf;

    /// Run one slice job. Progress is reported as (percent, message).
    fn slice(
        &self,
        job: &SliceJob,
        on_progress: &mut dyn FnMut(u8, &str),
        on_warning: &mut dyn FnMut(&str),
    ) -> Result<(), EngineError>;
}
