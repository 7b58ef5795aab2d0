//! Services module - Pure business logic for preset bundles and slicing jobs.
//!
//! Everything here is **framework-agnostic**: no windowing code, only the
//! codec, the import/export services, and the quick-slice orchestrator. The
//! frontend and the slicing engine are reached through the narrow contracts
//! in [`crate::ui`] and [`engine`].
//!
//! # Components
//!
//! - [`BundleCodec`]: text codec for bundle files and standalone configs
//! - [`ImportService`]: dedup-aware bundle import and external config loading
//! - [`ExportService`]: deterministic bundle export and single-config export
//! - [`QuickSlice`]: the one-shot slice workflow (validate, pick input,
//!   resolve output, run the engine, remember paths for reslice)
//! - [`engine`]: the consumed slicing-engine contract
//!
//! # Design Philosophy
//!
//! - **Stateless**: services hold only their compiled parsers; all stores and
//!   session state are explicit parameters
//! - **Testable**: every collaborator is a trait with an in-memory test double
//! - **Eager failure**: format and validation errors are detected before any
//!   file or engine I/O, with one deliberate exception (bundle import applies
//!   sections as they parse; see [`ImportService::import_bundle`])

pub mod codec;
pub mod engine;
pub mod exporter;
pub mod importer;
pub mod quick_slice;

pub use codec::{BundleCodec, FormatError};
pub use engine::{EngineError, SliceJob, SlicingEngine, ValidationError};
pub use exporter::{ExportError, ExportService};
pub use importer::{ImportError, ImportService};
pub use quick_slice::{JobOutcome, QuickSlice, QuickSliceError, QuickSliceOptions, active_config};
