// quickslice - preset bundle management and quick-slice job orchestration
//
// This is the core library a 3D-printing frontend builds on: config presets,
// bundle import/export, and the one-shot slice workflow. Windowing, the
// viewport, and the slicing engine itself live behind the contracts in
// `services::engine` and `ui`.

pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::{AppSettings, SettingsStore};
pub use models::{Bundle, Category, Config, Preset, Section, SessionState};
pub use services::{
    BundleCodec, ExportService, FormatError, ImportService, JobOutcome, QuickSlice,
    QuickSliceError, QuickSliceOptions,
};
pub use store::{MemoryPresetStore, PresetStore};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
