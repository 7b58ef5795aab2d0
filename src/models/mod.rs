//! Data models for preset and bundle handling.
//!
//! - [`Config`]: one category's settings as an ordered key/value mapping
//! - [`Preset`]: a named, categorized [`Config`]
//! - [`Bundle`]/[`Section`]: the parsed form of a config bundle file
//! - [`SessionState`]: last-used paths remembered for one application run
//!
//! All of these are plain values. Validation of config contents is delegated
//! to the slicing engine contract; the models never enforce domain rules.

pub mod bundle;
pub mod preset;
pub mod session;

pub use bundle::{Bundle, PRESETS_SECTION, SETTINGS_SECTION, Section};
pub use preset::{Category, Config, Preset, SETTINGS_ID_KEY, UnknownCategory};
pub use session::SessionState;
