use crate::config::SettingsStore;
use crate::models::{Category, Preset, Section, SessionState};
use crate::services::codec::{BundleCodec, FormatError};
use crate::store::PresetStore;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

/// Errors from bundle import and standalone config loading.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("failed to persist application settings")]
    Settings(#[source] anyhow::Error),
}

/// Service importing config bundles and standalone config files.
///
/// Import has deliberate at-least-partial-apply semantics: sections are
/// applied in file order as they parse, and a malformed section aborts the
/// rest without rolling back what already landed. The store's reload
/// notification fires exactly once per import, on both the success and the
/// abort path.
pub struct ImportService {
    codec: BundleCodec,
}

impl ImportService {
    pub fn new() -> Self {
        Self {
            codec: BundleCodec::new(),
        }
    }

    /// Import a bundle file. See [`import_bundle`](Self::import_bundle).
    pub fn import_bundle_file(
        &self,
        path: &Utf8Path,
        allow_duplicates: bool,
        presets: &mut dyn PresetStore,
        settings: &mut dyn SettingsStore,
    ) -> Result<usize, ImportError> {
        let text = fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Importing config bundle from {}", path);
        self.import_bundle(&text, allow_duplicates, presets, settings)
    }

    /// Import bundle text into the preset and settings stores.
    ///
    /// - `[settings]` keys merge into the settings store, overwrite-on-key.
    /// - `[presets]` overwrites the selected-preset-per-category mapping.
    /// - Preset sections register in bundle order; with `allow_duplicates`
    ///   off, an entry whose non-empty `settings_id` already exists in its
    ///   category is skipped, so the first occurrence wins within a bundle
    ///   and re-importing the same bundle imports nothing.
    ///
    /// Returns the number of presets actually imported.
    pub fn import_bundle(
        &self,
        text: &str,
        allow_duplicates: bool,
        presets: &mut dyn PresetStore,
        settings: &mut dyn SettingsStore,
    ) -> Result<usize, ImportError> {
        let mut imported = 0;
        let mut skipped = 0;
        let mut settings_touched = false;
        let mut failure: Option<FormatError> = None;

        for section in self.codec.sections(text) {
            match section {
                Ok(Section::Settings(config)) => {
                    for (key, value) in config.iter() {
                        settings.set(key, value);
                    }
                    settings_touched = true;
                }
                Ok(Section::Presets(selections)) => {
                    for (keyword, name) in selections.iter() {
                        match keyword.parse::<Category>() {
                            Ok(category) => presets.set_selected(category, name),
                            Err(_) => tracing::warn!(
                                "Ignoring selection for unknown category \"{}\"",
                                keyword
                            ),
                        }
                    }
                }
                Ok(Section::Preset {
                    category,
                    name,
                    config,
                }) => {
                    if !allow_duplicates {
                        if let Some(id) = config.settings_id() {
                            if presets.settings_ids(category).contains(id) {
                                tracing::debug!(
                                    "Skipping duplicate {} preset \"{}\" (settings_id={})",
                                    category,
                                    name,
                                    id
                                );
                                skipped += 1;
                                continue;
                            }
                        }
                    }
                    presets.put(Preset::new(name, category, config));
                    imported += 1;
                }
                Err(error) => {
                    // Sections already applied stay applied.
                    failure = Some(error);
                    break;
                }
            }
        }

        presets.reload();

        if settings_touched {
            settings.persist().map_err(ImportError::Settings)?;
        }

        match failure {
            Some(error) => {
                tracing::error!(
                    "Bundle import aborted after {} presets: {}",
                    imported,
                    error
                );
                Err(error.into())
            }
            None => {
                tracing::info!("Imported {} presets ({} duplicates skipped)", imported, skipped);
                Ok(imported)
            }
        }
    }

    /// Load a standalone config file as a new external preset.
    ///
    /// The preset is named after the file stem, registered in all three
    /// categories, and selected everywhere, so the loaded file fully
    /// determines the active configuration. Returns the preset name.
    pub fn load_config_file(
        &self,
        path: &Utf8Path,
        presets: &mut dyn PresetStore,
        session: &mut SessionState,
    ) -> Result<String, ImportError> {
        let text = fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = self.codec.decode_config(&text)?;

        let name = path.file_stem().unwrap_or("config").to_string();
        for category in Category::ALL {
            presets.put(Preset::new(name.clone(), category, config.clone()));
            presets.set_selected(category, &name);
        }
        presets.reload();

        session.record_config(path.to_path_buf());
        tracing::info!("Loaded external config \"{}\" from {}", name, path);
        Ok(name)
    }
}

impl Default for ImportService {
    fn default() -> Self {
        Self::new()
    }
}
