use crate::config::{BUNDLED_SETTINGS_KEYS, SettingsStore};
use crate::models::{Bundle, Category, Config, Section, SessionState};
use crate::services::codec::BundleCodec;
use crate::services::engine::{SlicingEngine, ValidationError};
use crate::store::PresetStore;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

/// Errors from bundle and standalone config export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cannot write {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
}

/// Service writing config bundles and standalone config files.
pub struct ExportService {
    codec: BundleCodec,
}

impl ExportService {
    pub fn new() -> Self {
        Self {
            codec: BundleCodec::new(),
        }
    }

    /// Export the whole preset store as a bundle.
    ///
    /// The bundle carries the whitelisted application settings, the current
    /// selection per category, and one section per registered preset ordered
    /// by (category, name) lexicographic so exports are byte-stable for a
    /// given store state. The store is never mutated.
    pub fn export_bundle(
        &self,
        path: &Utf8Path,
        presets: &dyn PresetStore,
        settings: &dyn SettingsStore,
    ) -> Result<(), ExportError> {
        let mut bundle = Bundle::new();

        let mut global = Config::new();
        for key in BUNDLED_SETTINGS_KEYS {
            if let Some(value) = settings.get(key) {
                global.set(*key, value);
            }
        }
        bundle.push(Section::Settings(global));

        let mut selections = Config::new();
        for category in Category::ALL {
            if let Some(name) = presets.selected(category) {
                selections.set(category.keyword(), name);
            }
        }
        bundle.push(Section::Presets(selections));

        let mut registered: Vec<_> = Category::ALL
            .iter()
            .flat_map(|category| presets.list(*category))
            .collect();
        registered.sort_by_key(|preset| (preset.category.keyword(), preset.name.clone()));
        for preset in registered {
            bundle.push(Section::Preset {
                category: preset.category,
                name: preset.name.clone(),
                config: preset.config.clone(),
            });
        }

        let text = self.codec.encode(&bundle);
        fs::write(path, text).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Exported config bundle ({} sections) to {}", bundle.len(), path);
        Ok(())
    }

    /// Export one config as a standalone flat file.
    ///
    /// Validation runs first; on failure nothing is written and the session
    /// is untouched.
    pub fn export_config(
        &self,
        path: &Utf8Path,
        config: &Config,
        engine: &dyn SlicingEngine,
        session: &mut SessionState,
    ) -> Result<(), ExportError> {
        engine.validate(config)?;

        let text = self.codec.encode_config(config);
        fs::write(path, text).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        session.record_config(path.to_path_buf());
        tracing::info!("Exported config to {}", path);
        Ok(())
    }
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Preset;
    use crate::services::engine::{EngineError, SliceJob};
    use crate::store::MemoryPresetStore;
    use anyhow::Result;
    use indexmap::IndexMap;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeSettings {
        values: IndexMap<String, String>,
    }

    impl SettingsStore for FakeSettings {
        fn get(&self, key: &str) -> Option<&str> {
            self.values.get(key).map(String::as_str)
        }
        fn set(&mut self, key: &str, value: &str) {
            self.values.insert(key.to_string(), value.to_string());
        }
        fn persist(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct RejectingEngine;

    impl SlicingEngine for RejectingEngine {
        fn validate(&self, _config: &Config) -> Result<(), ValidationError> {
            Err(ValidationError("layer_height must be positive".to_string()))
        }
        fn default_output_path(
            &self,
            input_path: &Utf8Path,
            _config: &Config,
            _export_svg: bool,
        ) -> Utf8PathBuf {
            input_path.with_extension("gcode")
        }
        fn slice(
            &self,
            _job: &SliceJob,
            _on_progress: &mut dyn FnMut(u8, &str),
            _on_warning: &mut dyn FnMut(&str),
        ) -> Result<(), EngineError> {
            unreachable!("invalid config must never reach the engine")
        }
    }

    fn temp_path(temp_dir: &TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp_dir.path().join(name)).unwrap()
    }

    #[test]
    fn test_export_bundle_is_sorted_and_complete() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_path(&temp_dir, "bundle.ini");

        let mut store = MemoryPresetStore::new();
        let mut config = Config::new();
        config.set("layer_height", "0.3");
        store.put(Preset::new("Zz", Category::Print, config.clone()));
        store.put(Preset::new("Aa", Category::Print, config.clone()));
        store.put(Preset::new("PLA", Category::Filament, config));
        store.set_selected(Category::Print, "Aa");

        let mut settings = FakeSettings::default();
        settings.set("autocenter", "1");
        settings.set("window_w", "1200"); // not whitelisted, must not travel

        let exporter = ExportService::new();
        exporter.export_bundle(&path, &store, &settings).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let settings_pos = text.find("[settings]").unwrap();
        let presets_pos = text.find("[presets]").unwrap();
        let filament_pos = text.find("[filament:PLA]").unwrap();
        let print_a = text.find("[print:Aa]").unwrap();
        let print_z = text.find("[print:Zz]").unwrap();

        assert!(settings_pos < presets_pos);
        assert!(presets_pos < filament_pos);
        assert!(filament_pos < print_a);
        assert!(print_a < print_z);
        assert!(text.contains("autocenter = 1"));
        assert!(!text.contains("window_w"));
        assert!(text.contains("print = Aa"));
    }

    #[test]
    fn test_export_config_validation_failure_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_path(&temp_dir, "config.ini");

        let mut config = Config::new();
        config.set("layer_height", "-1");
        let mut session = SessionState::new();

        let exporter = ExportService::new();
        let err = exporter
            .export_config(&path, &config, &RejectingEngine, &mut session)
            .unwrap_err();

        assert!(matches!(err, ExportError::Validation(_)));
        assert!(!path.exists());
        assert_eq!(session, SessionState::new());
    }
}
