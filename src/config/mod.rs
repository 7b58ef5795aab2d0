use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::fs;

/// Application-level keys copied into the `[settings]` section of an
/// exported bundle. Everything else in the store is host-local (recent
/// directories, window geometry) and never travels in a bundle.
pub const BUNDLED_SETTINGS_KEYS: &[&str] = &["autocenter", "background_processing"];

/// Flat process-wide key/value settings store.
///
/// Consumed by the bundle importer (overwrite-on-key merge of a bundle's
/// `[settings]` section) and the bundle exporter (whitelisted keys only).
/// The store survives across invocations via external storage; where and how
/// it persists is an implementation detail behind this trait.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<&str>;
    fn set(&mut self, key: &str, value: &str);
    fn persist(&mut self) -> Result<()>;
}

/// File-backed settings store, persisted as YAML.
///
/// Missing file means defaults; a present file is parsed strictly and a parse
/// failure surfaces instead of silently resetting user settings.
#[derive(Debug, Clone)]
pub struct AppSettings {
    settings_path: Utf8PathBuf,
    values: IndexMap<String, String>,
}

impl AppSettings {
    /// Open the settings store rooted at `settings_dir`, creating the
    /// directory if needed and loading `quickslice.yaml` when present.
    pub fn new<P: AsRef<Utf8Path>>(settings_dir: P) -> Result<Self> {
        let settings_dir = settings_dir.as_ref();

        if !settings_dir.exists() {
            fs::create_dir_all(settings_dir).with_context(|| {
                format!("Failed to create settings directory: {settings_dir}")
            })?;
        }

        let settings_path = settings_dir.join("quickslice.yaml");
        let values = if settings_path.exists() {
            let file_contents = fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read settings: {settings_path}"))?;

            let values: IndexMap<String, String> = serde_yaml_ng::from_str(&file_contents)
                .with_context(|| format!("Failed to parse settings: {settings_path}"))?;

            tracing::info!("Loaded {} settings from {}", values.len(), settings_path);
            values
        } else {
            tracing::warn!("Settings file not found at {}, using defaults", settings_path);
            Self::defaults()
        };

        Ok(Self {
            settings_path,
            values,
        })
    }

    fn defaults() -> IndexMap<String, String> {
        let mut values = IndexMap::new();
        values.insert("autocenter".to_string(), "1".to_string());
        values.insert("background_processing".to_string(), "0".to_string());
        values
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    pub fn values(&self) -> &IndexMap<String, String> {
        &self.values
    }
}

impl SettingsStore for AppSettings {
    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn persist(&mut self) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(&self.values).context("Failed to serialize settings")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_settings() -> (AppSettings, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let settings = AppSettings::new(&dir).unwrap();
        (settings, temp_dir)
    }

    #[test]
    fn test_defaults_when_file_missing() {
        let (settings, _temp_dir) = create_test_settings();
        assert_eq!(settings.get("autocenter"), Some("1"));
        assert_eq!(settings.get("background_processing"), Some("0"));
        assert_eq!(settings.get("no_such_key"), None);
    }

    #[test]
    fn test_set_persist_reload() {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

        let mut settings = AppSettings::new(&dir).unwrap();
        settings.set("autocenter", "0");
        settings.set("last_bundle_dir", "/home/user/bundles");
        settings.persist().unwrap();

        let reloaded = AppSettings::new(&dir).unwrap();
        assert_eq!(reloaded.get("autocenter"), Some("0"));
        assert_eq!(reloaded.get("last_bundle_dir"), Some("/home/user/bundles"));
    }

    #[test]
    fn test_bundled_keys_are_default_keys() {
        let (settings, _temp_dir) = create_test_settings();
        for key in BUNDLED_SETTINGS_KEYS {
            assert!(settings.get(key).is_some(), "missing default for {key}");
        }
    }
}
