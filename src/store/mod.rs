//! Preset store contract and the in-memory production implementation.
//!
//! The store is keyed by (category, name); names are unique within a
//! category and `put` overwrites. It also tracks the currently selected
//! preset per category, which bundle import overwrites wholesale and bundle
//! export records in its `[presets]` section.

use crate::models::{Category, Preset};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Registry of named presets, consumed and produced by the bundle services.
pub trait PresetStore {
    /// Presets of one category, in registration order.
    fn list(&self, category: Category) -> Vec<&Preset>;

    fn get(&self, category: Category, name: &str) -> Option<&Preset>;

    /// Register a preset, overwriting any existing preset of the same name.
    fn put(&mut self, preset: Preset);

    /// Name of the currently selected preset for a category.
    fn selected(&self, category: Category) -> Option<&str>;

    fn set_selected(&mut self, category: Category, name: &str);

    /// Notification that a batch mutation finished and views should refresh.
    /// Fired once per import, not per entry.
    fn reload(&mut self);

    /// The non-empty `settings_id` values registered in a category, used for
    /// import dedup.
    fn settings_ids(&self, category: Category) -> HashSet<String> {
        self.list(category)
            .iter()
            .filter_map(|preset| preset.settings_id())
            .map(str::to_string)
            .collect()
    }
}

/// In-memory preset store.
#[derive(Debug, Default)]
pub struct MemoryPresetStore {
    presets: IndexMap<Category, IndexMap<String, Preset>>,
    selected: IndexMap<Category, String>,
    reloads: usize,
}

impl MemoryPresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many reload notifications have fired.
    pub fn reloads(&self) -> usize {
        self.reloads
    }
}

impl PresetStore for MemoryPresetStore {
    fn list(&self, category: Category) -> Vec<&Preset> {
        self.presets
            .get(&category)
            .map(|by_name| by_name.values().collect())
            .unwrap_or_default()
    }

    fn get(&self, category: Category, name: &str) -> Option<&Preset> {
        self.presets.get(&category)?.get(name)
    }

    fn put(&mut self, preset: Preset) {
        let by_name = self.presets.entry(preset.category).or_default();
        if by_name.contains_key(&preset.name) {
            tracing::debug!(
                "Overwriting {} preset \"{}\"",
                preset.category,
                preset.name
            );
        }
        by_name.insert(preset.name.clone(), preset);
    }

    fn selected(&self, category: Category) -> Option<&str> {
        self.selected.get(&category).map(String::as_str)
    }

    fn set_selected(&mut self, category: Category, name: &str) {
        self.selected.insert(category, name.to_string());
    }

    fn reload(&mut self) {
        self.reloads += 1;
        tracing::debug!("Preset store reloaded ({} total)", self.reloads);
    }
}
