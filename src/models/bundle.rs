use crate::models::{Category, Config};

/// Bare section keyword holding application-level settings.
pub const SETTINGS_SECTION: &str = "settings";

/// Bare section keyword holding the selected-preset-per-category listing.
pub const PRESETS_SECTION: &str = "presets";

/// One section of a config bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// `[settings]`: global application settings merged on import.
    Settings(Config),

    /// `[presets]`: category keyword -> selected preset name.
    Presets(Config),

    /// `[<category>:<name>]`: one preset's config blob.
    Preset {
        category: Category,
        name: String,
        config: Config,
    },
}

impl Section {
    /// The header text for this section, without brackets.
    pub fn header(&self) -> String {
        match self {
            Section::Settings(_) => SETTINGS_SECTION.to_string(),
            Section::Presets(_) => PRESETS_SECTION.to_string(),
            Section::Preset { category, name, .. } => format!("{category}:{name}"),
        }
    }

    pub fn config(&self) -> &Config {
        match self {
            Section::Settings(config) | Section::Presets(config) => config,
            Section::Preset { config, .. } => config,
        }
    }
}

/// An ordered collection of bundle sections.
///
/// The anonymous section of the underlying file must stay empty; a file with
/// keys before its first header is a flat single-category config, not a
/// bundle, and the codec rejects it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    pub sections: Vec<Section>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// The global-settings section, if any.
    pub fn settings(&self) -> Option<&Config> {
        self.sections.iter().find_map(|s| match s {
            Section::Settings(config) => Some(config),
            _ => None,
        })
    }

    /// The selected-preset listing, if any.
    pub fn selections(&self) -> Option<&Config> {
        self.sections.iter().find_map(|s| match s {
            Section::Presets(config) => Some(config),
            _ => None,
        })
    }

    /// Preset sections in bundle order.
    pub fn presets(&self) -> impl Iterator<Item = (Category, &str, &Config)> {
        self.sections.iter().filter_map(|s| match s {
            Section::Preset {
                category,
                name,
                config,
            } => Some((*category, name.as_str(), config)),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
