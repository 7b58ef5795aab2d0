use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Config key carrying the stable identity used for import dedup.
pub const SETTINGS_ID_KEY: &str = "settings_id";

/// The three preset categories a frontend manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Print,
    Filament,
    Printer,
}

impl Category {
    /// All categories, in tab order.
    pub const ALL: [Category; 3] = [Category::Print, Category::Filament, Category::Printer];

    /// The keyword used in bundle section headers and selection listings.
    pub fn keyword(&self) -> &'static str {
        match self {
            Category::Print => "print",
            Category::Filament => "filament",
            Category::Printer => "printer",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Error returned when a string is not one of the three category keywords.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown preset category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "print" => Ok(Category::Print),
            "filament" => Ok(Category::Filament),
            "printer" => Ok(Category::Printer),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// One category's settings as a flat, ordered key/value mapping.
///
/// A `Config` is never validated here; constraint checks are delegated to the
/// slicing engine before a config is used for a job or persisted standalone.
/// Equality is key-set/value equality: insertion order is preserved for
/// serialization but does not participate in comparisons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    entries: IndexMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Merge another config into this one, overwriting on key collision.
    pub fn merge(&mut self, other: &Config) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// The dedup identity token, if present and non-empty.
    pub fn settings_id(&self) -> Option<&str> {
        self.get(SETTINGS_ID_KEY).filter(|id| !id.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for Config {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A named, categorized configuration.
///
/// Names are unique within a category at the store level. A preset's config
/// is only ever replaced wholesale; there are no partial field edits at this
/// layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub category: Category,
    pub config: Config,
}

impl Preset {
    pub fn new(name: impl Into<String>, category: Category, config: Config) -> Self {
        Self {
            name: name.into(),
            category,
            config,
        }
    }

    pub fn settings_id(&self) -> Option<&str> {
        self.config.settings_id()
    }

    /// Replace the config wholesale.
    pub fn replace_config(&mut self, config: Config) {
        self.config = config;
    }
}
