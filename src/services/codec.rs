use crate::models::{
    Bundle, Category, Config, PRESETS_SECTION, SETTINGS_SECTION, Section,
};
use regex::Regex;
use std::iter::Enumerate;
use std::str::Lines;
use thiserror::Error;

/// Errors raised while parsing bundle or flat config text.
///
/// The codec never validates config values; these cover structure only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("line {line}: malformed section header: {text}")]
    MalformedHeader { line: usize, text: String },

    #[error("line {line}: unknown section [{name}]")]
    UnknownSection { line: usize, name: String },

    #[error("line {line}: unknown preset category in [{header}]")]
    UnknownCategory { line: usize, header: String },

    #[error("line {line}: expected key = value, got: {text}")]
    MalformedEntry { line: usize, text: String },

    #[error("line {line}: settings before the first section header; not a bundle file")]
    KeysOutsideSection { line: usize },

    #[error("line {line}: section header in a flat config file")]
    SectionInFlatConfig { line: usize },
}

/// Text codec for config bundles and standalone flat configs.
///
/// Bundle files are INI-like: `[settings]`, `[presets]`, or
/// `[<category>:<name>]` headers followed by flat `key = value` lines.
/// `#` and `;` start comment lines; the anonymous section must be empty so a
/// bundle is never misread as a flat single-category config (and vice versa).
pub struct BundleCodec {
    /// Matches a `[...]` header line and captures the inner text
    header_pattern: Regex,

    /// Matches a `key = value` entry and captures both sides
    keyval_pattern: Regex,
}

impl BundleCodec {
    pub fn new() -> Self {
        Self {
            header_pattern: Regex::new(r"^\[([^\[\]]+)\]$").expect("Invalid header regex"),
            keyval_pattern: Regex::new(r"^([^=]+?)\s*=\s*(.*)$").expect("Invalid keyval regex"),
        }
    }

    /// Serialize a bundle to text. Inverse of [`decode`](Self::decode) under
    /// per-section key-set/value equality.
    pub fn encode(&self, bundle: &Bundle) -> String {
        let mut out = String::new();
        for section in &bundle.sections {
            out.push('[');
            out.push_str(&section.header());
            out.push_str("]\n");
            for (key, value) in section.config().iter() {
                out.push_str(key);
                out.push_str(" = ");
                out.push_str(value);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    /// Parse a whole bundle, failing on the first malformed section.
    pub fn decode(&self, text: &str) -> Result<Bundle, FormatError> {
        let mut bundle = Bundle::new();
        for section in self.sections(text) {
            bundle.push(section?);
        }
        Ok(bundle)
    }

    /// Stream sections out of bundle text in file order.
    ///
    /// The importer consumes this instead of [`decode`](Self::decode) so that
    /// sections already yielded stay applied when a later one is malformed.
    /// After the first error the iterator is exhausted.
    pub fn sections<'a>(&'a self, text: &'a str) -> Sections<'a> {
        Sections {
            codec: self,
            lines: text.lines().enumerate(),
            open: None,
            pending_error: None,
            done: false,
        }
    }

    /// Serialize a single config in the standalone flat format.
    pub fn encode_config(&self, config: &Config) -> String {
        let mut out = String::new();
        for (key, value) in config.iter() {
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    /// Parse a standalone flat config file (no section headers).
    pub fn decode_config(&self, text: &str) -> Result<Config, FormatError> {
        let mut config = Config::new();
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if Self::is_blank_or_comment(trimmed) {
                continue;
            }
            if trimmed.starts_with('[') {
                return Err(FormatError::SectionInFlatConfig { line: line_no });
            }
            let (key, value) = self.parse_entry(trimmed, line_no)?;
            config.set(key, value);
        }
        Ok(config)
    }

    fn is_blank_or_comment(trimmed: &str) -> bool {
        trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';')
    }

    fn parse_entry(&self, trimmed: &str, line_no: usize) -> Result<(String, String), FormatError> {
        let caps = self.keyval_pattern.captures(trimmed).ok_or_else(|| {
            FormatError::MalformedEntry {
                line: line_no,
                text: trimmed.to_string(),
            }
        })?;
        let key = caps[1].trim();
        if key.is_empty() {
            return Err(FormatError::MalformedEntry {
                line: line_no,
                text: trimmed.to_string(),
            });
        }
        Ok((key.to_string(), caps[2].to_string()))
    }

    fn parse_header(&self, inner: &str, line_no: usize) -> Result<SectionKind, FormatError> {
        if let Some((category, name)) = inner.split_once(':') {
            let name = name.trim();
            if name.is_empty() {
                return Err(FormatError::MalformedHeader {
                    line: line_no,
                    text: format!("[{inner}]"),
                });
            }
            let category: Category =
                category.trim().parse().map_err(|_| FormatError::UnknownCategory {
                    line: line_no,
                    header: inner.to_string(),
                })?;
            return Ok(SectionKind::Preset {
                category,
                name: name.to_string(),
            });
        }

        match inner.trim() {
            SETTINGS_SECTION => Ok(SectionKind::Settings),
            PRESETS_SECTION => Ok(SectionKind::Presets),
            other => Err(FormatError::UnknownSection {
                line: line_no,
                name: other.to_string(),
            }),
        }
    }
}

impl Default for BundleCodec {
    fn default() -> Self {
        Self::new()
    }
}

enum SectionKind {
    Settings,
    Presets,
    Preset { category: Category, name: String },
}

struct OpenSection {
    kind: SectionKind,
    config: Config,
}

impl OpenSection {
    fn into_section(self) -> Section {
        match self.kind {
            SectionKind::Settings => Section::Settings(self.config),
            SectionKind::Presets => Section::Presets(self.config),
            SectionKind::Preset { category, name } => Section::Preset {
                category,
                name,
                config: self.config,
            },
        }
    }
}

/// Streaming section iterator over bundle text. See [`BundleCodec::sections`].
pub struct Sections<'a> {
    codec: &'a BundleCodec,
    lines: Enumerate<Lines<'a>>,
    open: Option<OpenSection>,
    pending_error: Option<FormatError>,
    done: bool,
}

impl Sections<'_> {
    /// Terminate with `error`. A section completed by the offending line is
    /// still yielded first; the error follows on the next call.
    fn fail_at_boundary(&mut self, error: FormatError) -> Option<Result<Section, FormatError>> {
        if let Some(finished) = self.open.take() {
            self.pending_error = Some(error);
            return Some(Ok(finished.into_section()));
        }
        self.done = true;
        Some(Err(error))
    }

    /// Terminate with `error`, discarding the malformed open section.
    fn fail_in_section(&mut self, error: FormatError) -> Option<Result<Section, FormatError>> {
        self.done = true;
        self.open = None;
        Some(Err(error))
    }
}

impl Iterator for Sections<'_> {
    type Item = Result<Section, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(error) = self.pending_error.take() {
            self.done = true;
            return Some(Err(error));
        }

        while let Some((idx, line)) = self.lines.next() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if BundleCodec::is_blank_or_comment(trimmed) {
                continue;
            }

            if trimmed.starts_with('[') {
                let Some(caps) = self.codec.header_pattern.captures(trimmed) else {
                    return self.fail_at_boundary(FormatError::MalformedHeader {
                        line: line_no,
                        text: trimmed.to_string(),
                    });
                };
                let kind = match self.codec.parse_header(&caps[1], line_no) {
                    Ok(kind) => kind,
                    Err(error) => return self.fail_at_boundary(error),
                };
                let finished = self.open.replace(OpenSection {
                    kind,
                    config: Config::new(),
                });
                if let Some(finished) = finished {
                    return Some(Ok(finished.into_section()));
                }
                continue;
            }

            let (key, value) = match self.codec.parse_entry(trimmed, line_no) {
                Ok(entry) => entry,
                Err(error) => return self.fail_in_section(error),
            };
            match &mut self.open {
                Some(open) => open.config.set(key, value),
                // Keys in the anonymous section: this is a flat config file,
                // not a bundle.
                None => {
                    return self.fail_in_section(FormatError::KeysOutsideSection {
                        line: line_no,
                    });
                }
            }
        }

        self.done = true;
        self.open.take().map(|open| Ok(open.into_section()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal_bundle() {
        let codec = BundleCodec::new();
        let text = "\
# exported by quickslice
[settings]
autocenter = 1

[presets]
print = Fast

[print:Fast]
layer_height = 0.3
settings_id = abc
";
        let bundle = codec.decode(text).unwrap();
        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.settings().unwrap().get("autocenter"), Some("1"));
        assert_eq!(bundle.selections().unwrap().get("print"), Some("Fast"));

        let (category, name, config) = bundle.presets().next().unwrap();
        assert_eq!(category, Category::Print);
        assert_eq!(name, "Fast");
        assert_eq!(config.get("layer_height"), Some("0.3"));
    }

    #[test]
    fn test_round_trip_preserves_sections() {
        let codec = BundleCodec::new();
        let mut settings = Config::new();
        settings.set("autocenter", "0");

        let mut preset_config = Config::new();
        preset_config.set("nozzle_diameter", "0.4");
        preset_config.set("settings_id", "xyz");

        let mut bundle = Bundle::new();
        bundle.push(Section::Settings(settings));
        bundle.push(Section::Preset {
            category: Category::Printer,
            name: "MK3".to_string(),
            config: preset_config,
        });

        let decoded = codec.decode(&codec.encode(&bundle)).unwrap();
        assert_eq!(decoded, bundle);
    }

    #[test]
    fn test_unknown_bare_section_fails() {
        let codec = BundleCodec::new();
        let err = codec.decode("[material]\nkey = v\n").unwrap_err();
        assert!(matches!(err, FormatError::UnknownSection { line: 1, .. }));
    }

    #[test]
    fn test_unknown_category_fails() {
        let codec = BundleCodec::new();
        let err = codec.decode("[sla:Fast]\n").unwrap_err();
        assert!(matches!(err, FormatError::UnknownCategory { line: 1, .. }));
    }

    #[test]
    fn test_keys_before_first_header_fail() {
        let codec = BundleCodec::new();
        let err = codec.decode("layer_height = 0.2\n[settings]\n").unwrap_err();
        assert!(matches!(err, FormatError::KeysOutsideSection { line: 1 }));
    }

    #[test]
    fn test_sections_stream_stops_after_error() {
        let codec = BundleCodec::new();
        let text = "[print:Fast]\nlayer_height = 0.3\n\n[bogus]\n\n[print:Slow]\n";
        let mut sections = codec.sections(text);

        assert!(matches!(
            sections.next(),
            Some(Ok(Section::Preset { .. }))
        ));
        assert!(matches!(
            sections.next(),
            Some(Err(FormatError::UnknownSection { .. }))
        ));
        assert!(sections.next().is_none());
    }

    #[test]
    fn test_decode_config_flat_file() {
        let codec = BundleCodec::new();
        let config = codec
            .decode_config("; single category\nlayer_height = 0.15\nperimeters = 2\n")
            .unwrap();
        assert_eq!(config.get("layer_height"), Some("0.15"));
        assert_eq!(config.get("perimeters"), Some("2"));
    }

    #[test]
    fn test_decode_config_rejects_bundle() {
        let codec = BundleCodec::new();
        let err = codec.decode_config("[print:Fast]\nlayer_height = 0.3\n").unwrap_err();
        assert!(matches!(err, FormatError::SectionInFlatConfig { line: 1 }));
    }

    #[test]
    fn test_malformed_entry() {
        let codec = BundleCodec::new();
        let err = codec.decode("[settings]\nno equals sign here\n").unwrap_err();
        assert!(matches!(err, FormatError::MalformedEntry { line: 2, .. }));
    }

    #[test]
    fn test_config_encode_round_trip() {
        let codec = BundleCodec::new();
        let mut config = Config::new();
        config.set("layer_height", "0.2");
        config.set("fill_pattern", "honeycomb");

        let decoded = codec.decode_config(&codec.encode_config(&config)).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_preset_name_with_spaces_and_colon() {
        let codec = BundleCodec::new();
        // Only the first colon splits category from name
        let bundle = codec.decode("[print:0.2mm NORMAL: draft]\n").unwrap();
        let (category, name, _) = bundle.presets().next().unwrap();
        assert_eq!(category, Category::Print);
        assert_eq!(name, "0.2mm NORMAL: draft");
    }

    #[test]
    fn test_empty_section_survives() {
        let codec = BundleCodec::new();
        let bundle = codec.decode("[presets]\n").unwrap();
        assert_eq!(bundle.len(), 1);
        assert!(bundle.selections().unwrap().is_empty());
    }
}
