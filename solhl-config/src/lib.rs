//! Configuration loader for solhl.
//!
//! `defaults/solhl.default.toml` is embedded into the binary so that the documented defaults
//! and runtime behavior stay in sync. Callers layer user files and command line overrides on
//! top of those defaults via [`Loader`] before deserializing into [`SolhlConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/solhl.default.toml");

/// Language value that asks for automatic detection.
pub const AUTO_LANGUAGE: &str = "auto";

#[derive(Debug, Clone, Deserialize)]
pub struct SolhlConfig {
    pub highlight: HighlightConfig,
    pub output: OutputConfig,
    /// Scope name to color name.
    #[serde(default)]
    pub theme: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HighlightConfig {
    pub language: String,
    pub ignore_illegals: bool,
}

impl HighlightConfig {
    pub fn detects_language(&self) -> bool {
        self.language == AUTO_LANGUAGE
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: String,
    pub class_prefix: String,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file, ignored when absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. from a command line flag.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merges the layers key by key, later ones winning, and checks the result against
    /// [`SolhlConfig`]. Theme keys are kept verbatim, so `meta-string` stays hyphenated.
    pub fn build(self) -> Result<SolhlConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<SolhlConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert!(config.highlight.detects_language());
        assert!(!config.highlight.ignore_illegals);
        assert_eq!(config.output.format, "ansi");
        assert_eq!(config.output.class_prefix, "hljs-");
        assert_eq!(config.theme.get("keyword").map(String::as_str), Some("magenta"));
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("highlight.language", "yul")
            .expect("override to apply")
            .set_override("output.format", "html")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.highlight.language, "yul");
        assert!(!config.highlight.detects_language());
        assert_eq!(config.output.format, "html");
    }

    #[test]
    fn theme_table_round_trips() {
        let config = load_defaults().expect("defaults to deserialize");
        let expected = [
            ("keyword", "magenta"),
            ("built_in", "cyan"),
            ("literal", "blue"),
            ("number", "yellow"),
            ("string", "green"),
            ("meta-string", "dark_green"),
            ("meta", "dark_yellow"),
            ("comment", "dark_grey"),
            ("doctag", "red"),
            ("title", "blue"),
            ("operator", "dark_cyan"),
        ];
        let theme: Vec<_> = config
            .theme
            .iter()
            .map(|(scope, color)| (scope.as_str(), color.as_str()))
            .collect();
        let mut sorted = expected.to_vec();
        sorted.sort();
        assert_eq!(theme, sorted);
    }

    #[test]
    fn theme_entries_merge_with_overrides() {
        let config = Loader::new()
            .set_override("theme.meta-string", "#00ff00")
            .expect("override to apply")
            .set_override("theme.params", "white")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(
            config.theme.get("meta-string").map(String::as_str),
            Some("#00ff00")
        );
        assert_eq!(config.theme.get("params").map(String::as_str), Some("white"));
        assert_eq!(config.theme.get("keyword").map(String::as_str), Some("magenta"));
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("does-not-exist/solhl.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.output.format, "ansi");
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = Loader::new()
            .with_file("does-not-exist/solhl.toml")
            .build();
        assert!(result.is_err());
    }
}
