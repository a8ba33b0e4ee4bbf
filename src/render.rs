//! Output formats
//!
//!     A highlight result is a tree of scoped text. Formats turn it into something to show or
//!     to feed another tool:
//!
//!         html    `<span class="hljs-keyword">` markup, escaped
//!         ansi    terminal colors from a [ansi::Theme]
//!         tokens  one `category<TAB>text` line per top level token
//!         json    the result tree, serialized
//!         yaml    the same, as YAML
//!
//!     Formats are looked up by name through a [FormatRegistry], the same way the CLI picks
//!     them from `--format`.

use crate::engine::Highlight;
use std::collections::HashMap;
use std::fmt;

pub mod ansi;
pub mod html;
pub mod tokens;

pub use ansi::{AnsiFormat, Theme, ThemeError};
pub use html::HtmlFormat;
pub use tokens::TokensFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    FormatNotFound(String),
    Serialization(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::FormatNotFound(name) => write!(f, "Format not found: {}", name),
            RenderError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// An output format for highlight results.
pub trait Format: Send + Sync {
    /// The name used to select the format, e.g. "html".
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn render(&self, highlight: &Highlight) -> Result<String, RenderError>;
}

pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Result tree as JSON"
    }

    fn render(&self, highlight: &Highlight) -> Result<String, RenderError> {
        serde_json::to_string_pretty(highlight)
            .map_err(|err| RenderError::Serialization(err.to_string()))
    }
}

pub struct YamlFormat;

impl Format for YamlFormat {
    fn name(&self) -> &str {
        "yaml"
    }

    fn description(&self) -> &str {
        "Result tree as YAML"
    }

    fn render(&self, highlight: &Highlight) -> Result<String, RenderError> {
        serde_yaml::to_string(highlight).map_err(|err| RenderError::Serialization(err.to_string()))
    }
}

/// Formats by name.
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Registers a format, replacing one with the same name.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, RenderError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| RenderError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Format names, sorted.
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn render(&self, highlight: &Highlight, format: &str) -> Result<String, RenderError> {
        self.get(format)?.render(highlight)
    }

    /// Every built-in format with its default settings.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(HtmlFormat::default());
        registry.register(AnsiFormat::default());
        registry.register(TokensFormat);
        registry.register(JsonFormat);
        registry.register(YamlFormat);
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Node, Scope};

    fn sample() -> Highlight {
        Highlight {
            language: "solidity".into(),
            relevance: 1,
            illegal: false,
            nodes: vec![
                Node::Scoped {
                    scope: Scope::Keyword,
                    children: vec![Node::Text("uint".into())],
                },
                Node::Text(" x;".into()),
            ],
        }
    }

    #[test]
    fn test_registry_defaults() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(
            registry.list_formats(),
            vec!["ansi", "html", "json", "tokens", "yaml"]
        );
        assert!(registry.has("html"));
    }

    #[test]
    fn test_registry_get_nonexistent() {
        let registry = FormatRegistry::with_defaults();
        match registry.render(&sample(), "pdf") {
            Err(RenderError::FormatNotFound(name)) => assert_eq!(name, "pdf"),
            other => panic!("Expected FormatNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_json_shape() {
        let json = JsonFormat.render(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["language"], "solidity");
        assert_eq!(value["nodes"][0]["scope"], "keyword");
        assert_eq!(value["nodes"][0]["children"][0], "uint");
        assert_eq!(value["nodes"][1], " x;");
    }

    #[test]
    fn test_yaml_mentions_scopes() {
        let yaml = YamlFormat.render(&sample()).unwrap();
        assert!(yaml.contains("language: solidity"));
        assert!(yaml.contains("scope: keyword"));
    }
}
