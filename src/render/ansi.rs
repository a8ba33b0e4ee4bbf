//! Terminal output
//!
//!     A [Theme] maps scopes to terminal colors. Text takes the color of its innermost scope
//!     that has one; scopes without a color (`params`, `function`, ...) let the color of
//!     their parent show through.
//!
//!     Themes can be built from names, which is how the configuration file describes them:
//!
//!         keyword = "magenta"
//!         comment = "dark_grey"
//!         string  = "#a5d6ff"

use super::{Format, RenderError};
use crate::engine::{Highlight, Node, Scope};
use crossterm::style::{style, Color, Stylize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    UnknownScope(String),
    UnknownColor { scope: String, color: String },
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeError::UnknownScope(scope) => write!(f, "Unknown scope in theme: {}", scope),
            ThemeError::UnknownColor { scope, color } => {
                write!(f, "Unknown color {:?} for scope {}", color, scope)
            }
        }
    }
}

impl std::error::Error for ThemeError {}

/// Parses a crossterm color name (`dark_grey`, `cyan`, ...) or a `#rrggbb` value.
pub fn parse_color(name: &str) -> Option<Color> {
    if let Ok(color) = Color::try_from(name) {
        return Some(color);
    }
    let hex = name.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    colors: HashMap<Scope, Color>,
}

impl Theme {
    /// A theme that colors nothing.
    pub fn empty() -> Self {
        Self {
            colors: HashMap::new(),
        }
    }

    pub fn color(&self, scope: Scope) -> Option<Color> {
        self.colors.get(&scope).copied()
    }

    pub fn set(&mut self, scope: Scope, color: Color) {
        self.colors.insert(scope, color);
    }

    /// Overrides colors from `(scope name, color name)` pairs.
    pub fn with_names<I, K, V>(mut self, entries: I) -> Result<Self, ThemeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (scope_name, color_name) in entries {
            let (scope_name, color_name) = (scope_name.as_ref(), color_name.as_ref());
            let scope = Scope::from_name(scope_name)
                .ok_or_else(|| ThemeError::UnknownScope(scope_name.to_string()))?;
            let color = parse_color(color_name).ok_or_else(|| ThemeError::UnknownColor {
                scope: scope_name.to_string(),
                color: color_name.to_string(),
            })?;
            self.set(scope, color);
        }
        Ok(self)
    }
}

impl Default for Theme {
    fn default() -> Self {
        let mut theme = Self::empty();
        theme.set(Scope::Keyword, Color::Magenta);
        theme.set(Scope::BuiltIn, Color::Cyan);
        theme.set(Scope::Literal, Color::Blue);
        theme.set(Scope::Number, Color::Yellow);
        theme.set(Scope::String, Color::Green);
        theme.set(Scope::MetaString, Color::DarkGreen);
        theme.set(Scope::Meta, Color::DarkYellow);
        theme.set(Scope::Comment, Color::DarkGrey);
        theme.set(Scope::Doctag, Color::Red);
        theme.set(Scope::Title, Color::Blue);
        theme.set(Scope::Operator, Color::DarkCyan);
        theme
    }
}

/// Renders the result with terminal escape codes.
pub fn to_ansi(highlight: &Highlight, theme: &Theme) -> String {
    let mut out = String::new();
    write_nodes(&highlight.nodes, theme, None, &mut out);
    out
}

fn write_nodes(nodes: &[Node], theme: &Theme, inherited: Option<Color>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => match inherited {
                Some(color) => out.push_str(&style(text).with(color).to_string()),
                None => out.push_str(text),
            },
            Node::Scoped { scope, children } => {
                let color = theme.color(*scope).or(inherited);
                write_nodes(children, theme, color, out);
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnsiFormat {
    pub theme: Theme,
}

impl Format for AnsiFormat {
    fn name(&self) -> &str {
        "ansi"
    }

    fn description(&self) -> &str {
        "Terminal colors"
    }

    fn render(&self, highlight: &Highlight) -> Result<String, RenderError> {
        Ok(to_ansi(highlight, &self.theme))
    }
}
