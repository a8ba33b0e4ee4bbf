//! Token categories.
//!
//! A scope is the classification a grammar attaches to a run of text. Renderers map scopes to
//! display styles; the engine only guarantees that assignment is deterministic. Unclassified
//! text carries no scope at all (`Option<Scope>::None`), which renders as "none".

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    String,
    Number,
    Operator,
    Keyword,
    Literal,
    BuiltIn,
    Params,
    Function,
    Class,
    Title,
    Meta,
    #[serde(rename = "meta-string")]
    MetaString,
    Comment,
    Doctag,
}

impl Scope {
    pub const ALL: [Scope; 14] = [
        Scope::String,
        Scope::Number,
        Scope::Operator,
        Scope::Keyword,
        Scope::Literal,
        Scope::BuiltIn,
        Scope::Params,
        Scope::Function,
        Scope::Class,
        Scope::Title,
        Scope::Meta,
        Scope::MetaString,
        Scope::Comment,
        Scope::Doctag,
    ];

    /// The class name used by renderers, e.g. `built_in` or `meta-string`.
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::String => "string",
            Scope::Number => "number",
            Scope::Operator => "operator",
            Scope::Keyword => "keyword",
            Scope::Literal => "literal",
            Scope::BuiltIn => "built_in",
            Scope::Params => "params",
            Scope::Function => "function",
            Scope::Class => "class",
            Scope::Title => "title",
            Scope::Meta => "meta",
            Scope::MetaString => "meta-string",
            Scope::Comment => "comment",
            Scope::Doctag => "doctag",
        }
    }

    /// Inverse of [Scope::as_str].
    pub fn from_name(name: &str) -> Option<Scope> {
        Scope::ALL.iter().copied().find(|scope| scope.as_str() == name)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
