//! Mode definitions
//!
//!     A [ModeDef] is the declarative record a grammar writes for each region or rule. Modes
//!     reference each other through [ModeRef] handles into the builder's arena, so a mode can
//!     list itself among its children for recursive nesting.
//!
//!     Deriving a variant of an existing mode is a plain copy with overrides:
//!
//!         let nested = builder.inherit(block)?.begin(PatternDef::literal("{"));

use super::grammar::ModeRef;
use super::keywords::Keywords;
use super::pattern::PatternDef;
use super::scope::Scope;
use std::sync::Arc;

/// How a region ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum End {
    /// The rule is atomic: it emits its begin match and is done.
    #[default]
    Immediate,
    /// The region stays open until this pattern matches.
    Pattern(PatternDef),
    /// The region is closed only by a child flagged `ends_parent`, or by end of input.
    Never,
    /// The region closes when the nearest ancestor with an own end pattern closes.
    WithParent,
}

#[derive(Debug, Clone, Default)]
pub struct ModeDef {
    pub(crate) scope: Option<Scope>,
    pub(crate) begin: Option<PatternDef>,
    pub(crate) begin_keywords: Vec<String>,
    pub(crate) end: End,
    pub(crate) ends_parent: bool,
    pub(crate) exclude_begin: bool,
    pub(crate) exclude_end: bool,
    pub(crate) keywords: Option<Arc<Keywords>>,
    pub(crate) illegal: Option<PatternDef>,
    pub(crate) relevance: Option<u32>,
    pub(crate) contains: Vec<ModeRef>,
}

impl ModeDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn begin(mut self, pattern: PatternDef) -> Self {
        self.begin = Some(pattern);
        self
    }

    /// Begins on any of `words`. Unless the mode declares its own table, the words are also
    /// its keywords, and unless it declares a relevance it scores zero.
    pub fn begin_keywords<S: AsRef<str>>(mut self, words: &[S]) -> Self {
        self.begin = Some(PatternDef::words(words));
        self.begin_keywords = words.iter().map(|w| w.as_ref().to_string()).collect();
        self
    }

    pub fn end(mut self, pattern: PatternDef) -> Self {
        self.end = End::Pattern(pattern);
        self
    }

    pub fn never_ends(mut self) -> Self {
        self.end = End::Never;
        self
    }

    pub fn ends_with_parent(mut self) -> Self {
        self.end = End::WithParent;
        self
    }

    /// Closing this region also closes its parent.
    pub fn ends_parent(mut self) -> Self {
        self.ends_parent = true;
        self
    }

    pub fn exclude_begin(mut self) -> Self {
        self.exclude_begin = true;
        self
    }

    pub fn exclude_end(mut self) -> Self {
        self.exclude_end = true;
        self
    }

    pub fn keywords(mut self, keywords: Arc<Keywords>) -> Self {
        self.keywords = Some(keywords);
        self
    }

    pub fn illegal(mut self, pattern: PatternDef) -> Self {
        self.illegal = Some(pattern);
        self
    }

    pub fn relevance(mut self, relevance: u32) -> Self {
        self.relevance = Some(relevance);
        self
    }

    pub fn contains(mut self, modes: Vec<ModeRef>) -> Self {
        self.contains = modes;
        self
    }

    pub fn push_contains(mut self, mode: ModeRef) -> Self {
        self.contains.push(mode);
        self
    }

    pub(crate) fn effective_relevance(&self) -> u32 {
        match self.relevance {
            Some(relevance) => relevance,
            None if !self.begin_keywords.is_empty() => 0,
            None => 1,
        }
    }
}
