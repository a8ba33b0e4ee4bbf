//! Grammar construction
//!
//!     [GrammarBuilder] is the handle a language definition receives. It owns the arena of
//!     [ModeDef]s, hands out the shared primitives every C-like grammar needs (comments,
//!     titles, escapes) and finally validates and compiles everything into an immutable
//!     [Grammar].
//!
//!     The regex capability probe happens when the builder is created, so every pattern of a
//!     grammar is compiled with the same lookbehind strategy and nothing is re-checked while
//!     highlighting.

use super::emitter::Highlight;
use super::keywords::{KeywordClass, Keywords};
use super::mode::{End, ModeDef};
use super::pattern::{Lookbehind, Pattern, PatternDef};
use super::scanner::{HighlightOptions, Scanner};
use super::scope::Scope;
use std::fmt;
use std::sync::Arc;

/// Handle to a mode in a [GrammarBuilder] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeRef(usize);

/// Error type for grammar construction.
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    /// A regex failed to compile.
    InvalidPattern { pattern: String, message: String },
    /// A word was listed under two keyword classes.
    OverlappingKeyword {
        word: String,
        first: KeywordClass,
        second: KeywordClass,
    },
    /// A reserved mode was never defined, or a reference points outside the arena.
    UndefinedMode(usize),
    /// A contained mode has no begin pattern, so it could never be entered.
    MissingBegin(usize),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::InvalidPattern { pattern, message } => {
                write!(f, "Invalid pattern {:?}: {}", pattern, message)
            }
            GrammarError::OverlappingKeyword {
                word,
                first,
                second,
            } => write!(
                f,
                "Keyword {:?} is listed as both {:?} and {:?}",
                word, first, second
            ),
            GrammarError::UndefinedMode(index) => write!(f, "Mode #{} is not defined", index),
            GrammarError::MissingBegin(index) => {
                write!(f, "Mode #{} has no begin pattern", index)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// The top-level description of a language: `{aliases, keywords, contains, illegal}`.
#[derive(Debug, Clone)]
pub struct LanguageDef {
    pub name: String,
    pub aliases: Vec<String>,
    pub keywords: Option<Arc<Keywords>>,
    pub contains: Vec<ModeRef>,
    pub illegal: Option<PatternDef>,
}

impl LanguageDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            keywords: None,
            contains: Vec::new(),
            illegal: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn keywords(mut self, keywords: Arc<Keywords>) -> Self {
        self.keywords = Some(keywords);
        self
    }

    pub fn contains(mut self, modes: Vec<ModeRef>) -> Self {
        self.contains = modes;
        self
    }

    pub fn illegal(mut self, pattern: PatternDef) -> Self {
        self.illegal = Some(pattern);
        self
    }
}

pub struct GrammarBuilder {
    lookbehind: Lookbehind,
    defs: Vec<Option<ModeDef>>,
    doctag: Option<ModeRef>,
    line_comment: Option<ModeRef>,
    block_comment: Option<ModeRef>,
    backslash_escape: Option<ModeRef>,
}

impl GrammarBuilder {
    /// A builder using the best lookbehind strategy of the regex engine.
    pub fn new() -> Self {
        Self::with_lookbehind(Lookbehind::detect())
    }

    pub fn with_lookbehind(lookbehind: Lookbehind) -> Self {
        Self {
            lookbehind,
            defs: Vec::new(),
            doctag: None,
            line_comment: None,
            block_comment: None,
            backslash_escape: None,
        }
    }

    pub fn lookbehind(&self) -> Lookbehind {
        self.lookbehind
    }

    pub fn add(&mut self, def: ModeDef) -> ModeRef {
        self.defs.push(Some(def));
        ModeRef(self.defs.len() - 1)
    }

    /// Allocates a handle to be defined later, for modes that contain themselves.
    pub fn reserve(&mut self) -> ModeRef {
        self.defs.push(None);
        ModeRef(self.defs.len() - 1)
    }

    pub fn define(&mut self, mode: ModeRef, def: ModeDef) -> Result<(), GrammarError> {
        let slot = self
            .defs
            .get_mut(mode.0)
            .ok_or(GrammarError::UndefinedMode(mode.0))?;
        *slot = Some(def);
        Ok(())
    }

    /// A copy of an existing mode, to be overridden and added as a new one.
    pub fn inherit(&self, mode: ModeRef) -> Result<ModeDef, GrammarError> {
        self.defs
            .get(mode.0)
            .and_then(Option::as_ref)
            .cloned()
            .ok_or(GrammarError::UndefinedMode(mode.0))
    }

    /// `TODO:`-style markers inside comments.
    pub fn doctag(&mut self) -> ModeRef {
        if let Some(mode) = self.doctag {
            return mode;
        }
        let mode = self.add(
            ModeDef::new()
                .scope(Scope::Doctag)
                .begin(PatternDef::regex(
                    r"\b(?:TODO|FIXME|NOTE|BUG|OPTIMIZE|HACK|XXX):",
                ))
                .relevance(0),
        );
        self.doctag = Some(mode);
        mode
    }

    /// `// ...` up to the end of the line.
    pub fn line_comment(&mut self) -> ModeRef {
        if let Some(mode) = self.line_comment {
            return mode;
        }
        let doctag = self.doctag();
        let mode = self.add(
            ModeDef::new()
                .scope(Scope::Comment)
                .begin(PatternDef::literal("//"))
                .end(PatternDef::regex(r"(?m)$"))
                .contains(vec![doctag]),
        );
        self.line_comment = Some(mode);
        mode
    }

    /// `/* ... */`, possibly spanning lines.
    pub fn block_comment(&mut self) -> ModeRef {
        if let Some(mode) = self.block_comment {
            return mode;
        }
        let doctag = self.doctag();
        let mode = self.add(
            ModeDef::new()
                .scope(Scope::Comment)
                .begin(PatternDef::literal("/*"))
                .end(PatternDef::literal("*/"))
                .contains(vec![doctag]),
        );
        self.block_comment = Some(mode);
        mode
    }

    /// A backslash and whatever character follows it.
    pub fn backslash_escape(&mut self) -> ModeRef {
        if let Some(mode) = self.backslash_escape {
            return mode;
        }
        let mode = self.add(
            ModeDef::new()
                .begin(PatternDef::regex(r"\\(?s:.)"))
                .relevance(0),
        );
        self.backslash_escape = Some(mode);
        mode
    }

    /// The generic title rule: a declared name.
    pub fn title(&self, begin: &str) -> ModeDef {
        ModeDef::new()
            .scope(Scope::Title)
            .begin(PatternDef::regex(begin))
            .relevance(0)
    }

    /// Validates the arena and compiles every pattern.
    pub fn finish(self, language: LanguageDef) -> Result<Grammar, GrammarError> {
        let mut compiler = Compiler {
            lookbehind: self.lookbehind,
            arena_len: self.defs.len(),
            terminals: Vec::new(),
        };

        let mut modes = Vec::with_capacity(self.defs.len() + 1);
        for (index, slot) in self.defs.iter().enumerate() {
            let def = slot.as_ref().ok_or(GrammarError::UndefinedMode(index))?;
            modes.push(compiler.mode(index, def)?);
        }

        let root = modes.len();
        modes.push(Mode {
            scope: None,
            begin: None,
            end: Terminator::Never,
            ends_parent: false,
            exclude_begin: false,
            exclude_end: false,
            keywords: language.keywords,
            illegal: language
                .illegal
                .as_ref()
                .map(|illegal| compiler.terminal(illegal, false))
                .transpose()?,
            relevance: 0,
            contains: compiler.contains(&language.contains)?,
        });

        log::debug!(
            "compiled grammar {} with {} modes and {} patterns ({:?} lookbehind)",
            language.name,
            modes.len(),
            compiler.terminals.len(),
            self.lookbehind
        );

        Ok(Grammar {
            name: language.name,
            aliases: language.aliases,
            modes,
            terminals: compiler.terminals,
            root,
        })
    }
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct Compiler {
    lookbehind: Lookbehind,
    arena_len: usize,
    terminals: Vec<Terminal>,
}

impl Compiler {
    fn terminal(&mut self, def: &PatternDef, allow_empty: bool) -> Result<usize, GrammarError> {
        let pattern = def
            .compile(self.lookbehind)
            .map_err(|err| GrammarError::InvalidPattern {
                pattern: def.describe(),
                message: err.to_string(),
            })?;
        self.terminals.push(Terminal {
            pattern,
            allow_empty,
        });
        Ok(self.terminals.len() - 1)
    }

    fn contains(&self, refs: &[ModeRef]) -> Result<Vec<usize>, GrammarError> {
        refs.iter()
            .map(|mode| {
                if mode.0 < self.arena_len {
                    Ok(mode.0)
                } else {
                    Err(GrammarError::UndefinedMode(mode.0))
                }
            })
            .collect()
    }

    fn mode(&mut self, index: usize, def: &ModeDef) -> Result<Mode, GrammarError> {
        let begin = def
            .begin
            .as_ref()
            .ok_or(GrammarError::MissingBegin(index))?;
        let begin = self.terminal(begin, false)?;

        let end = match &def.end {
            End::Immediate => Terminator::Immediate,
            End::Never => Terminator::Never,
            End::WithParent => Terminator::WithParent,
            End::Pattern(pattern) => Terminator::Pattern(self.terminal(pattern, true)?),
        };

        let keywords = match (&def.keywords, def.begin_keywords.is_empty()) {
            (Some(keywords), _) => Some(Arc::clone(keywords)),
            (None, false) => Some(
                Keywords::builder()
                    .keywords(def.begin_keywords.iter().cloned())
                    .build()?,
            ),
            (None, true) => None,
        };

        Ok(Mode {
            scope: def.scope,
            begin: Some(begin),
            end,
            ends_parent: def.ends_parent,
            exclude_begin: def.exclude_begin,
            exclude_end: def.exclude_end,
            keywords,
            illegal: def
                .illegal
                .as_ref()
                .map(|illegal| self.terminal(illegal, false))
                .transpose()?,
            relevance: def.effective_relevance(),
            contains: self.contains(&def.contains)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terminator {
    Immediate,
    Pattern(usize),
    Never,
    WithParent,
}

#[derive(Debug)]
pub(crate) struct Mode {
    pub(crate) scope: Option<Scope>,
    pub(crate) begin: Option<usize>,
    pub(crate) end: Terminator,
    pub(crate) ends_parent: bool,
    pub(crate) exclude_begin: bool,
    pub(crate) exclude_end: bool,
    pub(crate) keywords: Option<Arc<Keywords>>,
    pub(crate) illegal: Option<usize>,
    pub(crate) relevance: u32,
    pub(crate) contains: Vec<usize>,
}

#[derive(Debug)]
pub(crate) struct Terminal {
    pub(crate) pattern: Pattern,
    pub(crate) allow_empty: bool,
}

/// A compiled, immutable grammar. Cheap to share across threads.
#[derive(Debug)]
pub struct Grammar {
    name: String,
    aliases: Vec<String>,
    modes: Vec<Mode>,
    terminals: Vec<Terminal>,
    root: usize,
}

impl Grammar {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Whether `name` is this grammar's name or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| alias == name)
    }

    pub fn mode_count(&self) -> usize {
        self.modes.len()
    }

    pub fn highlight(&self, source: &str, options: HighlightOptions) -> Highlight {
        Scanner::new(self, source, options).run()
    }

    pub(crate) fn root(&self) -> usize {
        self.root
    }

    pub(crate) fn mode(&self, index: usize) -> &Mode {
        &self.modes[index]
    }

    pub(crate) fn terminal(&self, index: usize) -> &Terminal {
        &self.terminals[index]
    }

    pub(crate) fn terminal_count(&self) -> usize {
        self.terminals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_mode_must_be_defined() {
        let mut builder = GrammarBuilder::new();
        let block = builder.reserve();
        let err = builder
            .finish(LanguageDef::new("toy").contains(vec![block]))
            .unwrap_err();
        assert_eq!(err, GrammarError::UndefinedMode(0));
    }

    #[test]
    fn test_contained_mode_needs_begin() {
        let mut builder = GrammarBuilder::new();
        let mode = builder.add(ModeDef::new().scope(Scope::Meta));
        let err = builder
            .finish(LanguageDef::new("toy").contains(vec![mode]))
            .unwrap_err();
        assert_eq!(err, GrammarError::MissingBegin(0));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let mut builder = GrammarBuilder::new();
        let mode = builder.add(ModeDef::new().begin(PatternDef::regex("[")));
        let err = builder
            .finish(LanguageDef::new("toy").contains(vec![mode]))
            .unwrap_err();
        assert!(matches!(err, GrammarError::InvalidPattern { ref pattern, .. } if pattern == "["));
    }

    #[test]
    fn test_shared_primitives_are_reused() {
        let mut builder = GrammarBuilder::new();
        let first = builder.line_comment();
        let second = builder.line_comment();
        assert_eq!(first, second);

        let grammar = builder
            .finish(LanguageDef::new("toy").alias("t").contains(vec![first]))
            .unwrap();
        // doctag, line comment, root
        assert_eq!(grammar.mode_count(), 3);
        assert!(grammar.answers_to("t"));
        assert!(!grammar.answers_to("x"));
    }

    #[test]
    fn test_inherit_copies_definition() {
        let mut builder = GrammarBuilder::new();
        let title = builder.add(builder.title(r"[a-z]+"));
        let copy = builder.inherit(title).unwrap().scope(Scope::Class);
        assert_eq!(copy.scope, Some(Scope::Class));
        assert!(copy.begin.is_some());
        assert!(builder.inherit(ModeRef(42)).is_err());
    }
}
