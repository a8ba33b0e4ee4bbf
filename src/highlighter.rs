//! Language registry
//!
//!     A [Highlighter] owns compiled grammars and resolves languages by name or alias. It is
//!     immutable once built, so one instance serves any number of threads.
//!
//!     Automatic detection highlights the input with every registered grammar, drops results
//!     that hit an illegal pattern at the top level and keeps the most relevant one. Plain
//!     text competes with relevance zero, so input no grammar recognises stays plain.

use crate::engine::{Grammar, GrammarBuilder, GrammarError, Highlight, HighlightOptions};
use crate::grammars;
use std::fmt;

/// Error type for highlighting.
#[derive(Debug, Clone, PartialEq)]
pub enum HighlightError {
    /// No grammar answers to this name or alias.
    UnknownLanguage(String),
    /// A grammar failed to build.
    Grammar(GrammarError),
}

impl fmt::Display for HighlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightError::UnknownLanguage(name) => write!(f, "Unknown language: {}", name),
            HighlightError::Grammar(err) => write!(f, "Grammar error: {}", err),
        }
    }
}

impl std::error::Error for HighlightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HighlightError::Grammar(err) => Some(err),
            HighlightError::UnknownLanguage(_) => None,
        }
    }
}

impl From<GrammarError> for HighlightError {
    fn from(err: GrammarError) -> Self {
        HighlightError::Grammar(err)
    }
}

/// Result of [Highlighter::highlight_auto].
#[derive(Debug, Clone, PartialEq)]
pub struct AutoHighlight {
    pub best: Highlight,
    pub second_best: Option<Highlight>,
}

#[derive(Debug, Default)]
pub struct Highlighter {
    grammars: Vec<Grammar>,
    options: HighlightOptions,
}

impl Highlighter {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with Solidity and Yul.
    pub fn with_builtin() -> Result<Self, HighlightError> {
        let mut highlighter = Self::new();
        for (name, define) in grammars::BUILTIN {
            log::debug!("building grammar {}", name);
            highlighter.register(define(GrammarBuilder::new())?);
        }
        Ok(highlighter)
    }

    pub fn with_options(mut self, options: HighlightOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> HighlightOptions {
        self.options
    }

    /// Adds a grammar. A grammar with the same name is replaced in place.
    pub fn register(&mut self, grammar: Grammar) {
        for alias in grammar.aliases() {
            if let Some(existing) = self
                .grammars
                .iter()
                .find(|other| other.name() != grammar.name() && other.answers_to(alias))
            {
                log::warn!(
                    "alias {} of {} is already taken by {}",
                    alias,
                    grammar.name(),
                    existing.name()
                );
            }
        }

        match self
            .grammars
            .iter()
            .position(|other| other.name() == grammar.name())
        {
            Some(index) => {
                log::debug!("replacing grammar {}", grammar.name());
                self.grammars[index] = grammar;
            }
            None => {
                log::debug!("registered grammar {}", grammar.name());
                self.grammars.push(grammar);
            }
        }
    }

    /// Looks a grammar up by name, then by alias.
    pub fn language(&self, name: &str) -> Option<&Grammar> {
        self.grammars
            .iter()
            .find(|grammar| grammar.name() == name)
            .or_else(|| self.grammars.iter().find(|grammar| grammar.answers_to(name)))
    }

    /// Registered grammars in registration order.
    pub fn languages(&self) -> impl Iterator<Item = &Grammar> {
        self.grammars.iter()
    }

    pub fn highlight(&self, source: &str, language: &str) -> Result<Highlight, HighlightError> {
        let grammar = self
            .language(language)
            .ok_or_else(|| HighlightError::UnknownLanguage(language.to_string()))?;
        Ok(grammar.highlight(source, self.options))
    }

    /// Highlights with the most relevant grammar.
    pub fn highlight_auto(&self, source: &str) -> AutoHighlight {
        let mut candidates = vec![Highlight::plaintext(source)];
        candidates.extend(
            self.grammars
                .iter()
                .map(|grammar| grammar.highlight(source, self.options))
                .filter(|result| !result.illegal),
        );

        // Stable: ties keep registration order, with plain text first.
        candidates.sort_by(|a, b| b.relevance.cmp(&a.relevance));
        let mut ranked = candidates.into_iter();
        let best = ranked
            .next()
            .unwrap_or_else(|| Highlight::plaintext(source));
        let second_best = ranked.next();

        log::debug!(
            "detected {} (relevance {}), runner-up {:?}",
            best.language,
            best.relevance,
            second_best.as_ref().map(|h| h.language.as_str())
        );
        AutoHighlight { best, second_best }
    }
}
