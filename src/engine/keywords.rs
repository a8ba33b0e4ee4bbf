//! Keyword tables
//!
//!     A table classifies identifiers into three disjoint sets: keywords, literals and
//!     built-ins. Identifiers are cut out of unmatched text with the table's own lexeme
//!     pattern, so the pattern travels with the table: a table whose lexeme cannot produce
//!     `$`-containing words would never recognise them, and one whose lexeme is too greedy
//!     would swallow members after a dot.

use super::grammar::GrammarError;
use super::scope::Scope;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// Lexeme used when a table does not declare one.
pub const DEFAULT_LEXEME: &str = r"\w+";

/// Words that appear in prose and code alike and so say nothing about the language.
const COMMON_WORDS: &[&str] = &[
    "of", "and", "for", "in", "not", "or", "if", "then", "parent", "list", "value",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordClass {
    Keyword,
    Literal,
    BuiltIn,
}

impl KeywordClass {
    pub fn scope(self) -> Scope {
        match self {
            KeywordClass::Keyword => Scope::Keyword,
            KeywordClass::Literal => Scope::Literal,
            KeywordClass::BuiltIn => Scope::BuiltIn,
        }
    }
}

/// A compiled keyword table. Shared between modes through `Arc`.
#[derive(Debug)]
pub struct Keywords {
    lexeme: Regex,
    words: HashMap<String, KeywordClass>,
}

impl Keywords {
    pub fn builder() -> KeywordsBuilder {
        KeywordsBuilder::default()
    }

    pub fn lexeme(&self) -> &Regex {
        &self.lexeme
    }

    pub fn classify(&self, word: &str) -> Option<KeywordClass> {
        self.words.get(word).copied()
    }

    /// Relevance a single hit of `word` contributes to language detection.
    pub fn relevance(word: &str) -> u32 {
        if COMMON_WORDS.contains(&word) {
            0
        } else {
            1
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeywordsBuilder {
    lexeme: Option<String>,
    entries: Vec<(String, KeywordClass)>,
}

impl KeywordsBuilder {
    pub fn lexeme(mut self, source: impl Into<String>) -> Self {
        self.lexeme = Some(source.into());
        self
    }

    pub fn class<I, S>(mut self, class: KeywordClass, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .extend(words.into_iter().map(|word| (word.into(), class)));
        self
    }

    pub fn keywords<I, S>(self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class(KeywordClass::Keyword, words)
    }

    pub fn literals<I, S>(self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class(KeywordClass::Literal, words)
    }

    pub fn built_ins<I, S>(self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class(KeywordClass::BuiltIn, words)
    }

    /// Compiles the table. A word listed under two classes is an error; repeating a word
    /// within one class is not.
    pub fn build(self) -> Result<Arc<Keywords>, GrammarError> {
        let source = self.lexeme.unwrap_or_else(|| DEFAULT_LEXEME.to_string());
        let lexeme = Regex::new(&source).map_err(|err| GrammarError::InvalidPattern {
            pattern: source.clone(),
            message: err.to_string(),
        })?;

        let mut words = HashMap::with_capacity(self.entries.len());
        for (word, class) in self.entries {
            match words.get(&word).copied() {
                Some(existing) if existing != class => {
                    return Err(GrammarError::OverlappingKeyword {
                        word,
                        first: existing,
                        second: class,
                    });
                }
                Some(_) => {}
                None => {
                    words.insert(word, class);
                }
            }
        }

        Ok(Arc::new(Keywords { lexeme, words }))
    }
}
