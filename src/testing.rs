//! Test helpers
//!
//!     Grammars are checked the way a reader sees them: as a list of `(category, text)`
//!     pairs, where a scoped region counts as one token and unclassified text is `none`.
//!
//!         assert_eq!(tokens("msg", "sol"), vec![("built_in".into(), "msg".into())]);
//!
//!     The helpers build a shared [Highlighter] once per test binary.

use crate::engine::Highlight;
use crate::highlighter::Highlighter;
use once_cell::sync::Lazy;

static HIGHLIGHTER: Lazy<Highlighter> = Lazy::new(|| {
    Highlighter::with_builtin().unwrap_or_else(|err| panic!("built-in grammars must build: {err}"))
});

/// The shared highlighter with the built-in grammars.
pub fn highlighter() -> &'static Highlighter {
    &HIGHLIGHTER
}

/// Highlights `source` as `language`, panicking on an unknown language.
pub fn highlight(source: &str, language: &str) -> Highlight {
    highlighter()
        .highlight(source, language)
        .unwrap_or_else(|err| panic!("{err}"))
}

/// Top level `(category, text)` pairs.
pub fn tokens(source: &str, language: &str) -> Vec<(String, String)> {
    highlight(source, language)
        .tokens()
        .into_iter()
        .map(|token| (token.category().to_string(), token.text))
        .collect()
}

/// `(category, text)` for every text run, using its innermost scope.
pub fn leaves(source: &str, language: &str) -> Vec<(String, String)> {
    highlight(source, language)
        .leaves()
        .into_iter()
        .map(|token| (token.category().to_string(), token.text))
        .collect()
}

/// Shorthand for building expected token lists.
pub fn token(category: &str, text: &str) -> (String, String) {
    (category.to_string(), text.to_string())
}
