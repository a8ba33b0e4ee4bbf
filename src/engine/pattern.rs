//! Patterns
//!
//!     A [PatternDef] is what a grammar declares: a regex source plus the lookaround guards the
//!     grammar relies on. Compiling it yields a [Pattern] that can search the source text.
//!
//!     Guards are kept separate from the regex so the same declaration works whether or not the
//!     regex engine understands negative lookbehind. The capability is probed once per process
//!     and a grammar builder picks one [Lookbehind] strategy for all of its patterns:
//!
//!         Native    the guard is compiled into the pattern as `(?<![c])` and run by
//!                   `fancy_regex`, which backtracks through the lookbehind
//!         Emulated  the regex is compiled bare for `regex` and matches starting right
//!                   after `c` are skipped
//!
//!     Both strategies accept exactly the same matches, because the guard only looks at the
//!     character in front of the match start. The probe asks `regex` itself, so the default
//!     stays on the automaton engine; Native has to be picked explicitly.
//!
//!     Trailing guards are always emulated:
//!
//!         followed_by(c)      `c` is matched by the regex and trimmed off the result
//!         not_followed_by(c)  the match is discarded when `c` comes next; only used on
//!                             patterns whose end cannot backtrack to a shorter match

use super::numbers;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::ops::Range;

static NEGATIVE_LOOKBEHIND: Lazy<bool> = Lazy::new(|| Regex::new(r"(?<![$])x").is_ok());

/// Whether `regex` accepts negative lookbehind. Probed once.
pub fn negative_lookbehind_available() -> bool {
    *NEGATIVE_LOOKBEHIND
}

/// How "not preceded by" guards are compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookbehind {
    Native,
    Emulated,
}

impl Lookbehind {
    /// Native when `regex` can run the guard itself, Emulated otherwise.
    pub fn detect() -> Self {
        if negative_lookbehind_available() {
            Lookbehind::Native
        } else {
            Lookbehind::Emulated
        }
    }
}

/// A pattern as declared by a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternDef {
    Regex(RegexDef),
    /// The structural number literal, see [numbers].
    Number,
    /// Never matches. Used for regions that are only closed by a child.
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexDef {
    source: String,
    not_preceded_by: Option<char>,
    not_followed_by: Vec<char>,
    followed_by: Option<char>,
}

impl PatternDef {
    pub fn regex(source: impl Into<String>) -> Self {
        PatternDef::Regex(RegexDef {
            source: source.into(),
            not_preceded_by: None,
            not_followed_by: Vec::new(),
            followed_by: None,
        })
    }

    /// Matches `text` literally.
    pub fn literal(text: &str) -> Self {
        PatternDef::regex(regex::escape(text))
    }

    /// Matches any of `words` as a whole word, e.g. `\b(?:function|modifier)\b`.
    ///
    /// Words directly preceded or followed by a `.` are member accesses, not keywords, and
    /// are skipped.
    pub fn words<S: AsRef<str>>(words: &[S]) -> Self {
        let alternation = words
            .iter()
            .map(|word| regex::escape(word.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        PatternDef::regex(format!(r"\b(?:{})\b", alternation))
            .unless_after('.')
            .unless_before('.')
    }

    /// Rejects matches that start right after `guard`.
    pub fn unless_after(mut self, guard: char) -> Self {
        if let PatternDef::Regex(def) = &mut self {
            def.not_preceded_by = Some(guard);
        }
        self
    }

    /// Rejects matches that are directly followed by `guard`.
    pub fn unless_before(mut self, guard: char) -> Self {
        if let PatternDef::Regex(def) = &mut self {
            def.not_followed_by.push(guard);
        }
        self
    }

    /// Requires `next` right after the match without including it.
    pub fn before(mut self, next: char) -> Self {
        if let PatternDef::Regex(def) = &mut self {
            def.followed_by = Some(next);
        }
        self
    }

    pub fn compile(&self, lookbehind: Lookbehind) -> Result<Pattern, PatternError> {
        let matcher = match self {
            PatternDef::Number => Matcher::Number,
            PatternDef::Never => Matcher::Never,
            PatternDef::Regex(def) => def.compile(lookbehind)?,
        };
        Ok(Pattern { matcher })
    }

    /// Human readable form, used in errors and logs.
    pub fn describe(&self) -> String {
        match self {
            PatternDef::Regex(def) => def.source.clone(),
            PatternDef::Number => "<number>".to_string(),
            PatternDef::Never => "<never>".to_string(),
        }
    }
}

impl RegexDef {
    fn compile(&self, lookbehind: Lookbehind) -> Result<Matcher, PatternError> {
        let mut source = format!("(?:{})", self.source);
        let mut trim_end = 0;
        if let Some(next) = self.followed_by {
            source.push_str(&regex::escape(&next.to_string()));
            trim_end = next.len_utf8();
        }

        let (engine, not_preceded_by) = match (self.not_preceded_by, lookbehind) {
            (Some(guard), Lookbehind::Native) => {
                let guarded = format!("(?<![{}]){}", regex::escape(&guard.to_string()), source);
                let engine = if negative_lookbehind_available() {
                    Engine::Automaton(Regex::new(&guarded)?)
                } else {
                    let regex = fancy_regex::Regex::new(&guarded)
                        .map_err(|err| PatternError::Lookbehind(Box::new(err)))?;
                    Engine::Backtracking(regex)
                };
                (engine, None)
            }
            (guard, _) => (Engine::Automaton(Regex::new(&source)?), guard),
        };

        Ok(Matcher::Regex {
            engine,
            not_preceded_by,
            not_followed_by: self.not_followed_by.clone(),
            trim_end,
        })
    }
}

/// Why a declared pattern failed to compile.
#[derive(Debug)]
pub enum PatternError {
    Regex(regex::Error),
    Lookbehind(Box<fancy_regex::Error>),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Regex(err) => write!(f, "{}", err),
            PatternError::Lookbehind(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for PatternError {}

impl From<regex::Error> for PatternError {
    fn from(err: regex::Error) -> Self {
        PatternError::Regex(err)
    }
}

#[derive(Debug, Clone)]
enum Engine {
    Automaton(Regex),
    Backtracking(fancy_regex::Regex),
}

impl Engine {
    fn find_at(&self, text: &str, from: usize) -> Option<Range<usize>> {
        match self {
            Engine::Automaton(regex) => regex.find_at(text, from).map(|m| m.start()..m.end()),
            Engine::Backtracking(regex) => match regex.find_from_pos(text, from) {
                Ok(found) => found.map(|m| m.start()..m.end()),
                Err(err) => {
                    log::warn!("lookbehind search from {} gave up: {}", from, err);
                    None
                }
            },
        }
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex {
        engine: Engine,
        not_preceded_by: Option<char>,
        not_followed_by: Vec<char>,
        trim_end: usize,
    },
    Number,
    Never,
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    matcher: Matcher,
}

impl Pattern {
    /// Finds the leftmost accepted match starting at or after `from`.
    pub fn find_at(&self, text: &str, from: usize) -> Option<Range<usize>> {
        match &self.matcher {
            Matcher::Never => None,
            Matcher::Number => numbers::find_number(text, from),
            Matcher::Regex {
                engine,
                not_preceded_by,
                not_followed_by,
                trim_end,
            } => {
                let mut cursor = from;
                while cursor <= text.len() {
                    let found = engine.find_at(text, cursor)?;
                    let range = found.start..found.end - trim_end;
                    let before = text[..range.start].chars().next_back();
                    let after = text[range.end..].chars().next();

                    let rejected = (before.is_some() && before == *not_preceded_by)
                        || after.is_some_and(|next| not_followed_by.contains(&next));
                    if !rejected {
                        return Some(range);
                    }
                    cursor = next_boundary(text, found.start);
                }
                None
            }
        }
    }
}

/// The char boundary after `at`, or one past the end of `text`.
pub(crate) fn next_boundary(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| at + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn find(def: PatternDef, text: &str) -> Option<Range<usize>> {
        def.compile(Lookbehind::Emulated)
            .expect("pattern compiles")
            .find_at(text, 0)
    }

    #[test]
    fn test_unless_after_skips_guarded_start() {
        let def = PatternDef::regex(r"\btx\.").unless_after('$');
        assert_eq!(find(def.clone(), "id$tx.origin"), None);
        assert_eq!(find(def, "id$tx. tx.origin"), Some(7..10));
    }

    #[test]
    fn test_before_is_excluded_from_match() {
        let def = PatternDef::regex(r"\b(?:gas|value|salt)").before(':');
        assert_eq!(find(def.clone(), "{value: 1}"), Some(1..6));
        assert_eq!(find(def, "value = 1"), None);
    }

    #[test]
    fn test_words_skip_member_access() {
        let def = PatternDef::words(&["error", "event"]);
        assert_eq!(find(def.clone(), "x.error"), None);
        assert_eq!(find(def.clone(), "error.x"), None);
        assert_eq!(find(def.clone(), "errors"), None);
        assert_eq!(find(def, "  event E();"), Some(2..7));
    }

    #[test]
    fn test_never_and_number() {
        assert_eq!(find(PatternDef::Never, "anything"), None);
        assert_eq!(find(PatternDef::Number, "x = 1_000;"), Some(4..9));
    }

    #[rstest]
    #[case(r"\bverbatim_[1-9]?[0-9]i_[1-9]?[0-9]o\b", '$')]
    #[case(r"\b(?:msg|tx|block)\.\s*", '$')]
    #[case(r"\b(?:function|event)\b", '.')]
    fn test_strategies_agree(#[case] source: &str, #[case] guard: char) {
        let def = PatternDef::regex(source).unless_after(guard).unless_before('$');
        let native = def.compile(Lookbehind::Native).expect("native compiles");
        let emulated = def.compile(Lookbehind::Emulated).expect("emulated compiles");
        let texts = [
            "verbatim_1i_2o",
            "a$verbatim_1i_2o",
            "$verbatim_10i_0o x verbatim_0i_0o",
            "verbatim_1i_2o$",
            "id$tx.origin tx. msg.sender",
            "$msg. block.number",
            "x.function function y.event event$ event",
            "",
        ];
        for text in texts {
            for from in 0..=text.len() {
                assert_eq!(
                    native.find_at(text, from),
                    emulated.find_at(text, from),
                    "{text:?} from {from}"
                );
            }
        }
    }

    #[test]
    fn test_native_guard_is_compiled_in() {
        let def = PatternDef::regex(r"\btx\b").unless_after('$');
        let Matcher::Regex { not_preceded_by, .. } =
            def.compile(Lookbehind::Native).expect("native compiles").matcher
        else {
            panic!("expected a regex matcher");
        };
        assert_eq!(not_preceded_by, None);
    }

    #[test]
    fn test_invalid_source_is_an_error() {
        assert!(PatternDef::regex("(").compile(Lookbehind::Emulated).is_err());
    }
}
