//! Engine
//!
//!     A small mode-stack tokenizer in the style of declarative highlighting engines. Grammars
//!     are data: an arena of regions ("modes"), each with an entry pattern, an exit, an ordered
//!     list of child rules and a keyword table. The engine owns the control flow.
//!
//! Scanning
//!
//!     Input is scanned left to right. At each position every terminator of the active region
//!     is searched: the begin pattern of each contained rule in declaration order, then the
//!     region's own end, then its illegal pattern. The leftmost match wins and ties go to the
//!     earliest declared terminator. Text between matches is classified against the active
//!     region's keyword table. See [scanner].
//!
//! Regions
//!
//!     A rule with only a begin pattern is atomic: it emits one token and never becomes
//!     active. Other rules push a frame on the region stack. A frame is popped when its end
//!     matches, when an ancestor it "ends with" is popped, or when a child flagged as
//!     `ends_parent` is popped. A region that meets its illegal pattern is rolled back and the
//!     parent rescans its opening text as ordinary content.
//!
//! Patterns
//!
//!     The regex crate has no lookaround, so guards that the grammars need (not preceded by
//!     `$`, followed by `:`, ...) are carried next to the regex and checked around each match.
//!     Number literals use a dedicated matcher, see [numbers].

pub mod emitter;
pub mod grammar;
pub mod keywords;
pub mod mode;
pub mod numbers;
pub mod pattern;
pub mod scanner;
pub mod scope;

pub use emitter::{Highlight, Node, Token};
pub use grammar::{Grammar, GrammarBuilder, GrammarError, LanguageDef, ModeRef};
pub use keywords::{KeywordClass, Keywords, KeywordsBuilder};
pub use mode::{End, ModeDef};
pub use pattern::{negative_lookbehind_available, Lookbehind, PatternDef, PatternError};
pub use scanner::HighlightOptions;
pub use scope::Scope;
