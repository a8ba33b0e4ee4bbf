//! # solhl
//!
//! Tokenization grammars for Solidity and its Yul assembly dialect.
//!
//! File Layout
//!
//! The crate is split the same way a highlighting toolchain is: a generic engine that knows
//! nothing about Solidity, and declarative grammars that only describe regions, patterns and
//! vocabularies.
//!
//! src/
//!   ├── engine       Mode-stack tokenizer: patterns, keyword tables, regions, scanning
//!   ├── grammars     Solidity, Yul and the pattern library they share
//!   ├── highlighter  Language registry and relevance based auto-detection
//!   ├── render       HTML, ANSI and flat token outputs
//!   └── testing      Helpers shared by unit and integration tests
//!
//! Grammars are built once and are immutable afterwards, so a single [Highlighter] can be
//! shared across threads and used for any number of independent highlighting calls.

#![allow(rustdoc::invalid_html_tags)]

pub mod engine;
pub mod grammars;
pub mod highlighter;
pub mod render;
pub mod testing;

pub use engine::{Highlight, HighlightOptions, Node, Scope, Token};
pub use highlighter::{AutoHighlight, HighlightError, Highlighter};
