//! Grammars
//!
//!     Each language exposes a `define` function that receives the engine's
//!     [GrammarBuilder] (shared comment rules, titles, inheritance, the regex strategy) and
//!     returns a compiled [Grammar]:
//!
//!         common    strings, numbers and the assembly skeleton
//!         solidity  the contract language, alias `sol`
//!         yul       the standalone assembly dialect

use crate::engine::{Grammar, GrammarBuilder, GrammarError};

pub mod common;
pub mod solidity;
pub mod yul;

/// Signature shared by every grammar definition.
pub type LanguageFn = fn(GrammarBuilder) -> Result<Grammar, GrammarError>;

/// The grammars shipped with the crate, in registration order.
pub const BUILTIN: &[(&str, LanguageFn)] = &[("solidity", solidity::define), ("yul", yul::define)];
