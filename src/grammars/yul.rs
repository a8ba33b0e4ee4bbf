//! Yul
//!
//!     The standalone assembly dialect: the shared assembly rules at the top level, with
//!     object structure keywords, data section built-ins and the `verbatim_<n>i_<m>o` family.

use super::common::{self, Library};
use crate::engine::{Grammar, GrammarBuilder, GrammarError, LanguageDef, ModeDef, PatternDef, Scope};

const KEYWORDS: &[&str] = &["object", "code", "data"];

const BUILT_INS: &[&str] = &[
    "datasize",
    "dataoffset",
    "datacopy",
    "setimmutable",
    "loadimmutable",
    "linkersymbol",
    "memoryguard",
];

/// `verbatim_<n>i_<m>o` with n and m in 0..=99.
const VERBATIM_RE: &str = r"\bverbatim_[1-9]?[0-9]i_[1-9]?[0-9]o\b";

/// Builds the Yul grammar with the host's shared primitives.
pub fn define(mut builder: GrammarBuilder) -> Result<Grammar, GrammarError> {
    let keywords = common::assembly_keywords(KEYWORDS, BUILT_INS)?;
    let library = Library::new(&mut builder);
    let mut contains = common::base_assembly(&mut builder, &library, &keywords);

    contains.push(
        builder.add(
            ModeDef::new().scope(Scope::BuiltIn).begin(
                PatternDef::regex(VERBATIM_RE)
                    .unless_after('$')
                    .unless_before('$'),
            ),
        ),
    );

    builder.finish(
        LanguageDef::new("yul")
            .keywords(keywords)
            .contains(contains),
    )
}

/// The Yul grammar, using the best regex strategy available.
pub fn grammar() -> Result<Grammar, GrammarError> {
    define(GrammarBuilder::new())
}
