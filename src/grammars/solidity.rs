//! Solidity
//!
//!     Regions: function-like declarations, contracts/interfaces/libraries, structs and enums,
//!     `import`, `using` and `pragma` statements, and inline `assembly` sections whose braced
//!     blocks nest to any depth.
//!
//!     Member access on the global namespaces (`msg.sender`, `abi.encode`, ...) is matched by
//!     dedicated rules listed ahead of the generic member rule, and weighs more for language
//!     detection.

use super::common::{self, Library, SOL_LEXEME, TITLE_RE};
use crate::engine::{
    Grammar, GrammarBuilder, GrammarError, Keywords, LanguageDef, ModeDef, ModeRef, PatternDef,
    Scope,
};
use std::sync::Arc;

const KEYWORDS: &[&str] = &[
    "var", "bool", "string", "int", "uint", "byte", "bytes", "fixed", "ufixed", "enum", "struct",
    "mapping", "address", "new", "delete", "if", "else", "for", "while", "continue", "break",
    "return", "throw", "emit", "try", "catch", "revert", "unchecked", "_", "function", "modifier",
    "event", "constructor", "fallback", "receive", "error", "virtual", "override", "constant",
    "immutable", "anonymous", "indexed", "storage", "memory", "calldata", "external", "public",
    "internal", "payable", "pure", "view", "private", "returns", "import", "from", "as", "using",
    "global", "pragma", "contract", "interface", "library", "is", "abstract", "type", "data",
    "code", "object", "assembly",
];

const LITERALS: &[&str] = &[
    "true", "false", "wei", "gwei", "szabo", "finney", "ether", "seconds", "minutes", "hours",
    "days", "weeks", "years",
];

const BUILT_INS: &[&str] = &[
    "self", "this", "super", "selfdestruct", "suicide", "now", "msg", "block", "tx", "abi",
    "blockhash", "gasleft", "assert", "require", "Error", "Panic", "sha3", "sha256", "keccak256",
    "ripemd160", "ecrecover", "addmod", "mulmod", "log0", "log1", "log2", "log3", "log4",
];

/// Members of external functions, arrays, addresses, user defined value types and `type(..)`.
const RESERVED_MEMBERS: &[&str] = &[
    "gas", "value", "selector", "address", "length", "push", "pop", "send", "transfer", "call",
    "callcode", "delegatecall", "staticcall", "balance", "code", "codehash", "wrap", "unwrap",
    "name", "creationCode", "runtimeCode", "interfaceId", "min", "max",
];

/// Global namespaces and the members each one exposes.
const NAMESPACES: &[(&str, &[&str])] = &[
    ("msg", &["gas", "value", "data", "sender", "sig"]),
    (
        "block",
        &[
            "blockhash",
            "coinbase",
            "difficulty",
            "gaslimit",
            "basefee",
            "number",
            "timestamp",
            "chainid",
        ],
    ),
    ("tx", &["gasprice", "origin"]),
    (
        "abi",
        &[
            "decode",
            "encode",
            "encodePacked",
            "encodeWithSelector",
            "encodeWithSignature",
            "encodeCall",
        ],
    ),
    ("bytes", &["concat"]),
    ("string", &["concat"]),
];

/// Call options that are only built-ins right before a `:`.
const SPECIAL_PARAMETERS: &[&str] = &["gas", "value", "salt"];

const FUNCTION_WORDS: &[&str] = &[
    "function",
    "modifier",
    "event",
    "constructor",
    "fallback",
    "receive",
    "error",
];
const CLASS_WORDS: &[&str] = &["contract", "interface", "library"];
const STRUCT_WORDS: &[&str] = &["struct", "enum"];

/// Every spelling of the sized numeric types: `bytes1`..`bytes32`, `int8`..`int256`,
/// `uint8`..`uint256` and `fixedMxN`/`ufixedMxN` for M in 8..=256 by 8 and N in 0..=80.
pub fn sized_type_names() -> Vec<String> {
    let bits: Vec<u32> = (8..=256).step_by(8).collect();
    let mut names = Vec::new();
    names.extend((1..=32).map(|size| format!("bytes{}", size)));
    names.extend(bits.iter().map(|size| format!("int{}", size)));
    names.extend(bits.iter().map(|size| format!("uint{}", size)));
    for prefix in ["fixed", "ufixed"] {
        for size in &bits {
            names.extend((0..=80).map(|precision| format!("{}{}x{}", prefix, size, precision)));
        }
    }
    names
}

/// The contract language keyword table.
pub fn keywords() -> Result<Arc<Keywords>, GrammarError> {
    Keywords::builder()
        .lexeme(SOL_LEXEME)
        .keywords(KEYWORDS.iter().copied())
        .keywords(sized_type_names())
        .literals(LITERALS.iter().copied())
        .built_ins(BUILT_INS.iter().copied())
        .build()
}

/// A region opened by one of `words`, classifying them with the contract lexeme.
fn declaration(words: &[&str]) -> Result<ModeDef, GrammarError> {
    let table = Keywords::builder()
        .lexeme(SOL_LEXEME)
        .keywords(words.iter().copied())
        .build()?;
    Ok(ModeDef::new().begin_keywords(words).keywords(table))
}

fn statement(
    words: &[&str],
    keywords: &[&str],
    built_ins: &[&str],
) -> Result<ModeDef, GrammarError> {
    let table = Keywords::builder()
        .lexeme(SOL_LEXEME)
        .keywords(keywords.iter().copied())
        .built_ins(built_ins.iter().copied())
        .build()?;
    Ok(ModeDef::new()
        .begin_keywords(words)
        .keywords(table)
        .end(PatternDef::literal(";")))
}

/// `msg.`, `block.`, ... up to the end of the member chain.
fn namespace(
    builder: &mut GrammarBuilder,
    name: &str,
    members: &[&str],
    reserved: ModeRef,
) -> Result<ModeRef, GrammarError> {
    let table = Keywords::builder()
        .lexeme(SOL_LEXEME)
        .built_ins(std::iter::once(name).chain(members.iter().copied()))
        .build()?;
    Ok(builder.add(
        ModeDef::new()
            .begin(PatternDef::regex(format!(r"\b{}\.\s*", regex::escape(name))).unless_after('$'))
            .end(PatternDef::regex(r"[^A-Za-z0-9$_.]"))
            .exclude_end()
            .keywords(table)
            .contains(vec![reserved])
            .relevance(10),
    ))
}

/// `assembly ("memory-safe") { ... }`. The section has no terminator of its own and closes
/// with its top block.
fn assembly(builder: &mut GrammarBuilder, library: &Library) -> Result<ModeRef, GrammarError> {
    let keywords = common::assembly_keywords(&[], &[])?;
    let mut environment = common::base_assembly(builder, library, &keywords);

    let members = Keywords::builder()
        .built_ins(["slot", "offset", "length", "address", "selector"])
        .build()?;
    let old_members = Keywords::builder().built_ins(["slot", "offset"]).build()?;
    environment.push(builder.add(
        ModeDef::new()
            .begin(PatternDef::literal("."))
            .end(PatternDef::regex(r"[^A-Za-z0-9$.]"))
            .exclude_begin()
            .exclude_end()
            .keywords(members)
            .relevance(2),
    ));
    environment.push(builder.add(
        ModeDef::new()
            .begin(PatternDef::literal("_"))
            .end(PatternDef::regex(r"[^A-Za-z0-9$.]"))
            .exclude_begin()
            .exclude_end()
            .keywords(old_members)
            .relevance(2),
    ));

    let block = builder.reserve();
    let block_def = ModeDef::new()
        .begin(PatternDef::literal("{"))
        .end(PatternDef::literal("}"))
        .keywords(Arc::clone(&keywords))
        .contains(environment)
        .push_contains(block);
    let top_block = block_def.clone().ends_parent();
    builder.define(block, block_def)?;
    let top_block = builder.add(top_block);

    let [meta_apos, meta_quote] = library.meta_strings(builder)?;
    let section = declaration(&["assembly"])?
        .never_ends()
        .contains(vec![
            library.line_comment,
            library.block_comment,
            meta_apos,
            meta_quote,
            top_block,
        ]);
    Ok(builder.add(section))
}

/// Builds the Solidity grammar with the host's shared primitives.
pub fn define(mut builder: GrammarBuilder) -> Result<Grammar, GrammarError> {
    let sol_keywords = keywords()?;
    let library = Library::new(&mut builder);
    let [line_comment, block_comment] = library.comments();

    let operators = builder.add(
        ModeDef::new()
            .scope(Scope::Operator)
            .begin(PatternDef::regex(r"[+\-!~*/%<>&^|=]")),
    );

    let params = builder.add(
        ModeDef::new()
            .scope(Scope::Params)
            .begin(PatternDef::literal("("))
            .end(PatternDef::literal(")"))
            .exclude_begin()
            .exclude_end()
            .keywords(Arc::clone(&sol_keywords))
            .contains(vec![
                line_comment,
                block_comment,
                library.apos_string,
                library.quote_string,
                library.number,
            ]),
    );

    let reserved_members = builder.add(
        ModeDef::new()
            .begin(PatternDef::regex(r"\.\s*"))
            .end(PatternDef::regex(r"[^A-Za-z0-9$_.]"))
            .exclude_begin()
            .exclude_end()
            .keywords(
                Keywords::builder()
                    .built_ins(RESERVED_MEMBERS.iter().copied())
                    .build()?,
            )
            .relevance(2),
    );

    let title = builder.title(TITLE_RE).keywords(Arc::clone(&sol_keywords));
    let title = builder.add(title);

    let special_parameters = builder.add(
        ModeDef::new().scope(Scope::BuiltIn).begin(
            PatternDef::regex(format!(r"\b(?:{})", SPECIAL_PARAMETERS.join("|")))
                .before(':')
                .unless_after('$'),
        ),
    );

    let function = declaration(FUNCTION_WORDS)?
        .scope(Scope::Function)
        .end(PatternDef::regex(r"[{;]"))
        .exclude_end()
        .illegal(PatternDef::literal("%"))
        .contains(vec![
            title,
            params,
            special_parameters,
            line_comment,
            block_comment,
        ]);
    let function = builder.add(function);

    let mut namespaces = Vec::with_capacity(NAMESPACES.len());
    for (name, members) in NAMESPACES {
        namespaces.push(namespace(&mut builder, name, members, reserved_members)?);
    }

    let inheritance = builder.add(declaration(&["is"])?);
    let class = declaration(CLASS_WORDS)?
        .scope(Scope::Class)
        .end(PatternDef::literal("{"))
        .exclude_end()
        .illegal(PatternDef::regex(r#"[:"\[\]]"#))
        .contains(vec![
            inheritance,
            title,
            params,
            special_parameters,
            line_comment,
            block_comment,
        ]);
    let class = builder.add(class);

    let structure = declaration(STRUCT_WORDS)?
        .end(PatternDef::literal("{"))
        .exclude_end()
        .illegal(PatternDef::regex(r#"[:"\[\]]"#))
        .contains(vec![title, line_comment, block_comment]);
    let structure = builder.add(structure);

    let mut import_rules = vec![title];
    import_rules.extend(library.strings());
    import_rules.extend([line_comment, block_comment, operators]);
    let import = statement(&["import"], &["import", "from", "as"], &[])?.contains(import_rules);
    let import = builder.add(import);

    let using = statement(&["using"], &["using", "for", "global"], &[])?.contains(vec![
        title,
        line_comment,
        block_comment,
        operators,
    ]);
    let using = builder.add(using);

    let [meta_apos, meta_quote] = library.meta_strings(&mut builder)?;
    let pragma = statement(
        &["pragma"],
        &["pragma", "solidity", "experimental", "abicoder"],
        &["ABIEncoderV2", "SMTChecker", "v1", "v2"],
    )?
    .scope(Scope::Meta)
    .contains(vec![line_comment, block_comment, meta_apos, meta_quote]);
    let pragma = builder.add(pragma);

    let assembly = assembly(&mut builder, &library)?;

    let mut contains = library.strings().to_vec();
    contains.extend([
        line_comment,
        block_comment,
        library.number,
        special_parameters,
        operators,
        function,
    ]);
    contains.extend(namespaces);
    contains.extend([reserved_members, class, structure, import, using, pragma, assembly]);

    builder.finish(
        LanguageDef::new("solidity")
            .alias("sol")
            .keywords(sol_keywords)
            .contains(contains)
            .illegal(PatternDef::literal("#")),
    )
}

/// The Solidity grammar, using the best regex strategy available.
pub fn grammar() -> Result<Grammar, GrammarError> {
    define(GrammarBuilder::new())
}
