//! Pattern library shared by the Solidity and Yul grammars
//!
//!     Strings, numbers and the skeleton of an assembly region are defined once here so that
//!     the same construct is tokenized the same way in a `.sol` file, inside an `assembly { }`
//!     section and in a standalone Yul object.

use crate::engine::{GrammarBuilder, GrammarError, Keywords, ModeDef, ModeRef, PatternDef, Scope};
use std::sync::Arc;

/// Identifiers of the contract language. `$` is an identifier character.
pub const SOL_LEXEME: &str = r"[A-Za-z_$][A-Za-z_$0-9]*";

/// Identifiers inside assembly, where dotted names such as `x.slot` are a single word.
pub const ASSEMBLY_LEXEME: &str = r"[A-Za-z_$][A-Za-z_$0-9.]*";

pub const ASSEMBLY_KEYWORDS: &[&str] = &[
    "assembly", "let", "function", "if", "switch", "case", "default", "for", "leave", "break",
    "continue", "u256", "jump", "jumpi", "stop", "return", "revert", "selfdestruct", "invalid",
];

pub const ASSEMBLY_LITERALS: &[&str] = &["true", "false"];

pub const ASSEMBLY_BUILT_INS: &[&str] = &[
    // arithmetic and bitwise
    "add", "sub", "mul", "div", "sdiv", "mod", "smod", "exp", "not", "lt", "gt", "slt", "sgt",
    "eq", "iszero", "and", "or", "xor", "byte", "shl", "shr", "sar", "addmod", "mulmod",
    "signextend", "keccak256",
    // stack
    "pc", "pop", "dup1", "dup2", "dup3", "dup4", "dup5", "dup6", "dup7", "dup8", "dup9", "dup10",
    "dup11", "dup12", "dup13", "dup14", "dup15", "dup16", "swap1", "swap2", "swap3", "swap4",
    "swap5", "swap6", "swap7", "swap8", "swap9", "swap10", "swap11", "swap12", "swap13",
    "swap14", "swap15", "swap16",
    // memory and storage
    "mload", "mstore", "mstore8", "sload", "sstore", "tload", "tstore", "mcopy", "msize",
    // execution context
    "gas", "address", "balance", "selfbalance", "caller", "callvalue", "calldataload",
    "calldatasize", "calldatacopy", "codesize", "codecopy", "extcodesize", "extcodecopy",
    "returndatasize", "returndatacopy", "extcodehash",
    // calls and logs
    "create", "create2", "call", "callcode", "delegatecall", "staticcall", "log0", "log1",
    "log2", "log3", "log4",
    // chain and block
    "chainid", "origin", "gasprice", "basefee", "blobbasefee", "blobhash", "blockhash",
    "coinbase", "timestamp", "number", "difficulty", "prevrandao", "gaslimit",
];

/// A declared name.
pub const TITLE_RE: &str = r"[A-Za-z$_][0-9A-Za-z$_]*";

/// The literal rules both grammars start from.
#[derive(Debug, Clone, Copy)]
pub struct Library {
    pub apos_string: ModeRef,
    pub quote_string: ModeRef,
    pub hex_apos_string: ModeRef,
    pub hex_quote_string: ModeRef,
    pub line_comment: ModeRef,
    pub block_comment: ModeRef,
    pub number: ModeRef,
}

impl Library {
    pub fn new(builder: &mut GrammarBuilder) -> Self {
        let apos = string(builder, '\'');
        let quote = string(builder, '"');
        Self {
            apos_string: builder.add(apos),
            quote_string: builder.add(quote),
            hex_apos_string: builder.add(hex_string('\'')),
            hex_quote_string: builder.add(hex_string('"')),
            line_comment: builder.line_comment(),
            block_comment: builder.block_comment(),
            number: builder.add(
                ModeDef::new()
                    .scope(Scope::Number)
                    .begin(PatternDef::Number)
                    .relevance(0),
            ),
        }
    }

    /// Plain strings first, then hex strings.
    pub fn strings(&self) -> [ModeRef; 4] {
        [
            self.apos_string,
            self.quote_string,
            self.hex_apos_string,
            self.hex_quote_string,
        ]
    }

    pub fn comments(&self) -> [ModeRef; 2] {
        [self.line_comment, self.block_comment]
    }

    /// Both plain string rules, classified as `meta-string`.
    pub fn meta_strings(&self, builder: &mut GrammarBuilder) -> Result<[ModeRef; 2], GrammarError> {
        let apos = builder.inherit(self.apos_string)?.scope(Scope::MetaString);
        let quote = builder.inherit(self.quote_string)?.scope(Scope::MetaString);
        Ok([builder.add(apos), builder.add(quote)])
    }
}

/// `'...'` or `"..."`, optionally `unicode` prefixed. Strings do not span lines.
fn string(builder: &mut GrammarBuilder, quote: char) -> ModeDef {
    let escape = builder.backslash_escape();
    let quote = regex::escape(&quote.to_string());
    ModeDef::new()
        .scope(Scope::String)
        .begin(PatternDef::regex(format!(r"(?:\bunicode)?{}", quote)))
        .end(PatternDef::regex(quote))
        .illegal(PatternDef::literal("\n"))
        .contains(vec![escape])
}

/// `hex'00ff'`: pairs of hex digits, optionally separated by single underscores.
fn hex_string(quote: char) -> ModeDef {
    let quote = regex::escape(&quote.to_string());
    ModeDef::new().scope(Scope::String).begin(PatternDef::regex(format!(
        r"\bhex{q}(?:(?:[0-9a-fA-F]{{2}}_?)*[0-9a-fA-F]{{2}})?{q}",
        q = quote
    )))
}

/// A keyword table over the assembly vocabulary plus dialect additions.
pub fn assembly_keywords(
    keywords: &[&str],
    built_ins: &[&str],
) -> Result<Arc<Keywords>, GrammarError> {
    Keywords::builder()
        .lexeme(ASSEMBLY_LEXEME)
        .keywords(ASSEMBLY_KEYWORDS.iter().chain(keywords).copied())
        .built_ins(ASSEMBLY_BUILT_INS.iter().chain(built_ins).copied())
        .literals(ASSEMBLY_LITERALS.iter().copied())
        .build()
}

/// The rules every assembly region contains: literals, comments, `:=`/`->` and function
/// definitions.
pub fn base_assembly(
    builder: &mut GrammarBuilder,
    library: &Library,
    keywords: &Arc<Keywords>,
) -> Vec<ModeRef> {
    let operators = builder.add(
        ModeDef::new()
            .scope(Scope::Operator)
            .begin(PatternDef::regex(r":=|->")),
    );

    let title = builder.title(TITLE_RE).keywords(Arc::clone(keywords));
    let title = builder.add(title);

    let mut param_rules = library.comments().to_vec();
    param_rules.extend(library.strings());
    param_rules.push(library.number);
    let params = builder.add(
        ModeDef::new()
            .scope(Scope::Params)
            .begin(PatternDef::literal("("))
            .end(PatternDef::literal(")"))
            .exclude_begin()
            .exclude_end()
            .keywords(Arc::clone(keywords))
            .contains(param_rules),
    );

    let function = builder.add(
        ModeDef::new()
            .scope(Scope::Function)
            .begin_keywords(&["function"])
            .end(PatternDef::literal("{"))
            .exclude_end()
            .contains(vec![
                title,
                params,
                library.line_comment,
                library.block_comment,
                operators,
            ]),
    );

    let mut rules = library.strings().to_vec();
    rules.extend(library.comments());
    rules.extend([library.number, operators, function]);
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{HighlightOptions, LanguageDef};

    fn categories(source: &str) -> Vec<(&'static str, String)> {
        let mut builder = GrammarBuilder::new();
        let library = Library::new(&mut builder);
        let keywords = assembly_keywords(&[], &[]).unwrap();
        let rules = base_assembly(&mut builder, &library, &keywords);
        let grammar = builder
            .finish(LanguageDef::new("asm").keywords(keywords).contains(rules))
            .unwrap();
        grammar
            .highlight(source, HighlightOptions::default())
            .tokens()
            .into_iter()
            .map(|token| (token.category(), token.text))
            .collect()
    }

    #[test]
    fn test_hex_strings() {
        assert_eq!(categories("hex'00ff'"), vec![("string", "hex'00ff'".to_string())]);
        assert_eq!(categories("hex\"0_0\"")[0].0, "none");
    }

    #[test]
    fn test_unicode_prefix_and_escapes() {
        assert_eq!(
            categories(r#"unicode"a\"b""#),
            vec![("string", r#"unicode"a\"b""#.to_string())]
        );
    }

    #[test]
    fn test_string_does_not_span_lines() {
        let tokens = categories("'abc\nlet");
        assert_eq!(tokens[0], ("none", "'abc\n".to_string()));
        assert_eq!(tokens[1], ("keyword", "let".to_string()));
    }

    #[test]
    fn test_assembly_operators() {
        assert_eq!(
            categories("x := add(1, y)"),
            vec![
                ("none", "x ".to_string()),
                ("operator", ":=".to_string()),
                ("none", " ".to_string()),
                ("built_in", "add".to_string()),
                ("none", "(".to_string()),
                ("number", "1".to_string()),
                ("none", ", y)".to_string()),
            ]
        );
    }

    #[test]
    fn test_assembly_function() {
        let tokens = categories("function f(a) -> b { leave }");
        assert_eq!(tokens[0], ("function", "function f(a) -> b ".to_string()));
        assert_eq!(tokens[2], ("keyword", "leave".to_string()));
    }

    #[test]
    fn test_vocabulary_is_disjoint() {
        assert!(assembly_keywords(&["object", "code", "data"], &["datasize"]).is_ok());
    }
}
