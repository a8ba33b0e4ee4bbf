//! Token level tests for the standalone Yul grammar

use rstest::rstest;
use solhl::testing::{highlight, leaves, token, tokens};

fn yul(source: &str) -> Vec<(String, String)> {
    tokens(source, "yul")
}

#[rstest]
#[case("object")]
#[case("code")]
#[case("data")]
#[case("let")]
#[case("leave")]
#[case("switch")]
fn keywords(#[case] word: &str) {
    assert_eq!(yul(word), vec![token("keyword", word)]);
}

#[rstest]
#[case("datasize")]
#[case("dataoffset")]
#[case("datacopy")]
#[case("setimmutable")]
#[case("loadimmutable")]
#[case("linkersymbol")]
#[case("memoryguard")]
#[case("mstore8")]
#[case("keccak256")]
fn built_ins(#[case] word: &str) {
    assert_eq!(yul(word), vec![token("built_in", word)]);
}

#[rstest]
#[case("verbatim_0i_0o", "built_in")]
#[case("verbatim_2i_1o", "built_in")]
#[case("verbatim_99i_99o", "built_in")]
#[case("verbatim_100i_0o", "none")]
#[case("verbatim_1i_01o", "none")]
#[case("verbatim_1i", "none")]
#[case("$verbatim_1i_1o", "none")]
#[case("verbatim_1i_1o$", "none")]
fn verbatim_family(#[case] source: &str, #[case] category: &str) {
    assert_eq!(yul(source), vec![token(category, source)]);
}

#[test]
fn dotted_names_are_one_word() {
    assert_eq!(yul("x.slot"), vec![token("none", "x.slot")]);
    assert_eq!(yul("add.x"), vec![token("none", "add.x")]);
}

#[test]
fn object_structure() {
    let source = "object \"Token\" {\n  code {\n    let size := datasize(\"Token\")\n  }\n}";
    let leaves = leaves(source, "yul");
    assert_eq!(leaves[0], token("keyword", "object"));
    assert_eq!(leaves[2], token("string", "\"Token\""));
    assert!(leaves.contains(&token("keyword", "code")));
    assert!(leaves.contains(&token("operator", ":=")));
    assert!(leaves.contains(&token("built_in", "datasize")));
    assert_eq!(highlight(source, "yul").text(), source);
}

#[test]
fn function_definition() {
    assert_eq!(
        yul("function f(a, b) -> c { c := add(a, b) }"),
        vec![
            token("function", "function f(a, b) -> c "),
            token("none", "{ c "),
            token("operator", ":="),
            token("none", " "),
            token("built_in", "add"),
            token("none", "(a, b) }"),
        ]
    );
    assert_eq!(
        leaves("function f(a) -> c {}", "yul")[..7],
        [
            token("keyword", "function"),
            token("function", " "),
            token("title", "f"),
            token("function", "("),
            token("params", "a"),
            token("function", ") "),
            token("operator", "->"),
        ]
    );
}

#[test]
fn literals_and_numbers() {
    assert_eq!(
        yul("let t := true"),
        vec![
            token("keyword", "let"),
            token("none", " t "),
            token("operator", ":="),
            token("none", " "),
            token("literal", "true"),
        ]
    );
    assert_eq!(
        yul("mstore(0x40, 1_000)"),
        vec![
            token("built_in", "mstore"),
            token("none", "("),
            token("number", "0x40"),
            token("none", ", "),
            token("number", "1_000"),
            token("none", ")"),
        ]
    );
}

#[test]
fn hash_is_plain_text() {
    let highlight = highlight("# let", "yul");
    assert!(!highlight.illegal);
    assert_eq!(highlight.tokens()[1].text, "let");
}
