//! Token level tests for the Solidity grammar
//!
//! Inputs are checked through the same `(category, text)` view the grammar is designed
//! against: one pair per top level token, with unclassified text as `none`.

use rstest::rstest;
use solhl::testing::{highlight, leaves, token, tokens};

fn sol(source: &str) -> Vec<(String, String)> {
    tokens(source, "sol")
}

#[rstest]
#[case("-1")]
#[case("654_321")]
#[case("54_321")]
#[case("4_321")]
#[case("5_43_21")]
#[case("1_2e10")]
#[case("12e1_0")]
#[case("3.14_15")]
#[case("3_1.4_15")]
#[case("0x8765_4321")]
#[case("0x765_4321")]
#[case("0x65_4321")]
#[case("0x5_4321")]
#[case("0x123_1234_1234_1234")]
#[case("0x123456_1234_1234")]
#[case("0X123")]
#[case("0xffffff")]
#[case("0xfff_fff")]
fn numbers_ok(#[case] number: &str) {
    assert_eq!(sol(number), vec![token("number", number)]);
}

#[rstest]
#[case("1234_")]
#[case("12__34")]
#[case("12_e34")]
#[case("12e_34")]
#[case("3.1415_")]
#[case("3__1.4__15")]
#[case("1._2")]
#[case("1.2e_12")]
#[case("1._")]
#[case("0x1234__1234__1234__123")]
fn numbers_fail(#[case] number: &str) {
    assert_ne!(sol(number), vec![token("number", number)]);
}

#[rstest]
#[case("msg")]
#[case("block")]
#[case("tx")]
#[case("abi")]
fn built_ins(#[case] word: &str) {
    assert_eq!(sol(word), vec![token("built_in", word)]);
}

#[rstest]
#[case("object")]
#[case("code")]
#[case("data")]
fn assembly_object_words_are_keywords(#[case] word: &str) {
    assert_eq!(sol(word), vec![token("keyword", word)]);
}

#[rstest]
#[case("id$1")]
#[case("id$tx")]
#[case("$msg")]
fn identifiers_with_dollar_sign(#[case] source: &str) {
    assert_eq!(sol(source), vec![token("none", source)]);
}

#[rstest]
fn independent_tokens_do_not_interact(
    #[values("msg", "0x1f", "true", "uint256", "'s'", "hex\"00ff\"", "ether")] first: &str,
    #[values("tx", "1e5", "false", "bytes4", "\"s\"", "constant")] second: &str,
) {
    let mut expected = sol(first);
    expected.push(token("none", " "));
    expected.extend(sol(second));
    assert_eq!(sol(&format!("{} {}", first, second)), expected);
}

#[test]
fn sized_types_are_keywords() {
    for word in ["bytes1", "bytes32", "int8", "uint256", "fixed128x18", "ufixed8x0"] {
        assert_eq!(sol(word), vec![token("keyword", word)], "{word}");
    }
    for word in ["bytes33", "int7", "uint264", "fixed8x81"] {
        assert_eq!(sol(word), vec![token("none", word)], "{word}");
    }
}

#[test]
fn namespace_members() {
    assert_eq!(
        sol("msg.sender;"),
        vec![
            token("built_in", "msg"),
            token("none", "."),
            token("built_in", "sender"),
            token("none", ";"),
        ]
    );
    assert_eq!(
        sol("abi.encodePacked(x)"),
        vec![
            token("built_in", "abi"),
            token("none", "."),
            token("built_in", "encodePacked"),
            token("none", "(x)"),
        ]
    );
    assert_eq!(
        sol("bytes.concat"),
        vec![
            token("built_in", "bytes"),
            token("none", "."),
            token("built_in", "concat"),
        ]
    );
}

#[test]
fn namespaces_weigh_more_than_plain_members() {
    let namespaced = highlight("msg.sender;", "sol");
    let member = highlight("x.length;", "sol");
    assert!(namespaced.relevance >= 10);
    assert!(member.relevance < namespaced.relevance);
}

#[test]
fn reserved_members() {
    assert_eq!(
        sol("x.length"),
        vec![token("none", "x."), token("built_in", "length")]
    );
    assert_eq!(sol("a.b"), vec![token("none", "a.b")]);
}

#[test]
fn special_parameters_need_a_colon() {
    assert_eq!(
        sol("{value: 1}"),
        vec![
            token("none", "{"),
            token("built_in", "value"),
            token("none", ": "),
            token("number", "1"),
            token("none", "}"),
        ]
    );
    assert_eq!(
        sol("value = 1"),
        vec![
            token("none", "value "),
            token("operator", "="),
            token("none", " "),
            token("number", "1"),
        ]
    );
}

#[test]
fn pragma_is_meta() {
    assert_eq!(
        sol("pragma solidity ^0.8.0;"),
        vec![token("meta", "pragma solidity ^0.8.0;")]
    );
    assert_eq!(
        leaves("pragma solidity ^0.8.0;", "sol"),
        vec![
            token("keyword", "pragma"),
            token("meta", " "),
            token("keyword", "solidity"),
            token("meta", " ^0.8.0;"),
        ]
    );
    assert_eq!(
        leaves("pragma abicoder \"v2\";", "sol")[4],
        token("meta-string", "\"v2\"")
    );
}

#[test]
fn import_statement() {
    assert_eq!(
        sol("import \"./IAccessControl.sol\";"),
        vec![
            token("keyword", "import"),
            token("none", " "),
            token("string", "\"./IAccessControl.sol\""),
            token("none", ";"),
        ]
    );
}

#[test]
fn strings_and_comments() {
    assert_eq!(
        sol("unicode\"héllo\" // done"),
        vec![
            token("string", "unicode\"héllo\""),
            token("none", " "),
            token("comment", "// done"),
        ]
    );
    assert_eq!(
        leaves("/* TODO: x */", "sol"),
        vec![
            token("comment", "/* "),
            token("doctag", "TODO:"),
            token("comment", " x */"),
        ]
    );
}

#[test]
fn unterminated_string_stays_plain() {
    let highlight = highlight("'abc\nuint x;", "sol");
    assert_eq!(highlight.text(), "'abc\nuint x;");
    assert_eq!(
        highlight.tokens()[..2]
            .iter()
            .map(|t| (t.category().to_string(), t.text.clone()))
            .collect::<Vec<_>>(),
        vec![token("none", "'abc\n"), token("keyword", "uint")]
    );
}

#[test]
fn nested_regions_close_in_order() {
    let source = "contract C { function f() public { assembly { { let x := 1 } } } }";
    assert_eq!(
        sol(source),
        vec![
            token("class", "contract C "),
            token("none", "{ "),
            token("function", "function f() public "),
            token("none", "{ "),
            token("keyword", "assembly"),
            token("none", " { { "),
            token("keyword", "let"),
            token("none", " x "),
            token("operator", ":="),
            token("none", " "),
            token("number", "1"),
            token("none", " } } } }"),
        ]
    );
}

#[test]
fn assembly_ends_with_its_block() {
    // `uint` after the section is classified by the contract keywords again.
    let tokens = sol("assembly { sstore(0, 1) } uint");
    assert_eq!(tokens.last(), Some(&token("keyword", "uint")));
    assert!(tokens.contains(&token("built_in", "sstore")));
}

#[test]
fn assembly_flags_are_meta_strings() {
    assert_eq!(
        sol("assembly (\"memory-safe\") {}")[..3],
        [
            token("keyword", "assembly"),
            token("none", " ("),
            token("meta-string", "\"memory-safe\""),
        ]
    );
}

#[test]
fn assembly_members() {
    let leaves = leaves("assembly { let s := x.slot }", "sol");
    assert!(leaves.contains(&token("built_in", "slot")));
    assert!(!leaves.contains(&token("built_in", "x")));
}

#[rstest]
#[case("contract C { function f() { assembly { {")]
#[case("}}} contract {")]
#[case("function f(")]
#[case("assembly { { }")]
#[case("contract A is B, C")]
fn unbalanced_input_degrades_gracefully(#[case] source: &str) {
    let highlight = highlight(source, "sol");
    assert_eq!(highlight.text(), source);
}

#[test]
fn illegal_percent_abandons_function() {
    assert_eq!(
        sol("function f() % {"),
        vec![
            token("keyword", "function"),
            token("none", " f() "),
            token("operator", "%"),
            token("none", " {"),
        ]
    );
}

#[test]
fn illegal_quote_abandons_contract() {
    assert_eq!(
        sol("contract C is \"x\" {"),
        vec![
            token("keyword", "contract"),
            token("none", " C "),
            token("keyword", "is"),
            token("none", " "),
            token("string", "\"x\""),
            token("none", " {"),
        ]
    );
}

#[test]
fn repeated_declarations_roll_back_together() {
    assert_eq!(
        sol("contract contract \"x\" {"),
        vec![
            token("keyword", "contract"),
            token("none", " "),
            token("keyword", "contract"),
            token("none", " "),
            token("string", "\"x\""),
            token("none", " {"),
        ]
    );
    let source = format!("{}%", "function ".repeat(3000));
    let highlight = highlight(&source, "sol");
    assert_eq!(highlight.text(), source);
    assert_eq!(highlight.tokens()[0], highlight.tokens()[2]);
}

#[test]
fn hash_is_illegal_at_top_level() {
    let highlight = highlight("# uint", "sol");
    assert!(highlight.illegal);
    assert_eq!(highlight.text(), "# uint");
}
