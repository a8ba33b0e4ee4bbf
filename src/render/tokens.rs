//! Flat token listing, handy for eyeballing what a grammar does with a snippet.

use super::{Format, RenderError};
use crate::engine::Highlight;

/// One `category<TAB>text` line per top level token, text debug escaped.
pub fn to_listing(highlight: &Highlight) -> String {
    highlight
        .tokens()
        .iter()
        .map(|token| format!("{}\t{:?}\n", token.category(), token.text))
        .collect()
}

pub struct TokensFormat;

impl Format for TokensFormat {
    fn name(&self) -> &str {
        "tokens"
    }

    fn description(&self) -> &str {
        "Top level tokens, one per line"
    }

    fn render(&self, highlight: &Highlight) -> Result<String, RenderError> {
        Ok(to_listing(highlight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Node, Scope};

    #[test]
    fn test_listing() {
        let highlight = Highlight {
            language: "yul".into(),
            relevance: 0,
            illegal: false,
            nodes: vec![
                Node::Scoped {
                    scope: Scope::Keyword,
                    children: vec![Node::Text("let".into())],
                },
                Node::Text(" x\n".into()),
            ],
        };
        assert_eq!(to_listing(&highlight), "keyword\t\"let\"\nnone\t\" x\\n\"\n");
    }
}
