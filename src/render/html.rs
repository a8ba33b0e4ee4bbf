//! HTML output: nested `<span>`s with a class per scope.

use super::{Format, RenderError};
use crate::engine::{Highlight, Node};

pub const DEFAULT_CLASS_PREFIX: &str = "hljs-";

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Renders `nodes` as HTML, prefixing every class name with `class_prefix`.
pub fn to_html(nodes: &[Node], class_prefix: &str) -> String {
    let mut out = String::new();
    write_nodes(nodes, class_prefix, &mut out);
    out
}

fn write_nodes(nodes: &[Node], class_prefix: &str, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&escape_html(text)),
            Node::Scoped { scope, children } => {
                out.push_str(&format!("<span class=\"{}{}\">", class_prefix, scope));
                write_nodes(children, class_prefix, out);
                out.push_str("</span>");
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct HtmlFormat {
    pub class_prefix: String,
}

impl HtmlFormat {
    pub fn new(class_prefix: impl Into<String>) -> Self {
        Self {
            class_prefix: class_prefix.into(),
        }
    }
}

impl Default for HtmlFormat {
    fn default() -> Self {
        Self::new(DEFAULT_CLASS_PREFIX)
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML spans with hljs style classes"
    }

    fn render(&self, highlight: &Highlight) -> Result<String, RenderError> {
        Ok(to_html(&highlight.nodes, &self.class_prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Scope;

    #[test]
    fn test_escapes_text() {
        let nodes = vec![Node::Scoped {
            scope: Scope::String,
            children: vec![Node::Text("\"<a & 'b'>\"".into())],
        }];
        assert_eq!(
            to_html(&nodes, ""),
            "<span class=\"string\">&quot;&lt;a &amp; &#x27;b&#x27;&gt;&quot;</span>"
        );
    }

    #[test]
    fn test_prefix_and_nesting() {
        let nodes = vec![Node::Scoped {
            scope: Scope::MetaString,
            children: vec![Node::Scoped {
                scope: Scope::BuiltIn,
                children: vec![Node::Text("x".into())],
            }],
        }];
        assert_eq!(
            to_html(&nodes, "hljs-"),
            "<span class=\"hljs-meta-string\"><span class=\"hljs-built_in\">x</span></span>"
        );
    }
}
