//! Output tree
//!
//!     The scanner records a flat event log (open scope, text range, close scope) so that a
//!     rolled back region can be discarded by truncating the log. Only when the scan is over is
//!     the log folded into the [Node] tree that renderers and tests consume.

use super::scope::Scope;
use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Open(Scope),
    Text(Range<usize>),
    Close,
}

#[derive(Debug, Default)]
pub(crate) struct Emitter {
    events: Vec<Event>,
}

impl Emitter {
    pub(crate) fn open(&mut self, scope: Scope) {
        self.events.push(Event::Open(scope));
    }

    pub(crate) fn text(&mut self, range: Range<usize>) {
        if !range.is_empty() {
            self.events.push(Event::Text(range));
        }
    }

    pub(crate) fn close(&mut self) {
        self.events.push(Event::Close);
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }

    /// Folds the log into a tree. Unclosed scopes are closed at the end.
    pub(crate) fn finish(self, source: &str) -> Vec<Node> {
        let mut root = Vec::new();
        let mut open: Vec<(Scope, Vec<Node>)> = Vec::new();

        for event in self.events {
            match event {
                Event::Open(scope) => open.push((scope, Vec::new())),
                Event::Text(range) => push_text(current(&mut root, &mut open), &source[range]),
                Event::Close => {
                    if let Some((scope, children)) = open.pop() {
                        current(&mut root, &mut open).push(Node::Scoped { scope, children });
                    }
                }
            }
        }
        while let Some((scope, children)) = open.pop() {
            current(&mut root, &mut open).push(Node::Scoped { scope, children });
        }
        root
    }
}

fn current<'a>(root: &'a mut Vec<Node>, open: &'a mut [(Scope, Vec<Node>)]) -> &'a mut Vec<Node> {
    match open.last_mut() {
        Some((_, children)) => children,
        None => root,
    }
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    match nodes.last_mut() {
        Some(Node::Text(last)) => last.push_str(text),
        _ => nodes.push(Node::Text(text.to_string())),
    }
}

/// A node of the highlighted tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Scoped { scope: Scope, children: Vec<Node> },
}

impl Node {
    /// The source text covered by this node.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Scoped { children, .. } => {
                for child in children {
                    child.write_text(out);
                }
            }
        }
    }

    fn collect_leaves(&self, scope: Option<Scope>, out: &mut Vec<Token>) {
        match self {
            Node::Text(text) => out.push(Token {
                scope,
                text: text.clone(),
            }),
            Node::Scoped { scope, children } => {
                for child in children {
                    child.collect_leaves(Some(*scope), out);
                }
            }
        }
    }
}

/// A classified run of text. `scope == None` is the "none" category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub scope: Option<Scope>,
    pub text: String,
}

impl Token {
    pub fn category(&self) -> &'static str {
        self.scope.map_or("none", Scope::as_str)
    }
}

/// The result of highlighting one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub language: String,
    pub relevance: u32,
    /// An illegal pattern matched outside of any region.
    pub illegal: bool,
    pub nodes: Vec<Node>,
}

impl Highlight {
    /// The whole input as one unclassified run.
    pub fn plaintext(source: &str) -> Self {
        let nodes = if source.is_empty() {
            Vec::new()
        } else {
            vec![Node::Text(source.to_string())]
        };
        Self {
            language: "plaintext".to_string(),
            relevance: 0,
            illegal: false,
            nodes,
        }
    }

    /// Top level tokens. A scoped node counts as one token carrying all of its text.
    pub fn tokens(&self) -> Vec<Token> {
        self.nodes
            .iter()
            .map(|node| match node {
                Node::Text(text) => Token {
                    scope: None,
                    text: text.clone(),
                },
                Node::Scoped { scope, .. } => Token {
                    scope: Some(*scope),
                    text: node.text(),
                },
            })
            .collect()
    }

    /// Every text run with its innermost scope.
    pub fn leaves(&self) -> Vec<Token> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.collect_leaves(None, &mut out);
        }
        out
    }

    /// The input, reassembled from the tree.
    pub fn text(&self) -> String {
        self.nodes.iter().map(Node::text).collect()
    }
}
