//! Parse tree
//!
//! Every grammar rule produces a [`Node`] tagged with its [`NodeKind`].
//! Nodes only store byte spans into the source; text is materialized
//! through [`Document::node_text`] when the builder needs it. Child lists
//! are shared, so cloning a node never copies its subtree.

use std::fmt;
use std::sync::Arc;

/// Byte range `[start, end)` in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `pos`
    pub fn empty(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Grammar rule that produced a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    // Top level and sections
    Configuration,
    GlobalSection,
    DefaultsSection,
    UserlistSection,
    ListenSection,
    FrontendSection,
    BackendSection,

    // Section headers
    GlobalHeader,
    DefaultsHeader,
    UserlistHeader,
    ListenHeader,
    FrontendHeader,
    BackendHeader,

    // Lines
    ConfigBlock,
    ServerLine,
    OptionLine,
    BindLine,
    AclLine,
    BackendLine,
    GroupLine,
    UserLine,
    ConfigLine,
    CommentLine,
    BlankLine,

    // Tokens
    CommentText,
    LineBreak,
    Keyword,
    ProxyName,
    ServerName,
    AclName,
    BackendName,
    BackendType,
    Operator,
    BackendCondition,
    GroupName,
    UserName,
    PasswordType,
    Password,
    ServiceAddress,
    Host,
    Port,
    Ipv4Host,
    DnsHost,
    WildcardHost,
    Value,
    Char,
    Whitespace,
    WhitespacePlus,

    /// Anonymous sequence, repetition, terminal or absent optional
    Generic,
}

impl NodeKind {
    pub fn is_section(self) -> bool {
        matches!(
            self,
            NodeKind::GlobalSection
                | NodeKind::DefaultsSection
                | NodeKind::UserlistSection
                | NodeKind::ListenSection
                | NodeKind::FrontendSection
                | NodeKind::BackendSection
        )
    }
}

/// A node of the parse tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub children: Arc<[Node]>,
}

impl Node {
    /// Leaf node for a matched terminal
    pub fn leaf(span: Span) -> Self {
        Self {
            kind: NodeKind::Generic,
            span,
            children: Arc::default(),
        }
    }

    /// Zero-width node left by an optional that did not match
    pub fn absent(pos: usize) -> Self {
        Self::leaf(Span::empty(pos))
    }

    /// Anonymous node covering `children`
    pub fn group(span: Span, children: Vec<Node>) -> Self {
        Self {
            kind: NodeKind::Generic,
            span,
            children: children.into(),
        }
    }

    /// Tag the result of a rule body with the rule's kind.
    ///
    /// Anonymous nodes are re-tagged in place; a node that already belongs
    /// to another rule (the winner of an ordered choice) is wrapped.
    pub fn into_kind(self, kind: NodeKind) -> Self {
        if self.kind == NodeKind::Generic {
            Self { kind, ..self }
        } else {
            Self {
                kind,
                span: self.span,
                children: Arc::from([self]),
            }
        }
    }

    /// Cursor position right after this node
    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// First node of `kind` reachable through anonymous groupings only
    pub fn find(&self, kind: NodeKind) -> Option<&Node> {
        for child in self.children.iter() {
            if child.kind == kind {
                return Some(child);
            }
            if child.kind == NodeKind::Generic {
                if let Some(found) = child.find(kind) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Named children, descending through anonymous groupings
    pub fn named_children(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        collect_named(self, &mut out);
        out
    }

    /// Number of nodes in this subtree
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Node::size).sum::<usize>()
    }
}

fn collect_named<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    for child in node.children.iter() {
        if child.kind == NodeKind::Generic {
            collect_named(child, out);
        } else {
            out.push(child);
        }
    }
}

/// Result of a successful parse: the source text and its tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    source: String,
    root: Node,
}

impl Document {
    pub(crate) fn new(source: String, root: Node) -> Self {
        Self { source, root }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The `Configuration` node
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Source text under `span`, if it lies inside this document
    pub fn text(&self, span: Span) -> Option<&str> {
        self.source.get(span.start..span.end)
    }

    /// Source text of `node`; empty for a node from another document
    pub fn node_text(&self, node: &Node) -> &str {
        self.text(node.span).unwrap_or_default()
    }

    /// Section nodes in source order
    pub fn sections(&self) -> impl Iterator<Item = &Node> {
        self.root
            .children
            .iter()
            .filter(|node| node.kind.is_section())
    }
}

impl fmt::Display for Document {
    /// Indented outline of the tree, one named node per line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn walk(doc: &Document, node: &Node, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(
                f,
                "{:indent$}{:?} {}..{} {:?}",
                "",
                node.kind,
                node.span.start,
                node.span.end,
                doc.node_text(node).trim_end_matches('\n'),
                indent = depth * 2
            )?;
            for child in node.named_children() {
                if !matches!(
                    child.kind,
                    NodeKind::Whitespace | NodeKind::WhitespacePlus | NodeKind::LineBreak
                ) {
                    walk(doc, child, depth + 1, f)?;
                }
            }
            Ok(())
        }
        walk(self, &self.root, 0, f)
    }
}
