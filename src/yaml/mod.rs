//! Position-aware YAML document tree.
//!
//! Pipeline files are parsed into an arena of typed [`Node`]s. Unlike a
//! deserialized value, the tree keeps everything script extraction needs:
//! source positions, anchors and aliases as distinct nodes, tags, the raw
//! body of block scalars and the comments written around mapping entries
//! and sequence items.
//!
//! [`NodeId`] indexes the arena and is the stable node identity used by the
//! alias resolver. A [`YamlFile`] may hold several documents.

mod comments;
mod merge;
mod parser;

pub use comments::{Comment, CommentGroup};
pub use merge::merge_files;
pub use parser::{parse_file, parse_fragment};

/// Identity of a node inside a [`YamlFile`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// 1-based line and column of a node in its source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Quoting style of a flow scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Plain or quoted scalar.
    Scalar { value: String, style: ScalarStyle },
    /// `|` or `>` block scalar. `value` is the parser's interpretation,
    /// `raw` the body lines as written with the block indentation removed.
    BlockScalar {
        folded: bool,
        value: String,
        raw: String,
    },
    Sequence {
        items: Vec<NodeId>,
        /// Comment lines written directly above each item.
        item_comments: Vec<Option<CommentGroup>>,
    },
    Mapping { entries: Vec<NodeId> },
    MappingEntry {
        key: NodeId,
        value: NodeId,
        comment: Option<CommentGroup>,
    },
    Tagged { tag: String, value: NodeId },
    Anchor { name: String, value: NodeId },
    Alias { name: String },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub position: Position,
    /// `$`-rooted locator such as `$.build.script[1]`.
    pub path: String,
    /// Index into [`YamlFile::sources`].
    pub source: usize,
}

/// One YAML document of a file.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// `None` for an empty document.
    pub root: Option<NodeId>,
}

/// A parsed YAML stream.
#[derive(Debug, Clone, Default)]
pub struct YamlFile {
    pub name: String,
    /// Names of the files the nodes were read from. A parsed file has one
    /// entry; merged files keep one per input.
    pub sources: Vec<String>,
    pub documents: Vec<Document>,
    nodes: Vec<Node>,
}

impl YamlFile {
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Name of the file a node was read from.
    pub fn source_name(&self, id: NodeId) -> &str {
        self.sources
            .get(self.node(id).source)
            .map(String::as_str)
            .unwrap_or(self.name.as_str())
    }

    /// Text of a scalar node, used for mapping keys and reference segments.
    pub fn scalar_text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Scalar { value, .. } | NodeKind::BlockScalar { value, .. } => {
                Some(value.as_str())
            }
            NodeKind::Tagged { value, .. } | NodeKind::Anchor { value, .. } => {
                self.scalar_text(*value)
            }
            _ => None,
        }
    }

    /// Key text of a mapping entry.
    pub fn entry_key(&self, entry: NodeId) -> Option<&str> {
        match self.kind(entry) {
            NodeKind::MappingEntry { key, .. } => self.scalar_text(*key),
            _ => None,
        }
    }

    /// Comment attached to a mapping entry.
    pub fn entry_comment(&self, entry: NodeId) -> Option<&CommentGroup> {
        match self.kind(entry) {
            NodeKind::MappingEntry { comment, .. } => comment.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}
