//! Archive content tree
//!
//! The tree is an arena: nodes live in one `Vec` and refer to their parent and
//! children by [`NodeId`]. Node 0 is always the root. Child order is listing
//! order (or sorted order after [`FileTree::sort`]).
//!
//! Each node carries an `extracted` flag that only ever goes from false to
//! true; a refresh replaces the whole tree instead of clearing flags.

mod display;


use chrono::NaiveDateTime;
use serde::ser::{Error as _, SerializeSeq, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

use crate::counter::{CountKind, FileCounter};
use crate::utils::{segment_eq, segments};

/// Index of a node inside its [`FileTree`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Name and metadata of a directory or file entry
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Last path segment
    pub name: String,
    /// Modification time reported by the listing
    pub modified: Option<NaiveDateTime>,
    /// Name of the enclosing directory (empty at top level)
    pub parent: Option<String>,
}

impl Entry {
    /// Entry with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// What a node stands for
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeValue {
    /// Synthetic placeholder, only ever the root
    #[default]
    None,
    /// Directory
    Dir(Entry),
    /// Regular file
    File(Entry),
}

impl NodeValue {
    /// Directory value with the given name
    pub fn dir(name: impl Into<String>) -> Self {
        NodeValue::Dir(Entry::named(name))
    }

    /// File value with the given name
    pub fn file(name: impl Into<String>) -> Self {
        NodeValue::File(Entry::named(name))
    }

    /// Name of a directory or file; placeholders have none
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeValue::None => None,
            NodeValue::Dir(entry) | NodeValue::File(entry) => Some(&entry.name),
        }
    }

    /// Whether this is the synthetic placeholder
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, NodeValue::None)
    }

    /// Whether this is a directory
    pub const fn is_dir(&self) -> bool {
        matches!(self, NodeValue::Dir(_))
    }

    /// Whether this is a regular file
    pub const fn is_file(&self) -> bool {
        matches!(self, NodeValue::File(_))
    }

    /// Counter slot an extraction of this node increments
    pub const fn count_kind(&self) -> CountKind {
        match self {
            NodeValue::None | NodeValue::Dir(_) => CountKind::Directory,
            NodeValue::File(_) => CountKind::File,
        }
    }

    /// Whether a progress path segment selects this node
    ///
    /// Placeholders match any segment; a tree only holds one, at its root.
    pub fn matches_segment(&self, segment: &str) -> bool {
        match self {
            NodeValue::None => true,
            NodeValue::Dir(entry) | NodeValue::File(entry) => segment_eq(&entry.name, segment),
        }
    }
}

/// One node of the arena
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileTreeNode {
    /// What the node stands for
    pub value: NodeValue,
    extracted: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl FileTreeNode {
    fn new(value: NodeValue, parent: Option<NodeId>) -> Self {
        Self {
            value,
            extracted: false,
            parent,
            children: Vec::new(),
        }
    }

    /// Whether the extractor has reported this entry
    pub fn is_extracted(&self) -> bool {
        self.extracted
    }

    /// Parent node, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Rooted, ordered tree of archive entries
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileTree {
    nodes: Vec<FileTreeNode>,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTree {
    /// Tree consisting of a single placeholder root
    pub fn new() -> Self {
        Self {
            nodes: vec![FileTreeNode::new(NodeValue::None, None)],
        }
    }

    /// The root node id
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds nothing but its root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Node by id
    pub fn get(&self, id: NodeId) -> Option<&FileTreeNode> {
        self.nodes.get(id.0)
    }

    /// Children of `id` in order (empty for unknown ids)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(FileTreeNode::children).unwrap_or(&[])
    }

    /// Whether the listing had at most one top-level entry
    ///
    /// When it had more, the extractor wraps everything into one extra
    /// directory that the listing does not mention.
    pub fn has_single_root(&self) -> bool {
        self.children(self.root()).len() <= 1
    }

    /// Append `value` as the last child of `parent`
    ///
    /// Returns `None` if `parent` is not a node of this tree or `value` is a
    /// placeholder; only the root may be one, since a placeholder matches any
    /// segment and would shadow its later siblings.
    pub fn append_child(&mut self, parent: NodeId, value: NodeValue) -> Option<NodeId> {
        if parent.0 >= self.nodes.len() || value.is_placeholder() {
            return None;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(FileTreeNode::new(value, Some(parent)));
        self.nodes[parent.0].children.push(id);
        Some(id)
    }

    /// Insert a listed path, creating missing intermediate directories
    ///
    /// Existing nodes are reused by exact name. The last segment becomes a
    /// file unless `is_dir` is set; every other created node is a directory.
    /// Returns the node of the last segment (the root for an empty path).
    pub fn append_path(
        &mut self,
        path: &str,
        is_dir: bool,
        modified: Option<NaiveDateTime>,
    ) -> NodeId {
        let parts = segments(path);
        let mut current = self.root();
        let mut parent_name = String::new();

        for (i, part) in parts.iter().enumerate() {
            let existing = self
                .children(current)
                .iter()
                .copied()
                .find(|&child| self.nodes[child.0].value.name() == Some(*part));
            current = match existing {
                Some(child) => child,
                None => {
                    let entry = Entry {
                        name: (*part).to_string(),
                        modified,
                        parent: Some(parent_name.clone()),
                    };
                    let value = if i + 1 == parts.len() && !is_dir {
                        NodeValue::File(entry)
                    } else {
                        NodeValue::Dir(entry)
                    };
                    let id = NodeId(self.nodes.len());
                    self.nodes.push(FileTreeNode::new(value, Some(current)));
                    self.nodes[current.0].children.push(id);
                    id
                }
            };
            parent_name = (*part).to_string();
        }
        current
    }

    /// First child of `parent` selected by `segment`
    pub fn find_child(&self, parent: NodeId, segment: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.nodes[child.0].value.matches_segment(segment))
    }

    /// Flip the extracted flag of `id` from false to true
    ///
    /// Returns true only on the transition; already extracted or unknown nodes
    /// return false.
    pub fn mark_extracted(&mut self, id: NodeId) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(node) if !node.extracted => {
                node.extracted = true;
                true
            }
            _ => false,
        }
    }

    /// Node ids in depth-first pre-order, starting at `id`
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack = if id.0 < self.nodes.len() {
            vec![id]
        } else {
            Vec::new()
        };
        Descendants { tree: self, stack }
    }

    /// Count the entries the extractor is expected to report
    ///
    /// Every `Dir` adds one directory, every `File` one file; the placeholder
    /// root adds nothing. Without a single root directory one more directory
    /// is expected for the folder the extractor creates around the contents.
    pub fn count_all(&self, has_root_dir: bool) -> FileCounter {
        let mut directories = if has_root_dir { 0 } else { 1 };
        let mut files = 0;
        for id in self.descendants(self.root()) {
            match &self.nodes[id.0].value {
                NodeValue::None => {}
                NodeValue::Dir(_) => directories += 1,
                NodeValue::File(_) => files += 1,
            }
        }
        FileCounter::with_totals(directories, files)
    }

    /// Order every child list: directories first, then by name
    pub fn sort(&mut self) {
        for i in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[i].children);
            children.sort_by(|a, b| {
                let (a, b) = (&self.nodes[a.0].value, &self.nodes[b.0].value);
                b.is_dir()
                    .cmp(&a.is_dir())
                    .then_with(|| a.name().cmp(&b.name()))
            });
            self.nodes[i].children = children;
        }
    }

    /// Borrowed nested view of the subtree at `id`, serializable as
    /// `{ value, children, extracted }`
    pub fn view(&self, id: NodeId) -> NodeView<'_> {
        NodeView {
            tree: self,
            id,
            depth: 0,
        }
    }
}

/// Pre-order traversal, see [`FileTree::descendants`]
pub struct Descendants<'a> {
    tree: &'a FileTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Nesting deeper than this is refused when serializing a [`NodeView`]
pub const MAX_SERIALIZE_DEPTH: usize = 256;

/// Read-only nested view of one subtree
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    tree: &'a FileTree,
    id: NodeId,
    depth: usize,
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Some(node) = self.tree.get(self.id) else {
            return serializer.serialize_none();
        };
        if self.depth > MAX_SERIALIZE_DEPTH {
            return Err(S::Error::custom(format!(
                "tree nested deeper than {MAX_SERIALIZE_DEPTH} levels"
            )));
        }
        let mut state = serializer.serialize_struct("FileTreeNode", 3)?;
        state.serialize_field("value", &node.value)?;
        state.serialize_field("children", &ChildViews(*self, node.children()))?;
        state.serialize_field("extracted", &node.extracted)?;
        state.end()
    }
}

struct ChildViews<'a>(NodeView<'a>, &'a [NodeId]);

impl Serialize for ChildViews<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let parent = self.0;
        let mut seq = serializer.serialize_seq(Some(self.1.len()))?;
        for &id in self.1 {
            seq.serialize_element(&NodeView {
                tree: parent.tree,
                id,
                depth: parent.depth + 1,
            })?;
        }
        seq.end()
    }
}

impl Serialize for FileTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.view(self.root()).serialize(serializer)
    }
}
