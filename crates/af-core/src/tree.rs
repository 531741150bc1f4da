//! Document arena for anchorfold trees.
//!
//! A [`Document`] owns every node in a flat slot vector and addresses them
//! by [`NodeId`]. Mappings and sequences hold child ids, so a subtree is
//! "owned" by whichever slot lists it. A [`Node::Reference`] is the only
//! non-owning edge: it names a node that lives elsewhere in the arena.
//!
//! Children must exist before their parent is built, and a reference target
//! must exist before the reference, so a document assembled through the
//! builder methods is always acyclic.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense node identifier. Two ids are equal iff they denote the same
/// physical node.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scalar type tag, as resolved by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarTag {
    String,
    Int,
    Float,
    Bool,
    Null,
    Custom(String),
}

impl ScalarTag {
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Null => "null",
            Self::Custom(tag) => tag,
        }
    }
}

impl fmt::Display for ScalarTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node kind without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Scalar,
    Mapping,
    Sequence,
    Reference,
}

impl NodeKind {
    /// Stable one-byte discriminant written ahead of a node's content when hashing.
    pub const fn code(self) -> u8 {
        match self {
            Self::Scalar => 0x01,
            Self::Mapping => 0x02,
            Self::Sequence => 0x03,
            Self::Reference => 0x04,
        }
    }
}

/// A single tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar { tag: ScalarTag, value: String },
    /// Ordered `(key, value)` entries.
    Mapping(Vec<(NodeId, NodeId)>),
    Sequence(Vec<NodeId>),
    /// Non-owning back-reference to a canonical node.
    Reference(NodeId),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Scalar { .. } => NodeKind::Scalar,
            Self::Mapping(_) => NodeKind::Mapping,
            Self::Sequence(_) => NodeKind::Sequence,
            Self::Reference(_) => NodeKind::Reference,
        }
    }

    pub fn is_string_scalar(&self) -> bool {
        matches!(self, Self::Scalar { tag: ScalarTag::String, .. })
    }
}

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    anchor: Option<String>,
}

/// Arena-backed hierarchical document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    slots: Vec<Slot>,
    root: Option<NodeId>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            slots: Vec::with_capacity(nodes),
            root: None,
        }
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Slot { node, anchor: None });
        id
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if id.index() < self.slots.len() {
            Ok(())
        } else {
            Err(CoreError::UnknownNode { id })
        }
    }

    /// Add a tagged scalar.
    pub fn scalar(&mut self, tag: ScalarTag, value: impl Into<String>) -> NodeId {
        self.push(Node::Scalar {
            tag,
            value: value.into(),
        })
    }

    /// Add a string scalar.
    pub fn string(&mut self, value: impl Into<String>) -> NodeId {
        self.scalar(ScalarTag::String, value)
    }

    /// Add a mapping over already-built key and value nodes.
    pub fn mapping(&mut self, entries: Vec<(NodeId, NodeId)>) -> Result<NodeId> {
        for &(k, v) in &entries {
            self.check(k)?;
            self.check(v)?;
        }
        Ok(self.push(Node::Mapping(entries)))
    }

    /// Add a sequence over already-built element nodes.
    pub fn sequence(&mut self, items: Vec<NodeId>) -> Result<NodeId> {
        for &item in &items {
            self.check(item)?;
        }
        Ok(self.push(Node::Sequence(items)))
    }

    /// Add a back-reference. A target that is itself a reference is
    /// collapsed onto its own target.
    pub fn reference(&mut self, target: NodeId) -> Result<NodeId> {
        self.check(target)?;
        let target = self.resolve(target);
        Ok(self.push(Node::Reference(target)))
    }

    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        self.check(id)?;
        self.root = Some(id);
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn try_root(&self) -> Result<NodeId> {
        self.root.ok_or(CoreError::EmptyDocument)
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).map(|s| &s.node)
    }

    /// Look up a node by an id handed out by this document.
    ///
    /// # Panics
    /// If `id` was not produced by this document.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.slots[id.index()].node
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind()
    }

    /// Number of child slots: entries for mappings, elements for sequences.
    pub fn child_count(&self, id: NodeId) -> usize {
        match self.node(id) {
            Node::Mapping(entries) => entries.len(),
            Node::Sequence(items) => items.len(),
            _ => 0,
        }
    }

    /// The `index`th child slot: a mapping value or a sequence element.
    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        match self.node(id) {
            Node::Mapping(entries) => entries.get(index).map(|&(_, v)| v),
            Node::Sequence(items) => items.get(index).copied(),
            _ => None,
        }
    }

    /// Replace a child slot, returning the node that previously occupied it.
    pub fn set_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<NodeId> {
        self.check(parent)?;
        self.check(child)?;
        let slot = match &mut self.slots[parent.index()].node {
            Node::Mapping(entries) => entries.get_mut(index).map(|(_, v)| v),
            Node::Sequence(items) => items.get_mut(index),
            _ => None,
        };
        match slot {
            Some(slot) => Ok(std::mem::replace(slot, child)),
            None => Err(CoreError::SlotOutOfRange { parent, index }),
        }
    }

    /// Raw text of a scalar key; empty for non-scalar keys.
    pub fn key_text(&self, id: NodeId) -> &str {
        match self.node(id) {
            Node::Scalar { value, .. } => value,
            _ => "",
        }
    }

    pub fn anchor(&self, id: NodeId) -> Option<&str> {
        self.slots.get(id.index()).and_then(|s| s.anchor.as_deref())
    }

    pub fn set_anchor(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        self.check(id)?;
        self.slots[id.index()].anchor = Some(name.into());
        Ok(())
    }

    pub fn clear_anchor(&mut self, id: NodeId) -> Option<String> {
        self.slots.get_mut(id.index()).and_then(|s| s.anchor.take())
    }

    /// Follow references until a content-bearing node is reached.
    pub fn resolve(&self, mut id: NodeId) -> NodeId {
        // bounded by the arena size
        for _ in 0..=self.slots.len() {
            match self.node(id) {
                Node::Reference(target) => id = *target,
                _ => break,
            }
        }
        id
    }

    /// Nodes reachable from the root through owning edges, in pre-order.
    /// References are yielded but not followed.
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            match self.node(id) {
                Node::Mapping(entries) => {
                    for &(k, v) in entries.iter().rev() {
                        stack.push(v);
                        stack.push(k);
                    }
                }
                Node::Sequence(items) => stack.extend(items.iter().rev()),
                _ => {}
            }
        }
        out
    }

    /// Anchored nodes reachable from the root.
    pub fn anchors(&self) -> Vec<(NodeId, &str)> {
        self.reachable()
            .into_iter()
            .filter_map(|id| self.anchor(id).map(|a| (id, a)))
            .collect()
    }

    /// Reference nodes reachable from the root, with their targets.
    pub fn references(&self) -> Vec<(NodeId, NodeId)> {
        self.reachable()
            .into_iter()
            .filter_map(|id| match self.node(id) {
                Node::Reference(target) => Some((id, *target)),
                _ => None,
            })
            .collect()
    }

    /// Whether any slot, reachable or not, carries an anchor.
    pub fn has_anchors(&self) -> bool {
        self.slots.iter().any(|s| s.anchor.is_some())
    }

    /// Total number of slots, including content orphaned by rewrites.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
