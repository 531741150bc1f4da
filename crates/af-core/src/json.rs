//! JSON bridge and logical comparison.
//!
//! `to_json` expands every reference, so two documents that differ only in
//! aliasing produce equal values. `serde_json::Map` compares keys without
//! regard to order, which matches mapping equality.

use crate::tree::{Document, Node, NodeId, ScalarTag};
use serde_json::{Map, Number, Value};

impl Document {
    /// Build a document from a JSON value.
    pub fn from_json(value: &Value) -> Self {
        let mut doc = Document::new();
        let root = doc.push_json(value);
        doc.set_root(root).ok();
        doc
    }

    fn push_json(&mut self, value: &Value) -> NodeId {
        match value {
            Value::Null => self.scalar(ScalarTag::Null, "null"),
            Value::Bool(b) => self.scalar(ScalarTag::Bool, b.to_string()),
            Value::Number(n) if n.is_f64() => self.scalar(ScalarTag::Float, n.to_string()),
            Value::Number(n) => self.scalar(ScalarTag::Int, n.to_string()),
            Value::String(s) => self.string(s.as_str()),
            Value::Array(items) => {
                let ids: Vec<NodeId> = items.iter().map(|v| self.push_json(v)).collect();
                self.push(Node::Sequence(ids))
            }
            Value::Object(map) => {
                let entries: Vec<(NodeId, NodeId)> = map
                    .iter()
                    .map(|(k, v)| {
                        let key = self.string(k.as_str());
                        (key, self.push_json(v))
                    })
                    .collect();
                self.push(Node::Mapping(entries))
            }
        }
    }

    /// Render the document with every reference expanded.
    pub fn to_json(&self) -> Value {
        match self.root() {
            Some(root) => self.node_to_json(root),
            None => Value::Null,
        }
    }

    /// Render one subtree with every reference expanded.
    pub fn node_to_json(&self, id: NodeId) -> Value {
        match self.node(self.resolve(id)) {
            Node::Scalar { tag, value } => scalar_to_json(tag, value),
            Node::Sequence(items) => Value::Array(items.iter().map(|&c| self.node_to_json(c)).collect()),
            Node::Mapping(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for &(k, v) in entries {
                    map.insert(self.key_to_string(k), self.node_to_json(v));
                }
                Value::Object(map)
            }
            // resolve() never stops on a reference unless the arena loops
            Node::Reference(_) => Value::Null,
        }
    }

    fn key_to_string(&self, key: NodeId) -> String {
        match self.node(self.resolve(key)) {
            Node::Scalar { value, .. } => value.clone(),
            _ => self.node_to_json(key).to_string(),
        }
    }

    /// Structural equality with references resolved: unordered mapping keys,
    /// ordered sequences, exact scalar tag and text.
    pub fn logically_eq(&self, other: &Document) -> bool {
        match (self.root(), other.root()) {
            (Some(a), Some(b)) => nodes_eq(self, a, other, b),
            (None, None) => true,
            _ => false,
        }
    }
}

fn scalar_to_json(tag: &ScalarTag, value: &str) -> Value {
    match tag {
        ScalarTag::Null => Value::Null,
        ScalarTag::Bool => match value {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(value.to_string()),
        },
        ScalarTag::Int | ScalarTag::Float => value
            .parse::<Number>()
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(value.to_string())),
        ScalarTag::String | ScalarTag::Custom(_) => Value::String(value.to_string()),
    }
}

fn nodes_eq(a_doc: &Document, a: NodeId, b_doc: &Document, b: NodeId) -> bool {
    match (a_doc.node(a_doc.resolve(a)), b_doc.node(b_doc.resolve(b))) {
        (Node::Scalar { tag: ta, value: va }, Node::Scalar { tag: tb, value: vb }) => ta == tb && va == vb,
        (Node::Sequence(xs), Node::Sequence(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(&x, &y)| nodes_eq(a_doc, x, b_doc, y))
        }
        (Node::Mapping(xs), Node::Mapping(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|&(xk, xv)| {
                    ys.iter().any(|&(yk, yv)| {
                        nodes_eq(a_doc, xk, b_doc, yk) && nodes_eq(a_doc, xv, b_doc, yv)
                    })
                })
        }
        _ => false,
    }
}
