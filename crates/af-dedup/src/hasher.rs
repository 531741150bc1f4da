//! Canonical content hashing of subtrees.
//!
//! The digest of a node is its kind code followed by its content:
//! - scalars: tag and raw text
//! - mappings: entries sorted by key text, each key digest followed by the
//!   value's content
//! - sequences: children in their original order
//! - references: the content of the referenced node, so an alias hashes
//!   exactly like the subtree it stands for
//!
//! Hashing is all-or-nothing. If any node below the start point trips a
//! bound the whole hash fails, so no digest ever covers a partial subtree.

use crate::governor::Governor;
use crate::limits::LimitExceeded;
use crate::pool::ScratchPool;
use af_core::{Document, Node, NodeId};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub struct CanonicalHasher<'a> {
    gov: &'a Governor,
    pool: &'a ScratchPool,
}

impl<'a> CanonicalHasher<'a> {
    pub fn new(gov: &'a Governor, pool: &'a ScratchPool) -> Self {
        Self { gov, pool }
    }

    /// 64-bit digest of the subtree at `id`, which sits `depth` levels below the root.
    pub fn hash(&self, doc: &Document, id: NodeId, depth: usize) -> Result<u64, LimitExceeded> {
        let mut h = DefaultHasher::new();
        self.write_node(&mut h, doc, id, depth)?;
        Ok(h.finish())
    }

    fn write_node(
        &self,
        h: &mut DefaultHasher,
        doc: &Document,
        id: NodeId,
        depth: usize,
    ) -> Result<(), LimitExceeded> {
        self.gov.enter(depth)?;

        let node = doc.node(id);
        match node {
            Node::Reference(target) => self.write_node(h, doc, *target, depth + 1),
            Node::Scalar { tag, value } => {
                h.write_u8(node.kind().code());
                tag.hash(h);
                value.hash(h);
                Ok(())
            }
            Node::Sequence(items) => {
                self.gov.check_width(items.len())?;
                h.write_u8(node.kind().code());
                h.write_usize(items.len());
                for &child in items {
                    self.write_node(h, doc, child, depth + 1)?;
                }
                Ok(())
            }
            Node::Mapping(entries) => {
                self.gov.check_width(entries.len())?;
                h.write_u8(node.kind().code());
                h.write_usize(entries.len());

                let mut order = self.pool.checkout();
                for (i, &(key, _)) in entries.iter().enumerate() {
                    order.push((self.key_digest(doc, key, depth + 1)?, i));
                }
                order.sort_by(|a, b| {
                    key_text(doc, entries[a.1].0)
                        .cmp(key_text(doc, entries[b.1].0))
                        .then(a.0.cmp(&b.0))
                });

                for &(digest, i) in order.iter() {
                    h.write_u64(digest);
                    self.write_node(h, doc, entries[i].1, depth + 1)?;
                }
                Ok(())
            }
        }
    }

    /// Scalar keys digest their tag and text; complex keys their full content.
    fn key_digest(&self, doc: &Document, key: NodeId, depth: usize) -> Result<u64, LimitExceeded> {
        match doc.node(doc.resolve(key)) {
            Node::Scalar { tag, value } => {
                let mut h = DefaultHasher::new();
                tag.hash(&mut h);
                value.hash(&mut h);
                Ok(h.finish())
            }
            _ => self.hash(doc, key, depth),
        }
    }
}

fn key_text(doc: &Document, key: NodeId) -> &str {
    doc.key_text(doc.resolve(key))
}
