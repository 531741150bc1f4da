//! Bounded size estimate of a subtree, in bytes of scalar text.
//!
//! Anything past the depth bound, past the width bound or after the
//! deadline counts as zero, so the estimate can only undercount. That keeps
//! eligibility conservative.

use crate::governor::Governor;
use af_core::{Document, Node, NodeId};

pub struct SizeEstimator<'a> {
    gov: &'a Governor,
}

impl<'a> SizeEstimator<'a> {
    pub fn new(gov: &'a Governor) -> Self {
        Self { gov }
    }

    pub fn estimate(&self, doc: &Document, id: NodeId, depth: usize) -> usize {
        if !self.gov.allows(depth) {
            return 0;
        }
        let width = self.gov.max_width();
        match doc.node(id) {
            Node::Scalar { value, .. } => value.len(),
            Node::Mapping(entries) => entries
                .iter()
                .take(width)
                .map(|&(k, v)| self.estimate(doc, k, depth + 1) + self.estimate(doc, v, depth + 1))
                .sum(),
            Node::Sequence(items) => items
                .iter()
                .take(width)
                .map(|&c| self.estimate(doc, c, depth + 1))
                .sum(),
            Node::Reference(target) => self.estimate(doc, *target, depth + 1),
        }
    }

    /// Mappings, sequences and string scalars whose estimate reaches the
    /// minimum size are candidates for deduplication.
    pub fn is_candidate(&self, doc: &Document, id: NodeId, depth: usize) -> bool {
        let node = doc.node(id);
        let kind_ok = matches!(node, Node::Mapping(_) | Node::Sequence(_)) || node.is_string_scalar();
        kind_ok && self.estimate(doc, id, depth) >= self.gov.min_size()
    }
}
