//! First pass: group candidate subtrees by content hash.

use crate::estimator::SizeEstimator;
use crate::governor::Governor;
use crate::hasher::CanonicalHasher;
use af_core::{Document, NodeId};
use std::collections::HashMap;
use tracing::trace;

/// Content hash → candidate nodes, in traversal order.
pub type HashBuckets = HashMap<u64, Vec<NodeId>>;

#[derive(Debug, Default)]
pub struct ScanResult {
    pub buckets: HashBuckets,
    pub nodes_scanned: usize,
    pub candidates: usize,
}

pub struct DuplicateScanner<'a> {
    gov: &'a Governor,
    hasher: &'a CanonicalHasher<'a>,
    estimator: &'a SizeEstimator<'a>,
    result: ScanResult,
}

impl<'a> DuplicateScanner<'a> {
    pub fn new(gov: &'a Governor, hasher: &'a CanonicalHasher<'a>, estimator: &'a SizeEstimator<'a>) -> Self {
        Self {
            gov,
            hasher,
            estimator,
            result: ScanResult::default(),
        }
    }

    /// Walk the tree from `root` (depth 0).
    pub fn scan(mut self, doc: &Document, root: NodeId) -> ScanResult {
        self.visit(doc, root, 0);
        self.result
    }

    fn visit(&mut self, doc: &Document, id: NodeId, depth: usize) {
        if self.gov.enter(depth).is_err() {
            return;
        }
        self.result.nodes_scanned += 1;

        if self.estimator.is_candidate(doc, id, depth) {
            match self.hasher.hash(doc, id, depth) {
                Ok(hash) => {
                    self.result.candidates += 1;
                    self.result.buckets.entry(hash).or_default().push(id);
                }
                Err(limit) => trace!(node = %id, %limit, "candidate skipped"),
            }
        }

        // Ineligible wrappers may still hold eligible children.
        let visible = self.gov.visible_width(doc.child_count(id));
        for i in 0..visible {
            if let Some(child) = doc.child_at(id, i) {
                self.visit(doc, child, depth + 1);
            }
        }
    }
}
