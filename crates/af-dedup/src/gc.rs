//! Removal of anchors nothing ended up referencing.

use crate::rewrite::AnchorRecord;
use af_core::Document;

/// Strip the mark from every created anchor with zero references.
/// Runs over the created anchors only, not the tree. Returns how many were removed.
pub fn remove_unused_anchors(doc: &mut Document, anchors: &[AnchorRecord]) -> usize {
    anchors
        .iter()
        .filter(|a| a.ref_count == 0)
        .filter(|a| doc.clear_anchor(a.node).is_some())
        .count()
}
