//! Second pass: anchor the first occurrence of each duplicate and turn
//! later occurrences into references.
//!
//! The walk mirrors the scanner exactly (same order, same depth labels,
//! same width cut), and eligibility is re-evaluated at every node because
//! earlier replacements may have changed the tree.

use crate::classifier::DuplicateSet;
use crate::estimator::SizeEstimator;
use crate::governor::Governor;
use crate::hasher::CanonicalHasher;
use af_core::{Document, Node, NodeId, NodeKind};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// An anchor created during one rewrite pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorRecord {
    pub node: NodeId,
    pub name: String,
    pub ref_count: usize,
}

#[derive(Debug, Default)]
pub struct RewriteOutcome {
    pub anchors: Vec<AnchorRecord>,
    pub references_created: usize,
}

/// Per-kind anchor name generator scoped to one run.
#[derive(Debug, Default)]
struct AnchorNamer {
    maps: usize,
    lists: usize,
    strs: usize,
    taken: HashSet<String>,
}

impl AnchorNamer {
    fn next(&mut self, kind: NodeKind) -> String {
        loop {
            let name = match kind {
                NodeKind::Mapping => {
                    self.maps += 1;
                    format!("map{}", self.maps)
                }
                NodeKind::Sequence => {
                    self.lists += 1;
                    format!("list{}", self.lists)
                }
                NodeKind::Scalar | NodeKind::Reference => {
                    self.strs += 1;
                    format!("str{}", self.strs)
                }
            };
            if self.taken.insert(name.clone()) {
                return name;
            }
        }
    }
}

pub struct RewriteEngine<'a> {
    gov: &'a Governor,
    hasher: &'a CanonicalHasher<'a>,
    estimator: &'a SizeEstimator<'a>,
    duplicates: &'a DuplicateSet,
    visited: HashMap<u64, NodeId>,
    created: Vec<AnchorRecord>,
    created_index: HashMap<NodeId, usize>,
    names: AnchorNamer,
    // anchors and reference targets that existed before this run
    protected: HashSet<NodeId>,
    references_created: usize,
}

impl<'a> RewriteEngine<'a> {
    pub fn new(
        gov: &'a Governor,
        hasher: &'a CanonicalHasher<'a>,
        estimator: &'a SizeEstimator<'a>,
        duplicates: &'a DuplicateSet,
    ) -> Self {
        Self {
            gov,
            hasher,
            estimator,
            duplicates,
            visited: HashMap::new(),
            created: Vec::new(),
            created_index: HashMap::new(),
            names: AnchorNamer::default(),
            protected: HashSet::new(),
            references_created: 0,
        }
    }

    pub fn rewrite(mut self, doc: &mut Document, root: NodeId) -> RewriteOutcome {
        self.seed_from_existing(doc);
        self.visit(doc, None, root, 0);
        RewriteOutcome {
            anchors: self.created,
            references_created: self.references_created,
        }
    }

    /// Reserve names and pin nodes left behind by an earlier run or by the caller.
    fn seed_from_existing(&mut self, doc: &Document) {
        for id in doc.reachable() {
            if let Some(name) = doc.anchor(id) {
                self.names.taken.insert(name.to_string());
                self.protected.insert(id);
            }
            if let Node::Reference(target) = doc.node(id) {
                self.protected.insert(*target);
            }
        }
    }

    /// `slot` is the parent and child index holding `id`; `None` for the root.
    fn visit(&mut self, doc: &mut Document, slot: Option<(NodeId, usize)>, id: NodeId, depth: usize) {
        if self.gov.enter(depth).is_err() {
            return;
        }

        if self.estimator.is_candidate(doc, id, depth) {
            if let Ok(hash) = self.hasher.hash(doc, id, depth) {
                match self.visited.get(&hash).copied() {
                    Some(canonical) if doc.anchor(canonical).is_some() => {
                        if canonical != id {
                            if let Some((parent, index)) = slot {
                                if self.replace(doc, parent, index, id, canonical) {
                                    // the old subtree is unreachable now
                                    return;
                                }
                            }
                        }
                    }
                    Some(_) => {}
                    None => {
                        if self.duplicates.contains(hash) {
                            self.mark(doc, id, hash);
                        }
                    }
                }
            }
        }

        let visible = self.gov.visible_width(doc.child_count(id));
        for i in 0..visible {
            if let Some(child) = doc.child_at(id, i) {
                self.visit(doc, Some((id, i)), child, depth + 1);
            }
        }
    }

    fn mark(&mut self, doc: &mut Document, id: NodeId, hash: u64) {
        if doc.anchor(id).is_some() {
            // Already canonical from an earlier run: reuse it under its own name.
            self.visited.insert(hash, id);
            return;
        }
        let name = self.names.next(doc.kind(id));
        if doc.set_anchor(id, name.as_str()).is_ok() {
            self.created_index.insert(id, self.created.len());
            self.created.push(AnchorRecord {
                node: id,
                name,
                ref_count: 0,
            });
            self.visited.insert(hash, id);
        }
    }

    fn replace(
        &mut self,
        doc: &mut Document,
        parent: NodeId,
        index: usize,
        old: NodeId,
        canonical: NodeId,
    ) -> bool {
        if !self.protected.is_empty() && self.holds_protected(doc, old) {
            trace!(node = %old, "duplicate holds a pre-existing anchor, not replaced");
            return false;
        }
        let Ok(alias) = doc.reference(canonical) else {
            return false;
        };
        if doc.set_child(parent, index, alias).is_err() {
            return false;
        }
        if let Some(&i) = self.created_index.get(&canonical) {
            self.created[i].ref_count += 1;
        }
        self.references_created += 1;
        true
    }

    fn holds_protected(&self, doc: &Document, id: NodeId) -> bool {
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if self.protected.contains(&n) {
                return true;
            }
            match doc.node(n) {
                Node::Mapping(entries) => stack.extend(entries.iter().flat_map(|&(k, v)| [k, v])),
                Node::Sequence(items) => stack.extend(items.iter().copied()),
                _ => {}
            }
        }
        false
    }
}
