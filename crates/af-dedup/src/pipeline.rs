//! Deduplication pipeline: scan, classify, rewrite, collect.

use crate::classifier::classify;
use crate::estimator::SizeEstimator;
use crate::gc::remove_unused_anchors;
use crate::governor::Governor;
use crate::hasher::CanonicalHasher;
use crate::limits::LimitStats;
use crate::pool::ScratchPool;
use crate::rewrite::RewriteEngine;
use crate::scanner::DuplicateScanner;
use af_core::{DedupOptions, Document};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Statistics for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupReport {
    pub nodes_scanned: usize,
    pub candidates: usize,
    pub duplicate_groups: usize,
    pub anchors_created: usize,
    pub anchors_removed: usize,
    pub references_created: usize,
    pub limits: LimitStats,
    pub elapsed: Duration,
}

impl DedupReport {
    /// Anchors still present after garbage collection.
    pub fn anchors_kept(&self) -> usize {
        self.anchors_created - self.anchors_removed
    }

    /// Whether any bound cut the run short.
    pub fn is_degraded(&self) -> bool {
        self.limits.total() > 0
    }
}

/// Reusable deduplication driver.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    options: DedupOptions,
    pool: Arc<ScratchPool>,
}

impl Deduplicator {
    pub fn new(options: DedupOptions) -> Self {
        Self {
            options: options.normalized(),
            pool: Arc::new(ScratchPool::new()),
        }
    }

    /// Share a scratch pool with other drivers, possibly on other threads.
    pub fn with_pool(mut self, pool: Arc<ScratchPool>) -> Self {
        self.pool = pool;
        self
    }

    pub fn options(&self) -> &DedupOptions {
        &self.options
    }

    /// Deduplicate `doc` in place. Bounds only reduce how much gets
    /// deduplicated; the run itself cannot fail.
    pub fn run(&self, doc: &mut Document) -> DedupReport {
        let started = Instant::now();
        let Some(root) = doc.root() else {
            return DedupReport::default();
        };

        let gov = Governor::new(&self.options);
        let hasher = CanonicalHasher::new(&gov, &self.pool);
        let estimator = SizeEstimator::new(&gov);

        let scan = DuplicateScanner::new(&gov, &hasher, &estimator).scan(doc, root);
        let duplicates = classify(&scan.buckets, gov.min_occurrences());
        let outcome = RewriteEngine::new(&gov, &hasher, &estimator, &duplicates).rewrite(doc, root);
        let anchors_removed = remove_unused_anchors(doc, &outcome.anchors);

        let report = DedupReport {
            nodes_scanned: scan.nodes_scanned,
            candidates: scan.candidates,
            duplicate_groups: duplicates.len(),
            anchors_created: outcome.anchors.len(),
            anchors_removed,
            references_created: outcome.references_created,
            limits: gov.limits(),
            elapsed: started.elapsed(),
        };
        debug!(
            nodes = report.nodes_scanned,
            candidates = report.candidates,
            groups = report.duplicate_groups,
            anchors = report.anchors_kept(),
            references = report.references_created,
            degraded = report.is_degraded(),
            elapsed_us = report.elapsed.as_micros() as u64,
            "deduplication finished"
        );
        report
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DedupOptions::default())
    }
}

/// Deduplicate a document and hand the same document back.
pub fn deduplicate(mut doc: Document, options: &DedupOptions) -> Document {
    Deduplicator::new(options.clone()).run(&mut doc);
    doc
}

/// Deduplicate in place and report what happened.
pub fn deduplicate_in_place(doc: &mut Document, options: &DedupOptions) -> DedupReport {
    Deduplicator::new(options.clone()).run(doc)
}
