//! anchorfold dedup engine. Replaces repeated subtrees with references to
//! one anchored instance.
//!
//! Passes:
//! 1. Scan: hash every candidate subtree and group by digest
//! 2. Classify: keep digests seen at least `min_occurrences` times
//! 3. Rewrite: anchor the first occurrence, alias the rest
//! 4. Collect: drop anchors nothing refers to
//!
//! Every pass runs under the same [`governor::Governor`]: depth, width and
//! deadline bounds make subtrees ineligible instead of failing the run.

pub mod classifier;
pub mod estimator;
pub mod gc;
pub mod governor;
pub mod hasher;
pub mod limits;
pub mod pipeline;
pub mod pool;
pub mod rewrite;
pub mod scanner;

pub use af_core::{DedupOptions, Document};
pub use limits::LimitStats;
pub use pipeline::{deduplicate, deduplicate_in_place, DedupReport, Deduplicator};
pub use pool::ScratchPool;
