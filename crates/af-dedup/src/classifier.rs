//! Threshold classification of scan buckets.

use crate::scanner::HashBuckets;
use std::collections::HashSet;

/// Content hashes seen at least `min_occurrences` times.
#[derive(Debug, Default, Clone)]
pub struct DuplicateSet {
    hashes: HashSet<u64>,
}

impl DuplicateSet {
    pub fn contains(&self, hash: u64) -> bool {
        self.hashes.contains(&hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

pub fn classify(buckets: &HashBuckets, min_occurrences: usize) -> DuplicateSet {
    DuplicateSet {
        hashes: buckets
            .iter()
            .filter(|(_, nodes)| nodes.len() >= min_occurrences)
            .map(|(&hash, _)| hash)
            .collect(),
    }
}
