//! Resource governor shared by every pass of one run.

use crate::limits::{LimitExceeded, LimitStats};
use af_core::DedupOptions;
use std::cell::Cell;
use std::time::Instant;
use tracing::trace;

/// Depth, width and deadline bounds plus the duplicate thresholds.
///
/// Built once per run; the deadline is measured from construction.
#[derive(Debug)]
pub struct Governor {
    min_occurrences: usize,
    min_size: usize,
    max_depth: usize,
    max_width: usize,
    deadline: Option<Instant>,
    hits: Cell<LimitStats>,
    deadline_logged: Cell<bool>,
}

impl Governor {
    pub fn new(options: &DedupOptions) -> Self {
        let o = options.normalized();
        let deadline = if o.time_limit.is_zero() {
            None
        } else {
            Some(Instant::now() + o.time_limit)
        };
        Self {
            min_occurrences: o.min_occurrences,
            min_size: o.min_size,
            max_depth: o.max_depth,
            max_width: o.max_width,
            deadline,
            hits: Cell::new(LimitStats::default()),
            deadline_logged: Cell::new(false),
        }
    }

    pub fn min_occurrences(&self) -> usize {
        self.min_occurrences
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_width(&self) -> usize {
        self.max_width
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Non-recording check used by the estimator.
    pub fn allows(&self, depth: usize) -> bool {
        depth <= self.max_depth && !self.deadline_passed()
    }

    /// Gate at every traversal entry point: depth first, then the clock.
    pub fn enter(&self, depth: usize) -> Result<(), LimitExceeded> {
        if depth > self.max_depth {
            return Err(self.hit(LimitExceeded::Depth {
                depth,
                max: self.max_depth,
            }));
        }
        if self.deadline_passed() {
            if !self.deadline_logged.replace(true) {
                trace!(depth, "deadline passed, skipping remaining subtrees");
            }
            return Err(self.hit(LimitExceeded::Deadline));
        }
        Ok(())
    }

    /// Refuse containers with more children than the width bound.
    pub fn check_width(&self, count: usize) -> Result<(), LimitExceeded> {
        if count > self.max_width {
            Err(self.hit(LimitExceeded::Width {
                count,
                max: self.max_width,
            }))
        } else {
            Ok(())
        }
    }

    /// Number of leading children a traversal may visit.
    pub fn visible_width(&self, count: usize) -> usize {
        if count > self.max_width {
            self.hit(LimitExceeded::Width {
                count,
                max: self.max_width,
            });
            self.max_width
        } else {
            count
        }
    }

    pub fn limits(&self) -> LimitStats {
        self.hits.get()
    }

    fn hit(&self, limit: LimitExceeded) -> LimitExceeded {
        let mut stats = self.hits.get();
        stats.record(&limit);
        self.hits.set(stats);
        limit
    }
}
