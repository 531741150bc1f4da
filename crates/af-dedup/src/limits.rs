//! Bound violations raised while walking a document.
//!
//! These never reach callers of the pipeline. A traversal that receives one
//! treats the current subtree as ineligible and moves on.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitExceeded {
    #[error("depth {depth} exceeds max depth {max}")]
    Depth { depth: usize, max: usize },
    #[error("{count} children exceed max width {max}")]
    Width { count: usize, max: usize },
    #[error("deadline passed")]
    Deadline,
}

/// How many times each bound cut a traversal short during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LimitStats {
    pub depth: usize,
    pub width: usize,
    pub deadline: usize,
}

impl LimitStats {
    pub fn total(&self) -> usize {
        self.depth + self.width + self.deadline
    }

    pub(crate) fn record(&mut self, limit: &LimitExceeded) {
        match limit {
            LimitExceeded::Depth { .. } => self.depth += 1,
            LimitExceeded::Width { .. } => self.width += 1,
            LimitExceeded::Deadline => self.deadline += 1,
        }
    }
}
