use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MIN_OCCURRENCES: usize = 2;
pub const DEFAULT_MIN_SIZE: usize = 20;
pub const DEFAULT_MAX_DEPTH: usize = 50;
pub const DEFAULT_MAX_WIDTH: usize = 10_000;

/// Deduplication bounds and thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupOptions {
    /// Occurrences needed before content is anchored.
    pub min_occurrences: usize,
    /// Minimum estimated size, in characters, of a candidate subtree.
    pub min_size: usize,
    /// Deepest level (root = 0) the engine will look at.
    pub max_depth: usize,
    /// Children processed per mapping or sequence.
    pub max_width: usize,
    /// Wall-clock budget for a whole run. Zero means unbounded.
    #[serde(rename = "time_limit_ms", with = "duration_ms")]
    pub time_limit: Duration,
}

impl Default for DedupOptions {
    fn default() -> Self {
        Self {
            min_occurrences: DEFAULT_MIN_OCCURRENCES,
            min_size: DEFAULT_MIN_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            max_width: DEFAULT_MAX_WIDTH,
            time_limit: Duration::ZERO,
        }
    }
}

impl DedupOptions {
    /// Load options from a JSON document. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Copy with zero-valued bounds replaced by their defaults.
    pub fn normalized(&self) -> Self {
        fn or_default(v: usize, d: usize) -> usize {
            if v == 0 { d } else { v }
        }
        Self {
            min_occurrences: or_default(self.min_occurrences, DEFAULT_MIN_OCCURRENCES),
            min_size: or_default(self.min_size, DEFAULT_MIN_SIZE),
            max_depth: or_default(self.max_depth, DEFAULT_MAX_DEPTH),
            max_width: or_default(self.max_width, DEFAULT_MAX_WIDTH),
            time_limit: self.time_limit,
        }
    }

    pub fn with_min_occurrences(mut self, n: usize) -> Self {
        self.min_occurrences = n;
        self
    }

    pub fn with_min_size(mut self, n: usize) -> Self {
        self.min_size = n;
        self
    }

    pub fn with_max_depth(mut self, n: usize) -> Self {
        self.max_depth = n;
        self
    }

    pub fn with_max_width(mut self, n: usize) -> Self {
        self.max_width = n;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
