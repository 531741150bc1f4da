//! Core data model for anchorfold: the document arena, deduplication
//! options and the JSON logical view.

pub mod config;
pub mod error;
pub mod json;
pub mod tree;

pub use config::DedupOptions;
pub use error::{CoreError, Result};
pub use tree::{Document, Node, NodeId, NodeKind, ScalarTag};
