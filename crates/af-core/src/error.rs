use thiserror::Error;

use crate::tree::NodeId;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown node: {id}")]
    UnknownNode { id: NodeId },
    #[error("Slot {index} out of range for node {parent}")]
    SlotOutOfRange { parent: NodeId, index: usize },
    #[error("Document has no root")]
    EmptyDocument,
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
