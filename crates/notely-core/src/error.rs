//! Error types for notely-core

use thiserror::Error;

use crate::dom::NodeId;

/// Result type alias using notely-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a document
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// Node id does not belong to this document
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Appending would make a node its own ancestor
    #[error("Cannot append {child} under {parent}: would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    /// Node is already attached somewhere else
    #[error("Node {0} already has a parent")]
    AlreadyAttached(NodeId),

    /// The document root cannot be moved or detached
    #[error("The document root cannot be moved")]
    RootNode,
}
