use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NodeNotFound(uuid::Uuid),

    #[error("edge not found: {0}")]
    EdgeNotFound(uuid::Uuid),

    #[error("edge endpoints must be inserted before the edge: {from} -> {to}")]
    DanglingEdge { from: uuid::Uuid, to: uuid::Uuid },

    #[error("cannot merge a node into itself: {0}")]
    SelfMerge(uuid::Uuid),
}
