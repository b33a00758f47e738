use std::time::Duration;

use thiserror::Error;

use belkit_graph::GraphError;

#[derive(Debug, Error)]
pub enum AlgoError {
    #[error("target node is not in the graph: {0}")]
    TargetNotFound(String),

    #[error("diffusion has not terminated: the target node is still unscored")]
    NotComplete,

    #[error("no removable edge while breaking a cycle")]
    NoRemovableEdge,

    #[error("trial started after the deadline ({0:?} elapsed)")]
    DeadlineExceeded(Duration),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
