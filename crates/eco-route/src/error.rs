//! Routing error type.

use thiserror::Error;

use eco_core::NodeId;

/// Errors produced by `eco-route`.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The frontier emptied before the destination was settled.
    /// `zone_pruned` counts edges excluded by zone restrictions during the
    /// search; zero means the graph itself is disconnected.
    #[error("no route from {from} to {to}")]
    NoRouteFound { from: NodeId, to: NodeId, zone_pruned: usize },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("search cancelled")]
    Cancelled,
}

pub type RouteResult<T> = Result<T, RouteError>;
