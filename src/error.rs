use crate::graph::EdgeId;
use thiserror::Error;

/// Contract violations raised while building a [`RoutingGraph`](crate::RoutingGraph)
/// or issuing a query against it.
///
/// Unreachable targets are never reported through this type, they are a normal
/// outcome of a bounded search and surface as `None` or as an absent map entry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("edge {0} does not exist in the routing graph")]
    EdgeNotFound(EdgeId),
}

impl TopologyError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        TopologyError::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, TopologyError>;
