#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub type EdgeId = i64;
pub type NodeId = i64;

/// A directed road segment, as supplied by the network loader.
///
/// The record itself carries no adjacency. Neighbor and successor links are
/// derived once by the [`GraphBuilder`](crate::GraphBuilder) and live inside the
/// resulting [`RoutingGraph`](crate::RoutingGraph).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

impl Edge {
    #[inline]
    pub const fn new(id: EdgeId, source: NodeId, target: NodeId, weight: f64) -> Self {
        Edge {
            id,
            source,
            target,
            weight,
        }
    }

    /// The edge weight as a cost function, the common choice for
    /// [`Costing::new`](crate::router::Costing::new).
    #[inline]
    pub fn weight(edge: &Edge) -> f64 {
        edge.weight
    }
}

/// Position of an edge inside the graph arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct EdgeIx(pub(crate) u32);

impl EdgeIx {
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Derived links of a single edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Adjacency {
    /// Next edge leaving the same source node. `None` when the edge is
    /// the only one leaving its source, i.e. the chain loops onto itself.
    pub(crate) neighbor: Option<EdgeIx>,
    /// First edge (in input order) leaving this edge's target node.
    /// `None` marks a dead end.
    pub(crate) successor: Option<EdgeIx>,
}
