//! The edge-based routing graph.
//!
//! Traversal happens on directed edges rather than nodes. Every edge knows the
//! next edge leaving its own source node (its *neighbor*, forming a circular
//! chain per node) and the first edge leaving its target node (its *successor*).
//! Walking the neighbor chain from a successor enumerates every continuation.

pub mod builder;
pub mod edge;

#[doc(inline)]
pub use builder::GraphBuilder;
#[doc(inline)]
pub use edge::{Edge, EdgeId, NodeId};
pub(crate) use edge::EdgeIx;

use crate::error::{Result, TopologyError};
use crate::router::GraphRouter;
use edge::Adjacency;

use rustc_hash::FxHashMap;
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;

/// An immutable, fully linked road graph.
///
/// Produced only by [`GraphBuilder::build`]. Once built, it is never mutated and is
/// safe to share between any number of concurrent routing queries.
pub struct RoutingGraph {
    pub(crate) edges: Vec<Edge>,
    pub(crate) adjacency: Vec<Adjacency>,
    pub(crate) lookup: FxHashMap<EdgeId, EdgeIx>,
    pub(crate) heads: FxHashMap<NodeId, EdgeIx>,
    pub(crate) nodes: usize,
}

impl Debug for RoutingGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RoutingGraph with Edges: {}, Nodes: {}",
            self.edges.len(),
            self.nodes
        )
    }
}

impl RoutingGraph {
    /// Builds a graph in one step from an edge collection.
    pub fn build<I>(edges: I) -> Result<RoutingGraph>
    where
        I: IntoIterator<Item = Edge>,
    {
        let edges = edges.into_iter();
        let mut builder = GraphBuilder::with_capacity(edges.size_hint().0);
        builder.extend(edges)?;

        Ok(builder.build())
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of distinct nodes touched by any edge.
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    pub fn contains(&self, id: EdgeId) -> bool {
        self.lookup.contains_key(&id)
    }

    /// Looks up an edge by identifier.
    pub fn get(&self, id: EdgeId) -> Result<EdgeRef<'_>> {
        self.index_of(id).map(|ix| self.at(ix))
    }

    /// The raw edge record for `id`.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge> {
        self.get(id).map(|edge| edge.edge())
    }

    /// All edges, in the order they were supplied.
    pub fn edges(&self) -> impl ExactSizeIterator<Item = EdgeRef<'_>> + '_ {
        (0..self.edges.len()).map(move |index| self.at(EdgeIx(index as u32)))
    }

    /// A router answering queries over this graph.
    pub fn router(&self) -> GraphRouter<'_> {
        GraphRouter::new(self)
    }

    /// Edges leaving `node`, in input order. Empty for dead ends and unknown nodes.
    pub fn outgoing(&self, node: NodeId) -> Chain<'_> {
        Chain::new(self, self.heads.get(&node).copied())
    }

    #[inline]
    pub(crate) fn index_of(&self, id: EdgeId) -> Result<EdgeIx> {
        self.lookup
            .get(&id)
            .copied()
            .ok_or(TopologyError::EdgeNotFound(id))
    }

    #[inline]
    pub(crate) fn at(&self, ix: EdgeIx) -> EdgeRef<'_> {
        EdgeRef { graph: self, ix }
    }
}

/// A borrowed view of an edge together with its derived links.
#[derive(Copy, Clone)]
pub struct EdgeRef<'g> {
    graph: &'g RoutingGraph,
    ix: EdgeIx,
}

impl Debug for EdgeRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let edge = self.edge();
        write!(
            f,
            "Edge({}: {} -> {}, w={})",
            edge.id, edge.source, edge.target, edge.weight
        )
    }
}

impl PartialEq for EdgeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.ix == other.ix
    }
}

impl Eq for EdgeRef<'_> {}

impl<'g> EdgeRef<'g> {
    #[inline]
    pub fn edge(&self) -> &'g Edge {
        &self.graph.edges[self.ix.index()]
    }

    #[inline]
    pub fn id(&self) -> EdgeId {
        self.edge().id
    }

    #[inline]
    pub fn source(&self) -> NodeId {
        self.edge().source
    }

    #[inline]
    pub fn target(&self) -> NodeId {
        self.edge().target
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.edge().weight
    }

    #[inline]
    pub(crate) fn index(&self) -> EdgeIx {
        self.ix
    }

    /// The next edge sharing this edge's source node. An edge that is alone
    /// at its source node is its own neighbor.
    #[inline]
    pub fn neighbor(&self) -> EdgeRef<'g> {
        match self.graph.adjacency[self.ix.index()].neighbor {
            Some(next) => self.graph.at(next),
            None => *self,
        }
    }

    /// The first edge leaving this edge's target node, or `None` at a dead end.
    #[inline]
    pub fn successor(&self) -> Option<EdgeRef<'g>> {
        self.graph.adjacency[self.ix.index()]
            .successor
            .map(|ix| self.graph.at(ix))
    }

    /// Every edge leaving this edge's target node.
    pub fn successors(&self) -> Chain<'g> {
        Chain::new(self.graph, self.graph.adjacency[self.ix.index()].successor)
    }

    /// Every edge sharing this edge's source node, itself excluded.
    pub fn siblings(&self) -> impl Iterator<Item = EdgeRef<'g>> + 'g {
        let origin = self.ix;
        Chain::new(self.graph, Some(origin)).filter(move |edge| edge.ix != origin)
    }
}

/// Iterates one full turn of a neighbor chain, starting at a given edge.
pub struct Chain<'g> {
    graph: &'g RoutingGraph,
    start: Option<EdgeIx>,
    next: Option<EdgeIx>,
}

impl<'g> Chain<'g> {
    fn new(graph: &'g RoutingGraph, start: Option<EdgeIx>) -> Self {
        Chain {
            graph,
            start,
            next: start,
        }
    }
}

impl<'g> Iterator for Chain<'g> {
    type Item = EdgeRef<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        self.next = self.graph.adjacency[current.index()]
            .neighbor
            .filter(|following| Some(*following) != self.start);

        Some(self.graph.at(current))
    }
}

impl FusedIterator for Chain<'_> {}
