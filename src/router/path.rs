use crate::graph::{EdgeId, EdgeIx, EdgeRef, RoutingGraph};

use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;

/// The cheapest edge sequence between two positions.
///
/// The first edge is the source position's edge and the last is the target
/// position's edge. When both positions share an edge and the target lies
/// ahead of the source, the path is that single edge.
#[derive(Clone)]
pub struct Path<'g> {
    graph: &'g RoutingGraph,
    edges: Vec<EdgeIx>,
    cost: f64,
}

impl Debug for Path<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Path")
            .field("cost", &self.cost)
            .field("edges", &self.ids())
            .finish()
    }
}

impl<'g> Path<'g> {
    pub(crate) fn new(graph: &'g RoutingGraph, edges: Vec<EdgeIx>, cost: f64) -> Self {
        debug_assert!(!edges.is_empty(), "a path always holds its source edge");
        Path { graph, edges, cost }
    }

    /// Total cost, including the partial first and last edges.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn source(&self) -> EdgeRef<'g> {
        self.graph.at(self.edges[0])
    }

    pub fn target(&self) -> EdgeRef<'g> {
        self.graph.at(self.edges[self.edges.len() - 1])
    }

    pub fn edges(&self) -> impl ExactSizeIterator<Item = EdgeRef<'g>> + '_ {
        self.edges.iter().map(|ix| self.graph.at(*ix))
    }

    pub fn ids(&self) -> Vec<EdgeId> {
        self.edges().map(|edge| edge.id()).collect()
    }
}

impl<'g> IntoIterator for Path<'g> {
    type Item = EdgeRef<'g>;
    type IntoIter = IntoEdges<'g>;

    fn into_iter(self) -> Self::IntoIter {
        IntoEdges {
            graph: self.graph,
            inner: self.edges.into_iter(),
        }
    }
}

/// Consuming iterator over the edges of a [`Path`].
pub struct IntoEdges<'g> {
    graph: &'g RoutingGraph,
    inner: std::vec::IntoIter<EdgeIx>,
}

impl<'g> Iterator for IntoEdges<'g> {
    type Item = EdgeRef<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|ix| self.graph.at(ix))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for IntoEdges<'_> {}
impl FusedIterator for IntoEdges<'_> {}
