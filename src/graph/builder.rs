use crate::error::{Result, TopologyError};
use crate::graph::edge::{Adjacency, Edge, EdgeId, EdgeIx, NodeId};
use crate::graph::RoutingGraph;

use indexmap::IndexMap;
use log::debug;
use measure_time::debug_time;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use smallvec::SmallVec;
use std::hash::BuildHasherDefault;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Accumulates edges for a [`RoutingGraph`].
///
/// The builder is the only mutable phase of a graph's life. [`GraphBuilder::build`]
/// consumes it, derives every adjacency link exactly once, and hands back a frozen
/// graph, so a graph can never be constructed twice.
///
/// ```compile_fail
/// use routers_topology::{Edge, GraphBuilder};
///
/// let mut builder = GraphBuilder::new();
/// builder.push(Edge::new(1, 1, 2, 1.0)).unwrap();
///
/// let graph = builder.build();
/// let again = builder.build(); // builder was moved by the first build
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    edges: Vec<Edge>,
    lookup: FxHashMap<EdgeId, EdgeIx>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        GraphBuilder {
            edges: Vec::with_capacity(capacity),
            lookup: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Number of edges accepted so far.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Adds an edge, rejecting duplicate identifiers and weights
    /// that are negative or not finite.
    pub fn push(&mut self, edge: Edge) -> Result<&mut Self> {
        if !edge.weight.is_finite() || edge.weight < 0.0 {
            return Err(TopologyError::invalid(format!(
                "edge {} has weight {}, weights must be finite and nonnegative",
                edge.id, edge.weight
            )));
        }

        if self.lookup.contains_key(&edge.id) {
            return Err(TopologyError::invalid(format!(
                "duplicate edge id {}",
                edge.id
            )));
        }

        let index = u32::try_from(self.edges.len())
            .map_err(|_| TopologyError::invalid("edge count exceeds the graph arena capacity"))?;

        self.lookup.insert(edge.id, EdgeIx(index));
        self.edges.push(edge);
        Ok(self)
    }

    pub fn extend<I>(&mut self, edges: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Edge>,
    {
        for edge in edges {
            self.push(edge)?;
        }

        Ok(self)
    }

    /// Freezes the builder into a [`RoutingGraph`].
    ///
    /// Edges are grouped by source node in first-seen order. Within each group,
    /// every edge links to the next as its neighbor and the last links back to the
    /// first. Each edge's successor is the head of its target node's group.
    pub fn build(self) -> RoutingGraph {
        debug_time!("RoutingGraph construction");

        let GraphBuilder { edges, lookup } = self;

        let mut groups: FxIndexMap<NodeId, SmallVec<[EdgeIx; 4]>> =
            FxIndexMap::with_capacity_and_hasher(edges.len(), Default::default());

        for (index, edge) in edges.iter().enumerate() {
            groups
                .entry(edge.source)
                .or_default()
                .push(EdgeIx(index as u32));
        }

        let mut adjacency = vec![
            Adjacency {
                neighbor: None,
                successor: None,
            };
            edges.len()
        ];

        for group in groups.values() {
            if group.len() < 2 {
                continue;
            }

            for (current, next) in group.iter().zip(group.iter().cycle().skip(1)) {
                adjacency[current.index()].neighbor = Some(*next);
            }
        }

        let mut dead_ends = 0usize;
        for (index, edge) in edges.iter().enumerate() {
            let successor = groups.get(&edge.target).and_then(|group| group.first().copied());
            if successor.is_none() {
                dead_ends += 1;
            }

            adjacency[index].successor = successor;
        }

        let heads = groups
            .iter()
            .filter_map(|(node, group)| group.first().map(|head| (*node, *head)))
            .collect::<FxHashMap<NodeId, EdgeIx>>();

        let nodes = edges
            .iter()
            .flat_map(|edge| [edge.source, edge.target])
            .collect::<FxHashSet<NodeId>>()
            .len();

        debug!(
            "Constructed routing graph with {} edges over {} nodes ({} dead ends)",
            edges.len(),
            nodes,
            dead_ends
        );

        RoutingGraph {
            edges,
            adjacency,
            lookup,
            heads,
            nodes,
        }
    }
}
