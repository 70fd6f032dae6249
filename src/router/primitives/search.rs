use crate::error::Result;
use crate::graph::{EdgeIx, EdgeRef, RoutingGraph};
use crate::router::Costing;

use indexmap::map::Entry;
use indexmap::IndexMap;
use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::BuildHasherDefault;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Parent sentinel of edges entered straight off the partial source edge.
const START: usize = usize::MAX;

/// A resolved position: arena index of its edge and the fraction along it.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Anchor {
    pub(crate) edge: EdgeIx,
    pub(crate) fraction: f64,
}

/// A target reached by [`BoundedSearch`].
#[derive(Clone, Debug)]
pub(crate) struct Reached {
    pub(crate) cost: f64,
    pub(crate) edges: Vec<EdgeIx>,
}

/// How a target was completed.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Via {
    /// Target lies ahead of the source on the source edge itself.
    Direct,
    /// Target edge was entered through the label at this index.
    Label(usize),
}

#[derive(Copy, Clone, Debug)]
enum Step {
    /// Completes the target at this input index.
    Finish(usize),
    /// Expands the label at this index, holding the given edge.
    Expand(usize, EdgeIx),
}

#[derive(Debug)]
struct SmallestHolder {
    priority: f64,
    rank: (u8, i64),
    step: Step,
}

impl PartialEq for SmallestHolder {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SmallestHolder {}

impl PartialOrd for SmallestHolder {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestHolder {
    // Min-heap on priority, then on rank: completions before expansions,
    // then by target order or edge id.
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.rank.cmp(&self.rank))
    }
}

#[derive(Copy, Clone, Debug)]
struct Label {
    /// Cost accrued on arrival at the edge's source node.
    cost: f64,
    parent: usize,
}

/// A single-source, cost-bounded search over the edge graph.
///
/// Labels are keyed by edge and record the cost of arriving at that edge's source
/// node. The partial source edge is handled outside the label table, so a route
/// that loops back onto its own source edge is still representable. Routes always
/// list the source edge first, even when they switch off it at its source node.
pub(crate) struct BoundedSearch<'s> {
    graph: &'s RoutingGraph,
    costing: &'s Costing<'s>,

    to_see: BinaryHeap<SmallestHolder>,
    seen: FxHashSet<usize>,
    labels: FxIndexMap<EdgeIx, Label>,

    targets: &'s [Anchor],
    on_edge: FxHashMap<EdgeIx, SmallVec<[usize; 2]>>,
    offered: Vec<Option<(f64, Via)>>,
    resolved: Vec<bool>,
}

impl<'s> BoundedSearch<'s> {
    pub(crate) fn new(
        graph: &'s RoutingGraph,
        costing: &'s Costing<'s>,
        targets: &'s [Anchor],
    ) -> Self {
        let mut on_edge: FxHashMap<EdgeIx, SmallVec<[usize; 2]>> = FxHashMap::default();
        for (index, target) in targets.iter().enumerate() {
            on_edge.entry(target.edge).or_default().push(index);
        }

        BoundedSearch {
            graph,
            costing,
            to_see: BinaryHeap::with_capacity(256),
            seen: FxHashSet::default(),
            labels: FxIndexMap::with_capacity_and_hasher(64, Default::default()),
            targets,
            on_edge,
            offered: vec![None; targets.len()],
            resolved: vec![false; targets.len()],
        }
    }

    /// Runs the search from `source`, returning one entry per target in input
    /// order. Targets costlier than the ceiling, or unreachable, are `None`.
    pub(crate) fn run(mut self, source: Anchor) -> Result<Vec<Option<Reached>>> {
        let graph = self.graph;
        let start = graph.at(source.edge);
        let start_cost = self.costing.cost(start.edge())?;

        if let Some(indices) = self.on_edge.get(&source.edge).cloned() {
            for index in indices {
                let fraction = self.targets[index].fraction;
                if fraction >= source.fraction {
                    self.offer(index, start_cost * (fraction - source.fraction), Via::Direct);
                }
            }
        }

        let exit = start_cost * (1.0 - source.fraction);
        for next in start.successors() {
            self.relax(next, exit, START)?;
        }

        // A source at the very start of its edge sits on the source node, so
        // every other edge leaving that node is entered at no cost.
        if source.fraction == 0.0 {
            for sibling in start.siblings() {
                self.relax(sibling, 0.0, START)?;
            }
        }

        let mut remaining = self.targets.len();
        while remaining > 0 {
            let Some(SmallestHolder { step, .. }) = self.to_see.pop() else {
                break;
            };

            match step {
                Step::Finish(index) => {
                    if !self.resolved[index] {
                        self.resolved[index] = true;
                        remaining -= 1;
                    }
                }
                Step::Expand(index, ix) => {
                    if !self.seen.insert(index) {
                        continue;
                    }

                    self.expand(index, graph.at(ix))?;
                }
            }
        }

        debug!(
            "Search from edge {} settled {} of {} labelled edges, resolved {}/{} targets",
            start.id(),
            self.seen.len(),
            self.labels.len(),
            self.targets.len() - remaining,
            self.targets.len()
        );

        Ok((0..self.targets.len())
            .map(|index| self.reached(index, source.edge))
            .collect())
    }

    fn expand(&mut self, index: usize, edge: EdgeRef<'s>) -> Result<()> {
        let Some((_, &Label { cost, .. })) = self.labels.get_index(index) else {
            return Ok(());
        };
        trace!("Expanding {:?} at cost {}", edge, cost);

        let edge_cost = self.costing.cost(edge.edge())?;

        if let Some(indices) = self.on_edge.get(&edge.index()).cloned() {
            for target in indices {
                let fraction = self.targets[target].fraction;
                self.offer(target, cost + edge_cost * fraction, Via::Label(index));
            }
        }

        // Walking the successor's neighbor chain enters every edge leaving the
        // target node at one cost, which covers switching between siblings.
        let exit = cost + edge_cost;
        for next in edge.successors() {
            self.relax(next, exit, index)?;
        }

        Ok(())
    }

    fn relax(&mut self, edge: EdgeRef<'s>, cost: f64, parent: usize) -> Result<()> {
        let priority = cost + self.costing.bound(edge.edge())?;
        if priority > self.costing.max() {
            return Ok(());
        }

        let index = match self.labels.entry(edge.index()) {
            Entry::Vacant(e) => {
                let n = e.index();
                e.insert(Label { cost, parent });
                n
            }
            Entry::Occupied(mut e) => {
                if cost < e.get().cost && !self.seen.contains(&e.index()) {
                    e.insert(Label { cost, parent });
                    e.index()
                } else {
                    return Ok(());
                }
            }
        };

        self.to_see.push(SmallestHolder {
            priority,
            rank: (1, edge.id()),
            step: Step::Expand(index, edge.index()),
        });

        Ok(())
    }

    fn offer(&mut self, target: usize, cost: f64, via: Via) {
        if self.resolved[target] || cost > self.costing.max() {
            return;
        }

        if matches!(self.offered[target], Some((best, _)) if best <= cost) {
            return;
        }

        self.offered[target] = Some((cost, via));
        self.to_see.push(SmallestHolder {
            priority: cost,
            rank: (0, target as i64),
            step: Step::Finish(target),
        });
    }

    fn reached(&self, target: usize, source: EdgeIx) -> Option<Reached> {
        if !self.resolved[target] {
            return None;
        }

        let (cost, via) = self.offered[target]?;

        let mut edges = Vec::new();
        let mut cursor = match via {
            Via::Direct => START,
            Via::Label(index) => index,
        };

        while cursor != START {
            let (ix, label) = self.labels.get_index(cursor)?;
            edges.push(*ix);
            cursor = label.parent;
        }

        edges.push(source);
        edges.reverse();

        Some(Reached { cost, edges })
    }
}
