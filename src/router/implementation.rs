use crate::error::Result;
use crate::graph::RoutingGraph;
use crate::point::{validate, Position};
use crate::router::definition::Router;
use crate::router::primitives::{Anchor, BoundedSearch, Reached};
use crate::router::{Costing, Path};

use indexmap::IndexSet;
use log::debug;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{BuildHasherDefault, Hash};

type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// A stateless query engine over a [`RoutingGraph`].
///
/// Each call allocates its own search state, so one router (or many) can serve
/// any number of threads over the same graph.
///
/// ```rust
/// use routers_topology::{Edge, EdgePoint, RoutingGraph};
/// use routers_topology::router::{Costing, GraphRouter, Router};
///
/// let graph = RoutingGraph::build([
///     Edge::new(1, 1, 2, 1.0),
///     Edge::new(2, 2, 3, 2.0),
/// ])?;
///
/// let router = GraphRouter::new(&graph);
/// let path = router
///     .route(&EdgePoint::new(1, 0.0), &EdgePoint::new(2, 1.0), &Costing::weight())?
///     .expect("node 3 is reachable from node 1");
///
/// assert_eq!(path.ids(), vec![1, 2]);
/// assert_eq!(path.cost(), 3.0);
/// # Ok::<(), routers_topology::TopologyError>(())
/// ```
#[derive(Copy, Clone, Debug)]
pub struct GraphRouter<'g> {
    graph: &'g RoutingGraph,
}

impl<'g> GraphRouter<'g> {
    pub fn new(graph: &'g RoutingGraph) -> Self {
        GraphRouter { graph }
    }

    pub fn graph(&self) -> &'g RoutingGraph {
        self.graph
    }

    fn anchor<P: Position>(&self, point: &P) -> Result<Anchor> {
        validate(point)?;

        Ok(Anchor {
            edge: self.graph.index_of(point.edge())?,
            fraction: point.fraction(),
        })
    }

    fn search(
        &self,
        source: Anchor,
        targets: &[Anchor],
        costing: &Costing<'_>,
    ) -> Result<Vec<Option<Reached>>> {
        BoundedSearch::new(self.graph, costing, targets).run(source)
    }

    fn path(&self, reached: Reached) -> Path<'g> {
        Path::new(self.graph, reached.edges, reached.cost)
    }
}

impl<'g, P> Router<'g, P> for GraphRouter<'g>
where
    P: Position + Clone + Eq + Hash,
{
    fn route(&self, source: &P, target: &P, costing: &Costing<'_>) -> Result<Option<Path<'g>>> {
        costing.validate()?;
        debug!(
            "Routing {}@{} -> {}@{}",
            source.edge(),
            source.fraction(),
            target.edge(),
            target.fraction()
        );

        let origin = self.anchor(source)?;
        let targets = [self.anchor(target)?];

        let reached = self.search(origin, &targets, costing)?;

        Ok(reached
            .into_iter()
            .next()
            .flatten()
            .map(|reached| self.path(reached)))
    }

    fn route_to_many(
        &self,
        source: &P,
        targets: &[P],
        costing: &Costing<'_>,
    ) -> Result<FxHashMap<P, Path<'g>>> {
        costing.validate()?;

        let origin = self.anchor(source)?;
        let targets = targets.iter().collect::<FxIndexSet<&P>>();
        let anchors = targets
            .iter()
            .map(|target| self.anchor(*target))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Routing {}@{} -> {} targets",
            source.edge(),
            source.fraction(),
            anchors.len()
        );

        let reached = self.search(origin, &anchors, costing)?;

        Ok(targets
            .into_iter()
            .zip(reached)
            .filter_map(|(target, reached)| Some((target.clone(), self.path(reached?))))
            .collect())
    }

    fn route_many_to_many(
        &self,
        sources: &[P],
        targets: &[P],
        costing: &Costing<'_>,
    ) -> Result<FxHashMap<P, (P, Path<'g>)>> {
        costing.validate()?;

        let sources = sources.iter().collect::<FxIndexSet<&P>>();
        let origins = sources
            .iter()
            .map(|source| self.anchor(*source))
            .collect::<Result<Vec<_>>>()?;

        let targets = targets.iter().collect::<FxIndexSet<&P>>();
        let anchors = targets
            .iter()
            .map(|target| self.anchor(*target))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Routing {} sources -> {} targets",
            origins.len(),
            anchors.len()
        );

        // Target index -> (source index, route). Sources are visited in input
        // order and only a strictly cheaper route replaces the incumbent.
        let mut best: FxHashMap<usize, (usize, Reached)> = FxHashMap::default();
        for (source, origin) in origins.into_iter().enumerate() {
            let reached = self.search(origin, &anchors, costing)?;

            for (target, reached) in reached.into_iter().enumerate() {
                let Some(reached) = reached else {
                    continue;
                };

                match best.get(&target) {
                    Some((_, incumbent)) if incumbent.cost <= reached.cost => {}
                    _ => {
                        best.insert(target, (source, reached));
                    }
                }
            }
        }

        Ok(best
            .into_iter()
            .filter_map(|(target, (source, reached))| {
                let target = targets.get_index(target)?;
                let source = sources.get_index(source)?;

                Some((
                    (*target).clone(),
                    ((*source).clone(), self.path(reached)),
                ))
            })
            .collect())
    }
}
