use crate::error::Result;
use crate::point::Position;
use crate::router::{Costing, Path};

use rustc_hash::FxHashMap;
use std::hash::Hash;

/// Cost-bounded shortest paths between positions on a routing graph.
///
/// Every form treats an unreachable target, or one whose cheapest route costs more
/// than [`Costing::max`], as a normal outcome: `None` for a single pair, an absent
/// key for the batch forms. Errors are reserved for contract violations such as an
/// unknown edge, an out-of-range fraction or a negative cost.
pub trait Router<'g, P>
where
    P: Position + Clone + Eq + Hash,
{
    /// Cheapest route from `source` to `target`.
    fn route(&self, source: &P, target: &P, costing: &Costing<'_>) -> Result<Option<Path<'g>>>;

    /// Cheapest route from `source` to each reachable target, from a single search.
    fn route_to_many(
        &self,
        source: &P,
        targets: &[P],
        costing: &Costing<'_>,
    ) -> Result<FxHashMap<P, Path<'g>>>;

    /// For each reachable target, the source with the cheapest route to it and
    /// that route. Sources of equal cost resolve to the one listed first.
    fn route_many_to_many(
        &self,
        sources: &[P],
        targets: &[P],
        costing: &Costing<'_>,
    ) -> Result<FxHashMap<P, (P, Path<'g>)>>;
}
