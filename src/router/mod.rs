//! Bounded shortest-path routing between [`EdgePoint`](crate::EdgePoint)s.
//!
//! The [`GraphRouter`] runs a priority-queue search over the edge graph: plain
//! Dijkstra by default, A* once the [`Costing`] carries a lower-bound function.
//! From a settled edge the search may switch to any edge sharing its source node
//! at no cost, or advance onto every edge leaving its target node at the cost of
//! the edge. Work per query is capped by the costing's ceiling.

pub mod costing;
pub mod definition;
pub mod implementation;
pub mod path;

mod primitives;
#[cfg(test)]
mod test;

#[doc(inline)]
pub use costing::Costing;
#[doc(inline)]
pub use definition::Router;
#[doc(inline)]
pub use implementation::GraphRouter;
#[doc(inline)]
pub use path::{IntoEdges, Path};
