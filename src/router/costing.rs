use crate::error::{Result, TopologyError};
use crate::graph::Edge;

use std::fmt::{Debug, Formatter};

type EdgeFn<'a> = Box<dyn Fn(&Edge) -> f64 + Send + Sync + 'a>;

/// The cost model of a routing query.
///
/// * `cost` prices a full traversal of an edge; partial edges at either end of a
///   route are priced proportionally to the travelled fraction.
/// * `bound` optionally estimates the remaining cost from an edge's source node to
///   any target. It must never overestimate, and must be consistent, for routes to
///   stay optimal. Without one, the search degrades to plain Dijkstra.
/// * `max` caps the total cost of any returned route. Unbounded by default.
///
/// ```rust
/// use routers_topology::router::Costing;
///
/// let costing = Costing::weight().with_max(500.0);
/// assert_eq!(costing.max(), 500.0);
/// ```
pub struct Costing<'a> {
    cost: EdgeFn<'a>,
    bound: Option<EdgeFn<'a>>,
    max: f64,
}

impl Debug for Costing<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Costing")
            .field("bounded", &self.bound.is_some())
            .field("max", &self.max)
            .finish()
    }
}

impl<'a> Costing<'a> {
    pub fn new(cost: impl Fn(&Edge) -> f64 + Send + Sync + 'a) -> Self {
        Costing {
            cost: Box::new(cost),
            bound: None,
            max: f64::INFINITY,
        }
    }

    /// Prices every edge by its weight.
    pub fn weight() -> Self {
        Costing::new(Edge::weight)
    }

    pub fn with_bound(mut self, bound: impl Fn(&Edge) -> f64 + Send + Sync + 'a) -> Self {
        self.bound = Some(Box::new(bound));
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = max;
        self
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.bound.is_some()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max.is_nan() || self.max < 0.0 {
            return Err(TopologyError::invalid(format!(
                "route ceiling {} must be a nonnegative number",
                self.max
            )));
        }

        Ok(())
    }

    /// Full traversal cost of `edge`.
    #[inline]
    pub(crate) fn cost(&self, edge: &Edge) -> Result<f64> {
        checked("cost", edge, (self.cost)(edge))
    }

    /// Lower bound on the remaining cost once `edge` is entered.
    #[inline]
    pub(crate) fn bound(&self, edge: &Edge) -> Result<f64> {
        match &self.bound {
            Some(bound) => checked("bound", edge, bound(edge)),
            None => Ok(0.0),
        }
    }
}

#[inline]
fn checked(kind: &str, edge: &Edge, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        return Ok(value);
    }

    Err(TopologyError::invalid(format!(
        "{kind} function returned {value} for edge {}, expected a finite nonnegative value",
        edge.id
    )))
}
