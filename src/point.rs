use crate::error::{Result, TopologyError};
use crate::graph::EdgeId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Anything that can be located on the routing graph as a fraction along an edge.
///
/// Candidate generators may carry richer candidate types (emission scores,
/// projected coordinates, ...) through the router by implementing this trait;
/// the router only ever reads the edge and the fraction.
pub trait Position {
    fn edge(&self) -> EdgeId;

    /// Fraction along [`Position::edge`], expected to lie in `[0, 1]`.
    fn fraction(&self) -> f64;
}

/// A position along a specific edge, as a fractional offset from its source.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgePoint {
    edge: EdgeId,
    fraction: f64,
}

impl EdgePoint {
    /// Creates a point without range checks.
    ///
    /// The fraction is expected to lie in `[0, 1]`; routing rejects points that
    /// do not. Use [`EdgePoint::try_new`] to validate at construction instead.
    #[inline]
    pub fn new(edge: EdgeId, fraction: f64) -> Self {
        // Folds -0.0 into 0.0 so equality and hashing agree.
        EdgePoint {
            edge,
            fraction: fraction + 0.0,
        }
    }

    pub fn try_new(edge: EdgeId, fraction: f64) -> Result<Self> {
        let point = EdgePoint::new(edge, fraction);
        validate(&point)?;

        Ok(point)
    }
}

impl Position for EdgePoint {
    #[inline]
    fn edge(&self) -> EdgeId {
        self.edge
    }

    #[inline]
    fn fraction(&self) -> f64 {
        self.fraction
    }
}

impl PartialEq for EdgePoint {
    fn eq(&self, other: &Self) -> bool {
        self.edge == other.edge && self.fraction.to_bits() == other.fraction.to_bits()
    }
}

impl Eq for EdgePoint {}

impl Hash for EdgePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.edge.hash(state);
        self.fraction.to_bits().hash(state);
    }
}

pub(crate) fn validate<P: Position>(point: &P) -> Result<()> {
    let fraction = point.fraction();
    if !(0.0..=1.0).contains(&fraction) {
        return Err(TopologyError::invalid(format!(
            "fraction {} on edge {} lies outside [0, 1]",
            fraction,
            point.edge()
        )));
    }

    Ok(())
}
