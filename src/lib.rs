#![doc = include_str!("../README.md")]

pub mod error;
pub mod graph;
pub mod point;
pub mod router;

#[doc(inline)]
pub use error::{Result, TopologyError};
#[doc(inline)]
pub use graph::{Edge, EdgeId, EdgeRef, GraphBuilder, NodeId, RoutingGraph};
#[doc(inline)]
pub use point::{EdgePoint, Position};
#[doc(inline)]
pub use router::{Costing, GraphRouter, Path, Router};
