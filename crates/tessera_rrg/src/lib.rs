//! Routing-resource graph and grid model.
//!
//! Loads the graph from markup records, JSON, or a bincode snapshot, then
//! derives the tables the bitstream passes need: per-segment statistics,
//! canonical (tileable) track counters, the routable-pin map, and the
//! switch-box/connection-box multiplexers.

#![warn(missing_docs)]

pub mod error;
pub mod fabric;
pub mod graph;
pub mod load;
pub mod muxes;
pub mod routable;
pub mod segments;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::RrgError;
pub use fabric::RoutingFabric;
pub use graph::{
    BlockPin, BlockType, Direction, GridCell, NodeType, PinClass, RoutingGraph, RrEdge, RrNode,
    RrSegment, RrSwitch, Side,
};
pub use load::{load_routing_graph, read_snapshot, write_snapshot, GraphForm};
pub use muxes::{mux_path, RoutingMux, RoutingMuxes};
pub use routable::RoutablePins;
pub use segments::{segment_stats, tileable_ptcs, SegmentStats};
