//! The analyzed routing fabric: graph plus every derived table.

use crate::error::RrgError;
use crate::graph::{RoutingGraph, RrNode};
use crate::load::load_routing_graph;
use crate::muxes::{RoutingMux, RoutingMuxes};
use crate::routable::RoutablePins;
use crate::segments::{segment_stats, tileable_ptcs, SegmentStats};
use std::collections::BTreeMap;
use std::path::Path;

/// A routing graph with its segment statistics, canonical track counters,
/// routable pins and routing muxes. Immutable once built.
#[derive(Clone, Debug)]
pub struct RoutingFabric {
    graph: RoutingGraph,
    segments: BTreeMap<u32, SegmentStats>,
    ptc: Vec<u32>,
    routable: RoutablePins,
    muxes: RoutingMuxes,
}

impl RoutingFabric {
    /// Loads the graph at `path` (optionally through a snapshot cache) and
    /// analyzes it.
    pub fn load(path: &Path, cache: Option<&Path>) -> Result<Self, RrgError> {
        Self::analyze(load_routing_graph(path, cache)?)
    }

    /// Runs every analysis pass over an already-normalized graph.
    pub fn analyze(graph: RoutingGraph) -> Result<Self, RrgError> {
        let segments = segment_stats(&graph)?;
        let ptc = tileable_ptcs(&graph, &segments);
        let routable = RoutablePins::scan(&graph);
        let muxes = RoutingMuxes::derive(&graph, &ptc);
        Ok(Self {
            graph,
            segments,
            ptc,
            routable,
            muxes,
        })
    }

    /// Returns the underlying graph.
    pub fn graph(&self) -> &RoutingGraph {
        &self.graph
    }

    /// Returns node `id`.
    pub fn node(&self, id: u32) -> Option<&RrNode> {
        self.graph.node(id)
    }

    /// Returns the statistics of segment `id`.
    pub fn segment(&self, id: u32) -> Option<&SegmentStats> {
        self.segments.get(&id)
    }

    /// Returns the canonical track counter of node `id`.
    pub fn canonical_ptc(&self, id: u32) -> Option<u32> {
        self.ptc.get(id as usize).copied()
    }

    /// Returns the routable-pin map.
    pub fn routable(&self) -> &RoutablePins {
        &self.routable
    }

    /// Returns the mux driving `node`, if it has one.
    pub fn mux_of(&self, node: u32) -> Option<&RoutingMux> {
        self.muxes.of(node)
    }

    /// Returns every routing mux.
    pub fn muxes(&self) -> &RoutingMuxes {
        &self.muxes
    }
}
