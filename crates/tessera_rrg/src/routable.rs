//! Block pins reachable from the routing fabric.
//!
//! A pin is routable when its OPIN/IPIN node shares an edge, in either
//! direction, with a channel node. Ports whose pins are never routable need
//! no top-of-tile multiplexer.

use crate::graph::{RoutingGraph, Side};
use std::collections::{BTreeMap, HashSet};

/// One routable pin, translated to its block port.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PinKey {
    /// Anchor x coordinate of the block.
    pub x: u32,
    /// Anchor y coordinate of the block.
    pub y: u32,
    /// Sub-tile (capacity slot).
    pub subtile: u32,
    /// Port name.
    pub port: String,
    /// Bit within the port.
    pub bit: u32,
}

/// The routable-pin map.
#[derive(Clone, Debug, Default)]
pub struct RoutablePins {
    sides: BTreeMap<(u32, u32, u32), Side>,
    ports: HashSet<PinKey>,
}

impl RoutablePins {
    /// Scans the edges of `graph`.
    pub fn scan(graph: &RoutingGraph) -> Self {
        let mut out = Self::default();
        for edge in &graph.edges {
            let (Some(src), Some(sink)) = (graph.node(edge.src), graph.node(edge.sink)) else {
                continue;
            };
            let pin = match (src.kind.is_pin(), sink.kind.is_pin()) {
                (true, false) if sink.kind.is_channel() => src,
                (false, true) if src.kind.is_channel() => sink,
                _ => continue,
            };
            let Some(side) = pin.side else { continue };
            if out.sides.insert((pin.xlow, pin.ylow, pin.ptc), side).is_some() {
                continue;
            }
            let Some(anchor) = graph.anchor(pin.xlow, pin.ylow) else {
                continue;
            };
            let Some(bp) = graph
                .block_type(anchor.block_type)
                .and_then(|bt| bt.pin(pin.ptc))
            else {
                continue;
            };
            out.ports.insert(PinKey {
                x: anchor.x,
                y: anchor.y,
                subtile: bp.subtile,
                port: bp.port.clone(),
                bit: bp.bit,
            });
        }
        out
    }

    /// Returns the side of the routable pin `ptc` at `(x, y)`.
    pub fn side(&self, x: u32, y: u32, ptc: u32) -> Option<Side> {
        self.sides.get(&(x, y, ptc)).copied()
    }

    /// Returns `true` if pin `port[bit]` of sub-tile `subtile` of the block
    /// anchored at `(x, y)` is reachable from the fabric.
    pub fn is_routable(&self, x: u32, y: u32, subtile: u32, port: &str, bit: u32) -> bool {
        self.ports.contains(&PinKey {
            x,
            y,
            subtile,
            port: port.to_string(),
            bit,
        })
    }

    /// Number of routable pins.
    pub fn len(&self) -> usize {
        self.sides.len()
    }

    /// Returns `true` when no pin is routable.
    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }
}
