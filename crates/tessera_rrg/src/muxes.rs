//! Inter-tile routing multiplexers.
//!
//! Every channel or IPIN node with at least two configurable driving edges
//! is the output of a switch-box or connection-box multiplexer. Its inputs
//! are the driving nodes in edge-file order.
//!
//! | node             | owner              | mux segment              |
//! |------------------|--------------------|--------------------------|
//! | CHANX INC        | `sb_{xlow-1}__{y}_`  | `mux_right_track[ptc]`   |
//! | CHANX DEC        | `sb_{xhigh}__{y}_`   | `mux_left_track[ptc]`    |
//! | CHANY INC        | `sb_{x}__{ylow-1}_`  | `mux_top_track[ptc]`     |
//! | CHANY DEC        | `sb_{x}__{yhigh}_`   | `mux_bottom_track[ptc]`  |
//! | IPIN TOP/BOTTOM  | `cbx_{x}__{y}_` / `cbx_{x}__{y-1}_` | `mux_<side>_ipin[ptc]` |
//! | IPIN RIGHT/LEFT  | `cby_{x}__{y}_` / `cby_{x-1}__{y}_` | `mux_<side>_ipin[ptc]` |

use crate::graph::{Direction, NodeType, RoutingGraph, RrNode, Side};
use std::collections::HashMap;
use tessera_common::{HierPath, Segment};

/// A switch-box or connection-box multiplexer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RoutingMux {
    /// Node driven by this mux.
    pub node: u32,
    /// Path of the mux, e.g. `sb_0__1_.mux_right_track[0]`.
    pub path: HierPath,
    /// Driving nodes in edge-file order.
    pub inputs: Vec<u32>,
}

impl RoutingMux {
    /// Number of selectable inputs.
    pub fn width(&self) -> usize {
        self.inputs.len()
    }

    /// Returns the input index of driving node `src`.
    pub fn index_of(&self, src: u32) -> Option<usize> {
        self.inputs.iter().position(|&n| n == src)
    }
}

/// Every routing mux, looked up by driven node.
#[derive(Clone, Debug, Default)]
pub struct RoutingMuxes {
    muxes: Vec<RoutingMux>,
    by_node: HashMap<u32, usize>,
}

impl RoutingMuxes {
    /// Derives the muxes of `graph`, naming tracks by `ptc` (indexed by node id).
    pub fn derive(graph: &RoutingGraph, ptc: &[u32]) -> Self {
        let mut fan_in: HashMap<u32, Vec<u32>> = HashMap::new();
        for edge in &graph.edges {
            if !graph.switch(edge.switch).is_none_or(|s| s.configurable()) {
                continue;
            }
            fan_in.entry(edge.sink).or_default().push(edge.src);
        }

        let mut out = Self::default();
        for node in &graph.nodes {
            if !matches!(node.kind, NodeType::Chanx | NodeType::Chany | NodeType::Ipin) {
                continue;
            }
            let Some(inputs) = fan_in.remove(&node.id) else {
                continue;
            };
            if inputs.len() < 2 {
                continue;
            }
            let counter = ptc.get(node.id as usize).copied().unwrap_or(node.ptc);
            let Some(path) = mux_path(node, counter) else {
                continue;
            };
            out.by_node.insert(node.id, out.muxes.len());
            out.muxes.push(RoutingMux {
                node: node.id,
                path,
                inputs,
            });
        }
        out
    }

    /// Returns the mux driving `node`.
    pub fn of(&self, node: u32) -> Option<&RoutingMux> {
        self.by_node.get(&node).map(|&i| &self.muxes[i])
    }

    /// Iterates over every mux in node order.
    pub fn iter(&self) -> impl Iterator<Item = &RoutingMux> {
        self.muxes.iter()
    }

    /// Number of muxes.
    pub fn len(&self) -> usize {
        self.muxes.len()
    }

    /// Returns `true` when there are no muxes.
    pub fn is_empty(&self) -> bool {
        self.muxes.is_empty()
    }
}

fn owner(kind: &str, x: u32, y: u32) -> Segment {
    Segment::named(format!("{kind}_{x}__{y}_"))
}

/// Builds the path of the mux driving `node`, given its canonical counter.
pub fn mux_path(node: &RrNode, ptc: u32) -> Option<HierPath> {
    let dir = node.direction.unwrap_or(Direction::Inc);
    let (block, side, what) = match (node.kind, dir) {
        (NodeType::Chanx, Direction::Dec) => (owner("sb", node.xhigh, node.ylow), Side::Left, "track"),
        (NodeType::Chanx, _) => (
            owner("sb", node.xlow.saturating_sub(1), node.ylow),
            Side::Right,
            "track",
        ),
        (NodeType::Chany, Direction::Dec) => (owner("sb", node.xlow, node.yhigh), Side::Bottom, "track"),
        (NodeType::Chany, _) => (
            owner("sb", node.xlow, node.ylow.saturating_sub(1)),
            Side::Top,
            "track",
        ),
        (NodeType::Ipin, _) => {
            let side = node.side?;
            let (x, y) = (node.xlow, node.ylow);
            let block = match side {
                Side::Top => owner("cbx", x, y),
                Side::Bottom => owner("cbx", x, y.saturating_sub(1)),
                Side::Right => owner("cby", x, y),
                Side::Left => owner("cby", x.saturating_sub(1), y),
            };
            (block, side, "ipin")
        }
        _ => return None,
    };
    Some(HierPath::from_segments(vec![
        block,
        Segment::indexed(format!("mux_{}_{what}", side.name()), ptc),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::RRG;
    use crate::load::from_markup;
    use tessera_markup::parse_str;

    fn muxes() -> RoutingMuxes {
        let g = from_markup(&parse_str(RRG).unwrap()).unwrap();
        let ptc: Vec<u32> = g.nodes.iter().map(|n| n.ptc).collect();
        RoutingMuxes::derive(&g, &ptc)
    }

    #[test]
    fn only_multi_driver_nodes_get_muxes() {
        let m = muxes();
        assert_eq!(m.len(), 2);
        assert!(m.of(1).is_none(), "short driver is not configurable");
        assert!(m.of(3).is_none(), "single driver");
    }

    #[test]
    fn names_and_input_order() {
        let m = muxes();
        let ipin = m.of(0).unwrap();
        assert_eq!(ipin.path.to_string(), "cbx_1__1_.mux_top_ipin[0]");
        assert_eq!(ipin.inputs, vec![2, 3]);
        assert_eq!(ipin.index_of(3), Some(1));

        let track = m.of(2).unwrap();
        assert_eq!(track.path.to_string(), "sb_0__1_.mux_right_track[0]");
        assert_eq!(track.width(), 2);
    }

    #[test]
    fn decreasing_wires_belong_to_far_switch_box() {
        let node = RrNode {
            id: 0,
            kind: NodeType::Chany,
            direction: Some(Direction::Dec),
            xlow: 2,
            ylow: 1,
            xhigh: 2,
            yhigh: 4,
            ptc: 3,
            side: None,
            segment: Some(0),
        };
        assert_eq!(mux_path(&node, 5).unwrap().to_string(), "sb_2__4_.mux_bottom_track[5]");
    }
}
