//! Segment statistics and tileable track counters.
//!
//! Graphs that were not generated with strict positional regularity number
//! their tracks arbitrarily. The canonical counter of a channel node is
//! recomputed from its segment and position:
//!
//! ```text
//! ptc = seg_min_ptc + 2 * (rank * L + start mod L) + (dir == DEC)
//! ```
//!
//! where `L` is the segment length, `start` the coordinate where the wire
//! begins in its direction of travel, and `rank` the node's position among
//! nodes sharing (type, direction, segment, axis, start), ordered by their
//! authored counter.

use crate::error::RrgError;
use crate::graph::{Direction, NodeType, RoutingGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Observed extent of one segment class.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SegmentStats {
    /// Longest physical span among the segment's wires.
    pub length: u32,
    /// Lowest track counter used.
    pub min_ptc: u32,
    /// Highest track counter used.
    pub max_ptc: u32,
}

/// Computes [`SegmentStats`] per segment id.
///
/// Fails if any segment leaves a track counter unused between its minimum
/// and maximum.
pub fn segment_stats(graph: &RoutingGraph) -> Result<BTreeMap<u32, SegmentStats>, RrgError> {
    let mut used: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    let mut length: BTreeMap<u32, u32> = BTreeMap::new();
    for node in graph.nodes.iter().filter(|n| n.kind.is_channel()) {
        let seg = node.segment.ok_or(RrgError::NoSegment(node.id))?;
        used.entry(seg).or_default().insert(node.ptc);
        let len = length.entry(seg).or_insert(0);
        *len = (*len).max(node.span());
    }

    let mut out = BTreeMap::new();
    for (seg, ptcs) in used {
        let (Some(&min), Some(&max)) = (ptcs.first(), ptcs.last()) else {
            continue;
        };
        if let Some(missing) = (min..=max).find(|p| !ptcs.contains(p)) {
            return Err(RrgError::PtcGap {
                segment: seg,
                missing,
                min,
                max,
            });
        }
        out.insert(
            seg,
            SegmentStats {
                length: length.get(&seg).copied().unwrap_or(1),
                min_ptc: min,
                max_ptc: max,
            },
        );
    }
    Ok(out)
}

/// Returns the canonical track counter of every node, indexed by node id.
/// Pins and sources/sinks keep their authored counter.
pub fn tileable_ptcs(graph: &RoutingGraph, stats: &BTreeMap<u32, SegmentStats>) -> Vec<u32> {
    type Key = (NodeType, Direction, u32, u32, u32);
    let mut groups: BTreeMap<Key, Vec<(u32, u32)>> = BTreeMap::new();
    for node in graph.nodes.iter().filter(|n| n.kind.is_channel()) {
        let Some(seg) = node.segment else { continue };
        let dir = node.direction.unwrap_or(Direction::Inc);
        groups
            .entry((node.kind, dir, seg, node.axis(), node.start()))
            .or_default()
            .push((node.ptc, node.id));
    }

    let mut out: Vec<u32> = graph.nodes.iter().map(|n| n.ptc).collect();
    for ((_, dir, seg, _, start), mut members) in groups {
        let Some(s) = stats.get(&seg) else { continue };
        let len = s.length.max(1);
        members.sort_unstable();
        for (rank, &(_, id)) in members.iter().enumerate() {
            let rank = rank as u32;
            let dec = u32::from(dir == Direction::Dec);
            out[id as usize] = s.min_ptc + 2 * (rank * len + start % len) + dec;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RrNode;

    fn wire(id: u32, kind: NodeType, dir: Direction, lo: u32, hi: u32, ptc: u32) -> RrNode {
        let (xlow, xhigh, ylow, yhigh) = match kind {
            NodeType::Chany => (1, 1, lo, hi),
            _ => (lo, hi, 1, 1),
        };
        RrNode {
            id,
            kind,
            direction: Some(dir),
            xlow,
            ylow,
            xhigh,
            yhigh,
            ptc,
            side: None,
            segment: Some(0),
        }
    }

    #[test]
    fn length_is_max_span() {
        let g = RoutingGraph {
            nodes: vec![
                wire(0, NodeType::Chanx, Direction::Inc, 1, 2, 0),
                wire(1, NodeType::Chanx, Direction::Dec, 1, 1, 1),
            ],
            ..RoutingGraph::default()
        };
        let stats = segment_stats(&g).unwrap();
        assert_eq!(
            stats[&0],
            SegmentStats {
                length: 2,
                min_ptc: 0,
                max_ptc: 1
            }
        );
    }

    #[test]
    fn ptc_gap_is_fatal() {
        let g = RoutingGraph {
            nodes: vec![
                wire(0, NodeType::Chanx, Direction::Inc, 1, 1, 0),
                wire(1, NodeType::Chanx, Direction::Inc, 2, 2, 2),
            ],
            ..RoutingGraph::default()
        };
        assert!(matches!(
            segment_stats(&g),
            Err(RrgError::PtcGap { missing: 1, .. })
        ));
    }

    #[test]
    fn tileable_counters_follow_formula() {
        // Length-2 segment; two INC wires starting at x=1 and one DEC wire
        // starting at x=2, authored with scrambled counters.
        let g = RoutingGraph {
            nodes: vec![
                wire(0, NodeType::Chanx, Direction::Inc, 1, 2, 3),
                wire(1, NodeType::Chanx, Direction::Inc, 1, 2, 1),
                wire(2, NodeType::Chanx, Direction::Dec, 1, 2, 2),
                wire(3, NodeType::Chanx, Direction::Inc, 2, 3, 0),
            ],
            ..RoutingGraph::default()
        };
        let stats = segment_stats(&g).unwrap();
        let ptc = tileable_ptcs(&g, &stats);
        // node 1 ranks first (authored 1 < 3): 2*(0*2 + 1%2) = 2
        assert_eq!(ptc[1], 2);
        // node 0 ranks second: 2*(1*2 + 1) = 6
        assert_eq!(ptc[0], 6);
        // DEC starts at xhigh=2: 2*(0 + 0) + 1 = 1
        assert_eq!(ptc[2], 1);
        // INC starting at x=2: 2*(0 + 0) = 0
        assert_eq!(ptc[3], 0);
    }

    #[test]
    fn pins_keep_authored_counter() {
        let mut pin = wire(0, NodeType::Ipin, Direction::Inc, 1, 1, 7);
        pin.direction = None;
        pin.segment = None;
        let g = RoutingGraph {
            nodes: vec![pin],
            ..RoutingGraph::default()
        };
        assert_eq!(tileable_ptcs(&g, &BTreeMap::new()), vec![7]);
    }
}
