//! Routing-resource graph records.

use crate::error::RrgError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a routing node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    /// Logical net source inside a block.
    Source,
    /// Logical net sink inside a block.
    Sink,
    /// Block output pin.
    Opin,
    /// Block input pin.
    Ipin,
    /// Horizontal channel wire.
    Chanx,
    /// Vertical channel wire.
    Chany,
}

impl NodeType {
    /// Returns `true` for channel wires.
    pub fn is_channel(self) -> bool {
        matches!(self, NodeType::Chanx | NodeType::Chany)
    }

    /// Returns `true` for block pins.
    pub fn is_pin(self) -> bool {
        matches!(self, NodeType::Opin | NodeType::Ipin)
    }

    /// Parses the VPR spelling.
    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "SOURCE" => NodeType::Source,
            "SINK" => NodeType::Sink,
            "OPIN" => NodeType::Opin,
            "IPIN" => NodeType::Ipin,
            "CHANX" => NodeType::Chanx,
            "CHANY" => NodeType::Chany,
            _ => return None,
        })
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeType::Source => "SOURCE",
            NodeType::Sink => "SINK",
            NodeType::Opin => "OPIN",
            NodeType::Ipin => "IPIN",
            NodeType::Chanx => "CHANX",
            NodeType::Chany => "CHANY",
        };
        f.write_str(s)
    }
}

/// Direction of travel of a channel wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Increasing coordinate.
    Inc,
    /// Decreasing coordinate.
    Dec,
    /// Bidirectional.
    Bi,
}

impl Direction {
    /// Parses `INC_DIR`/`DEC_DIR`/`BI_DIR` (the `_DIR` suffix is optional).
    pub fn parse(text: &str) -> Option<Self> {
        Some(match text.trim_end_matches("_DIR") {
            "INC" => Direction::Inc,
            "DEC" => Direction::Dec,
            "BI" => Direction::Bi,
            _ => return None,
        })
    }
}

/// Side of a block on which a pin sits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Top side.
    Top,
    /// Right side.
    Right,
    /// Bottom side.
    Bottom,
    /// Left side.
    Left,
}

impl Side {
    /// Parses the VPR spelling.
    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "TOP" => Side::Top,
            "RIGHT" => Side::Right,
            "BOTTOM" => Side::Bottom,
            "LEFT" => Side::Left,
            _ => return None,
        })
    }

    /// Lower-case name used in fabric paths.
    pub fn name(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }
}

/// One routing node.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RrNode {
    /// Node id.
    pub id: u32,
    /// Node type.
    #[serde(rename = "type")]
    pub kind: NodeType,
    /// Direction, for channel wires.
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Lowest x coordinate.
    pub xlow: u32,
    /// Lowest y coordinate.
    pub ylow: u32,
    /// Highest x coordinate.
    pub xhigh: u32,
    /// Highest y coordinate.
    pub yhigh: u32,
    /// Pin or track counter.
    pub ptc: u32,
    /// Pin side, for pins.
    #[serde(default)]
    pub side: Option<Side>,
    /// Segment id, for channel wires.
    #[serde(default)]
    pub segment: Option<u32>,
}

impl RrNode {
    /// Physical span in tiles along the direction of the wire.
    pub fn span(&self) -> u32 {
        match self.kind {
            NodeType::Chany => self.yhigh - self.ylow + 1,
            _ => self.xhigh - self.xlow + 1,
        }
    }

    /// Coordinate where the wire starts in its direction of travel.
    pub fn start(&self) -> u32 {
        match (self.kind, self.direction) {
            (NodeType::Chanx, Some(Direction::Dec)) => self.xhigh,
            (NodeType::Chany, Some(Direction::Dec)) => self.yhigh,
            (NodeType::Chany, _) => self.ylow,
            _ => self.xlow,
        }
    }

    /// The coordinate fixed along the wire: y for CHANX, x for CHANY.
    pub fn axis(&self) -> u32 {
        match self.kind {
            NodeType::Chany => self.xlow,
            _ => self.ylow,
        }
    }
}

/// One routing edge.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RrEdge {
    /// Driving node.
    pub src: u32,
    /// Driven node.
    pub sink: u32,
    /// Switch id.
    pub switch: u32,
}

/// A switch type.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RrSwitch {
    /// Switch id.
    pub id: u32,
    /// Switch name.
    pub name: String,
    /// `mux`, `tristate`, `pass_gate`, `short` or `buffer`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl RrSwitch {
    /// Returns `true` if the switch is programmable.
    pub fn configurable(&self) -> bool {
        !matches!(self.kind.as_str(), "short" | "buffer")
    }
}

/// A wire segment class.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RrSegment {
    /// Segment id.
    pub id: u32,
    /// Segment name.
    pub name: String,
}

/// Direction of a block pin.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PinClass {
    /// Block input.
    Input,
    /// Block output.
    Output,
}

/// One pin of a block type.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BlockPin {
    /// Pin counter within the block type.
    pub ptc: u32,
    /// Sub-tile (capacity slot) the pin belongs to.
    pub subtile: u32,
    /// Port name.
    pub port: String,
    /// Bit within the port.
    pub bit: u32,
    /// Pin direction.
    pub class: PinClass,
}

/// A block type placed on the grid.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BlockType {
    /// Block type id.
    pub id: u32,
    /// Block type name.
    pub name: String,
    /// Footprint width.
    pub width: u32,
    /// Footprint height.
    pub height: u32,
    /// Pin table.
    pub pins: Vec<BlockPin>,
}

impl BlockType {
    /// Returns the pin with counter `ptc`.
    pub fn pin(&self, ptc: u32) -> Option<&BlockPin> {
        self.pins.iter().find(|p| p.ptc == ptc)
    }
}

/// One grid location.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GridCell {
    /// x coordinate.
    pub x: u32,
    /// y coordinate.
    pub y: u32,
    /// Block type id.
    pub block_type: u32,
    /// Offset from the anchor cell, horizontally.
    pub width_offset: u32,
    /// Offset from the anchor cell, vertically.
    pub height_offset: u32,
}

impl GridCell {
    /// Returns `true` for the anchor cell of a block.
    pub fn is_anchor(&self) -> bool {
        self.width_offset == 0 && self.height_offset == 0
    }
}

/// The complete routing-resource graph as read from disk.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct RoutingGraph {
    /// Switch types.
    pub switches: Vec<RrSwitch>,
    /// Segment classes.
    pub segments: Vec<RrSegment>,
    /// Block types.
    pub block_types: Vec<BlockType>,
    /// Grid occupancy.
    pub grid: Vec<GridCell>,
    /// Nodes, indexed by id.
    pub nodes: Vec<RrNode>,
    /// Edges in file order.
    pub edges: Vec<RrEdge>,
}

impl RoutingGraph {
    /// Sorts nodes by id and checks that ids are dense and edges resolve.
    pub fn normalize(&mut self) -> Result<(), RrgError> {
        self.nodes.sort_by_key(|n| n.id);
        for (pos, node) in self.nodes.iter().enumerate() {
            if node.id != pos as u32 {
                return Err(RrgError::SparseIds {
                    expected: pos as u32,
                    found: node.id,
                });
            }
            if node.kind.is_channel() && node.segment.is_none() {
                return Err(RrgError::NoSegment(node.id));
            }
        }
        let n = self.nodes.len() as u32;
        if let Some(e) = self.edges.iter().find(|e| e.src >= n || e.sink >= n) {
            return Err(RrgError::DanglingEdge {
                src: e.src,
                sink: e.sink,
            });
        }
        Ok(())
    }

    /// Returns node `id`.
    pub fn node(&self, id: u32) -> Option<&RrNode> {
        self.nodes.get(id as usize)
    }

    /// Returns block type `id`.
    pub fn block_type(&self, id: u32) -> Option<&BlockType> {
        self.block_types.iter().find(|b| b.id == id)
    }

    /// Returns switch `id`.
    pub fn switch(&self, id: u32) -> Option<&RrSwitch> {
        self.switches.iter().find(|s| s.id == id)
    }

    /// Returns the grid cell at `(x, y)`.
    pub fn cell(&self, x: u32, y: u32) -> Option<&GridCell> {
        self.grid.iter().find(|c| c.x == x && c.y == y)
    }

    /// Returns the anchor cell of the block covering `(x, y)`.
    pub fn anchor(&self, x: u32, y: u32) -> Option<&GridCell> {
        let cell = self.cell(x, y)?;
        self.cell(x.checked_sub(cell.width_offset)?, y.checked_sub(cell.height_offset)?)
    }
}
