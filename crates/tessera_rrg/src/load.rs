//! Reading the routing graph in its three forms.
//!
//! * markup records (`.pyx`, optionally gzipped) using VPR element and
//!   attribute names;
//! * JSON (`.json`), the serde form of [`RoutingGraph`] emitted by the
//!   canonicalizer;
//! * a bincode snapshot (`.bin`) with a validated header.
//!
//! When a cache path is given, the snapshot is keyed by the content hash of
//! the source file: a stale or corrupt snapshot is a cache miss, after which
//! the source is reparsed and the snapshot rewritten.

use crate::error::RrgError;
use crate::graph::{
    BlockPin, BlockType, Direction, GridCell, NodeType, PinClass, RoutingGraph, RrEdge, RrNode,
    RrSegment, RrSwitch, Side,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tessera_common::{read_input_bytes, ContentHash, HierPath};
use tessera_markup::{parse_reader, Element, MarkupError};

/// Magic bytes identifying a routing-graph snapshot.
const SNAPSHOT_MAGIC: [u8; 4] = *b"TSRG";

/// Snapshot format version. Increment when [`RoutingGraph`] changes shape.
const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Header prepended to every snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    /// Must be `b"TSRG"`.
    pub magic: [u8; 4],
    /// Snapshot format version.
    pub format_version: u32,
    /// Hash of the source file the snapshot was built from.
    pub source: ContentHash,
    /// Hash of the payload.
    pub checksum: ContentHash,
}

/// The on-disk form of a routing graph.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GraphForm {
    /// Structural-markup records.
    Markup,
    /// serde JSON.
    Json,
    /// bincode snapshot.
    Snapshot,
}

impl GraphForm {
    /// Picks the form from the file name, ignoring a trailing `.gz`.
    pub fn of(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let name = name.strip_suffix(".gz").unwrap_or(&name);
        if name.ends_with(".json") {
            GraphForm::Json
        } else if name.ends_with(".bin") {
            GraphForm::Snapshot
        } else {
            GraphForm::Markup
        }
    }
}

/// Loads and normalizes the routing graph at `path`.
///
/// With `cache` set, a valid snapshot for the same source content is used
/// instead of parsing, and a fresh one is written after parsing.
pub fn load_routing_graph(path: &Path, cache: Option<&Path>) -> Result<RoutingGraph, RrgError> {
    let bytes = read_input_bytes(path).map_err(|source| RrgError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source = ContentHash::from_bytes(&bytes);
    if let Some(cached) = cache.and_then(|c| read_snapshot(c, Some(source))) {
        return Ok(cached);
    }

    let mut graph = match GraphForm::of(path) {
        GraphForm::Json => {
            serde_json::from_slice(&bytes).map_err(|e| RrgError::Decode(e.to_string()))?
        }
        GraphForm::Snapshot => decode_snapshot(&bytes, None)
            .ok_or_else(|| RrgError::Decode(format!("{} is not a valid snapshot", path.display())))?,
        GraphForm::Markup => from_markup(&parse_reader(bytes.as_slice())?)?,
    };
    graph.normalize()?;

    if let Some(cache) = cache {
        write_snapshot(cache, source, &graph)?;
    }
    Ok(graph)
}

/// Writes `graph` as a snapshot tagged with the hash of its source.
pub fn write_snapshot(path: &Path, source: ContentHash, graph: &RoutingGraph) -> Result<(), RrgError> {
    let payload = bincode::serde::encode_to_vec(graph, bincode::config::standard())
        .map_err(|e| RrgError::Encode(e.to_string()))?;
    let header = SnapshotHeader {
        magic: SNAPSHOT_MAGIC,
        format_version: SNAPSHOT_FORMAT_VERSION,
        source,
        checksum: ContentHash::from_bytes(&payload),
    };
    let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
        .map_err(|e| RrgError::Encode(e.to_string()))?;

    // 4-byte header length (little-endian) + header + payload
    let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    output.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(&payload);
    std::fs::write(path, &output).map_err(|source| RrgError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a snapshot, returning `None` on any mismatch or corruption.
///
/// When `source` is given, the snapshot must have been built from content
/// with that hash.
pub fn read_snapshot(path: &Path, source: Option<ContentHash>) -> Option<RoutingGraph> {
    let raw = std::fs::read(path).ok()?;
    decode_snapshot(&raw, source)
}

fn decode_snapshot(raw: &[u8], source: Option<ContentHash>) -> Option<RoutingGraph> {
    if raw.len() < 4 {
        return None;
    }
    let header_len = u32::from_le_bytes(raw[..4].try_into().ok()?) as usize;
    if raw.len() < 4 + header_len {
        return None;
    }
    let header: SnapshotHeader =
        bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
            .ok()?
            .0;
    if header.magic != SNAPSHOT_MAGIC || header.format_version != SNAPSHOT_FORMAT_VERSION {
        return None;
    }
    if source.is_some_and(|s| s != header.source) {
        return None;
    }
    let payload = &raw[4 + header_len..];
    if ContentHash::from_bytes(payload) != header.checksum {
        return None;
    }
    bincode::serde::decode_from_slice(payload, bincode::config::standard())
        .ok()
        .map(|(graph, _)| graph)
}

/// Converts a markup `rr_graph` tree into a [`RoutingGraph`].
pub fn from_markup(root: &Element) -> Result<RoutingGraph, RrgError> {
    let section = |name: &str| {
        root.child(name)
            .ok_or_else(|| RrgError::MissingSection(name.to_string()))
    };
    let mut graph = RoutingGraph::default();

    if let Some(switches) = root.child("switches") {
        for sw in switches.children_named("switch") {
            graph.switches.push(RrSwitch {
                id: uint(sw, "id")?,
                name: sw.attr_str("name").unwrap_or_default().to_string(),
                kind: sw.attr_str("type").unwrap_or("mux").to_string(),
            });
        }
    }
    if let Some(segments) = root.child("segments") {
        for seg in segments.children_named("segment") {
            graph.segments.push(RrSegment {
                id: uint(seg, "id")?,
                name: seg.attr_str("name").unwrap_or_default().to_string(),
            });
        }
    }
    if let Some(types) = root.child("block_types") {
        for bt in types.children_named("block_type") {
            graph.block_types.push(block_type(bt)?);
        }
    }
    if let Some(grid) = root.child("grid") {
        for loc in grid.children_named("grid_loc") {
            graph.grid.push(GridCell {
                x: uint(loc, "x")?,
                y: uint(loc, "y")?,
                block_type: uint(loc, "block_type_id")?,
                width_offset: opt_uint(loc, "width_offset")?.unwrap_or(0),
                height_offset: opt_uint(loc, "height_offset")?.unwrap_or(0),
            });
        }
    }
    for node in section("rr_nodes")?.children_named("node") {
        graph.nodes.push(node_record(node)?);
    }
    for edge in section("rr_edges")?.children_named("edge") {
        graph.edges.push(RrEdge {
            src: uint(edge, "src_node")?,
            sink: uint(edge, "sink_node")?,
            switch: opt_uint(edge, "switch_id")?.unwrap_or(0),
        });
    }
    Ok(graph)
}

fn node_record(node: &Element) -> Result<RrNode, RrgError> {
    let id = uint(node, "id")?;
    let bad = |what: &'static str, value: &str| RrgError::BadValue {
        node: id,
        what,
        value: value.to_string(),
    };
    let kind_text = node.require_str("type")?;
    let kind = NodeType::parse(kind_text).ok_or_else(|| bad("type", kind_text))?;
    let direction = match node.attr_str("direction") {
        Some(d) if kind.is_channel() => Some(Direction::parse(d).ok_or_else(|| bad("direction", d))?),
        _ => None,
    };
    let loc = node.child("loc").ok_or(MarkupError::MissingAttribute {
        element: format!("node {id}"),
        attr: "loc".to_string(),
    })?;
    let side = match loc.attr_str("side") {
        Some(s) if kind.is_pin() => Some(Side::parse(s).ok_or_else(|| bad("side", s))?),
        _ => None,
    };
    let segment = match node.child("segment") {
        Some(seg) => Some(uint(seg, "segment_id")?),
        None => None,
    };
    Ok(RrNode {
        id,
        kind,
        direction,
        xlow: uint(loc, "xlow")?,
        ylow: uint(loc, "ylow")?,
        xhigh: uint(loc, "xhigh")?,
        yhigh: uint(loc, "yhigh")?,
        ptc: uint(loc, "ptc")?,
        side,
        segment,
    })
}

fn block_type(bt: &Element) -> Result<BlockType, RrgError> {
    let id = uint(bt, "id")?;
    let mut pins = Vec::new();
    for class in bt.children_named("pin_class") {
        let class_kind = match class.attr_str("type") {
            Some("OUTPUT") => PinClass::Output,
            _ => PinClass::Input,
        };
        for pin in class.children_named("pin") {
            let text = pin.text();
            let path = HierPath::parse(text.trim()).map_err(|_| RrgError::BadValue {
                node: id,
                what: "pin name",
                value: text.clone(),
            })?;
            let [block, port] = path.segments() else {
                return Err(RrgError::BadValue {
                    node: id,
                    what: "pin name",
                    value: text,
                });
            };
            pins.push(BlockPin {
                ptc: uint(pin, "ptc")?,
                subtile: block.index.unwrap_or(0),
                port: port.name.clone(),
                bit: port.index.unwrap_or(0),
                class: class_kind,
            });
        }
    }
    Ok(BlockType {
        id,
        name: bt.attr_str("name").unwrap_or_default().to_string(),
        width: opt_uint(bt, "width")?.unwrap_or(1),
        height: opt_uint(bt, "height")?.unwrap_or(1),
        pins,
    })
}

fn uint(el: &Element, attr: &str) -> Result<u32, RrgError> {
    let v = el.require_int(attr)?;
    u32::try_from(v).map_err(|_| RrgError::BadValue {
        node: 0,
        what: "unsigned attribute",
        value: format!("{attr}={v}"),
    })
}

fn opt_uint(el: &Element, attr: &str) -> Result<Option<u32>, RrgError> {
    match el.attr(attr) {
        Some(_) => uint(el, attr).map(Some),
        None => Ok(None),
    }
}
