//! Conformance scenario builders for tessera.
//!
//! Provides a single-tile LUT4 fabric (architecture, circuit library and
//! routing graph), packed-design and routing builders for it, and helpers
//! that run the bit-writing passes in memory or lay out a whole project on
//! disk for [`tessera_bitstream::run_from_config`].
//!
//! The tile is `clb` at grid (1,1): four inputs `I[3:0]`, one output `O`,
//! and a single `lut4` fed by the `complete` element `xbar` from `clb.I`.
//! CHANX tracks 0 to 3 all drive the IPIN of `I[2]`, so that pin sits behind
//! a 4-input connection-box mux.

#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use tessera_annotate::{load_pb_annotations, parse_annotation_file, AnnotationTables};
use tessera_arch::ArchitectureModel;
use tessera_bitstream::{synthesize, DesignInputs, EngineOptions, PassContext, Synthesis};
use tessera_common::HierPath;
use tessera_design::{packed_from_markup, parse_placement, parse_routing, parse_synth_luts};
use tessera_diagnostics::DiagnosticSink;
use tessera_markup::parse_str;
use tessera_rrg::{
    BlockPin, BlockType, Direction, GridCell, NodeType, PinClass, RoutingFabric, RoutingGraph,
    RrEdge, RrNode, RrSegment, RrSwitch, Side,
};

/// Logical architecture of the LUT4 tile.
pub const LUT4_ARCH: &str = "\
(architecture
(complexblocklist
(pb_type
Aname clb
Acapacity 1
(input
Aname I
Anum_pins 4
)input
(output
Aname O
)output
(pb_type
Aname lut4
Aclass lut
Ablif_model .names
(input
Aname in
Anum_pins 4
)input
(output
Aname out
)output
)pb_type
(interconnect
(complete
Aname xbar
Ainput clb.I
Aoutput lut4.in
)complete
(direct
Aname out
Ainput lut4.out
Aoutput clb.O
)direct
)interconnect
)pb_type
)complexblocklist
)architecture
";

/// Circuit library of the LUT4 tile: a 4-input LUT with 16 SRAM bits.
pub const LUT4_CIRCUIT: &str = "\
(openfpga_architecture
(circuit_library
(circuit_model
Atype lut
Aname lut4
(port
Atype input
Aprefix in
Asize 4
)port
(port
Atype output
Aprefix out
)port
(port
Atype sram
Aprefix sram
Asize 16
)port
)circuit_model
)circuit_library
(pb_type_annotations
(pb_type
Aname clb.lut4
Acircuit_model_name lut4
)pb_type
)pb_type_annotations
)openfpga_architecture
";

/// Placement of block `c0` at (1,1).
pub const LUT4_PLACE: &str = "\
Netlist_File: top.net Netlist_ID: SHA256:0
Array size: 3 x 3 logic blocks

c0 1 1 0 0 #0
";

/// Node ID of the IPIN for `clb.I[2]`.
pub const IPIN_I2: u32 = 4;

/// Node ID of the OPIN for `clb.O[0]`.
pub const OPIN_O0: u32 = 5;

/// Template of the tile-level crossbar mux driving `lut4.in[bit]`.
pub fn xbar_mux(bit: u32) -> HierPath {
    path(&format!("grid_1_1.clb[0].clb.mux_xbar_lut4_0_in[{bit}]"))
}

/// Full path of the LUT4 truth-table owner.
pub fn lut_owner() -> HierPath {
    path("grid_1_1.clb[0].clb.lut4[0]")
}

/// Parses `text` as a path.
pub fn path(text: &str) -> HierPath {
    HierPath::parse(text).unwrap()
}

/// Packed design with block `c0` computing net `n_out`.
///
/// `sources[b]` names the `clb.I` bit feeding `lut4.in[b]`, or leaves the
/// pin open. Tile inputs carry nets `a` to `d`.
pub fn lut4_packed(sources: [Option<u32>; 4]) -> String {
    let pins: Vec<String> = sources
        .iter()
        .map(|s| match s {
            Some(i) => format!("clb.I[{i}]->xbar"),
            None => "open".to_string(),
        })
        .collect();
    format!(
        "\
(block
Aname top.net
Ainstance FPGA_packed_netlist[0]
(block
Aname c0
Ainstance clb[0]
Amode clb
(inputs
(port
Aname I
-a b c d
)port
)inputs
(outputs
(port
Aname O
-lut4[0].out[0]->out
)port
)outputs
(block
Aname n_out
Ainstance lut4[0]
(inputs
(port
Aname in
-{}
)port
)inputs
(outputs
(port
Aname out
-n_out
)port
)outputs
)block
)block
)block
",
        pins.join(" ")
    )
}

/// Routing result taking net `c` from CHANX track `track` into `clb.I[2]`.
pub fn lut4_route(track: u32) -> String {
    format!(
        "\
Net 0 (c)

Node:\t{track}\tCHANX (1,1) Track: {track}
Node:\t{IPIN_I2}\tIPIN (1,1) Pin: 2
"
    )
}

/// Post-synthesis source with one 4-input LUT driving `n_out`.
/// `mask` is the 16-bit truth table, most significant bit first.
pub fn lut4_synth(mask: &str) -> String {
    format!("LUT_K #(.K(4), .LUT_MASK(16'b{mask})) n_out_lut (.in({{d, c, b, a}}), .out(n_out));\n")
}

fn pin(ptc: u32, port: &str, bit: u32, class: PinClass) -> BlockPin {
    BlockPin {
        ptc,
        subtile: 0,
        port: port.to_string(),
        bit,
        class,
    }
}

fn node(id: u32, kind: NodeType, ptc: u32, side: Option<Side>) -> RrNode {
    RrNode {
        id,
        kind,
        direction: kind.is_channel().then_some(Direction::Inc),
        xlow: 1,
        ylow: 1,
        xhigh: 1,
        yhigh: 1,
        ptc,
        side,
        segment: kind.is_channel().then_some(0),
    }
}

/// Routing graph of the LUT4 tile.
///
/// Nodes 0 to 3 are CHANX tracks, [`IPIN_I2`] is the input pin they all
/// drive, and [`OPIN_O0`] drives track 0.
pub fn lut4_graph() -> RoutingGraph {
    let edge = |src, sink| RrEdge { src, sink, switch: 0 };
    let mut nodes: Vec<RrNode> = (0..4).map(|t| node(t, NodeType::Chanx, t, None)).collect();
    nodes.push(node(IPIN_I2, NodeType::Ipin, 2, Some(Side::Top)));
    nodes.push(node(OPIN_O0, NodeType::Opin, 4, Some(Side::Top)));
    let mut edges: Vec<RrEdge> = (0..4).map(|t| edge(t, IPIN_I2)).collect();
    edges.push(edge(OPIN_O0, 0));
    let mut g = RoutingGraph {
        switches: vec![RrSwitch {
            id: 0,
            name: "mux0".into(),
            kind: "mux".into(),
        }],
        segments: vec![RrSegment {
            id: 0,
            name: "L1".into(),
        }],
        block_types: vec![
            BlockType {
                id: 0,
                name: "EMPTY".into(),
                width: 1,
                height: 1,
                pins: Vec::new(),
            },
            BlockType {
                id: 1,
                name: "clb".into(),
                width: 1,
                height: 1,
                pins: (0..4)
                    .map(|b| pin(b, "I", b, PinClass::Input))
                    .chain([pin(4, "O", 0, PinClass::Output)])
                    .collect(),
            },
        ],
        grid: vec![
            GridCell {
                x: 0,
                y: 0,
                block_type: 0,
                width_offset: 0,
                height_offset: 0,
            },
            GridCell {
                x: 1,
                y: 1,
                block_type: 1,
                width_offset: 0,
                height_offset: 0,
            },
        ],
        nodes,
        edges,
    };
    g.normalize().unwrap();
    g
}

/// Architecture, annotations and fabric of one scenario.
pub struct Scenario {
    /// Architecture model.
    pub arch: ArchitectureModel,
    /// Annotation tables.
    pub annotations: AnnotationTables,
    /// Analyzed routing fabric.
    pub fabric: RoutingFabric,
    /// Diagnostics of every pass run against this scenario.
    pub sink: DiagnosticSink,
}

impl Scenario {
    /// The LUT4 tile with the given annotation file text.
    pub fn lut4(annotations: &str) -> Self {
        let circuit = parse_str(LUT4_CIRCUIT).unwrap();
        let arch = ArchitectureModel::from_elements(&parse_str(LUT4_ARCH).unwrap(), &circuit).unwrap();
        let sink = DiagnosticSink::new();
        let pb = load_pb_annotations(&circuit, &arch).unwrap();
        let records = parse_annotation_file(annotations).unwrap();
        let annotations = AnnotationTables::build(&records, &arch, pb, &sink);
        Self {
            arch,
            annotations,
            fabric: RoutingFabric::analyze(lut4_graph()).unwrap(),
            sink,
        }
    }

    /// The pass context over this scenario.
    pub fn ctx(&self) -> PassContext<'_> {
        PassContext {
            arch: &self.arch,
            annotations: &self.annotations,
            fabric: &self.fabric,
            sink: &self.sink,
        }
    }

    /// Runs every pass over the given packed design, routing and synthesis
    /// text, placed by [`LUT4_PLACE`].
    pub fn run(&self, packed: &str, route: &str, synth: Option<&str>) -> Synthesis {
        let design = DesignInputs {
            packed: packed_from_markup(&parse_str(packed).unwrap()).unwrap(),
            placement: parse_placement(LUT4_PLACE).unwrap(),
            routing: parse_routing(route).unwrap(),
            luts: synth.map(|s| parse_synth_luts(s).unwrap()),
            repack: None,
        };
        synthesize(&self.ctx(), &design, EngineOptions::default())
    }
}

/// Reads the select bits `mux.mem_out[0..width]` of `synthesis`, bit 0 first.
pub fn select_bits(synthesis: &Synthesis, mux: &HierPath, width: u32) -> Vec<char> {
    (0..width)
        .map(|b| synthesis.map.get(&mux.mem_bit(b)).unwrap_or('?'))
        .collect()
}

/// Writes a complete LUT4 project into `dir` and returns the path of its
/// `tessera.toml`. `extra` is appended to the configuration verbatim.
pub fn write_lut4_project(dir: &Path, packed: &str, route: &str, synth: &str, extra: &str) -> PathBuf {
    let files = [
        ("arch.pyx", LUT4_ARCH.to_string()),
        ("circuit.pyx", LUT4_CIRCUIT.to_string()),
        ("rrg.json", serde_json::to_string(&lut4_graph()).unwrap()),
        ("top.net.pyx", packed.to_string()),
        ("top.place", LUT4_PLACE.to_string()),
        ("top.route", route.to_string()),
        ("top.v", synth.to_string()),
    ];
    for (name, text) in &files {
        std::fs::write(dir.join(name), text).unwrap();
    }
    let config = format!(
        "\
[design]
name = \"top\"

[inputs]
arch = \"arch.pyx\"
circuit = \"circuit.pyx\"
rrg = \"rrg.json\"
packed = \"top.net.pyx\"
place = \"top.place\"
route = \"top.route\"
synth = \"top.v\"
{extra}"
    );
    let path = dir.join("tessera.toml");
    std::fs::write(&path, config).unwrap();
    path
}
