//! A one-tile fabric shared by unit tests.
//!
//! `clb` (capacity 1) holds two `fle`s. Each `fle` has a `physical` mode with
//! a fracturable LUT `frac` behind a `complete` input crossbar, and a logical
//! `n1_lut2` mode whose `lut2` is aliased onto `frac`. The tile crossbar feeds
//! `fle` inputs from `clb.I`, a clock crossbar feeds `fle.clk`, and `omux`
//! drives the two tile outputs.
//!
//! The routing graph places the tile at (1,1). Only `I[0]`, `I[1]` and `O[0]`
//! are routable; IPIN 0 and CHANX 2 are the two routing muxes.

use crate::context::PassContext;
use tessera_annotate::{load_pb_annotations, parse_annotation_file, AnnotationTables};
use tessera_arch::ArchitectureModel;
use tessera_diagnostics::DiagnosticSink;
use tessera_markup::parse_str;
use tessera_rrg::{
    BlockPin, BlockType, Direction, GridCell, NodeType, PinClass, RoutingFabric, RoutingGraph,
    RrEdge, RrNode, RrSegment, RrSwitch, Side,
};

pub(crate) const ARCH: &str = "\
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
Anum_pins 2
)output
(clock
Aname clk
Anum_pins 2
)clock
(pb_type
Aname fle
Anum_pb 2
(input
Aname in
Anum_pins 2
)input
(output
Aname out
)output
(clock
Aname clk
)clock
(mode
Aname physical
Adisable_packing true
(pb_type
Aname frac
Ablif_model .subckt frac
(input
Aname in
Anum_pins 2
)input
(output
Aname out
)output
)pb_type
(interconnect
(complete
Aname fin
Ainput fle.in
Aoutput frac.in
)complete
(direct
Aname fout
Ainput frac.out
Aoutput fle.out
)direct
)interconnect
)mode
(mode
Aname n1_lut2
(pb_type
Aname lut2
Aclass lut
Ablif_model .names
(input
Aname in
Anum_pins 2
)input
(output
Aname out
)output
)pb_type
(interconnect
(direct
Aname lin
Ainput fle.in
Aoutput lut2.in
)direct
(direct
Aname lout
Ainput lut2.out
Aoutput fle.out
)direct
)interconnect
)mode
)pb_type
(interconnect
(complete
Aname crossbar
Ainput clb.I
Aoutput fle[1:0].in
)complete
(complete
Aname clks
Ainput clb.clk
Aoutput fle[1:0].clk
)complete
(complete
Aname omux
Ainput fle[1:0].out
Aoutput clb.O
)complete
)interconnect
)pb_type
)complexblocklist
)architecture
";

pub(crate) const CIRCUIT: &str = "\
(openfpga_architecture
(circuit_library
(circuit_model
Atype lut
Aname frac_lut2
(port
Atype input
Aprefix in
Asize 2
)port
(port
Atype output
Aprefix out
)port
(port
Atype sram
Aprefix sram
Asize 4
)port
(port
Atype sram
Aprefix mode
Asize 1
Amode_select true
)port
)circuit_model
)circuit_library
(pb_type_annotations
(pb_type
Aname clb.fle[n1_lut2].lut2
Aphysical_pb_type_name clb.fle[physical].frac
)pb_type
(pb_type
Aname clb.fle[physical].frac
Acircuit_model_name frac_lut2
Amode_bits 1
)pb_type
(pb_type
Aname clb.fle
Aphysical_mode_name physical
)pb_type
)pb_type_annotations
)openfpga_architecture
";

/// The packed tile: `fle[0]` in `n1_lut2` computing `n_out` from `a` and `b`.
pub(crate) const PACKED: &str = "\
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
-a b open open
)port
)inputs
(outputs
(port
Aname O
-fle[0].out[0]->omux open
)port
)outputs
(clocks
(port
Aname clk
-clk open
)port
)clocks
(block
Aname n_out
Ainstance fle[0]
Amode n1_lut2
(inputs
(port
Aname in
-clb.I[1]->crossbar clb.I[0]->crossbar
)port
)inputs
(outputs
(port
Aname out
-lut2[0].out[0]->lout
)port
)outputs
(clocks
(port
Aname clk
-clb.clk[0]->clks
)port
)clocks
(block
Aname n_out
Ainstance lut2[0]
(inputs
(port
Aname in
-fle.in[0]->lin fle.in[1]->lin
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
(block
Aname open
Ainstance fle[1]
)block
)block
)block
";

pub(crate) const PLACE: &str = "\
Netlist_File: top.net Netlist_ID: SHA256:0
Array size: 3 x 3 logic blocks

c0 1 1 0 0 #0
";

pub(crate) const SYNTH: &str = "\
LUT_K #(.K(2), .LUT_MASK(4'b1000)) n_out_lut (.in({b, a}), .out(n_out));
";

fn pin(ptc: u32, port: &str, bit: u32, class: PinClass) -> BlockPin {
    BlockPin {
        ptc,
        subtile: 0,
        port: port.to_string(),
        bit,
        class,
    }
}

fn node(id: u32, kind: NodeType, ptc: u32, side: Option<Side>, direction: Option<Direction>) -> RrNode {
    RrNode {
        id,
        kind,
        direction,
        xlow: 1,
        ylow: 1,
        xhigh: 1,
        yhigh: 1,
        ptc,
        side,
        segment: kind.is_channel().then_some(0),
    }
}

/// Nodes: IPIN 0 (top), IPIN 1 (right), CHANX 2 (inc), CHANX 3 (dec),
/// OPIN 4, CHANY 5 (inc), CHANY 6 (dec).
pub(crate) fn graph() -> RoutingGraph {
    let edge = |src, sink, switch| RrEdge { src, sink, switch };
    let mut g = RoutingGraph {
        switches: vec![
            RrSwitch {
                id: 0,
                name: "mux0".into(),
                kind: "mux".into(),
            },
            RrSwitch {
                id: 1,
                name: "short".into(),
                kind: "short".into(),
            },
        ],
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
                pins: vec![
                    pin(0, "I", 0, PinClass::Input),
                    pin(1, "I", 1, PinClass::Input),
                    pin(2, "O", 0, PinClass::Output),
                ],
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
        nodes: vec![
            node(0, NodeType::Ipin, 0, Some(Side::Top), None),
            node(1, NodeType::Ipin, 1, Some(Side::Right), None),
            node(2, NodeType::Chanx, 0, None, Some(Direction::Inc)),
            node(3, NodeType::Chanx, 1, None, Some(Direction::Dec)),
            node(4, NodeType::Opin, 2, Some(Side::Top), None),
            node(5, NodeType::Chany, 0, None, Some(Direction::Inc)),
            node(6, NodeType::Chany, 1, None, Some(Direction::Dec)),
        ],
        edges: vec![
            edge(2, 0, 0),
            edge(3, 0, 0),
            edge(5, 1, 0),
            edge(6, 1, 1),
            edge(4, 2, 0),
            edge(5, 2, 0),
            edge(4, 3, 0),
        ],
    };
    g.normalize().unwrap();
    g
}

/// Architecture, annotations and fabric of one test run.
pub(crate) struct Fixture {
    pub(crate) arch: ArchitectureModel,
    pub(crate) annotations: AnnotationTables,
    pub(crate) fabric: RoutingFabric,
    pub(crate) sink: DiagnosticSink,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::build(ARCH, "")
    }

    pub(crate) fn with_arch(arch: &str) -> Self {
        Self::build(arch, "")
    }

    pub(crate) fn with_annotations(text: &str) -> Self {
        Self::build(ARCH, text)
    }

    fn build(arch_text: &str, annotation_text: &str) -> Self {
        let circuit = parse_str(CIRCUIT).unwrap();
        let arch = ArchitectureModel::from_elements(&parse_str(arch_text).unwrap(), &circuit).unwrap();
        let sink = DiagnosticSink::new();
        let pb = load_pb_annotations(&circuit, &arch).unwrap();
        let records = parse_annotation_file(annotation_text).unwrap();
        let annotations = AnnotationTables::build(&records, &arch, pb, &sink);
        Self {
            arch,
            annotations,
            fabric: RoutingFabric::analyze(graph()).unwrap(),
            sink,
        }
    }

    pub(crate) fn ctx(&self) -> PassContext<'_> {
        PassContext {
            arch: &self.arch,
            annotations: &self.annotations,
            fabric: &self.fabric,
            sink: &self.sink,
        }
    }
}
