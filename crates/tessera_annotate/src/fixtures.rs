//! Architecture fixtures shared by unit tests.

use tessera_arch::ArchitectureModel;
use tessera_markup::parse_str;

pub(crate) const ARCH: &str = "\
(architecture
(complexblocklist
(pb_type
Aname clb
Acapacity 2
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
)mode
)pb_type
(interconnect
(complete
Aname crossbar
Ainput clb.I
Aoutput fle[1:0].in
)complete
(direct
Aname outs
Ainput fle[1:0].out
Aoutput clb.O[1:0]
)direct
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
Amode_bits 0
)pb_type
(pb_type
Aname clb.fle
Aphysical_mode_name physical
)pb_type
)pb_type_annotations
)openfpga_architecture
";

pub(crate) fn arch() -> ArchitectureModel {
    ArchitectureModel::from_elements(&parse_str(ARCH).unwrap(), &parse_str(CIRCUIT).unwrap())
        .unwrap()
}
