//! Design-side inputs: the packed-design tree, placement, routing result,
//! post-synthesis LUT tables, repack pin constraints, and the coordinate map
//! used by addressed output formats.

#![warn(missing_docs)]

pub mod coords;
pub mod error;
pub mod packed;
pub mod place;
pub mod repack;
pub mod route;
pub mod synth;

pub use coords::{load_coord_map, parse_coord_map, CoordMap};
pub use error::DesignError;
pub use packed::{
    load_packed_design, packed_from_markup, Connection, PackedBlock, PackedDesign, PackedDir,
    PackedPort, PinValue,
};
pub use place::{load_placement, parse_placement, PlacedBlock, Placement};
pub use repack::{load_repack_constraints, repack_from_markup, PinConstraint, RepackConstraints};
pub use route::{load_routing, parse_routing, RoutedNet};
pub use synth::{load_synth_luts, parse_synth_luts, SynthLuts, TruthTable};
