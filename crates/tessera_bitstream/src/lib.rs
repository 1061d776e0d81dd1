//! Configuration-bit synthesis.
//!
//! Turns a packed, placed and routed design into the value of every
//! configuration memory bit of the fabric. The passes run in a fixed order
//! over one [`ConfigBitMap`]:
//!
//! 1. [`initialize_defaults`] enumerates every bit of every placed tile and
//!    routing mux, with its default value.
//! 2. [`apply_packing`] walks each packed block, selecting interconnect mux
//!    inputs, mode bits and annotation settings, and collects LUT sites.
//! 3. [`apply_lut_contents`] writes the rotated truth table of every LUT.
//! 4. [`apply_routing`] selects the driver of every routed hop.
//!
//! Writes carry a [`Rank`]; a lower rank overrides a higher one, so routing
//! decisions win over packing and packing over mapped fallbacks.

#![warn(missing_docs)]

pub mod clocks;
pub mod compare;
pub mod context;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod lut;
pub mod packing;
pub mod physical_path;
pub mod routing;
pub mod select_code;
pub mod serialize;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;

pub use clocks::check_clock_constraints;
pub use compare::{apply_overrides, diff, BitDiff, ChangedBit};
pub use context::{LutGeometry, PassContext};
pub use defaults::initialize_defaults;
pub use engine::{
    preflight, run_from_config, synthesize, DesignInputs, DiffCounts, EngineError, EngineOptions,
    RunSummary, Synthesis,
};
pub use error::OutputError;
pub use lut::{
    apply_lut_contents, classify, identity_rotation, rotate, wire_table, LutFunction, LutReport,
    LutSite,
};
pub use packing::{apply_packing, PackingReport, PackingStats};
pub use physical_path::{logical_pin_to_physical_path, PhysicalPin, TileCoord};
pub use routing::{apply_routing, RoutingStats};
pub use select_code::{code_bits, select_code, select_index, select_width, SelectCodes};
pub use serialize::{
    load_bitstream, parse_csv, parse_xml, render, write_csv, write_output, write_rows, write_xml,
    BitValues,
};
pub use store::{BitEntry, ConfigBitMap, Rank, WriteOutcome, WriteStats};
