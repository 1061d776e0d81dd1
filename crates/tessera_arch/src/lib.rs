//! Architecture model loader.
//!
//! Reads the logical architecture (pb-type/mode tree, ports, interconnect) and
//! the physical circuit library into an [`ArchitectureModel`], deriving every
//! multiplexer along the way.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use tessera_arch::ArchitectureModel;
//!
//! let arch = ArchitectureModel::load(Path::new("k4_N4.pyx"), Path::new("k4_N4_circuit.pyx"))?;
//! for mux in arch.muxes_of("clb") {
//!     println!("{} ({} inputs)", mux.template(), mux.width());
//! }
//! # Ok::<(), tessera_arch::ArchError>(())
//! ```

#![warn(missing_docs)]

pub mod bus;
pub mod circuit;
pub mod error;
pub mod ids;
pub mod interconnect;
pub mod logical;
pub mod model;

#[cfg(test)]
pub(crate) mod fixtures;

pub use bus::{expand_bus_list, expand_bus_ref, expand_range, PinRef};
pub use circuit::{CircuitModel, CircuitPort, CircuitPortKind, LutShape};
pub use error::ArchError;
pub use ids::{MuxId, PbId};
pub use interconnect::{InterconnectTable, MuxDef, RootOutputs};
pub use logical::{
    InterconnectKind, Mode, PbTree, PbType, PortDecl, PortDir, PrimitiveKind,
};
pub use model::{ArchitectureModel, ResolvedPb};
