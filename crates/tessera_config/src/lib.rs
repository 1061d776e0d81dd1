//! Parsing and validation of `tessera.toml` run configuration files.
//!
//! A run configuration names every input of one bitstream build (architecture
//! descriptions, routing-resource graph, packer/placer/router outputs) plus the
//! output format and engine knobs. [`resolve_inputs`] turns the relative paths
//! it contains into concrete file locations.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use resolve::{resolve_inputs, ResolvedInputs};
pub use types::*;
