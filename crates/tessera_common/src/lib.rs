//! Shared foundational types used across the tessera bitstream toolchain.
//!
//! This crate provides structured hierarchical paths, replica odometers,
//! content hashing, compressed-input helpers, and the common internal error type.

#![warn(missing_docs)]

pub mod hash;
pub mod input;
pub mod path;
pub mod replica;
pub mod result;

pub use hash::ContentHash;
pub use input::{open_input, read_input_bytes, read_input_to_string};
pub use path::{HierPath, PathParseError, Segment};
pub use replica::{ReplicaContext, ReplicaSlot, Replicas};
pub use result::{InternalError, TesseraResult};
