//! Logical-to-physical annotation resolver.
//!
//! Two sources feed the [`AnnotationTables`]: a declarative annotation file of
//! settings and mappings, expanded once per concrete replica, and the
//! `pb_type_annotations` of the circuit architecture (physical aliases,
//! circuit models with default mode bits, physical-mode declarations).

#![warn(missing_docs)]

pub mod error;
pub mod file;
pub mod pb;
pub mod tables;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::AnnotationError;
pub use file::{parse_annotation_file, AnnotationRecord, PinTarget};
pub use pb::{load_pb_annotations, PbAnnotation, PbAnnotations};
pub use tables::{load_annotations, AnnotationTables, MappingKey, PhysicalTarget};
