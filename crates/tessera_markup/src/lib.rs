//! Structural-markup reader.
//!
//! Architecture descriptions, packed designs and routing-resource graphs arrive
//! as a line-oriented, depth-first serialization of attributed trees: one
//! record per line, tagged by its first character.
//!
//! | lead | record                         |
//! |------|--------------------------------|
//! | `(`  | element open, followed by name |
//! | `A`  | attribute: `Aname value`       |
//! | `-`  | text content                   |
//! | `)`  | element close, followed by name|
//! | `?`  | processing instruction, ignored|
//!
//! [`parse_str`] and [`read_markup_file`] build an [`Element`] tree whose
//! attribute values are classified once into an [`AttrValue`].

#![warn(missing_docs)]

pub mod error;
pub mod reader;
pub mod tree;
pub mod value;

pub use error::MarkupError;
pub use reader::{parse_reader, parse_str, read_markup_file};
pub use tree::{Element, Node};
pub use value::{AttrKind, AttrValue};
