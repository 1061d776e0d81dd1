//! Diagnostic codes with category prefixes for structured error identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
///
/// Categories follow the error taxonomy of the bitstream engine: structural
/// problems with the inputs, writes to bits that were never created,
/// precedence conflicts between writers, references that resolve to nothing,
/// and file access problems.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Malformed or inconsistent input structure, prefixed with `S`.
    Structure,
    /// A write targeted a configuration bit that does not exist, prefixed with `M`.
    MissingBit,
    /// Two writes disagreed on a bit's value, prefixed with `P`.
    Precedence,
    /// A connection or annotation key matched nothing, prefixed with `U`.
    Unresolved,
    /// A file could not be read or written, prefixed with `I`.
    Io,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Structure => 'S',
            Category::MissingBit => 'M',
            Category::Precedence => 'P',
            Category::Unresolved => 'U',
            Category::Io => 'I',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `M201`, `P301`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
