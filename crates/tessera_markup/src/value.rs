//! Attribute values, classified once when read.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static RE_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());
static RE_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?([0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)([eE][+-]?[0-9]+)?$").unwrap()
});

/// How an attribute value was classified.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttrKind {
    /// Anything that does not look numeric.
    Str,
    /// An integer literal.
    Int(i64),
    /// A decimal or exponent literal.
    Float(f64),
}

/// An attribute value: its original text plus its numeric classification.
///
/// The text is always kept, so bit patterns like `"01"` survive untouched even
/// though they classify as integers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttrValue {
    text: String,
    kind: AttrKind,
}

impl AttrValue {
    /// Classifies `text`.
    pub fn classify(text: impl Into<String>) -> Self {
        let text = text.into();
        let kind = if RE_INT.is_match(&text) {
            match text.parse::<i64>() {
                Ok(v) => AttrKind::Int(v),
                Err(_) => text.parse::<f64>().map_or(AttrKind::Str, AttrKind::Float),
            }
        } else if RE_FLOAT.is_match(&text) {
            text.parse::<f64>().map_or(AttrKind::Str, AttrKind::Float)
        } else {
            AttrKind::Str
        };
        Self { text, kind }
    }

    /// Returns the original text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the classification.
    pub fn kind(&self) -> AttrKind {
        self.kind
    }

    /// Returns the integer value, if the text is an integer literal.
    pub fn as_int(&self) -> Option<i64> {
        match self.kind {
            AttrKind::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as a float, if the text is numeric.
    pub fn as_float(&self) -> Option<f64> {
        match self.kind {
            AttrKind::Int(v) => Some(v as f64),
            AttrKind::Float(v) => Some(v),
            AttrKind::Str => None,
        }
    }

    /// Returns `true` for the literal text `true`.
    pub fn as_bool(&self) -> bool {
        self.text == "true"
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
