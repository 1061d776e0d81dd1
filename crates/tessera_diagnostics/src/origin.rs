//! Where a diagnostic came from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The input location that triggered a diagnostic.
///
/// Most engine diagnostics concern a hierarchical path rather than a file
/// position, so an origin may carry a file, a line within it, a context path,
/// or nothing at all.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// The input file name, if known.
    pub file: Option<String>,
    /// The 1-based line within `file`, if known.
    pub line: Option<usize>,
    /// A hierarchical path or key giving context (e.g. a bit path).
    pub context: Option<String>,
}

impl Origin {
    /// An origin with no location information.
    pub const NONE: Origin = Origin {
        file: None,
        line: None,
        context: None,
    };

    /// An origin naming a line in an input file.
    pub fn file_line(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
            context: None,
        }
    }

    /// An origin naming a whole input file.
    pub fn file(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            line: None,
            context: None,
        }
    }

    /// An origin naming a hierarchical path or lookup key.
    pub fn context(context: impl Into<String>) -> Self {
        Self {
            file: None,
            line: None,
            context: Some(context.into()),
        }
    }

    /// Returns `true` if no location information is present.
    pub fn is_none(&self) -> bool {
        self.file.is_none() && self.line.is_none() && self.context.is_none()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{file}:{line}")?,
            (Some(file), None) => write!(f, "{file}")?,
            _ => {}
        }
        if let Some(ctx) = &self.context {
            if self.file.is_some() {
                write!(f, " ")?;
            }
            write!(f, "({ctx})")?;
        }
        Ok(())
    }
}
