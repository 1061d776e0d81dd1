//! Errors raised while reading design-side inputs.

use std::path::PathBuf;
use tessera_markup::MarkupError;

/// A design input that cannot be trusted.
#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    /// A markup input could not be read.
    #[error(transparent)]
    Markup(#[from] MarkupError),

    /// A text input could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A line or element did not match its format.
    #[error("{file}:{line}: {reason}")]
    Malformed {
        /// Which input (`place`, `route`, ...).
        file: &'static str,
        /// 1-based line, or 0 for tree inputs.
        line: usize,
        /// What was wrong.
        reason: String,
    },
}

impl DesignError {
    pub(crate) fn malformed(file: &'static str, line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            file,
            line,
            reason: reason.into(),
        }
    }
}

pub(crate) fn read_text(path: &std::path::Path) -> Result<String, DesignError> {
    tessera_common::read_input_to_string(path).map_err(|source| DesignError::Io {
        path: path.to_path_buf(),
        source,
    })
}
