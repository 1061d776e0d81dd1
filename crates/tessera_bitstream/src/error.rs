//! Errors raised while reading or writing bitstream files.

use std::path::PathBuf;
use thiserror::Error;

/// A fatal problem with a bitstream file or its addressing.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The file could not be read or written.
    #[error("cannot access '{path}': {source}")]
    Io {
        /// The offending file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// The requested format needs a coordinate map and none was configured.
    #[error("output format '{0}' requires a coordinate map (inputs.coord_map)")]
    MissingCoordMap(&'static str),
    /// A bit has no address in the coordinate map.
    #[error("bit '{0}' has no entry in the coordinate map")]
    Unaddressed(String),
    /// A bitstream file line could not be decoded.
    #[error("line {line}: {reason}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// What is wrong.
        reason: String,
    },
}

impl OutputError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        OutputError::Malformed {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        OutputError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
