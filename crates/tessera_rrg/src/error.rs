//! Fatal routing-graph errors.

use std::path::PathBuf;
use tessera_markup::MarkupError;

/// A structural problem in the routing-resource graph.
#[derive(Debug, thiserror::Error)]
pub enum RrgError {
    /// The markup form could not be read.
    #[error(transparent)]
    Markup(#[from] MarkupError),

    /// A file could not be read or written.
    #[error("routing graph I/O error at {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The structured (JSON) form could not be decoded.
    #[error("failed to decode routing graph: {0}")]
    Decode(String),

    /// A snapshot could not be encoded.
    #[error("failed to encode routing graph snapshot: {0}")]
    Encode(String),

    /// A required section was absent.
    #[error("routing graph lacks <{0}>")]
    MissingSection(String),

    /// An attribute held an unrecognized value.
    #[error("node {node}: unrecognized {what} '{value}'")]
    BadValue {
        /// Node or record id.
        node: u32,
        /// Which attribute.
        what: &'static str,
        /// The value found.
        value: String,
    },

    /// Node ids were not exactly `0..n`.
    #[error("node ids are not dense: expected {expected}, found {found}")]
    SparseIds {
        /// The id expected at this position.
        expected: u32,
        /// The id found.
        found: u32,
    },

    /// An edge named a node that does not exist.
    #[error("edge {src} -> {sink} references a missing node")]
    DanglingEdge {
        /// Source node.
        src: u32,
        /// Sink node.
        sink: u32,
    },

    /// A segment's track counters are not contiguous.
    #[error("segment {segment} has a ptc gap: {missing} is unused between {min} and {max}")]
    PtcGap {
        /// Segment id.
        segment: u32,
        /// First unused counter.
        missing: u32,
        /// Lowest counter used.
        min: u32,
        /// Highest counter used.
        max: u32,
    },

    /// A channel node named no segment.
    #[error("channel node {0} has no segment")]
    NoSegment(u32),
}
