//! Fatal errors raised while loading architecture descriptions.

use tessera_common::PathParseError;
use tessera_markup::MarkupError;

/// A structural problem in the logical or circuit architecture.
#[derive(Debug, thiserror::Error)]
pub enum ArchError {
    /// The underlying markup could not be read.
    #[error(transparent)]
    Markup(#[from] MarkupError),

    /// A required element was absent.
    #[error("missing <{0}> element")]
    MissingElement(String),

    /// An interconnect or pin reference could not be parsed or expanded.
    #[error("bad reference '{reference}': {reason}")]
    BadReference {
        /// The reference text.
        reference: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A LUT circuit model whose truth-table size does not match its inputs.
    #[error("LUT circuit model '{model}' has {inputs} inputs but a {ram}-bit truth table")]
    LutSizeMismatch {
        /// Circuit model name.
        model: String,
        /// Declared input count.
        inputs: u32,
        /// Declared truth-table size.
        ram: u64,
    },

    /// A pb-type name in `blk.sub[mode].leaf` notation did not resolve.
    #[error("cannot resolve pb-type name '{name}': {reason}")]
    BadPbName {
        /// The name as written.
        name: String,
        /// Why resolution failed.
        reason: String,
    },

    /// Two pb-types share the same dotted path.
    #[error("duplicate pb-type '{0}'")]
    DuplicatePbType(String),

    /// A dotted path was malformed.
    #[error(transparent)]
    Path(#[from] PathParseError),
}
