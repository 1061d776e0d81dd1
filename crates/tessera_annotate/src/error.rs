//! Fatal annotation errors.

use tessera_arch::ArchError;

/// A structural problem in annotation inputs.
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    /// The annotation file could not be read.
    #[error("failed to read annotations: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the annotation file was malformed.
    #[error("line {line}: {reason}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// A pb-type annotation declared more than one of alias, circuit model
    /// and physical mode.
    #[error("pb-type annotation '{0}' declares more than one of physical_pb_type_name, circuit_model_name, physical_mode_name")]
    Conflicting(String),

    /// A physical-mode declaration named a mode other than `physical`.
    #[error("pb-type '{pb}' declares physical mode '{mode}'; only 'physical' is supported")]
    BadPhysicalMode {
        /// pb-type name.
        pb: String,
        /// Declared mode.
        mode: String,
    },

    /// A circuit-model alias named an unknown model.
    #[error("pb-type '{pb}' refers to unknown circuit model '{model}'")]
    UnknownCircuit {
        /// pb-type name.
        pb: String,
        /// Circuit model name.
        model: String,
    },

    /// A mode-bit pattern whose length does not match the model's mode-select ports.
    #[error("pb-type '{pb}' has mode_bits of length {found}, circuit model expects {expected}")]
    ModeBitsWidth {
        /// pb-type name.
        pb: String,
        /// Width of the model's mode-select ports.
        expected: u32,
        /// Length of the declared pattern.
        found: usize,
    },

    /// A mode-bit pattern containing characters other than `0`/`1`.
    #[error("pb-type '{pb}' has invalid mode_bits '{bits}'")]
    BadModeBits {
        /// pb-type name.
        pb: String,
        /// The declared pattern.
        bits: String,
    },

    /// A pb-type name could not be resolved.
    #[error(transparent)]
    Arch(#[from] ArchError),
}
