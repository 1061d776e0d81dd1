//! Structured diagnostic messages with severity, codes, origins, and notes.

use crate::code::DiagnosticCode;
use crate::origin::Origin;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A structured diagnostic message.
///
/// Each diagnostic includes a severity level and code, a primary message, the
/// [`Origin`] that triggered it, and optional notes and help text. Notes carry
/// the path fragments that contributed to a failed lookup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The unique code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// Where the problem was detected.
    pub origin: Origin,
    /// Explanatory footnotes (e.g., "note: ...").
    pub notes: Vec<String>,
    /// Actionable suggestions (e.g., "help: ...").
    pub help: Vec<String>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, code: DiagnosticCode, message: String, origin: Origin) -> Self {
        Self {
            severity,
            code,
            message,
            origin,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, origin: Origin) -> Self {
        Self::with_severity(Severity::Error, code, message.into(), origin)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, origin: Origin) -> Self {
        Self::with_severity(Severity::Warning, code, message.into(), origin)
    }

    /// Creates a new informational diagnostic.
    pub fn note(code: DiagnosticCode, message: impl Into<String>, origin: Origin) -> Self {
        Self::with_severity(Severity::Note, code, message.into(), origin)
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}
