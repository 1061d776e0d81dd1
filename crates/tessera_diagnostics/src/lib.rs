//! Diagnostic creation, severity management, and rendering.
//!
//! This crate provides structured [`Diagnostic`] messages with severity levels,
//! categorized codes, an [`Origin`] naming the input that triggered them, and
//! notes. The [`DiagnosticSink`] accumulates diagnostics across every pass of a
//! run (with per-key "report once" suppression), and [`TerminalRenderer`]
//! formats them for the console.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod origin;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use origin::Origin;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::{CategoryCounts, DiagnosticSink};
