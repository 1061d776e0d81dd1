//! Diagnostic rendering for the console.

use crate::diagnostic::Diagnostic;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// warning[M201]: write to missing configuration bit
///   --> top.route:42 (grid_1__1_.clb[0].mem_out[3])
///    = note: precedence rank 0
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn severity_label(&self, diag: &Diagnostic) -> String {
        if !self.color {
            return diag.severity.to_string();
        }
        let color = match diag.severity {
            crate::Severity::Error => "31",
            crate::Severity::Warning => "33",
            crate::Severity::Note => "36",
        };
        format!("\x1b[1;{color}m{}\x1b[0m", diag.severity)
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "{}[{}]: {}\n",
            self.severity_label(diag),
            diag.code,
            diag.message
        ));

        if !diag.origin.is_none() {
            out.push_str(&format!("  --> {}\n", diag.origin));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }

        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use crate::origin::Origin;

    #[test]
    fn render_with_origin_and_notes() {
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::MissingBit, 201),
            "write to missing configuration bit",
            Origin::file_line("top.route", 42),
        )
        .with_note("precedence rank 0")
        .with_help("check the routing-resource graph matches the architecture");

        let output = TerminalRenderer::new(false).render(&diag);
        assert!(output.contains("warning[M201]: write to missing configuration bit"));
        assert!(output.contains("--> top.route:42"));
        assert!(output.contains("= note: precedence rank 0"));
        assert!(output.contains("= help: check the routing-resource graph"));
    }

    #[test]
    fn render_without_origin_has_no_arrow() {
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Structure, 101),
            "bad",
            Origin::NONE,
        );
        let output = TerminalRenderer::new(false).render(&diag);
        assert_eq!(output, "error[S101]: bad\n");
    }

    #[test]
    fn color_wraps_severity() {
        let diag = Diagnostic::note(DiagnosticCode::new(Category::Io, 1), "x", Origin::NONE);
        let output = TerminalRenderer::new(true).render(&diag);
        assert!(output.starts_with("\x1b[1;36mnote"));
    }
}
