//! Rendering of diagnostics and run summaries.

use serde::Serialize;
use tessera_bitstream::RunSummary;
use tessera_diagnostics::{Diagnostic, DiagnosticRenderer, Severity, TerminalRenderer};

use crate::GlobalArgs;

/// Lowest severity shown for the given verbosity.
pub fn threshold(global: &GlobalArgs) -> Severity {
    if global.quiet {
        Severity::Error
    } else if global.verbose {
        Severity::Note
    } else {
        Severity::Warning
    }
}

/// Renders `diags` to stderr, filtered by verbosity.
pub fn render_text(diags: &[Diagnostic], global: &GlobalArgs) {
    let renderer = TerminalRenderer::new(global.color);
    let min = threshold(global);
    for diag in diags.iter().filter(|d| d.severity >= min) {
        eprint!("{}", renderer.render(diag));
    }
}

/// Formats the human-readable summary lines.
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let [routing, packing, mapped, setting] = summary.writes;
    let mut lines = vec![
        format!("      Bits {} ({})", summary.bits, summary.hash),
        format!(
            "    Writes {routing} routing, {packing} packing, {mapped} mapped, {setting} setting"
        ),
        format!(
            "   Packing {} blocks, {} mapped, {} fallback, {} unresolved",
            summary.packing.placed, summary.packing.mapped, summary.packing.fallback, summary.packing.unresolved
        ),
        format!(
            "   Routing {} nets, {} hops, {} unresolved",
            summary.routing.nets, summary.routing.selections, summary.routing.unresolved
        ),
        format!("      LUTs {}", summary.luts),
    ];
    if summary.missing > 0 || summary.conflicts > 0 {
        lines.push(format!(
            "  Problems {} missing bits, {} precedence conflicts",
            summary.missing, summary.conflicts
        ));
    }
    if summary.overridden > 0 {
        lines.push(format!("  Override {} bits", summary.overridden));
    }
    if summary.clock_mismatches > 0 {
        lines.push(format!("    Clocks {} pins disagree with repack constraints", summary.clock_mismatches));
    }
    if let Some(prior) = &summary.prior {
        lines.push(format!(
            "     Prior {} changed, {} only in prior, {} only in output",
            prior.changed, prior.only_prior, prior.only_output
        ));
    }
    lines
}

#[derive(Serialize)]
struct BuildReport<'a> {
    summary: Option<&'a RunSummary>,
    error: Option<String>,
    diagnostics: &'a [Diagnostic],
}

/// Serializes a build outcome as one JSON document.
pub fn build_json(
    summary: Option<&RunSummary>,
    error: Option<String>,
    diagnostics: &[Diagnostic],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&BuildReport {
        summary,
        error,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_diagnostics::{Category, DiagnosticCode, Origin};

    fn global(quiet: bool, verbose: bool) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose,
            color: false,
            config: None,
        }
    }

    #[test]
    fn verbosity_thresholds() {
        assert_eq!(threshold(&global(true, false)), Severity::Error);
        assert_eq!(threshold(&global(false, false)), Severity::Warning);
        assert_eq!(threshold(&global(false, true)), Severity::Note);
    }

    #[test]
    fn json_report_carries_diagnostics() {
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::MissingBit, 201),
            "write to missing configuration bit",
            Origin::context("routing"),
        );
        let text = build_json(None, Some("boom".into()), &[diag]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["error"], "boom");
        assert!(value["summary"].is_null());
        assert_eq!(value["diagnostics"].as_array().unwrap().len(), 1);
    }
}
