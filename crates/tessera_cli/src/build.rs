//! `tessera build`: bitstream generation for the configured design.
//!
//! Loads `tessera.toml`, applies command-line output overrides, runs every
//! pass through [`tessera_bitstream::run_from_config`], and reports the
//! diagnostics and end-of-run summary.

use std::path::{Path, PathBuf};

use tessera_bitstream::{run_from_config, RunSummary};
use tessera_config::{OutputFormat, ResolvedInputs, RunConfig};
use tessera_diagnostics::DiagnosticSink;

use crate::report::{build_json, render_text, summary_lines};
use crate::{BuildArgs, CliFormat, GlobalArgs, ReportFormat};

/// Name of the configuration file looked up when `--config` is absent.
pub const DEFAULT_CONFIG: &str = "tessera.toml";

/// Runs the `tessera build` command.
///
/// Returns exit code 0 when a bitstream was written and no error diagnostic
/// was raised, 1 otherwise.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config_path = PathBuf::from(global.config.as_deref().unwrap_or(DEFAULT_CONFIG));
    let mut config = tessera_config::load_config(&config_path)?;
    let resolved = prepare(&mut config, &config_path, args);

    if !global.quiet && args.report_format == ReportFormat::Text {
        eprintln!("   Building {}", config.design.name);
        if global.verbose {
            eprintln!("      Arch {}", resolved.arch.display());
            eprintln!("   Circuit {}", resolved.circuit.display());
            eprintln!("       RRG {}", resolved.rrg.display());
        }
    }

    let sink = DiagnosticSink::new();
    let outcome = run_from_config(&config, &resolved, &sink);
    let diagnostics = sink.take_all();

    let code = match &outcome {
        Ok(_) if !sink.has_errors() => 0,
        _ => 1,
    };

    match args.report_format {
        ReportFormat::Json => {
            let error = outcome.as_ref().err().map(|e| e.to_string());
            println!("{}", build_json(outcome.as_ref().ok(), error, &diagnostics)?);
        }
        ReportFormat::Text => {
            render_text(&diagnostics, global);
            match &outcome {
                Ok(summary) => report_summary(summary, global),
                Err(e) => eprintln!("error: {e}"),
            }
        }
    }
    Ok(code)
}

/// Applies command-line overrides to `config` and resolves every path.
///
/// Inputs resolve against the configuration file's directory; an `--output`
/// given on the command line stays relative to the working directory.
pub fn prepare(config: &mut RunConfig, config_path: &Path, args: &BuildArgs) -> ResolvedInputs {
    if let Some(format) = args.format {
        config.output.format = output_format(format);
    }
    if args.xml_addresses {
        config.output.xml_addresses = true;
    }
    let base_dir = config_path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut resolved = tessera_config::resolve_inputs(config, base_dir);
    if let Some(output) = &args.output {
        resolved.output = PathBuf::from(output);
    }
    resolved
}

fn output_format(format: CliFormat) -> OutputFormat {
    match format {
        CliFormat::Csv => OutputFormat::Csv,
        CliFormat::Xml => OutputFormat::Xml,
        CliFormat::Rows => OutputFormat::Rows,
    }
}

fn report_summary(summary: &RunSummary, global: &GlobalArgs) {
    if global.quiet {
        return;
    }
    eprintln!();
    for line in summary_lines(summary) {
        eprintln!("{line}");
    }
    if summary.incomplete() {
        eprintln!("   Wrote {} (incomplete)", summary.output);
    } else {
        eprintln!("   Wrote {}", summary.output);
    }
}
