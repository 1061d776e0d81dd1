//! Tessera CLI: the command-line driver for configuration bitstream
//! generation.
//!
//! `tessera build` runs every configured pass and writes the bitstream;
//! `tessera diff` compares two bitstream files bit by bit.

#![warn(missing_docs)]

mod build;
mod diff;
mod report;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Tessera, a configuration bitstream generator for tiled FPGA fabrics.
#[derive(Parser, Debug)]
#[command(name = "tessera", version, about = "Tessera bitstream generator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output, including notes.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to the `tessera.toml` run configuration.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the bitstream of the configured design.
    Build(BuildArgs),
    /// Compare two bitstream files.
    Diff(DiffArgs),
}

/// Arguments for the `tessera build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Output format, overriding `[output] format`.
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,

    /// Output file, overriding `[output] path`.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Annotate XML bits with bit-line and word-line addresses.
    #[arg(long)]
    pub xml_addresses: bool,

    /// Format of the diagnostics and run summary.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub report_format: ReportFormat,
}

/// Arguments for the `tessera diff` subcommand.
#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Left-hand bitstream (`.csv` or `.xml`, optionally gzipped).
    pub left: String,

    /// Right-hand bitstream.
    pub right: String,

    /// Format of the comparison.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub report_format: ReportFormat,
}

/// Bitstream serialization selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliFormat {
    /// `value,path` lines.
    Csv,
    /// `<bitstream>` XML document.
    Xml,
    /// One line per word line.
    Rows,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic and summary output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON on stdout.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print notes and extra progress lines.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to the run configuration.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && std::env::var_os("TERM").is_some(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Diff(ref args) => diff::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_build_default() {
        let cli = Cli::parse_from(["tessera", "build"]);
        match cli.command {
            Command::Build(ref args) => {
                assert!(args.format.is_none());
                assert!(args.output.is_none());
                assert!(!args.xml_addresses);
                assert_eq!(args.report_format, ReportFormat::Text);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_with_overrides() {
        let cli = Cli::parse_from([
            "tessera",
            "build",
            "--format",
            "xml",
            "--output",
            "out/top.xml",
            "--xml-addresses",
            "--report-format",
            "json",
        ]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.format, Some(CliFormat::Xml));
                assert_eq!(args.output.as_deref(), Some("out/top.xml"));
                assert!(args.xml_addresses);
                assert_eq!(args.report_format, ReportFormat::Json);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_diff() {
        let cli = Cli::parse_from(["tessera", "diff", "a.csv", "b.xml"]);
        match cli.command {
            Command::Diff(ref args) => {
                assert_eq!(args.left, "a.csv");
                assert_eq!(args.right, "b.xml");
            }
            _ => panic!("expected Diff command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["tessera", "--quiet", "--color", "never", "--config", "run/tessera.toml", "build"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.config.as_deref(), Some("run/tessera.toml"));
    }

    #[test]
    fn rows_format_parses() {
        let cli = Cli::parse_from(["tessera", "build", "-f", "rows"]);
        match cli.command {
            Command::Build(ref args) => assert_eq!(args.format, Some(CliFormat::Rows)),
            _ => panic!("expected Build command"),
        }
    }
}
