//! `tessera diff`: bit-by-bit comparison of two bitstream files.

use std::path::Path;

use tessera_bitstream::{diff, load_bitstream, BitDiff};

use crate::{DiffArgs, GlobalArgs, ReportFormat};

/// Runs the `tessera diff` command.
///
/// Returns exit code 0 when both files hold the same bits and values, 1
/// otherwise.
pub fn run(args: &DiffArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let left = load_bitstream(Path::new(&args.left))?;
    let right = load_bitstream(Path::new(&args.right))?;
    let result = diff(&left, &right);

    match args.report_format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        ReportFormat::Text => {
            for line in diff_lines(&result) {
                println!("{line}");
            }
            if !global.quiet {
                eprintln!(
                    "   Compared {} and {} bits: {} differ",
                    left.len(),
                    right.len(),
                    result.len()
                );
            }
        }
    }
    Ok(if result.is_empty() { 0 } else { 1 })
}

/// Formats one line per differing bit: `~` for a changed value, `-` for a
/// bit only on the left, `+` for a bit only on the right.
pub fn diff_lines(result: &BitDiff) -> Vec<String> {
    let changed = result
        .changed
        .iter()
        .map(|c| format!("~ {} {} -> {}", c.path, c.left, c.right));
    let removed = result.only_left.iter().map(|p| format!("- {p}"));
    let added = result.only_right.iter().map(|p| format!("+ {p}"));
    changed.chain(removed).chain(added).collect()
}
