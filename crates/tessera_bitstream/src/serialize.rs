//! Bitstream serializers and readers.
//!
//! Three output forms: CSV `value,path` lines; an XML `<bitstream>` of
//! `<bit id path value/>` elements, optionally carrying bit-line and
//! word-line addresses; and the row form, one line per word line holding
//! every bit-line value followed by the one-hot row address. The row form
//! and addressed XML need a coordinate map.
//!
//! Prior and override bitstreams are read back from CSV or XML.

use crate::error::OutputError;
use crate::select_code::select_width;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::LazyLock;
use tessera_common::{read_input_to_string, HierPath};
use tessera_config::OutputFormat;
use tessera_design::CoordMap;

/// Path-ordered bit values, as serialized.
pub type BitValues = BTreeMap<HierPath, char>;

static RE_XML_BIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<bit\s([^>]*?)/?>").unwrap());
static RE_XML_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)""#).unwrap());

/// Renders `bits` as CSV.
pub fn write_csv(bits: &BitValues) -> String {
    let mut out = String::new();
    for (path, value) in bits {
        let _ = writeln!(out, "{value},{path}");
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Binary address of `line` among `count` lines, most significant bit first.
fn address(line: u32, count: u32) -> String {
    let width = select_width(count as usize).max(1) as usize;
    format!("{line:0width$b}")
}

/// Renders `bits` as XML. With `coords`, every bit carries its `bl` and
/// `wl` addresses and an unmapped bit is an error.
pub fn write_xml(bits: &BitValues, coords: Option<&CoordMap>) -> Result<String, OutputError> {
    let mut out = String::from("<bitstream>\n");
    for (id, (path, value)) in bits.iter().enumerate() {
        let head = format!("  <bit id=\"{id}\" path=\"{}\" value=\"{value}\"", escape(&path.to_string()));
        match coords {
            None => {
                let _ = writeln!(out, "{head}/>");
            }
            Some(coords) => {
                let (bl, wl) = coords
                    .address(path)
                    .ok_or_else(|| OutputError::Unaddressed(path.to_string()))?;
                let _ = writeln!(out, "{head}>");
                let _ = writeln!(out, "    <bl address=\"{}\"/>", address(bl, coords.columns()));
                let _ = writeln!(out, "    <wl address=\"{}\"/>", address(wl, coords.rows()));
                out.push_str("  </bit>\n");
            }
        }
    }
    out.push_str("</bitstream>\n");
    Ok(out)
}

/// Renders `bits` in row form. Cells no bit maps to hold `0`.
pub fn write_rows(bits: &BitValues, coords: &CoordMap) -> Result<String, OutputError> {
    let columns = coords.columns() as usize;
    let rows = coords.rows() as usize;
    let mut grid = vec![vec!['0'; columns]; rows];
    for (path, &value) in bits {
        let cell = coords
            .address(path)
            .and_then(|(bl, wl)| grid.get_mut(wl as usize)?.get_mut(bl as usize));
        match cell {
            Some(cell) => *cell = value,
            None => return Err(OutputError::Unaddressed(path.to_string())),
        }
    }
    let mut out = String::with_capacity(rows * (columns + rows + 1));
    for (wl, line) in grid.iter().enumerate() {
        out.extend(line.iter());
        out.extend((0..rows).map(|r| if r == wl { '1' } else { '0' }));
        out.push('\n');
    }
    Ok(out)
}

/// Renders `bits` in `format`.
pub fn render(format: OutputFormat, bits: &BitValues, coords: Option<&CoordMap>) -> Result<String, OutputError> {
    match format {
        OutputFormat::Csv => Ok(write_csv(bits)),
        OutputFormat::Xml => write_xml(bits, coords),
        OutputFormat::Rows => write_rows(bits, coords.ok_or(OutputError::MissingCoordMap("rows"))?),
    }
}

fn bit_value(line: usize, text: &str) -> Result<char, OutputError> {
    match text.trim() {
        "0" => Ok('0'),
        "1" => Ok('1'),
        other => Err(OutputError::malformed(line, format!("bit value '{other}' is not 0 or 1"))),
    }
}

fn bit_path(line: usize, text: &str) -> Result<HierPath, OutputError> {
    HierPath::parse(text.trim()).map_err(|e| OutputError::malformed(line, e.to_string()))
}

/// Parses CSV text. Blank lines and `#` comments are skipped.
pub fn parse_csv(text: &str) -> Result<BitValues, OutputError> {
    let mut bits = BitValues::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }
        let (value, path) = raw
            .split_once(',')
            .ok_or_else(|| OutputError::malformed(line, "expected 'value,path'"))?;
        bits.insert(bit_path(line, path)?, bit_value(line, value)?);
    }
    Ok(bits)
}

/// Parses XML text produced by [`write_xml`].
pub fn parse_xml(text: &str) -> Result<BitValues, OutputError> {
    let mut bits = BitValues::new();
    for caps in RE_XML_BIT.captures_iter(text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        let line = text[..start].matches('\n').count() + 1;
        let attrs: BTreeMap<&str, String> = RE_XML_ATTR
            .captures_iter(&caps[1])
            .filter_map(|a| Some((a.get(1)?.as_str(), unescape(a.get(2)?.as_str()))))
            .collect();
        let (Some(path), Some(value)) = (attrs.get("path"), attrs.get("value")) else {
            return Err(OutputError::malformed(line, "<bit> lacks path or value"));
        };
        bits.insert(bit_path(line, path)?, bit_value(line, value)?);
    }
    Ok(bits)
}

/// Reads a bitstream file, choosing the reader by extension (`.xml`, or CSV
/// otherwise; a trailing `.gz` is looked through).
pub fn load_bitstream(path: &Path) -> Result<BitValues, OutputError> {
    let text = read_input_to_string(path).map_err(|e| OutputError::io(path, e))?;
    let name = path.to_string_lossy();
    if name.trim_end_matches(".gz").ends_with(".xml") {
        parse_xml(&text)
    } else {
        parse_csv(&text)
    }
}

/// Writes `text` to `path`, creating parent directories.
pub fn write_output(path: &Path, text: &str) -> Result<(), OutputError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| OutputError::io(dir, e))?;
    }
    std::fs::write(path, text).map_err(|e| OutputError::io(path, e))
}
