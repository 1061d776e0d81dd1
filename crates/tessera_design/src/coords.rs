//! Coordinate map: bit path to (bit line, word line).

use crate::error::{read_text, DesignError};
use std::collections::HashMap;
use std::path::Path;
use tessera_common::HierPath;

/// Bit-line/word-line address of every configuration bit.
#[derive(Clone, Debug, Default)]
pub struct CoordMap {
    addresses: HashMap<HierPath, (u32, u32)>,
    columns: u32,
    rows: u32,
}

impl CoordMap {
    /// Returns `(bl, wl)` for `path`.
    pub fn address(&self, path: &HierPath) -> Option<(u32, u32)> {
        self.addresses.get(path).copied()
    }

    /// Number of bit lines (columns).
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of word lines (rows).
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of mapped bits.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Returns `true` if nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Reads a coordinate map file.
pub fn load_coord_map(path: &Path) -> Result<CoordMap, DesignError> {
    parse_coord_map(&read_text(path)?)
}

/// Parses `path bl wl` lines; blank lines and `#` comments are skipped.
pub fn parse_coord_map(content: &str) -> Result<CoordMap, DesignError> {
    let mut out = CoordMap::default();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let bad = |reason: &str| DesignError::malformed("coord_map", line_no + 1, reason);
        let [path, bl, wl] = line.split_whitespace().collect::<Vec<_>>()[..] else {
            return Err(bad("expected 'path bl wl'"));
        };
        let path = HierPath::parse(path).map_err(|e| bad(&e.to_string()))?;
        let bl: u32 = bl.parse().map_err(|_| bad("bad bit line"))?;
        let wl: u32 = wl.parse().map_err(|_| bad("bad word line"))?;
        out.columns = out.columns.max(bl + 1);
        out.rows = out.rows.max(wl + 1);
        out.addresses.insert(path, (bl, wl));
    }
    Ok(out)
}
