//! Placement table (`.place`).
//!
//! ```text
//! Netlist_File: top.net Netlist_ID: SHA256:...
//! Array size: 3 x 3 logic blocks
//!
//! #block name x   y   subblk  layer   block number
//! n_out       1   1   0       0       #0
//! ```

use crate::error::{read_text, DesignError};
use std::collections::HashMap;
use std::path::Path;

/// One placed top-level block.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PlacedBlock {
    /// Block name, matching the packed design.
    pub name: String,
    /// Grid x coordinate.
    pub x: u32,
    /// Grid y coordinate.
    pub y: u32,
    /// Capacity slot within the tile.
    pub subblk: u32,
    /// Die layer.
    pub layer: u32,
}

/// The whole placement.
#[derive(Clone, Debug, Default)]
pub struct Placement {
    blocks: Vec<PlacedBlock>,
    by_name: HashMap<String, usize>,
}

impl Placement {
    /// Returns the placement of block `name`.
    pub fn get(&self, name: &str) -> Option<&PlacedBlock> {
        self.by_name.get(name).map(|&i| &self.blocks[i])
    }

    /// Iterates over placed blocks in file order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedBlock> {
        self.blocks.iter()
    }

    /// Number of placed blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if nothing is placed.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Reads a placement file.
pub fn load_placement(path: &Path) -> Result<Placement, DesignError> {
    parse_placement(&read_text(path)?)
}

/// Parses placement text. Header lines and `#` comments are skipped.
pub fn parse_placement(content: &str) -> Result<Placement, DesignError> {
    let mut out = Placement::default();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with('#')
            || line.starts_with("Netlist_File:")
            || line.starts_with("Array size:")
        {
            continue;
        }
        let fields: Vec<&str> = line
            .split('#')
            .next()
            .unwrap_or_default()
            .split_whitespace()
            .collect();
        if fields.len() < 4 {
            return Err(DesignError::malformed(
                "place",
                line_no + 1,
                "expected 'name x y subblk [layer]'",
            ));
        }
        let num = |i: usize| {
            fields[i].parse::<u32>().map_err(|_| {
                DesignError::malformed("place", line_no + 1, format!("'{}' is not a number", fields[i]))
            })
        };
        let block = PlacedBlock {
            name: fields[0].to_string(),
            x: num(1)?,
            y: num(2)?,
            subblk: num(3)?,
            layer: if fields.len() > 4 { num(4)? } else { 0 },
        };
        out.by_name.insert(block.name.clone(), out.blocks.len());
        out.blocks.push(block);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_headers_and_block_numbers() {
        let p = parse_placement(
            "Netlist_File: top.net Netlist_ID: SHA256:00\n\
             Array size: 3 x 3 logic blocks\n\
             \n\
             #block name\tx\ty\tsubblk\tlayer\tblock number\n\
             n_out\t1\t1\t0\t0\t#0\n\
             out:y\t0\t1\t3\t#1\n",
        )
        .unwrap();
        assert_eq!(p.len(), 2);
        let b = p.get("n_out").unwrap();
        assert_eq!((b.x, b.y, b.subblk, b.layer), (1, 1, 0, 0));
        assert_eq!(p.get("out:y").unwrap().subblk, 3);
    }

    #[test]
    fn short_line_is_malformed() {
        let err = parse_placement("a 1 2\n").unwrap_err();
        assert!(matches!(err, DesignError::Malformed { line: 1, .. }));
    }

    #[test]
    fn non_numeric_coordinate() {
        assert!(parse_placement("a x 2 0\n").is_err());
    }
}
