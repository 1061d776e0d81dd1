//! LUT truth tables from the post-synthesis Verilog netlist.
//!
//! Only `LUT_K` instances are read:
//!
//! ```text
//! LUT_K #(
//!     .K(2),
//!     .LUT_MASK(4'b1000)
//! ) \lut_n_out  (
//!     .in({ b, a }),
//!     .out(n_out)
//! );
//! ```
//!
//! The mask literal is written most-significant bit first, so bit `v` of the
//! table (the output for input vector `v`) is the `v`-th character from the
//! right.

use crate::error::{read_text, DesignError};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

static RE_LUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)LUT_K\s*#\(\s*\.K\((\d+)\)\s*,\s*\.LUT_MASK\(\s*(\d+)'([bBhH])([0-9a-fA-F_xXzZ]+)\s*\)\s*\)\s*(\S+)\s*\((.*?)\)\s*;",
    )
    .unwrap()
});
static RE_OUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.out\s*\(\s*\\?([^\s()]+)\s*\)").unwrap());

/// A LUT truth table, indexed by input vector.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TruthTable {
    /// Number of inputs.
    pub k: u32,
    /// Output for each input vector, `2^k` entries.
    pub bits: Vec<bool>,
}

impl TruthTable {
    /// Builds a table from a most-significant-first bit string.
    pub fn from_msb_first(k: u32, text: &str) -> Option<Self> {
        let size = 1usize.checked_shl(k)?;
        let mut bits: Vec<bool> = text
            .chars()
            .rev()
            .filter(|&c| c != '_')
            .map(|c| c == '1')
            .collect();
        bits.resize(size, false);
        Some(Self { k, bits })
    }

    /// Returns the output for input vector `v`.
    pub fn get(&self, v: usize) -> bool {
        self.bits.get(v).copied().unwrap_or(false)
    }

    /// Renders the table most-significant bit first.
    pub fn to_msb_first(&self) -> String {
        self.bits.iter().rev().map(|&b| if b { '1' } else { '0' }).collect()
    }
}

/// Truth tables keyed by output net name.
#[derive(Clone, Debug, Default)]
pub struct SynthLuts {
    by_net: BTreeMap<String, TruthTable>,
}

impl SynthLuts {
    /// Returns the table driving `net`.
    pub fn get(&self, net: &str) -> Option<&TruthTable> {
        self.by_net.get(net)
    }

    /// Number of LUT instances read.
    pub fn len(&self) -> usize {
        self.by_net.len()
    }

    /// Returns `true` if no LUT was read.
    pub fn is_empty(&self) -> bool {
        self.by_net.is_empty()
    }
}

/// Reads LUT tables from a Verilog file.
pub fn load_synth_luts(path: &Path) -> Result<SynthLuts, DesignError> {
    parse_synth_luts(&read_text(path)?)
}

/// Scans Verilog text for `LUT_K` instances.
pub fn parse_synth_luts(content: &str) -> Result<SynthLuts, DesignError> {
    let mut out = SynthLuts::default();
    for caps in RE_LUT.captures_iter(content) {
        let line = content[..caps.get(0).map_or(0, |m| m.start())].lines().count() + 1;
        let k: u32 = caps[1]
            .parse()
            .map_err(|_| DesignError::malformed("synth", line, "bad K parameter"))?;
        let width: usize = caps[2]
            .parse()
            .map_err(|_| DesignError::malformed("synth", line, "bad LUT_MASK width"))?;
        let literal = caps[4].replace('_', "");
        let mut msb_first = match &caps[3] {
            "b" | "B" => literal,
            _ => literal
                .chars()
                .map(|c| c.to_digit(16).map(|d| format!("{d:04b}")).unwrap_or_else(|| "0000".into()))
                .collect(),
        };
        if msb_first.len() > width {
            msb_first = msb_first[msb_first.len() - width..].to_string();
        }
        let table = TruthTable::from_msb_first(k, &msb_first)
            .ok_or_else(|| DesignError::malformed("synth", line, format!("K={k} is too large")))?;
        let Some(net) = RE_OUT.captures(&caps[6]).map(|c| c[1].to_string()) else {
            return Err(DesignError::malformed("synth", line, "LUT_K without .out connection"));
        };
        out.by_net.insert(net, table);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETLIST: &str = r"
module top (a, b, c, n_out, n_inv);
    input a;
    LUT_K #(
        .K(2),
        .LUT_MASK(4'b1000)
    ) \lut_n_out  (
        .in({
            b,
            a
         }),
        .out(n_out)
    );

    LUT_K #(.K(4), .LUT_MASK(16'h00FF)) lut_inv (.in({1'b0, 1'b0, 1'b0, c}), .out(\n_inv ));
endmodule
";

    #[test]
    fn reads_binary_and_hex_masks() {
        let luts = parse_synth_luts(NETLIST).unwrap();
        assert_eq!(luts.len(), 2);
        let and = luts.get("n_out").unwrap();
        assert_eq!(and.k, 2);
        assert_eq!(and.bits, vec![false, false, false, true]);

        let inv = luts.get("n_inv").unwrap();
        assert_eq!(inv.bits.len(), 16);
        assert!(inv.get(0) && inv.get(7) && !inv.get(8));
    }

    #[test]
    fn msb_first_round_trip() {
        let t = TruthTable::from_msb_first(3, "0110_1001").unwrap();
        assert_eq!(t.to_msb_first(), "01101001");
        assert!(t.get(0) && !t.get(1));
    }

    #[test]
    fn short_mask_is_zero_extended() {
        let t = TruthTable::from_msb_first(2, "1").unwrap();
        assert_eq!(t.bits, vec![true, false, false, false]);
    }

    #[test]
    fn missing_output_is_malformed() {
        let text = "LUT_K #(.K(1), .LUT_MASK(2'b10)) l (.in(a));";
        assert!(parse_synth_luts(text).is_err());
    }
}
