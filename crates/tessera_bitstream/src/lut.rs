//! LUT truth-table resolution.
//!
//! A packed LUT carries its synthesized table onto a physical site that may
//! have more inputs, through the packer's rotation map: entry `b` names the
//! logical input carried by physical input `b`, or `open`. For physical
//! input vector `v`, the logical index sums `1 << (max_m - m)` over every
//! set bit `b` of `v` whose rotation entry is `m`.

use crate::context::{LutGeometry, PassContext};
use crate::physical_path::TileCoord;
use crate::store::{ConfigBitMap, Rank};
use serde::Serialize;
use tessera_common::HierPath;
use tessera_design::{SynthLuts, TruthTable};
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, Origin};

const LUT_TOO_WIDE: DiagnosticCode = DiagnosticCode {
    category: Category::Unresolved,
    number: 460,
};
const NO_TABLE: DiagnosticCode = DiagnosticCode {
    category: Category::Unresolved,
    number: 461,
};
const OUT_OF_RANGE: DiagnosticCode = DiagnosticCode {
    category: Category::Unresolved,
    number: 462,
};
const DEGENERATE: DiagnosticCode = DiagnosticCode {
    category: Category::Structure,
    number: 130,
};

/// What a truth table computes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "kind", content = "input", rename_all = "snake_case")]
pub enum LutFunction {
    /// Fixed output, no input matters.
    Constant(bool),
    /// Follows one input.
    Buffer(u32),
    /// Inverts one input.
    Inverter(u32),
    /// Anything else.
    General,
}

/// Classifies `table` (entry `v` is the output for input vector `v`).
pub fn classify(table: &[bool]) -> LutFunction {
    let k = table.len().trailing_zeros();
    let active: Vec<u32> = (0..k)
        .filter(|&i| (0..table.len()).any(|v| table[v] != table[v ^ (1 << i)]))
        .collect();
    match active[..] {
        [] => LutFunction::Constant(table.first().copied().unwrap_or(false)),
        [i] => {
            if (0..table.len()).all(|v| table[v] == (v >> i & 1 == 1)) {
                LutFunction::Buffer(i)
            } else {
                LutFunction::Inverter(i)
            }
        }
        _ => LutFunction::General,
    }
}

/// The rotation that leaves a `k`-input table unchanged on a site with
/// `phys_k` inputs: physical input `b` carries logical `k - 1 - b`.
pub fn identity_rotation(k: u32, phys_k: u32) -> Vec<Option<u32>> {
    (0..phys_k).map(|b| (b < k).then(|| k - 1 - b)).collect()
}

/// Re-expresses `table` on a `phys_k`-input site through `rotation`.
///
/// Returns the physical table and the number of physical vectors whose
/// logical index fell outside `table`; those entries are `false`.
pub fn rotate(table: &TruthTable, rotation: &[Option<u32>], phys_k: u32) -> (Vec<bool>, usize) {
    let max_m = rotation.iter().flatten().copied().max().unwrap_or(0);
    let size = 1usize << phys_k;
    let mut out = Vec::with_capacity(size);
    let mut out_of_range = 0;
    for v in 0..size {
        let index = rotation
            .iter()
            .enumerate()
            .take(phys_k as usize)
            .filter(|&(b, _)| v >> b & 1 == 1)
            .filter_map(|(_, m)| *m)
            .try_fold(0usize, |acc, m| acc.checked_add(1usize.checked_shl(max_m - m)?));
        match index.and_then(|i| table.bits.get(i)) {
            Some(&bit) => out.push(bit),
            None => {
                out_of_range += 1;
                out.push(false);
            }
        }
    }
    (out, out_of_range)
}

/// A buffer from physical input `input` on a `phys_k`-input site.
pub fn wire_table(input: u32, phys_k: u32) -> Vec<bool> {
    (0..1usize << phys_k).map(|v| v >> input & 1 == 1).collect()
}

/// A packed LUT awaiting its contents.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LutSite {
    /// Tile of the site.
    pub tile: TileCoord,
    /// Logical LUT instance, relative to the tile.
    pub logical: HierPath,
    /// Physical bit owner, relative to the tile.
    pub physical: HierPath,
    /// Geometry of the physical owner.
    pub geometry: LutGeometry,
    /// Output net.
    pub net: String,
    /// `true` when packed in `wire` mode.
    pub wire: bool,
    /// Packer rotation map of the input port.
    pub rotation: Option<Vec<Option<u32>>>,
    /// Which logical input pins carry a signal.
    pub connected: Vec<bool>,
}

impl LutSite {
    /// Which physical input pins carry a signal.
    pub fn physical_connected(&self) -> Vec<bool> {
        match &self.rotation {
            Some(rot) => (0..self.geometry.inputs as usize)
                .map(|b| rot.get(b).copied().flatten().is_some())
                .collect(),
            None => (0..self.geometry.inputs as usize)
                .map(|b| self.connected.get(b).copied().unwrap_or(false))
                .collect(),
        }
    }
}

/// Outcome of resolving one LUT.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct LutReport {
    /// Full path of the physical bit owner.
    pub path: String,
    /// Output net.
    pub net: String,
    /// What the written table computes.
    pub function: LutFunction,
}

/// Computes the physical table of `site`, or reports why it cannot.
fn resolve(ctx: &PassContext<'_>, site: &LutSite, luts: Option<&SynthLuts>) -> Option<Vec<bool>> {
    let phys_k = site.geometry.inputs;
    let origin = || Origin::context(site.tile.locate(&site.logical).to_string());
    let table = if site.wire { None } else { luts.and_then(|l| l.get(&site.net)) };
    let Some(table) = table else {
        let Some(input) = site.physical_connected().iter().position(|&c| c) else {
            ctx.sink.emit(Diagnostic::warning(
                NO_TABLE,
                format!("no truth table for net '{}' and no connected input", site.net),
                origin(),
            ));
            return None;
        };
        return Some(wire_table(input as u32, phys_k));
    };
    if table.k > phys_k {
        ctx.sink.emit(Diagnostic::warning(
            LUT_TOO_WIDE,
            format!("net '{}' needs {} inputs but the site has {phys_k}", site.net, table.k),
            origin(),
        ));
        return None;
    }
    let rotation = site
        .rotation
        .clone()
        .unwrap_or_else(|| identity_rotation(table.k, phys_k));
    let (bits, out_of_range) = rotate(table, &rotation, phys_k);
    if out_of_range > 0 {
        ctx.sink.emit(
            Diagnostic::warning(
                OUT_OF_RANGE,
                format!(
                    "rotation of net '{}' reaches past its {}-entry table at {out_of_range} vectors",
                    site.net,
                    table.bits.len()
                ),
                origin(),
            )
            .with_note("those entries are written as 0"),
        );
    }
    Some(bits)
}

/// Writes the truth table of every site into `map`.
pub fn apply_lut_contents(
    ctx: &PassContext<'_>,
    map: &mut ConfigBitMap,
    sites: &[LutSite],
    luts: Option<&SynthLuts>,
) -> Vec<LutReport> {
    let mut reports = Vec::new();
    for site in sites {
        let Some(bits) = resolve(ctx, site, luts) else {
            continue;
        };
        let owner = site.tile.locate(&site.physical);
        for (b, &bit) in bits.iter().enumerate().take(site.geometry.bits as usize) {
            map.write(&owner.mem_bit(b as u32), if bit { '1' } else { '0' }, Rank::Packing, ctx.sink);
        }
        let function = classify(&bits);
        if function != LutFunction::General {
            ctx.sink.emit(Diagnostic::note(
                DEGENERATE,
                format!("LUT for net '{}' is {function:?}", site.net),
                Origin::context(owner.to_string()),
            ));
        }
        reports.push(LutReport {
            path: owner.to_string(),
            net: site.net.clone(),
            function,
        });
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(k: u32, bits: &[u8]) -> TruthTable {
        TruthTable {
            k,
            bits: bits.iter().map(|&b| b == 1).collect(),
        }
    }

    #[test]
    fn classifies_degenerate_tables() {
        assert_eq!(classify(&[false; 4]), LutFunction::Constant(false));
        assert_eq!(classify(&[true; 8]), LutFunction::Constant(true));
        assert_eq!(classify(&[false, true, false, true]), LutFunction::Buffer(0));
        assert_eq!(classify(&[true, true, false, false]), LutFunction::Inverter(1));
        assert_eq!(classify(&[false, false, false, true]), LutFunction::General);
    }

    #[test]
    fn identity_rotation_keeps_table() {
        let t = table(3, &[0, 1, 1, 0, 1, 0, 0, 1]);
        let (bits, oor) = rotate(&t, &identity_rotation(3, 3), 3);
        assert_eq!(bits, t.bits);
        assert_eq!(oor, 0);
    }

    #[test]
    fn smaller_table_on_larger_site_repeats() {
        let t = table(2, &[0, 0, 0, 1]);
        let (bits, oor) = rotate(&t, &identity_rotation(2, 3), 3);
        assert_eq!(bits, vec![false, false, false, true, false, false, false, true]);
        assert_eq!(oor, 0);
    }

    #[test]
    fn swapped_inputs() {
        // physical 0 carries logical 0, physical 1 carries logical 1: the
        // MSB-first weighting swaps the two input bits.
        let t = table(2, &[0, 1, 0, 0]);
        let (bits, _) = rotate(&t, &[Some(0), Some(1)], 2);
        assert_eq!(bits, vec![false, false, true, false]);
    }

    #[test]
    fn open_inputs_are_ignored() {
        let t = table(1, &[0, 1]);
        let (bits, oor) = rotate(&t, &[None, Some(0)], 2);
        assert_eq!(bits, vec![false, false, true, true]);
        assert_eq!(oor, 0);
    }

    #[test]
    fn out_of_range_fills_zero() {
        let t = table(1, &[1, 1]);
        let (bits, oor) = rotate(&t, &[Some(0), Some(2)], 2);
        assert_eq!(oor, 2);
        assert_eq!(bits, vec![true, false, true, false]);
    }

    #[test]
    fn oversized_rotation_entry_fills_zero() {
        let t = table(2, &[0, 1, 1, 0]);
        let (bits, oor) = rotate(&t, &[Some(0), Some(64)], 2);
        assert_eq!(oor, 2);
        assert_eq!(bits, vec![false, false, true, false]);
        let (_, oor) = rotate(&t, &[Some(0), Some(u32::MAX)], 2);
        assert_eq!(oor, 2);
    }

    #[test]
    fn wire_follows_one_input() {
        assert_eq!(wire_table(1, 2), vec![false, false, true, true]);
        assert_eq!(classify(&wire_table(2, 3)), LutFunction::Buffer(2));
    }
}
