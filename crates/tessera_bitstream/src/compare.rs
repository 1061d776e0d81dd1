//! Bitstream comparison and override merging.

use crate::serialize::BitValues;
use crate::store::ConfigBitMap;
use serde::Serialize;
use tessera_common::HierPath;
use tessera_diagnostics::DiagnosticSink;

/// A bit whose value differs between two bitstreams.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct ChangedBit {
    /// Bit path.
    pub path: String,
    /// Value on the left.
    pub left: char,
    /// Value on the right.
    pub right: char,
}

/// Difference between two bitstreams.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize)]
pub struct BitDiff {
    /// Bits present on both sides with different values.
    pub changed: Vec<ChangedBit>,
    /// Bits only on the left.
    pub only_left: Vec<String>,
    /// Bits only on the right.
    pub only_right: Vec<String>,
}

impl BitDiff {
    /// Returns `true` if both sides hold the same bits and values.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.only_left.is_empty() && self.only_right.is_empty()
    }

    /// Total number of differing bits.
    pub fn len(&self) -> usize {
        self.changed.len() + self.only_left.len() + self.only_right.len()
    }
}

/// Compares two bitstreams bit by bit, in path order.
pub fn diff(left: &BitValues, right: &BitValues) -> BitDiff {
    let mut out = BitDiff::default();
    for (path, &l) in left {
        match right.get(path) {
            Some(&r) if r != l => out.changed.push(ChangedBit {
                path: path.to_string(),
                left: l,
                right: r,
            }),
            Some(_) => {}
            None => out.only_left.push(path.to_string()),
        }
    }
    out.only_right = right
        .keys()
        .filter(|p| !left.contains_key(*p))
        .map(HierPath::to_string)
        .collect();
    out
}

/// Overlays `overlay` onto `map`, replacing values regardless of rank.
/// Returns the number of bits replaced; unknown paths are reported.
pub fn apply_overrides(map: &mut ConfigBitMap, overlay: &BitValues, sink: &DiagnosticSink) -> usize {
    overlay
        .iter()
        .filter(|(path, &value)| map.overlay(path, value, sink))
        .count()
}
