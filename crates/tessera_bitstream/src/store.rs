//! The configuration-bit map and its write discipline.
//!
//! Bits are created only by default initialization. Every later write names
//! a [`Rank`]; a write may replace a bit's value only when its rank is
//! numerically lower than the rank already recorded (or the bit still holds
//! its default). Writes to bits that were never created are refused and
//! counted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessera_common::HierPath;
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Origin};

/// Precedence of a write, highest priority first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Rank {
    /// Decided by the router.
    Routing = 0,
    /// A packer connection on a logical mux.
    Packing = 1,
    /// A packer connection realized through an annotation mapping.
    Mapped = 2,
    /// An annotation setting triggered by a packed mode.
    Setting = 3,
}

impl Rank {
    /// Every rank, highest priority first.
    pub const ALL: [Rank; 4] = [Rank::Routing, Rank::Packing, Rank::Mapped, Rank::Setting];

    /// Numeric rank.
    pub fn level(self) -> usize {
        self as usize
    }
}

/// One configuration bit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BitEntry {
    /// Current value, `'0'` or `'1'`.
    pub value: char,
    /// Rank of the last accepted write; `None` while the default stands.
    pub rank: Option<Rank>,
}

/// Result of a single write.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WriteOutcome {
    /// The value was stored.
    Written,
    /// The bit already held this value at equal or higher precedence.
    Unchanged,
    /// The bit does not exist.
    Missing,
    /// A higher-or-equal precedence write holds a different value.
    Conflict,
}

/// Counters kept by the map.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct WriteStats {
    /// Accepted writes per rank.
    pub writes: [usize; 4],
    /// Writes refused because the bit does not exist.
    pub missing: usize,
    /// Writes dropped for precedence.
    pub conflicts: usize,
    /// Bits replaced by override files.
    pub overridden: usize,
}

const DUPLICATE_BIT: DiagnosticCode = DiagnosticCode {
    category: Category::Structure,
    number: 120,
};
const MISSING_BIT: DiagnosticCode = DiagnosticCode {
    category: Category::MissingBit,
    number: 201,
};
const MISSING_OVERRIDE: DiagnosticCode = DiagnosticCode {
    category: Category::MissingBit,
    number: 202,
};
const CONFLICT: DiagnosticCode = DiagnosticCode {
    category: Category::Precedence,
    number: 301,
};

/// Flat map from bit path to value.
#[derive(Clone, Debug, Default)]
pub struct ConfigBitMap {
    bits: BTreeMap<HierPath, BitEntry>,
    stats: WriteStats,
}

impl ConfigBitMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates bit `path` with its default value. A path created twice keeps
    /// its first default and is reported once.
    pub fn create(&mut self, path: HierPath, value: char, sink: &DiagnosticSink) -> bool {
        if self.bits.contains_key(&path) {
            sink.emit_once(
                format!("dup:{path}"),
                Diagnostic::warning(
                    DUPLICATE_BIT,
                    format!("configuration bit '{path}' is created twice"),
                    Origin::context("default initialization"),
                ),
            );
            return false;
        }
        self.bits.insert(path, BitEntry { value, rank: None });
        true
    }

    /// Writes `value` to `path` at `rank`.
    pub fn write(
        &mut self,
        path: &HierPath,
        value: char,
        rank: Rank,
        sink: &DiagnosticSink,
    ) -> WriteOutcome {
        let Some(entry) = self.bits.get_mut(path) else {
            self.stats.missing += 1;
            sink.emit(Diagnostic::warning(
                MISSING_BIT,
                format!("write to nonexistent bit '{path}'"),
                Origin::context(format!("rank {} write", rank.level())),
            ));
            return WriteOutcome::Missing;
        };
        match entry.rank {
            Some(held) if held <= rank => {
                if entry.value == value {
                    return WriteOutcome::Unchanged;
                }
                self.stats.conflicts += 1;
                sink.emit_once(
                    format!("conflict:{path}"),
                    Diagnostic::warning(
                        CONFLICT,
                        format!(
                            "bit '{path}' holds '{}' at rank {}; rank {} write of '{value}' dropped",
                            entry.value,
                            held.level(),
                            rank.level()
                        ),
                        Origin::context("bit assignment"),
                    ),
                );
                WriteOutcome::Conflict
            }
            held => {
                if let Some(held) = held.filter(|_| entry.value != value) {
                    sink.emit_once(
                        format!("conflict:{path}"),
                        Diagnostic::note(
                            CONFLICT,
                            format!(
                                "bit '{path}' rank {} value '{}' replaced by rank {} value '{value}'",
                                held.level(),
                                entry.value,
                                rank.level()
                            ),
                            Origin::context("bit assignment"),
                        ),
                    );
                }
                entry.value = value;
                entry.rank = Some(rank);
                self.stats.writes[rank.level()] += 1;
                WriteOutcome::Written
            }
        }
    }

    /// Writes `bits` (bit 0 first) to `<mux>.mem_out[b]`.
    pub fn write_bits(
        &mut self,
        mux: &HierPath,
        bits: &[char],
        rank: Rank,
        sink: &DiagnosticSink,
    ) -> Vec<WriteOutcome> {
        bits.iter()
            .enumerate()
            .map(|(b, &v)| self.write(&mux.mem_bit(b as u32), v, rank, sink))
            .collect()
    }

    /// Replaces the value of `path` unconditionally.
    pub fn overlay(&mut self, path: &HierPath, value: char, sink: &DiagnosticSink) -> bool {
        match self.bits.get_mut(path) {
            Some(entry) => {
                entry.value = value;
                self.stats.overridden += 1;
                true
            }
            None => {
                self.stats.missing += 1;
                sink.emit(Diagnostic::warning(
                    MISSING_OVERRIDE,
                    format!("override names nonexistent bit '{path}'"),
                    Origin::context("override"),
                ));
                false
            }
        }
    }

    /// Returns the value of `path`.
    pub fn get(&self, path: &HierPath) -> Option<char> {
        self.bits.get(path).map(|e| e.value)
    }

    /// Returns the full entry of `path`.
    pub fn entry(&self, path: &HierPath) -> Option<&BitEntry> {
        self.bits.get(path)
    }

    /// Iterates over `(path, value)` in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&HierPath, char)> {
        self.bits.iter().map(|(p, e)| (p, e.value))
    }

    /// Returns the bits as a plain path-to-value map.
    pub fn values(&self) -> BTreeMap<HierPath, char> {
        self.iter().map(|(p, v)| (p.clone(), v)).collect()
    }

    /// Returns the write counters.
    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns `true` if no bit exists.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> HierPath {
        HierPath::parse(s).unwrap()
    }

    fn map_with(bits: &[&str]) -> ConfigBitMap {
        let sink = DiagnosticSink::new();
        let mut map = ConfigBitMap::new();
        for b in bits {
            map.create(path(b), '1', &sink);
        }
        map
    }

    #[test]
    fn routing_wins_in_either_order() {
        let sink = DiagnosticSink::new();
        let p = path("m.mem_out[0]");

        let mut a = map_with(&["m.mem_out[0]"]);
        a.write(&p, '0', Rank::Routing, &sink);
        assert_eq!(a.write(&p, '1', Rank::Setting, &sink), WriteOutcome::Conflict);
        assert_eq!(a.get(&p), Some('0'));

        let mut b = map_with(&["m.mem_out[0]"]);
        b.write(&p, '1', Rank::Setting, &sink);
        assert_eq!(b.write(&p, '0', Rank::Routing, &sink), WriteOutcome::Written);
        assert_eq!(b.get(&p), Some('0'));
    }

    #[test]
    fn equal_rank_keeps_first_and_reports_once() {
        let sink = DiagnosticSink::new();
        let p = path("m.mem_out[0]");
        let mut map = map_with(&["m.mem_out[0]"]);
        map.write(&p, '0', Rank::Packing, &sink);
        map.write(&p, '1', Rank::Packing, &sink);
        map.write(&p, '1', Rank::Packing, &sink);
        assert_eq!(map.get(&p), Some('0'));
        assert_eq!(map.stats().conflicts, 2);
        assert_eq!(sink.counts().precedence, 1);
    }

    #[test]
    fn missing_write_never_inserts() {
        let sink = DiagnosticSink::new();
        let mut map = map_with(&["m.mem_out[0]"]);
        let outcome = map.write(&path("x.mem_out[0]"), '1', Rank::Routing, &sink);
        assert_eq!(outcome, WriteOutcome::Missing);
        assert_eq!(map.len(), 1);
        assert_eq!(map.stats().missing, 1);
        assert_eq!(sink.counts().missing_bit, 1);
    }

    #[test]
    fn duplicate_create_reported_once() {
        let sink = DiagnosticSink::new();
        let mut map = ConfigBitMap::new();
        assert!(map.create(path("a.mem_out[0]"), '0', &sink));
        assert!(!map.create(path("a.mem_out[0]"), '1', &sink));
        assert!(!map.create(path("a.mem_out[0]"), '1', &sink));
        assert_eq!(map.get(&path("a.mem_out[0]")), Some('0'));
        assert_eq!(sink.counts().structure, 1);
    }

    #[test]
    fn write_bits_low_bit_first() {
        let sink = DiagnosticSink::new();
        let mut map = map_with(&["m.mem_out[0]", "m.mem_out[1]"]);
        map.write_bits(&path("m"), &['1', '0'], Rank::Packing, &sink);
        assert_eq!(map.get(&path("m.mem_out[0]")), Some('1'));
        assert_eq!(map.get(&path("m.mem_out[1]")), Some('0'));
        assert_eq!(map.stats().writes[1], 2);
    }

    #[test]
    fn overlay_replaces_regardless_of_rank() {
        let sink = DiagnosticSink::new();
        let p = path("m.mem_out[0]");
        let mut map = map_with(&["m.mem_out[0]"]);
        map.write(&p, '0', Rank::Routing, &sink);
        assert!(map.overlay(&p, '1', &sink));
        assert_eq!(map.get(&p), Some('1'));
        assert!(!map.overlay(&path("nope.mem_out[0]"), '1', &sink));
        assert_eq!(map.len(), 1);
    }
}
