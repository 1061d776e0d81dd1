//! Replica bookkeeping for replicated pb-type hierarchies.
//!
//! A pb-type declared with `num_pb = n` exists `n` times inside its parent.
//! A [`ReplicaContext`] records, for each replicated segment of a template
//! path, its radix and current subscript, and advances like an odometer
//! (last slot fastest). Applying a context to a template produces one
//! concrete instance path.

use crate::path::HierPath;
use serde::{Deserialize, Serialize};

/// One replicated position within a template path.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ReplicaSlot {
    /// Index of the segment in the template path that receives the subscript.
    pub position: usize,
    /// Number of replicas at this level.
    pub radix: u32,
    /// Current subscript, always `< radix`.
    pub current: u32,
}

/// An odometer over the replica subscripts of one template path.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct ReplicaContext {
    slots: Vec<ReplicaSlot>,
}

impl ReplicaContext {
    /// Builds a context for `template`, asking `radix_of` for the replica count
    /// of every prefix of the template. Prefixes for which it returns `None`
    /// (mode segments, for example) carry no subscript.
    pub fn for_path(template: &HierPath, mut radix_of: impl FnMut(&HierPath) -> Option<u32>) -> Self {
        let mut slots = Vec::new();
        for position in 0..template.len() {
            if let Some(radix) = radix_of(&template.prefix(position + 1)) {
                slots.push(ReplicaSlot {
                    position,
                    radix,
                    current: 0,
                });
            }
        }
        Self { slots }
    }

    /// Builds a context whose slots map onto segment positions `0..n`.
    pub fn from_radices(radices: &[u32]) -> Self {
        Self {
            slots: radices
                .iter()
                .enumerate()
                .map(|(position, &radix)| ReplicaSlot {
                    position,
                    radix,
                    current: 0,
                })
                .collect(),
        }
    }

    /// Returns the slots of this context.
    pub fn slots(&self) -> &[ReplicaSlot] {
        &self.slots
    }

    /// Returns the current subscript of every slot, outermost first.
    pub fn indices(&self) -> Vec<u32> {
        self.slots.iter().map(|s| s.current).collect()
    }

    /// Returns the total number of replica combinations.
    pub fn count(&self) -> u64 {
        self.slots.iter().map(|s| u64::from(s.radix)).product()
    }

    /// Sets the current subscripts from `indices`, clamping each to its radix.
    pub fn set_indices(&mut self, indices: &[u32]) {
        for (slot, &idx) in self.slots.iter_mut().zip(indices) {
            slot.current = idx.min(slot.radix.saturating_sub(1));
        }
    }

    /// Advances to the next combination. Returns `false` (and wraps to all
    /// zeros) after the last one.
    pub fn advance(&mut self) -> bool {
        for slot in self.slots.iter_mut().rev() {
            slot.current += 1;
            if slot.current < slot.radix {
                return true;
            }
            slot.current = 0;
        }
        false
    }

    /// Writes the current subscripts into a copy of `template`.
    pub fn apply(&self, template: &HierPath) -> HierPath {
        let mut out = template.clone();
        for slot in &self.slots {
            out.set_index(slot.position, Some(slot.current));
        }
        out
    }

    /// Iterates over every combination, starting from all zeros.
    pub fn replicas(&self) -> Replicas {
        let mut start = self.clone();
        for slot in &mut start.slots {
            slot.current = 0;
        }
        Replicas {
            next: (start.count() > 0).then_some(start),
        }
    }
}

/// Iterator over every combination of a [`ReplicaContext`].
pub struct Replicas {
    next: Option<ReplicaContext>,
}

impl Iterator for Replicas {
    type Item = ReplicaContext;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let mut following = current.clone();
        if following.advance() {
            self.next = Some(following);
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odometer_last_slot_fastest() {
        let ctx = ReplicaContext::from_radices(&[2, 3]);
        let all: Vec<_> = ctx.replicas().map(|c| c.indices()).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2]
            ]
        );
    }

    #[test]
    fn advance_wraps_and_reports_end() {
        let mut ctx = ReplicaContext::from_radices(&[2]);
        assert!(ctx.advance());
        assert_eq!(ctx.indices(), vec![1]);
        assert!(!ctx.advance());
        assert_eq!(ctx.indices(), vec![0]);
    }

    #[test]
    fn zero_radix_has_no_replicas() {
        let ctx = ReplicaContext::from_radices(&[4, 0]);
        assert_eq!(ctx.count(), 0);
        assert_eq!(ctx.replicas().count(), 0);
    }

    #[test]
    fn empty_context_yields_one_replica() {
        let ctx = ReplicaContext::default();
        assert_eq!(ctx.replicas().count(), 1);
    }

    #[test]
    fn for_path_skips_unreplicated_segments() {
        let template = HierPath::parse("clb.default.fle").unwrap();
        let ctx = ReplicaContext::for_path(&template, |prefix| match prefix.to_string().as_str() {
            "clb" => Some(1),
            "clb.default.fle" => Some(4),
            _ => None,
        });
        assert_eq!(ctx.slots().len(), 2);
        let paths: Vec<_> = ctx.replicas().map(|c| c.apply(&template).to_string()).collect();
        assert_eq!(paths.len(), 4);
        assert_eq!(paths[0], "clb[0].default.fle[0]");
        assert_eq!(paths[3], "clb[0].default.fle[3]");
    }

    #[test]
    fn set_indices_clamps() {
        let mut ctx = ReplicaContext::from_radices(&[2, 2]);
        ctx.set_indices(&[5, 1]);
        assert_eq!(ctx.indices(), vec![1, 1]);
    }
}
