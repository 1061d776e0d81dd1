//! The assembled architecture model.

use crate::bus::PinRef;
use crate::circuit::{load_circuit_library, CircuitModel};
use crate::error::ArchError;
use crate::ids::{MuxId, PbId};
use crate::interconnect::{derive_interconnect, InterconnectTable, MuxDef, RootOutputs};
use crate::logical::{load_pb_tree, PbTree, PbType, PortDir, PrimitiveKind};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tessera_common::{HierPath, ReplicaContext};
use tessera_markup::{read_markup_file, Element};

/// A pb-type resolved from `blk.sub[mode].leaf` notation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ResolvedPb {
    /// The named pb-type.
    pub id: PbId,
    /// Mode index, when the last component named one.
    pub mode: Option<usize>,
}

/// Logical and circuit architecture tables, built once per run.
#[derive(Clone, Debug)]
pub struct ArchitectureModel {
    tree: PbTree,
    circuits: BTreeMap<String, CircuitModel>,
    tables: HashMap<(HierPath, String), InterconnectTable>,
    muxes: Vec<MuxDef>,
    mux_by_sink: HashMap<(HierPath, String, PinRef), MuxId>,
    mux_by_pin: HashMap<(HierPath, PinRef), MuxId>,
    root_outputs: HashMap<String, RootOutputs>,
}

impl ArchitectureModel {
    /// Reads both architecture files and builds the model.
    pub fn load(logical: &Path, circuit: &Path) -> Result<Self, ArchError> {
        let logical = read_markup_file(logical)?;
        let circuit = read_markup_file(circuit)?;
        Self::from_elements(&logical, &circuit)
    }

    /// Builds the model from already-parsed markup trees.
    pub fn from_elements(logical: &Element, circuit: &Element) -> Result<Self, ArchError> {
        let tree = load_pb_tree(logical)?;
        let circuits = load_circuit_library(circuit)?;
        let derived = derive_interconnect(&tree)?;
        let mux_by_sink = derived
            .muxes
            .iter()
            .map(|m| ((m.mode.clone(), m.interconnect.clone(), m.sink.clone()), m.id))
            .collect();
        let mux_by_pin = derived
            .muxes
            .iter()
            .map(|m| ((m.mode.clone(), m.sink.clone()), m.id))
            .collect();
        Ok(Self {
            tree,
            circuits,
            tables: derived.tables,
            muxes: derived.muxes,
            mux_by_sink,
            mux_by_pin,
            root_outputs: derived.root_outputs,
        })
    }

    /// Returns the pb-type tree.
    pub fn tree(&self) -> &PbTree {
        &self.tree
    }

    /// Returns the pb-type with ID `id`.
    pub fn pb(&self, id: PbId) -> &PbType {
        self.tree.get(id)
    }

    /// Returns the top-level pb-type named `name`.
    pub fn root(&self, name: &str) -> Option<&PbType> {
        self.tree.root(name)
    }

    /// Returns the circuit model named `name`.
    pub fn circuit(&self, name: &str) -> Option<&CircuitModel> {
        self.circuits.get(name)
    }

    /// Returns every circuit model.
    pub fn circuits(&self) -> &BTreeMap<String, CircuitModel> {
        &self.circuits
    }

    /// Returns the interconnect table of element `name` in mode `mode`.
    pub fn table(&self, mode: &HierPath, name: &str) -> Option<&InterconnectTable> {
        self.tables.get(&(mode.template(), name.to_string()))
    }

    /// Returns the bit-owning mux of element `name` in `mode` driving `sink`.
    pub fn mux(&self, mode: &HierPath, name: &str, sink: &PinRef) -> Option<&MuxDef> {
        self.mux_by_sink
            .get(&(mode.template(), name.to_string(), sink.clone()))
            .map(|&id| &self.muxes[id.index()])
    }

    /// Returns the bit-owning mux in `mode` driving `sink`, whatever element
    /// it came from.
    pub fn mux_driving(&self, mode: &HierPath, sink: &PinRef) -> Option<&MuxDef> {
        self.mux_by_pin
            .get(&(mode.template(), sink.clone()))
            .map(|&id| &self.muxes[id.index()])
    }

    /// Returns every bit-owning mux.
    pub fn muxes(&self) -> &[MuxDef] {
        &self.muxes
    }

    /// Returns the bit-owning muxes inside top-level pb-type `root`.
    pub fn muxes_of<'a>(&'a self, root: &'a str) -> impl Iterator<Item = &'a MuxDef> + 'a {
        self.muxes
            .iter()
            .filter(move |m| m.mode.segments().first().is_some_and(|s| s.name == root))
    }

    /// Returns the top-of-tile wiring tables of `root`.
    pub fn root_outputs(&self, root: &str) -> Option<&RootOutputs> {
        self.root_outputs.get(root)
    }

    /// Returns the LUT primitives inside `root` that own truth-table bits:
    /// physically reachable LUTs with no LUT ancestor.
    pub fn lut_sites<'a>(&'a self, root: &'a str) -> impl Iterator<Item = &'a PbType> + 'a {
        self.tree.iter().filter(move |pb| {
            pb.physical_reachable
                && pb.primitive_kind() == PrimitiveKind::Lut
                && self.tree.root_of(pb).name == root
                && !self.has_lut_ancestor(pb)
        })
    }

    fn has_lut_ancestor(&self, pb: &PbType) -> bool {
        let mut cur = pb.parent;
        while let Some((id, _)) = cur {
            let parent = self.tree.get(id);
            if parent.primitive_kind() == PrimitiveKind::Lut {
                return true;
            }
            cur = parent.parent;
        }
        false
    }

    /// Number of truth-table bits of a LUT pb-type: `2^inputs`.
    pub fn lut_bits(&self, pb: &PbType) -> u32 {
        1u32.checked_shl(pb.width_of(PortDir::Input)).unwrap_or(0)
    }

    /// Replication factor of the pb-type at `path`: `num_pb`, or the per-cell
    /// capacity for top-level pb-types.
    pub fn replication(&self, path: &HierPath) -> Option<u32> {
        self.tree.by_path(path).map(|pb| pb.num_pb)
    }

    /// Builds the replica odometer of `template`: one slot per pb-type
    /// segment, mode and local segments carry none.
    pub fn replica_context(&self, template: &HierPath) -> ReplicaContext {
        ReplicaContext::for_path(template, |prefix| {
            if prefix.len() % 2 == 1 {
                self.replication(prefix)
            } else {
                None
            }
        })
    }

    /// Resolves `blk.sub[mode].leaf` notation to a pb-type.
    ///
    /// A level whose mode is not named uses its default mode.
    pub fn resolve_pb_name(&self, name: &str) -> Result<ResolvedPb, ArchError> {
        let bad = |reason: String| ArchError::BadPbName {
            name: name.to_string(),
            reason,
        };
        let mut parts = Vec::new();
        for part in name.split('.') {
            let (pb, mode) = match part.split_once('[') {
                Some((pb, rest)) => {
                    let mode = rest
                        .strip_suffix(']')
                        .ok_or_else(|| bad(format!("unterminated mode in '{part}'")))?;
                    (pb, Some(mode))
                }
                None => (part, None),
            };
            if pb.is_empty() {
                return Err(bad("empty component".to_string()));
            }
            parts.push((pb, mode));
        }
        let Some(&(root_name, _)) = parts.first() else {
            return Err(bad("empty name".to_string()));
        };
        let mut cur = self
            .tree
            .root(root_name)
            .ok_or_else(|| bad(format!("no top-level pb-type '{root_name}'")))?;
        let mut chosen = Self::pick_mode(cur, parts[0].1).map_err(&bad)?;
        for &(pb_name, mode) in &parts[1..] {
            let mode_idx = chosen
                .ok_or_else(|| bad(format!("'{}' is a leaf", cur.name)))?;
            cur = self.tree.child(cur, mode_idx, pb_name).ok_or_else(|| {
                bad(format!(
                    "no '{pb_name}' in mode '{}' of '{}'",
                    cur.modes[mode_idx].name, cur.name
                ))
            })?;
            chosen = Self::pick_mode(cur, mode).map_err(&bad)?;
        }
        let explicit = parts.last().and_then(|p| p.1).is_some();
        Ok(ResolvedPb {
            id: cur.id,
            mode: if explicit { chosen } else { None },
        })
    }

    fn pick_mode(pb: &PbType, named: Option<&str>) -> Result<Option<usize>, String> {
        match named {
            Some(mode) => pb
                .mode_index(mode)
                .map(Some)
                .ok_or_else(|| format!("'{}' has no mode '{mode}'", pb.name)),
            None => Ok(pb.default_mode()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{ARCH, CIRCUIT};
    use tessera_markup::parse_str;

    fn model() -> ArchitectureModel {
        ArchitectureModel::from_elements(&parse_str(ARCH).unwrap(), &parse_str(CIRCUIT).unwrap())
            .unwrap()
    }

    #[test]
    fn resolves_named_modes() {
        let m = model();
        let r = m.resolve_pb_name("clb.fle[n1_lut2].lut2").unwrap();
        assert_eq!(m.pb(r.id).path.to_string(), "clb.clb.fle.n1_lut2.lut2");
        assert_eq!(r.mode, None);
    }

    #[test]
    fn unnamed_mode_uses_default() {
        let m = model();
        let r = m.resolve_pb_name("clb.fle.frac").unwrap();
        assert_eq!(m.pb(r.id).path.to_string(), "clb.clb.fle.physical.frac");
    }

    #[test]
    fn trailing_mode_is_reported() {
        let m = model();
        let r = m.resolve_pb_name("clb.fle[physical]").unwrap();
        assert_eq!(r.mode, Some(0));
    }

    #[test]
    fn unresolvable_names() {
        let m = model();
        assert!(m.resolve_pb_name("dsp").is_err());
        assert!(m.resolve_pb_name("clb.fle[bogus].lut2").is_err());
        assert!(m.resolve_pb_name("clb.fle.lut2").is_err());
        assert!(m.resolve_pb_name("clb.fle[n1_lut2").is_err());
    }

    #[test]
    fn replica_context_covers_capacity_and_num_pb() {
        let m = model();
        let mux = m.muxes_of("clb").next().unwrap();
        let template = HierPath::parse("clb.clb.fle.physical.frac").unwrap();
        let ctx = m.replica_context(&template);
        assert_eq!(ctx.count(), 4);
        let paths: Vec<_> = ctx.replicas().map(|c| c.apply(&template).to_string()).collect();
        assert_eq!(paths[1], "clb[0].clb.fle[1].physical.frac[0]");
        let mux_ctx = m.replica_context(&mux.template());
        assert_eq!(mux_ctx.count(), 2);
    }

    #[test]
    fn lut_sites_skip_shadowed_modes() {
        let m = model();
        assert_eq!(m.lut_sites("clb").count(), 0);
    }

    #[test]
    fn mux_lookup_by_sink() {
        let m = model();
        let mode = HierPath::parse("clb[1].clb").unwrap();
        let mux = m
            .mux(&mode, "crossbar", &PinRef::child("fle", 0, "in", 1))
            .unwrap();
        assert_eq!(mux.width(), 4);
        assert!(m.table(&mode, "crossbar").is_some());
        assert!(m.mux(&mode, "crossbar", &PinRef::parent("clb", "O", 0)).is_none());
        let driving = m.mux_driving(&mode, &PinRef::child("fle", 1, "in", 0)).unwrap();
        assert_eq!(driving.interconnect, "crossbar");
    }
}
