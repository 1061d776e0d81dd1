//! Interconnect and multiplexer derivation.
//!
//! One depth-first walk over the pb-type tree expands every `complete`, `mux`
//! and `direct` element into an [`InterconnectTable`]: its concrete inputs in
//! declaration order, each with the next 0-based logical index. Packed
//! connection strings are resolved against these tables for every mode.
//!
//! Only modes that are real wiring (no sibling `physical` mode shadows them)
//! also yield [`MuxDef`]s, the multiplexers that own configuration bits: one
//! per sink pin of a `complete` or `mux`, and a width-1 mux per `direct` pair.

use crate::bus::{expand_bus_list, PinRef, PortScope};
use crate::error::ArchError;
use crate::ids::MuxId;
use crate::logical::{InterconnectDecl, InterconnectKind, Mode, PbTree, PbType, PortDir};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tessera_common::{HierPath, Segment};

/// The expanded inputs of one interconnect element.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InterconnectTable {
    /// Template path of the containing mode.
    pub mode: HierPath,
    /// Element name.
    pub name: String,
    /// Element kind.
    pub kind: InterconnectKind,
    /// Inputs in logical-index order.
    pub inputs: Vec<PinRef>,
    /// Outputs in declaration order.
    pub outputs: Vec<PinRef>,
    index: HashMap<PinRef, usize>,
}

impl InterconnectTable {
    /// Returns the logical index of `source`.
    pub fn index_of(&self, source: &PinRef) -> Option<usize> {
        self.index.get(source).copied()
    }
}

/// A multiplexer that owns configuration bits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MuxDef {
    /// This mux's ID.
    pub id: MuxId,
    /// Template path of the containing mode.
    pub mode: HierPath,
    /// Name of the interconnect element it came from.
    pub interconnect: String,
    /// Element kind.
    pub kind: InterconnectKind,
    /// The pin this mux drives.
    pub sink: PinRef,
    /// Selectable inputs, in logical-index order.
    pub inputs: Vec<PinRef>,
    /// `true` when the sink is a clock port.
    pub clock: bool,
    /// `true` when the sink is an output of a top-level pb-type.
    pub root_output: bool,
}

impl MuxDef {
    /// Number of selectable inputs.
    pub fn width(&self) -> usize {
        self.inputs.len()
    }

    /// The local path segment: `mux_<ic>_<block>[_<idx>]_<port>[bit]`.
    pub fn segment(&self) -> Segment {
        let name = match self.sink.index {
            Some(i) => format!(
                "mux_{}_{}_{i}_{}",
                self.interconnect, self.sink.block, self.sink.port
            ),
            None => format!("mux_{}_{}_{}", self.interconnect, self.sink.block, self.sink.port),
        };
        Segment::indexed(name, self.sink.bit)
    }

    /// Template path of this mux: the mode path plus [`MuxDef::segment`].
    pub fn template(&self) -> HierPath {
        self.mode.child(self.segment())
    }

    /// Returns the index of `source` among this mux's inputs.
    pub fn index_of(&self, source: &PinRef) -> Option<usize> {
        self.inputs.iter().position(|p| p == source)
    }
}

/// Wiring at the top-of-tile boundary of one top-level pb-type.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RootOutputs {
    /// Child pin directly wired to a top-level output.
    pub alias: BTreeMap<PinRef, PinRef>,
    /// Top-level output fed by a crossbar, with its ordered candidate sources.
    pub sources: BTreeMap<PinRef, Vec<PinRef>>,
}

/// Everything derived from the interconnect walk.
#[derive(Clone, Debug, Default)]
pub struct DerivedInterconnect {
    /// Tables keyed by `(mode template path, element name)`.
    pub tables: HashMap<(HierPath, String), InterconnectTable>,
    /// Every bit-owning mux, indexed by [`MuxId`].
    pub muxes: Vec<MuxDef>,
    /// Boundary tables per top-level pb-type name.
    pub root_outputs: HashMap<String, RootOutputs>,
}

struct ModeScope<'a> {
    tree: &'a PbTree,
    parent: &'a PbType,
    mode: &'a Mode,
}

impl ModeScope<'_> {
    fn child(&self, name: &str) -> Option<&PbType> {
        self.mode
            .children
            .iter()
            .map(|&id| self.tree.get(id))
            .find(|c| c.name == name)
    }

    fn port_dir(&self, pin: &PinRef) -> Option<PortDir> {
        let pb = match pin.index {
            Some(_) => self.child(&pin.block)?,
            None => self.parent,
        };
        pb.port(&pin.port).map(|p| p.dir)
    }
}

impl PortScope for ModeScope<'_> {
    fn lookup(&self, block: &str, indexed: bool, port: &str) -> Option<(Option<u32>, u32)> {
        let as_parent = || {
            (block == self.parent.name)
                .then(|| self.parent.port(port))
                .flatten()
                .map(|p| (None, p.width))
        };
        let as_child = || {
            self.child(block)
                .and_then(|c| c.port(port).map(|p| (Some(c.num_pb), p.width)))
        };
        if indexed {
            as_child().or_else(as_parent)
        } else {
            as_parent().or_else(as_child)
        }
    }
}

/// Walks `tree` and derives every interconnect table and mux.
pub fn derive_interconnect(tree: &PbTree) -> Result<DerivedInterconnect, ArchError> {
    let mut out = DerivedInterconnect::default();
    for pb in tree.iter() {
        for (mode_idx, mode) in pb.modes.iter().enumerate() {
            let scope = ModeScope {
                tree,
                parent: pb,
                mode,
            };
            let real = pb.physical_reachable && pb.mode_is_physical(mode_idx);
            for decl in &mode.interconnects {
                derive_element(&mut out, &scope, decl, real)?;
            }
        }
    }
    Ok(out)
}

fn derive_element(
    out: &mut DerivedInterconnect,
    scope: &ModeScope<'_>,
    decl: &InterconnectDecl,
    real: bool,
) -> Result<(), ArchError> {
    let inputs = expand_bus_list(&decl.input, scope)?;
    let outputs = expand_bus_list(&decl.output, scope)?;
    if decl.kind == InterconnectKind::Direct && inputs.len() != outputs.len() {
        return Err(ArchError::BadReference {
            reference: decl.name.clone(),
            reason: format!(
                "direct has {} inputs but {} outputs",
                inputs.len(),
                outputs.len()
            ),
        });
    }

    let mut index = HashMap::new();
    for (i, pin) in inputs.iter().enumerate() {
        index.entry(pin.clone()).or_insert(i);
    }
    let mode_path = scope.mode.path.clone();
    let is_root = scope.parent.parent.is_none();

    if real {
        for (pos, sink) in outputs.iter().enumerate() {
            let mux_inputs = match decl.kind {
                InterconnectKind::Direct => vec![inputs[pos].clone()],
                InterconnectKind::Complete | InterconnectKind::Mux => inputs.clone(),
            };
            let root_output = is_root
                && sink.index.is_none()
                && scope.port_dir(sink) == Some(PortDir::Output);
            if root_output {
                let boundary = out
                    .root_outputs
                    .entry(scope.parent.name.clone())
                    .or_default();
                match decl.kind {
                    InterconnectKind::Direct => {
                        boundary.alias.insert(inputs[pos].clone(), sink.clone());
                    }
                    InterconnectKind::Complete | InterconnectKind::Mux => {
                        boundary.sources.insert(sink.clone(), inputs.clone());
                    }
                }
            }
            out.muxes.push(MuxDef {
                id: MuxId::from_raw(out.muxes.len() as u32),
                mode: mode_path.clone(),
                interconnect: decl.name.clone(),
                kind: decl.kind,
                sink: sink.clone(),
                inputs: mux_inputs,
                clock: scope.port_dir(sink) == Some(PortDir::Clock),
                root_output,
            });
        }
    }

    out.tables.insert(
        (mode_path.clone(), decl.name.clone()),
        InterconnectTable {
            mode: mode_path,
            name: decl.name.clone(),
            kind: decl.kind,
            inputs,
            outputs,
            index,
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ARCH;
    use crate::logical::load_pb_tree;
    use tessera_markup::parse_str;

    fn derived() -> DerivedInterconnect {
        let tree = load_pb_tree(&parse_str(ARCH).unwrap()).unwrap();
        derive_interconnect(&tree).unwrap()
    }

    #[test]
    fn complete_yields_one_mux_per_sink() {
        let d = derived();
        let crossbar: Vec<_> = d.muxes.iter().filter(|m| m.interconnect == "crossbar").collect();
        assert_eq!(crossbar.len(), 4);
        assert!(crossbar.iter().all(|m| m.width() == 4));
        assert_eq!(
            crossbar[0].template().to_string(),
            "clb.clb.mux_crossbar_fle_1_in[0]"
        );
    }

    #[test]
    fn table_indices_follow_declaration_order() {
        let d = derived();
        let table = &d.tables[&(HierPath::parse("clb.clb").unwrap(), "crossbar".to_string())];
        assert_eq!(table.index_of(&PinRef::parent("clb", "I", 2)), Some(2));
        assert_eq!(table.outputs[0], PinRef::child("fle", 1, "in", 0));
        assert_eq!(table.index_of(&PinRef::parent("clb", "O", 0)), None);
    }

    #[test]
    fn direct_pairs_in_order() {
        let d = derived();
        let outs: Vec<_> = d.muxes.iter().filter(|m| m.interconnect == "outs").collect();
        assert_eq!(outs.len(), 2);
        assert_eq!(outs[0].inputs, vec![PinRef::child("fle", 1, "out", 0)]);
        assert_eq!(outs[0].sink, PinRef::parent("clb", "O", 1));
        assert!(outs[0].root_output);
    }

    #[test]
    fn root_boundary_alias() {
        let d = derived();
        let boundary = &d.root_outputs["clb"];
        assert_eq!(
            boundary.alias[&PinRef::child("fle", 0, "out", 0)],
            PinRef::parent("clb", "O", 0)
        );
        assert!(boundary.sources.is_empty());
    }

    #[test]
    fn clock_sink_is_flagged() {
        let text = ARCH.replace(
            "(direct\nAname outs",
            "(complete\nAname clks\nAinput clb.clk\nAoutput clb.clk\n)complete\n(direct\nAname outs",
        );
        let tree = load_pb_tree(&parse_str(&text).unwrap()).unwrap();
        let d = derive_interconnect(&tree).unwrap();
        assert!(d.muxes.iter().any(|m| m.interconnect == "clks" && m.clock));
    }

    #[test]
    fn mismatched_direct_is_error() {
        let text = ARCH.replace("Aoutput clb.O[1:0]", "Aoutput clb.O[0]");
        let tree = load_pb_tree(&parse_str(&text).unwrap()).unwrap();
        assert!(derive_interconnect(&tree).is_err());
    }
}
