//! The logical block/mode tree.
//!
//! Every pb-type gets a template path that alternates pb-type and mode
//! segments: `clb.default.fle.n1_lut4.ble4.ble4.lut4`. A pb-type with children
//! but no `<mode>` element receives an implicit mode named after itself;
//! leaves have no mode segment.

use crate::error::ArchError;
use crate::ids::PbId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tessera_common::{HierPath, Segment};
use tessera_markup::Element;

/// Direction of a pb-type port.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PortDir {
    /// `<input>`
    Input,
    /// `<output>`
    Output,
    /// `<clock>`
    Clock,
}

/// A port declared on a pb-type.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PortDecl {
    /// Port name.
    pub name: String,
    /// Direction.
    pub dir: PortDir,
    /// Number of pins.
    pub width: u32,
}

/// Kind of an interconnect element.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum InterconnectKind {
    /// Full crossbar: every output selects among every input.
    Complete,
    /// One output selecting among its inputs.
    Mux,
    /// Pairwise wiring with no selection.
    Direct,
}

/// An interconnect element as declared, before expansion.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct InterconnectDecl {
    /// Element kind.
    pub kind: InterconnectKind,
    /// Element name, unique within its mode.
    pub name: String,
    /// Space-separated input bus references.
    pub input: String,
    /// Space-separated output bus references.
    pub output: String,
}

/// The primitive kinds with special handling in path construction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// Lookup table.
    Lut,
    /// I/O pad.
    Io,
    /// Block RAM.
    Memory,
    /// Flip-flop.
    Flipflop,
    /// Anything else, including non-leaf pb-types.
    Other,
}

/// One mode of a pb-type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mode {
    /// Mode name.
    pub name: String,
    /// Template path: the owning pb-type's path plus the mode segment.
    pub path: HierPath,
    /// `true` for a `physical` mode with `disable_packing="true"`.
    pub physical: bool,
    /// `true` when synthesized for a pb-type with no `<mode>` element.
    pub implicit: bool,
    /// Child pb-types, in declaration order.
    pub children: Vec<PbId>,
    /// Interconnect elements, in declaration order.
    pub interconnects: Vec<InterconnectDecl>,
}

/// One pb-type of the logical architecture.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PbType {
    /// This pb-type's ID.
    pub id: PbId,
    /// pb-type name.
    pub name: String,
    /// Template path ending with this pb-type's segment.
    pub path: HierPath,
    /// Replication count inside the parent mode (`capacity` for roots).
    pub num_pb: u32,
    /// `blif_model` attribute.
    pub blif_model: Option<String>,
    /// `class` attribute.
    pub class: Option<String>,
    /// Declared ports.
    pub ports: Vec<PortDecl>,
    /// Modes; empty for leaves.
    pub modes: Vec<Mode>,
    /// Parent pb-type and mode index.
    pub parent: Option<(PbId, usize)>,
    /// `false` when some ancestor mode is shadowed by a sibling `physical` mode.
    pub physical_reachable: bool,
}

impl PbType {
    /// Returns the port named `name`.
    pub fn port(&self, name: &str) -> Option<&PortDecl> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Returns `true` if this pb-type has no modes.
    pub fn is_leaf(&self) -> bool {
        self.modes.is_empty()
    }

    /// Returns the index of mode `name`.
    pub fn mode_index(&self, name: &str) -> Option<usize> {
        self.modes.iter().position(|m| m.name == name)
    }

    /// Returns the index of the `physical` mode, if there is one.
    pub fn physical_mode(&self) -> Option<usize> {
        self.modes.iter().position(|m| m.physical)
    }

    /// Returns the mode packed when none is named: the physical mode if
    /// declared, else the first.
    pub fn default_mode(&self) -> Option<usize> {
        if self.modes.is_empty() {
            None
        } else {
            Some(self.physical_mode().unwrap_or(0))
        }
    }

    /// Returns `true` if mode `idx` is real wiring: either there is no
    /// physical mode, or this is it.
    pub fn mode_is_physical(&self, idx: usize) -> bool {
        match self.physical_mode() {
            Some(p) => p == idx,
            None => true,
        }
    }

    /// Classifies this pb-type for path construction.
    pub fn primitive_kind(&self) -> PrimitiveKind {
        match (self.class.as_deref(), self.blif_model.as_deref()) {
            (Some("lut"), _) | (_, Some(".names")) => PrimitiveKind::Lut,
            (Some("memory"), _) => PrimitiveKind::Memory,
            (Some("flipflop"), _) | (_, Some(".latch")) => PrimitiveKind::Flipflop,
            (_, Some(".input" | ".output")) => PrimitiveKind::Io,
            _ => PrimitiveKind::Other,
        }
    }

    /// Sum of the widths of ports with direction `dir`.
    pub fn width_of(&self, dir: PortDir) -> u32 {
        self.ports.iter().filter(|p| p.dir == dir).map(|p| p.width).sum()
    }
}

/// Arena of every pb-type, indexed by ID and by template path.
#[derive(Clone, Debug, Default)]
pub struct PbTree {
    pbs: Vec<PbType>,
    roots: Vec<PbId>,
    by_path: HashMap<HierPath, PbId>,
}

impl PbTree {
    /// Returns the pb-type with ID `id`.
    pub fn get(&self, id: PbId) -> &PbType {
        &self.pbs[id.index()]
    }

    /// Returns every pb-type in depth-first declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &PbType> {
        self.pbs.iter()
    }

    /// Returns the top-level pb-types.
    pub fn roots(&self) -> impl Iterator<Item = &PbType> {
        self.roots.iter().map(|&id| self.get(id))
    }

    /// Returns the top-level pb-type named `name`.
    pub fn root(&self, name: &str) -> Option<&PbType> {
        self.roots().find(|pb| pb.name == name)
    }

    /// Looks up a pb-type by template path (subscripts ignored).
    pub fn by_path(&self, path: &HierPath) -> Option<&PbType> {
        self.by_path.get(&path.template()).map(|&id| self.get(id))
    }

    /// Returns the child named `name` of mode `mode` of `parent`.
    pub fn child(&self, parent: &PbType, mode: usize, name: &str) -> Option<&PbType> {
        parent
            .modes
            .get(mode)?
            .children
            .iter()
            .map(|&id| self.get(id))
            .find(|c| c.name == name)
    }

    /// Returns the root pb-type above `pb`, or `pb` itself when it is a root.
    pub fn root_of<'a>(&'a self, pb: &'a PbType) -> &'a PbType {
        let mut cur = pb;
        while let Some((parent, _)) = cur.parent {
            cur = self.get(parent);
        }
        cur
    }

    /// Returns the number of pb-types.
    pub fn len(&self) -> usize {
        self.pbs.len()
    }

    /// Returns `true` if the tree holds no pb-types.
    pub fn is_empty(&self) -> bool {
        self.pbs.is_empty()
    }

    fn rebuild_index(&mut self) {
        self.by_path = self.pbs.iter().map(|pb| (pb.path.clone(), pb.id)).collect();
    }
}

/// Loads the pb-type tree from a logical architecture root element.
///
/// Root capacities come from the root pb-type's `capacity` attribute, or from
/// a `<tiles><tile name capacity>` entry of the same name.
pub fn load_pb_tree(arch: &Element) -> Result<PbTree, ArchError> {
    let list = arch
        .child("complexblocklist")
        .ok_or_else(|| ArchError::MissingElement("complexblocklist".to_string()))?;
    let tile_capacity: HashMap<&str, u32> = arch
        .child("tiles")
        .map(|tiles| {
            tiles
                .children_named("tile")
                .filter_map(|t| {
                    let cap = t.attr_int("capacity")?;
                    Some((t.attr_str("name")?, u32::try_from(cap).ok()?))
                })
                .collect()
        })
        .unwrap_or_default();

    let mut tree = PbTree::default();
    for element in list.children_named("pb_type") {
        let name = element.require_str("name")?;
        let capacity = element
            .attr_int("capacity")
            .and_then(|c| u32::try_from(c).ok())
            .or_else(|| tile_capacity.get(name).copied())
            .unwrap_or(1);
        let id = add_pb(&mut tree, element, &HierPath::new(), None, true, Some(capacity))?;
        tree.roots.push(id);
    }
    tree.rebuild_index();
    Ok(tree)
}

fn add_pb(
    tree: &mut PbTree,
    element: &Element,
    prefix: &HierPath,
    parent: Option<(PbId, usize)>,
    reachable: bool,
    capacity: Option<u32>,
) -> Result<PbId, ArchError> {
    let name = element.require_str("name")?.to_string();
    let path = prefix.child(Segment::named(name.clone()));
    if tree.pbs.iter().any(|pb| pb.path == path) {
        return Err(ArchError::DuplicatePbType(path.to_string()));
    }
    let num_pb = match capacity {
        Some(c) => c,
        None => element
            .attr_int("num_pb")
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(1),
    };

    let mut ports = Vec::new();
    for e in element.elements() {
        let dir = match e.name.as_str() {
            "input" => PortDir::Input,
            "output" => PortDir::Output,
            "clock" => PortDir::Clock,
            _ => continue,
        };
        let width = e
            .attr_int("num_pins")
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(1);
        ports.push(PortDecl {
            name: e.require_str("name")?.to_string(),
            dir,
            width,
        });
    }

    let id = PbId::from_raw(tree.pbs.len() as u32);
    tree.pbs.push(PbType {
        id,
        name: name.clone(),
        path: path.clone(),
        num_pb,
        blif_model: element.attr_str("blif_model").map(str::to_string),
        class: element.attr_str("class").map(str::to_string),
        ports,
        modes: Vec::new(),
        parent,
        physical_reachable: reachable,
    });

    let mode_elements: Vec<&Element> = element.children_named("mode").collect();
    let has_children = element.child("pb_type").is_some() || element.child("interconnect").is_some();
    let declared: Vec<(&Element, String, bool)> = if mode_elements.is_empty() {
        if has_children {
            vec![(element, name.clone(), true)]
        } else {
            Vec::new()
        }
    } else {
        mode_elements
            .into_iter()
            .map(|m| Ok((m, m.require_str("name")?.to_string(), false)))
            .collect::<Result<_, ArchError>>()?
    };

    let physical_idx = declared.iter().position(|(m, mode_name, implicit)| {
        !implicit && mode_name == "physical" && m.attr_flag("disable_packing")
    });

    for (idx, (mode_el, mode_name, implicit)) in declared.into_iter().enumerate() {
        let mode_path = path.child(Segment::named(mode_name.clone()));
        let mode_reachable = reachable && physical_idx.is_none_or(|p| p == idx);
        let mut children = Vec::new();
        for child_el in mode_el.children_named("pb_type") {
            children.push(add_pb(
                tree,
                child_el,
                &mode_path,
                Some((id, idx)),
                mode_reachable,
                None,
            )?);
        }
        let mut interconnects = Vec::new();
        if let Some(ic) = mode_el.child("interconnect") {
            for e in ic.elements() {
                let kind = match e.name.as_str() {
                    "complete" => InterconnectKind::Complete,
                    "mux" => InterconnectKind::Mux,
                    "direct" => InterconnectKind::Direct,
                    _ => continue,
                };
                interconnects.push(InterconnectDecl {
                    kind,
                    name: e.require_str("name")?.to_string(),
                    input: e.require_str("input")?.to_string(),
                    output: e.require_str("output")?.to_string(),
                });
            }
        }
        tree.pbs[id.index()].modes.push(Mode {
            name: mode_name,
            path: mode_path,
            physical: physical_idx == Some(idx),
            implicit,
            children,
            interconnects,
        });
    }
    Ok(id)
}
