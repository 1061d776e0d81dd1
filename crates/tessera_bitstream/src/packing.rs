//! Packing pass: turns every connection of the packed design into mux
//! selections.
//!
//! Each placed top-level block is walked depth first. A connection string
//! `src->element` on a pin resolves through the interconnect table of the
//! enclosing mode to a logical input index. Annotation mappings win; else
//! a connection in real wiring selects on its own mux; else the two pins
//! are carried into the physical tree and the mux driving the physical
//! sink is selected there. Leaf LUTs are collected for the LUT pass.

use crate::context::PassContext;
use crate::lut::LutSite;
use crate::physical_path::{physical_instance, physical_pin_ref, pin_owner, TileCoord};
use crate::select_code::{code_bits, SelectCodes};
use crate::store::{ConfigBitMap, Rank};
use serde::Serialize;
use tessera_annotate::{MappingKey, PhysicalTarget};
use tessera_arch::{MuxDef, PbType, PinRef};
use tessera_common::{HierPath, Segment};
use tessera_design::{Connection, PackedBlock, PackedDesign, PackedDir, PinValue, Placement};
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, Origin};

const fn unresolved(number: u16) -> DiagnosticCode {
    DiagnosticCode {
        category: Category::Unresolved,
        number,
    }
}

const NO_MUX: DiagnosticCode = unresolved(420);
const NO_PHYSICAL_ROUTE: DiagnosticCode = unresolved(421);
const BAD_TARGET: DiagnosticCode = unresolved(422);
const TARGET_INDEX: DiagnosticCode = unresolved(423);
const UNKNOWN_MODE: DiagnosticCode = unresolved(450);
const UNKNOWN_PB: DiagnosticCode = unresolved(451);
const UNKNOWN_ELEMENT: DiagnosticCode = unresolved(452);
const NOT_AN_INPUT: DiagnosticCode = unresolved(453);
const UNPLACED: DiagnosticCode = unresolved(454);

/// Outcome of the packing pass.
#[derive(Clone, Debug, Default)]
pub struct PackingReport {
    /// Leaf LUTs awaiting their truth tables.
    pub sites: Vec<LutSite>,
    /// Counters.
    pub stats: PackingStats,
}

/// Packing counters.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
pub struct PackingStats {
    /// Top-level blocks walked.
    pub placed: usize,
    /// Top-level blocks with no placement.
    pub unplaced: usize,
    /// Connections resolved through annotation mappings.
    pub mapped: usize,
    /// Connections resolved through the physical fallback.
    pub fallback: usize,
    /// Connections left unresolved.
    pub unresolved: usize,
}

/// Applies every packed connection of `design` to `map`.
pub fn apply_packing(
    ctx: &PassContext<'_>,
    map: &mut ConfigBitMap,
    codes: &mut SelectCodes,
    design: &PackedDesign,
    placement: &Placement,
) -> PackingReport {
    let mut report = PackingReport::default();
    for block in design.blocks.iter().filter(|b| !b.is_open()) {
        let Some(placed) = placement.get(&block.name) else {
            report.stats.unplaced += 1;
            ctx.sink.emit(Diagnostic::warning(
                UNPLACED,
                format!("block '{}' has no placement and is skipped", block.name),
                Origin::context("packing"),
            ));
            continue;
        };
        let Some(root) = ctx.arch.root(block.pb_name()) else {
            report.stats.unplaced += 1;
            ctx.sink.emit(Diagnostic::warning(
                UNKNOWN_PB,
                format!("block '{}' has unknown type '{}'", block.name, block.pb_name()),
                Origin::context("packing"),
            ));
            continue;
        };
        report.stats.placed += 1;
        let inst = HierPath::from_segments(vec![Segment::indexed(root.name.clone(), placed.subblk)]);
        let mut walk = Walk {
            ctx: *ctx,
            map: &mut *map,
            codes: &mut *codes,
            tile: TileCoord::new(placed.x, placed.y),
            report: &mut report,
        };
        walk.block(block, root, &inst);
    }
    report
}

struct Walk<'a, 'w> {
    ctx: PassContext<'a>,
    map: &'w mut ConfigBitMap,
    codes: &'w mut SelectCodes,
    tile: TileCoord,
    report: &'w mut PackingReport,
}

impl<'a> Walk<'a, '_> {
    fn origin(&self, inst: &HierPath) -> Origin {
        Origin::context(self.tile.locate(inst).to_string())
    }

    fn block(&mut self, block: &PackedBlock, pb: &'a PbType, inst: &HierPath) {
        if pb.is_leaf() {
            self.leaf(block, inst);
            return;
        }
        let mode_idx = match &block.mode {
            Some(name) => pb.mode_index(name),
            None => pb.default_mode(),
        };
        let Some(mode_idx) = mode_idx else {
            self.ctx.sink.emit(Diagnostic::warning(
                UNKNOWN_MODE,
                format!(
                    "'{}' has no mode '{}'",
                    pb.name,
                    block.mode.as_deref().unwrap_or_default()
                ),
                self.origin(inst),
            ));
            return;
        };
        let mode_inst = inst.child(Segment::named(pb.modes[mode_idx].name.clone()));

        let settings = (Some(mode_idx) != pb.default_mode())
            .then(|| self.ctx.annotations.setting(&mode_inst))
            .flatten();
        if let Some(targets) = settings {
            for target in targets {
                self.write_target(target, Rank::Setting);
            }
        }

        for port in block.ports.iter().filter(|p| p.dir == PackedDir::Output) {
            for (bit, pin) in port.pins.iter().enumerate() {
                if let PinValue::Connection(c) = pin {
                    let sink = PinRef::parent(pb.name.clone(), port.name.clone(), bit as u32);
                    self.connect(pb, mode_idx, &mode_inst, sink, c);
                }
            }
        }

        for child in block.children.iter().filter(|c| !c.is_open()) {
            let child_pb = self.ctx.arch.tree().child(pb, mode_idx, child.pb_name());
            let (Some(child_pb), Some(index)) = (child_pb, child.instance.index) else {
                self.ctx.sink.emit(Diagnostic::warning(
                    UNKNOWN_PB,
                    format!("mode '{}' has no child '{}'", pb.modes[mode_idx].name, child.instance),
                    self.origin(&mode_inst),
                ));
                continue;
            };
            for port in child.ports.iter().filter(|p| p.dir != PackedDir::Output) {
                for (bit, pin) in port.pins.iter().enumerate() {
                    if let PinValue::Connection(c) = pin {
                        let sink = PinRef::child(child_pb.name.clone(), index, port.name.clone(), bit as u32);
                        self.connect(pb, mode_idx, &mode_inst, sink, c);
                    }
                }
            }
            self.block(child, child_pb, &mode_inst.child(child.instance.clone()));
        }
    }

    fn leaf(&mut self, block: &PackedBlock, inst: &HierPath) {
        let ctx = self.ctx;
        let Some((physical, id)) = physical_instance(ctx.arch, &ctx.annotations.pb, inst) else {
            return;
        };
        let Some(geometry) = ctx.lut_geometry(ctx.arch.pb(id)) else {
            return;
        };
        let net = block
            .ports
            .iter()
            .filter(|p| p.dir == PackedDir::Output)
            .flat_map(|p| p.pins.iter())
            .find_map(PinValue::net);
        let Some(net) = net else {
            return;
        };
        let input = block.ports.iter().find(|p| p.dir == PackedDir::Input);
        let rotation = input.and_then(|p| {
            block
                .rotation(&p.name)
                .or_else(|| block.children.iter().find_map(|c| c.rotation(&p.name)))
        });
        self.report.sites.push(LutSite {
            tile: self.tile,
            logical: inst.clone(),
            physical,
            geometry,
            net: net.to_string(),
            wire: block.mode.as_deref() == Some("wire"),
            rotation: rotation.map(<[_]>::to_vec),
            connected: input
                .map(|p| p.pins.iter().map(|v| *v != PinValue::Open).collect())
                .unwrap_or_default(),
        });
    }

    fn connect(&mut self, pb: &PbType, mode_idx: usize, mode_inst: &HierPath, sink: PinRef, c: &Connection) {
        let ctx = self.ctx;
        let Some(table) = ctx.arch.table(mode_inst, &c.interconnect) else {
            self.unresolved(
                UNKNOWN_ELEMENT,
                format!("mode has no interconnect '{}'", c.interconnect),
                mode_inst,
            );
            return;
        };
        let Some(index) = table.index_of(&c.source) else {
            self.unresolved(
                NOT_AN_INPUT,
                format!("'{}' is not an input of '{}'", c.source.pin_name(), c.interconnect),
                mode_inst,
            );
            return;
        };

        if let Some(owner) = pin_owner(mode_inst, &sink) {
            let key = MappingKey {
                path: owner,
                port: sink.port.clone(),
                bit: sink.bit,
                index: index as u32,
            };
            if let Some(targets) = ctx.annotations.mapping(&key) {
                self.report.stats.mapped += 1;
                for target in targets {
                    self.write_target(target, Rank::Mapped);
                }
                return;
            }
        }

        if pb.mode_is_physical(mode_idx) && pb.physical_reachable {
            let Some(mux) = ctx.arch.mux(mode_inst, &c.interconnect, &sink) else {
                self.unresolved(
                    NO_MUX,
                    format!("no mux of '{}' drives '{}'", c.interconnect, sink.pin_name()),
                    mode_inst,
                );
                return;
            };
            if mux.root_output && ctx.unreachable_root_pin(self.tile, mode_inst, &sink.port, sink.bit) {
                return;
            }
            self.select(mode_inst, mux, mux.index_of(&c.source), Rank::Packing);
            return;
        }

        self.physical_fallback(mode_inst, &sink, &c.source);
    }

    /// Carries both pins of a logical-mode connection into the physical
    /// tree and selects on the mux driving the physical sink.
    fn physical_fallback(&mut self, mode_inst: &HierPath, sink: &PinRef, source: &PinRef) {
        let ctx = self.ctx;
        let ann = &ctx.annotations.pb;
        let sink_ref = physical_pin_ref(ctx.arch, ann, self.tile, mode_inst, sink);
        let source_ref = physical_pin_ref(ctx.arch, ann, self.tile, mode_inst, source);
        let resolved = match (sink_ref, source_ref) {
            (Some((mode, sink)), Some((source_mode, source))) if mode == source_mode => {
                Some((mode, sink, source))
            }
            _ => None,
        };
        let Some((mode, sink, source)) = resolved else {
            self.report.stats.unresolved += 1;
            ctx.sink.emit(Diagnostic::note(
                NO_PHYSICAL_ROUTE,
                format!(
                    "connection {} -> {} has no physical counterpart",
                    source.pin_name(),
                    sink.pin_name()
                ),
                self.origin(mode_inst),
            ));
            return;
        };
        self.report.stats.fallback += 1;
        if let Some(mux) = ctx.arch.mux_driving(&mode, &sink) {
            self.select(&mode, mux, mux.index_of(&source), Rank::Mapped);
        }
    }

    /// Writes the select code of input `index` of `mux` inside `mode_inst`.
    fn select(&mut self, mode_inst: &HierPath, mux: &MuxDef, index: Option<usize>, rank: Rank) {
        let Some(index) = index else {
            self.unresolved(
                NOT_AN_INPUT,
                format!("no input of the mux driving '{}' matches", mux.sink.pin_name()),
                mode_inst,
            );
            return;
        };
        if mux.width() <= 1 {
            return;
        }
        let Some(bits) = self.codes.bits(mux.width(), index) else {
            self.unresolved(
                TARGET_INDEX,
                format!("index {index} exceeds mux width {}", mux.width()),
                mode_inst,
            );
            return;
        };
        let path = self.tile.locate(&mode_inst.child(mux.segment()));
        self.map.write_bits(&path, &bits, rank, self.ctx.sink);
    }

    /// Applies one annotation target.
    fn write_target(&mut self, target: &PhysicalTarget, rank: Rank) {
        let ctx = self.ctx;
        let Some(pb) = ctx.arch.tree().by_path(&target.path) else {
            self.unresolved(BAD_TARGET, format!("no pb-type at '{}'", target.path), &target.path);
            return;
        };

        let memory = ctx
            .circuit_of(pb)
            .and_then(|c| c.mode_select_ports().find(|p| p.prefix == target.port));
        if let Some(port) = memory {
            if target.bit >= port.size {
                self.unresolved(
                    TARGET_INDEX,
                    format!("bit {} exceeds mode memory '{}'", target.bit, port.prefix),
                    &target.path,
                );
                return;
            }
            let owner = self
                .tile
                .locate(&target.path.child(Segment::named(port.prefix.clone())));
            let bits = code_bits(u64::from(target.index), port.size - target.bit);
            for (i, bit) in bits.into_iter().enumerate() {
                self.map
                    .write(&owner.mem_bit(target.bit + i as u32), bit, rank, ctx.sink);
            }
            return;
        }

        let as_child = target.path.last().and_then(|s| s.index).and_then(|index| {
            let mode = target.path.parent()?;
            let pin = PinRef::child(pb.name.clone(), index, target.port.clone(), target.bit);
            ctx.arch.mux_driving(&mode, &pin).map(|mux| (mode, mux))
        });
        let as_parent = || {
            let mode_idx = pb.default_mode()?;
            let mode = target
                .path
                .child(Segment::named(pb.modes[mode_idx].name.clone()));
            let pin = PinRef::parent(pb.name.clone(), target.port.clone(), target.bit);
            ctx.arch.mux_driving(&mode, &pin).map(|mux| (mode, mux))
        };
        let Some((mode, mux)) = as_child.or_else(as_parent) else {
            self.unresolved(
                BAD_TARGET,
                format!("no mux drives '{}[{}]'", target.port, target.bit),
                &target.path,
            );
            return;
        };
        let index = target.index as usize;
        if index >= mux.width() {
            self.unresolved(
                TARGET_INDEX,
                format!("index {index} exceeds mux width {}", mux.width()),
                &target.path,
            );
            return;
        }
        self.select(&mode, mux, Some(index), rank);
    }

    fn unresolved(&mut self, code: DiagnosticCode, message: String, at: &HierPath) {
        self.report.stats.unresolved += 1;
        self.ctx
            .sink
            .emit(Diagnostic::warning(code, message, self.origin(at)));
    }
}
