//! Default initialization: the only pass that creates configuration bits.
//!
//! For every anchor cell whose block type is a top-level pb-type, each
//! replica of each bit-owning mux gets its select bits (all ones, or the
//! clock default for clock-selecting muxes), each LUT owner gets its
//! truth-table bits (zero), and each pb with mode-select circuit ports gets
//! its mode bits. Every switch-box and connection-box mux then gets all-ones
//! select bits.

use crate::context::PassContext;
use crate::physical_path::TileCoord;
use crate::select_code::select_width;
use crate::store::ConfigBitMap;
use tessera_arch::PbType;
use tessera_common::{HierPath, Segment};

/// Builds the default configuration-bit map.
pub fn initialize_defaults(ctx: &PassContext<'_>, clock_default: char) -> ConfigBitMap {
    let mut map = ConfigBitMap::new();
    let graph = ctx.fabric.graph();
    for cell in graph.grid.iter().filter(|c| c.is_anchor()) {
        let Some(block_type) = graph.block_type(cell.block_type) else {
            continue;
        };
        let Some(root) = ctx.arch.root(&block_type.name) else {
            continue;
        };
        let tile = TileCoord::new(cell.x, cell.y);
        create_mux_bits(ctx, &mut map, tile, root, clock_default);
        create_lut_bits(ctx, &mut map, tile, root);
        create_mode_bits(ctx, &mut map, tile, root);
    }
    for mux in ctx.fabric.muxes().iter() {
        for b in 0..select_width(mux.width()) {
            map.create(mux.path.mem_bit(b), '1', ctx.sink);
        }
    }
    map
}

fn create_mux_bits(ctx: &PassContext<'_>, map: &mut ConfigBitMap, tile: TileCoord, root: &PbType, clock_default: char) {
    for mux in ctx.arch.muxes_of(&root.name) {
        let width = select_width(mux.width());
        if width == 0 {
            continue;
        }
        let value = if mux.clock { clock_default } else { '1' };
        let template = mux.template();
        for replica in ctx.arch.replica_context(&template).replicas() {
            let path = replica.apply(&template);
            if mux.root_output && ctx.unreachable_root_pin(tile, &path, &mux.sink.port, mux.sink.bit) {
                continue;
            }
            let located = tile.locate(&path);
            for b in 0..width {
                map.create(located.mem_bit(b), value, ctx.sink);
            }
        }
    }
}

fn create_lut_bits(ctx: &PassContext<'_>, map: &mut ConfigBitMap, tile: TileCoord, root: &PbType) {
    for (pb, geometry) in ctx.lut_owners(&root.name) {
        for inst in instances(ctx, &pb.path) {
            let located = tile.locate(&inst);
            for b in 0..geometry.bits {
                map.create(located.mem_bit(b), '0', ctx.sink);
            }
        }
    }
}

fn create_mode_bits(ctx: &PassContext<'_>, map: &mut ConfigBitMap, tile: TileCoord, root: &PbType) {
    let arch = ctx.arch;
    let owners = arch
        .tree()
        .iter()
        .filter(|pb| pb.physical_reachable && arch.tree().root_of(pb).name == root.name);
    for pb in owners {
        let Some(circuit) = ctx.circuit_of(pb) else {
            continue;
        };
        if circuit.mode_bit_width() == 0 {
            continue;
        }
        let pattern: Vec<char> = ctx
            .annotations
            .pb
            .circuit_of(pb.id)
            .and_then(|(_, bits)| bits)
            .map(|bits| bits.chars().collect())
            .unwrap_or_default();
        for inst in instances(ctx, &pb.path) {
            let mut values = pattern.iter().copied();
            for port in circuit.mode_select_ports() {
                let memory = tile.locate(&inst.child(Segment::named(port.prefix.clone())));
                for b in 0..port.size {
                    map.create(memory.mem_bit(b), values.next().unwrap_or('0'), ctx.sink);
                }
            }
        }
    }
}

fn instances(ctx: &PassContext<'_>, template: &HierPath) -> Vec<HierPath> {
    ctx.arch
        .replica_context(template)
        .replicas()
        .map(|replica| replica.apply(template))
        .collect()
}
