//! Shared, read-only state handed to every bit-writing pass.

use crate::physical_path::TileCoord;
use tessera_annotate::AnnotationTables;
use tessera_arch::{ArchitectureModel, CircuitModel, PbType, PortDir};
use tessera_common::HierPath;
use tessera_diagnostics::DiagnosticSink;
use tessera_rrg::RoutingFabric;

/// The architecture, annotation and routing tables of one run.
#[derive(Clone, Copy)]
pub struct PassContext<'a> {
    /// Architecture model.
    pub arch: &'a ArchitectureModel,
    /// Annotation tables.
    pub annotations: &'a AnnotationTables,
    /// Analyzed routing fabric.
    pub fabric: &'a RoutingFabric,
    /// Diagnostic accumulator.
    pub sink: &'a DiagnosticSink,
}

/// Truth-table geometry of a bit-owning LUT.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LutGeometry {
    /// Physical input count.
    pub inputs: u32,
    /// Number of truth-table bits.
    pub bits: u32,
}

impl<'a> PassContext<'a> {
    /// The circuit model attached to `pb` by a pb-type annotation.
    pub fn circuit_of(&self, pb: &PbType) -> Option<&'a CircuitModel> {
        let (model, _) = self.annotations.pb.circuit_of(pb.id)?;
        self.arch.circuit(model)
    }

    /// Truth-table geometry of `pb` if it owns LUT bits: the shape of its LUT
    /// circuit model when it has one, else `2^inputs` for a LUT primitive.
    pub fn lut_geometry(&self, pb: &PbType) -> Option<LutGeometry> {
        if let Some(shape) = self.circuit_of(pb).and_then(|c| c.lut) {
            return Some(LutGeometry {
                inputs: shape.inputs,
                bits: u32::try_from(shape.ram_size).ok()?,
            });
        }
        let root = self.arch.tree().root_of(pb);
        self.arch
            .lut_sites(&root.name)
            .any(|site| site.id == pb.id)
            .then(|| LutGeometry {
                inputs: pb.width_of(PortDir::Input),
                bits: self.arch.lut_bits(pb),
            })
    }

    /// Every physically reachable pb-type under `root` that owns LUT bits.
    pub fn lut_owners(&self, root: &str) -> Vec<(&'a PbType, LutGeometry)> {
        let arch = self.arch;
        arch.tree()
            .iter()
            .filter(|pb| pb.physical_reachable && arch.tree().root_of(pb).name == root)
            .filter_map(|pb| self.lut_geometry(pb).map(|g| (pb, g)))
            .collect()
    }

    /// Returns `true` when a top-of-tile output pin needs no mux because the
    /// fabric never reaches it. `instance` is any tile-relative path whose
    /// first segment is the root instance.
    pub fn unreachable_root_pin(&self, tile: TileCoord, instance: &HierPath, port: &str, bit: u32) -> bool {
        let subtile = instance
            .segments()
            .first()
            .and_then(|s| s.index)
            .unwrap_or(0);
        !self
            .fabric
            .routable()
            .is_routable(tile.x, tile.y, subtile, port, bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;

    #[test]
    fn circuit_lut_owns_ram_bits() {
        let f = Fixture::new();
        let owners = f.ctx().lut_owners("clb");
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].0.name, "frac");
        assert_eq!(owners[0].1, LutGeometry { inputs: 2, bits: 4 });
    }

    #[test]
    fn root_pin_reachability() {
        let f = Fixture::new();
        let ctx = f.ctx();
        let inst = HierPath::parse("clb[0].clb").unwrap();
        let tile = TileCoord::new(1, 1);
        assert!(!ctx.unreachable_root_pin(tile, &inst, "O", 0));
        assert!(ctx.unreachable_root_pin(tile, &inst, "O", 1));
    }
}
