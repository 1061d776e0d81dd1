//! Construction of physical bit-owner paths from logical pin references.
//!
//! A packed block may sit in a logical mode whose wiring is not real. Its
//! pins are carried into the physical tree by [`logical_pin_to_physical_path`]:
//! the owning pb-type is replaced by its physical alias (replica digits mapped
//! through the alias' index factor and offset), and the port is chosen by
//! primitive kind.

use tessera_annotate::PbAnnotations;
use tessera_arch::{ArchitectureModel, PbId, PbType, PinRef, PortDecl, PrimitiveKind};
use tessera_common::{HierPath, Segment};

/// Grid coordinate of a placed tile.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TileCoord {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl TileCoord {
    /// Creates a coordinate.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// The leading path segment of every bit in this tile: `grid_{x}_{y}`.
    pub fn segment(self) -> Segment {
        Segment::named(format!("grid_{}_{}", self.x, self.y))
    }

    /// Prefixes a tile-relative path with this tile's segment.
    pub fn locate(self, rel: &HierPath) -> HierPath {
        HierPath::from_segments(vec![self.segment()]).join(rel)
    }
}

/// A pin of the physical pb tree.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PhysicalPin {
    /// Tile holding the pin.
    pub tile: TileCoord,
    /// Physical pb instance path, relative to the tile.
    pub instance: HierPath,
    /// Physical pb-type.
    pub pb: PbId,
    /// Port name on the physical pb-type.
    pub port: String,
    /// Bit within the port.
    pub bit: u32,
}

impl PhysicalPin {
    /// Full path of the physical pb instance.
    pub fn located(&self) -> HierPath {
        self.tile.locate(&self.instance)
    }

    /// The pin as seen from the mode that contains its pb: returns the mode
    /// instance path and the child pin reference.
    pub fn as_child(&self, arch: &ArchitectureModel) -> Option<(HierPath, PinRef)> {
        let index = self.instance.last()?.index?;
        let mode = self.instance.parent()?;
        let name = arch.pb(self.pb).name.clone();
        Some((mode, PinRef::child(name, index, self.port.clone(), self.bit)))
    }

    /// The pin as seen from inside the pb's own default mode.
    pub fn as_parent(&self, arch: &ArchitectureModel) -> Option<(HierPath, PinRef)> {
        let pb = arch.pb(self.pb);
        let mode = &pb.modes[pb.default_mode()?];
        Some((
            self.instance.child(Segment::named(mode.name.clone())),
            PinRef::parent(pb.name.clone(), self.port.clone(), self.bit),
        ))
    }
}

/// Maps a logical pb instance onto the physical pb that implements it.
///
/// Returns the physical instance path and pb-type: the alias target when the
/// pb-type is annotated with one, else the instance itself when it lies in
/// real wiring.
pub fn physical_instance(
    arch: &ArchitectureModel,
    annotations: &PbAnnotations,
    instance: &HierPath,
) -> Option<(HierPath, PbId)> {
    let pb = arch.tree().by_path(instance)?;
    if let Some((physical, _, _)) = annotations.physical_alias(pb.id) {
        let path = annotations.map_replica_digits(arch, instance, &arch.pb(physical).path)?;
        return Some((path, physical));
    }
    pb.physical_reachable.then(|| (instance.clone(), pb.id))
}

/// Picks the physical port carrying logical `port[bit]`.
fn physical_port(logical: &PbType, physical: &PbType, port: &str, bit: u32) -> Option<(String, u32)> {
    let decl = logical.port(port)?;
    let fits = |p: &&PortDecl| p.dir == decl.dir && bit < p.width;
    let chosen = match logical.primitive_kind() {
        // Pads expose one port per direction under whatever name the
        // physical pad uses.
        PrimitiveKind::Io => physical.ports.iter().find(fits),
        // Dual-port memories suffix their ports per side: `addr` lands on
        // `addr_a` when no plain `addr` exists.
        PrimitiveKind::Memory => physical.port(port).filter(fits).or_else(|| {
            physical
                .ports
                .iter()
                .filter(fits)
                .find(|p| p.name.starts_with(port))
        }),
        PrimitiveKind::Lut | PrimitiveKind::Flipflop | PrimitiveKind::Other => {
            physical.port(port).filter(fits)
        }
    }?;
    Some((chosen.name.clone(), bit))
}

/// Builds the physical pin implementing logical pin `port[bit]` of pb
/// instance `instance` in `tile`.
pub fn logical_pin_to_physical_path(
    arch: &ArchitectureModel,
    annotations: &PbAnnotations,
    tile: TileCoord,
    instance: &HierPath,
    port: &str,
    bit: u32,
) -> Option<PhysicalPin> {
    let logical = arch.tree().by_path(instance)?;
    let (path, physical) = physical_instance(arch, annotations, instance)?;
    let (port, bit) = physical_port(logical, arch.pb(physical), port, bit)?;
    Some(PhysicalPin {
        tile,
        instance: path,
        pb: physical,
        port,
        bit,
    })
}

/// Returns the pb instance owning `pin` as referenced from mode instance `mode`.
pub fn pin_owner(mode: &HierPath, pin: &PinRef) -> Option<HierPath> {
    match pin.index {
        Some(i) => Some(mode.child(Segment::indexed(pin.block.clone(), i))),
        None => mode.parent(),
    }
}

/// Carries a pin reference of logical mode `mode` into the physical tree,
/// returning the physical mode instance and pin reference.
pub fn physical_pin_ref(
    arch: &ArchitectureModel,
    annotations: &PbAnnotations,
    tile: TileCoord,
    mode: &HierPath,
    pin: &PinRef,
) -> Option<(HierPath, PinRef)> {
    let owner = pin_owner(mode, pin)?;
    let physical = logical_pin_to_physical_path(arch, annotations, tile, &owner, &pin.port, pin.bit)?;
    if pin.index.is_some() {
        physical.as_child(arch)
    } else {
        physical.as_parent(arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;

    fn path(s: &str) -> HierPath {
        HierPath::parse(s).unwrap()
    }

    #[test]
    fn tile_prefix() {
        let tile = TileCoord::new(3, 7);
        assert_eq!(tile.locate(&path("clb[0].clb")).to_string(), "grid_3_7.clb[0].clb");
    }

    #[test]
    fn aliased_lut_lands_on_physical_site() {
        let f = Fixture::new();
        let pin = logical_pin_to_physical_path(
            &f.arch,
            &f.annotations.pb,
            TileCoord::new(1, 1),
            &path("clb[0].clb.fle[1].n1_lut2.lut2[0]"),
            "in",
            1,
        )
        .unwrap();
        assert_eq!(pin.instance.to_string(), "clb[0].clb.fle[1].physical.frac[0]");
        assert_eq!((pin.port.as_str(), pin.bit), ("in", 1));
        assert_eq!(
            pin.located().to_string(),
            "grid_1_1.clb[0].clb.fle[1].physical.frac[0]"
        );
        let (mode, child) = pin.as_child(&f.arch).unwrap();
        assert_eq!(mode.to_string(), "clb[0].clb.fle[1].physical");
        assert_eq!(child, PinRef::child("frac", 0, "in", 1));
    }

    #[test]
    fn unaliased_pb_maps_to_itself() {
        let f = Fixture::new();
        let (p, id) = physical_instance(&f.arch, &f.annotations.pb, &path("clb[0].clb.fle[0]")).unwrap();
        assert_eq!(p.to_string(), "clb[0].clb.fle[0]");
        assert_eq!(f.arch.pb(id).name, "fle");
    }

    #[test]
    fn parent_pin_enters_default_mode() {
        let f = Fixture::new();
        let (mode, pin) = physical_pin_ref(
            &f.arch,
            &f.annotations.pb,
            TileCoord::new(1, 1),
            &path("clb[0].clb.fle[0].n1_lut2"),
            &PinRef::parent("fle", "in", 1),
        )
        .unwrap();
        assert_eq!(mode.to_string(), "clb[0].clb.fle[0].physical");
        assert_eq!(pin, PinRef::parent("fle", "in", 1));
    }

    #[test]
    fn unknown_port_or_bit_is_none() {
        let f = Fixture::new();
        let inst = path("clb[0].clb.fle[0].n1_lut2.lut2[0]");
        let tile = TileCoord::new(1, 1);
        assert!(logical_pin_to_physical_path(&f.arch, &f.annotations.pb, tile, &inst, "nope", 0).is_none());
        assert!(logical_pin_to_physical_path(&f.arch, &f.annotations.pb, tile, &inst, "in", 2).is_none());
    }

    #[test]
    fn pad_port_follows_direction() {
        let text = crate::fixtures::ARCH.replace(
            "Aname lut2\nAclass lut\nAblif_model .names",
            "Aname lut2\nAblif_model .input",
        );
        let f = Fixture::with_arch(&text);
        let pin = logical_pin_to_physical_path(
            &f.arch,
            &f.annotations.pb,
            TileCoord::new(1, 1),
            &path("clb[0].clb.fle[0].n1_lut2.lut2[0]"),
            "out",
            0,
        )
        .unwrap();
        assert_eq!(pin.port, "out");
        assert_eq!(f.arch.pb(pin.pb).name, "frac");
    }
}
