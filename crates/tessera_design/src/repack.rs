//! Repack pin constraints.
//!
//! `repack_design_constraints > pin_constraint(pb_type, pin, net)` pins a
//! net (usually a global clock) to one pin of a top-level pb-type.

use crate::error::{read_text, DesignError};
use std::path::Path;
use tessera_common::HierPath;
use tessera_markup::{parse_str, Element};

/// One pin constraint.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PinConstraint {
    /// Top-level pb-type name.
    pub pb_type: String,
    /// Port name.
    pub port: String,
    /// Bit within the port.
    pub bit: u32,
    /// Net assigned to the pin; `OPEN` means the pin must stay unused.
    pub net: String,
}

/// Every pin constraint.
#[derive(Clone, Debug, Default)]
pub struct RepackConstraints {
    /// Constraints in file order.
    pub pins: Vec<PinConstraint>,
}

impl RepackConstraints {
    /// Returns the net pinned to `pb_type.port[bit]`.
    pub fn net_for(&self, pb_type: &str, port: &str, bit: u32) -> Option<&str> {
        self.pins
            .iter()
            .find(|c| c.pb_type == pb_type && c.port == port && c.bit == bit)
            .map(|c| c.net.as_str())
    }

    /// Returns `true` if any constraint names `net`.
    pub fn mentions(&self, net: &str) -> bool {
        self.pins.iter().any(|c| c.net == net)
    }
}

/// Reads a repack constraint file.
pub fn load_repack_constraints(path: &Path) -> Result<RepackConstraints, DesignError> {
    repack_from_markup(&parse_str(&read_text(path)?)?)
}

/// Converts a `repack_design_constraints` tree.
pub fn repack_from_markup(root: &Element) -> Result<RepackConstraints, DesignError> {
    let mut out = RepackConstraints::default();
    for c in root.children_named("pin_constraint") {
        let pin = c.require_str("pin")?;
        let parsed = HierPath::parse(pin)
            .ok()
            .filter(|p| p.len() == 1)
            .and_then(|p| p.last().cloned())
            .ok_or_else(|| DesignError::malformed("repack", 0, format!("bad pin '{pin}'")))?;
        out.pins.push(PinConstraint {
            pb_type: c.require_str("pb_type")?.to_string(),
            port: parsed.name,
            bit: parsed.index.unwrap_or(0),
            net: c.require_str("net")?.to_string(),
        });
    }
    Ok(out)
}
