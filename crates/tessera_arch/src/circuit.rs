//! The physical circuit library.

use crate::error::ArchError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessera_markup::Element;

/// Kind of a circuit-model port.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum CircuitPortKind {
    /// Data input.
    Input,
    /// Data output.
    Output,
    /// Configuration memory.
    Sram,
    /// Clock.
    Clock,
    /// Any other declared type.
    Other,
}

/// A port of a circuit model.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CircuitPort {
    /// Port kind.
    pub kind: CircuitPortKind,
    /// Port name prefix; names the memory block of mode-select ports.
    pub prefix: String,
    /// Number of pins.
    pub size: u32,
    /// `true` for ports that select the operating mode.
    pub mode_select: bool,
    /// Sub-circuit this port selects among, if declared.
    pub selected_circuit: Option<String>,
    /// `true` for global ports, excluded from LUT input counts.
    pub is_global: bool,
}

/// Input count and truth-table size of a LUT circuit model.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LutShape {
    /// Number of non-global inputs.
    pub inputs: u32,
    /// Number of truth-table bits.
    pub ram_size: u64,
}

/// One circuit model.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CircuitModel {
    /// Model name.
    pub name: String,
    /// Declared `type` attribute (`lut`, `mux`, `ff`, ...).
    pub kind: String,
    /// Ports in declaration order.
    pub ports: Vec<CircuitPort>,
    /// Sizing, for LUT models.
    pub lut: Option<LutShape>,
}

impl CircuitModel {
    /// Iterates over the mode-select ports.
    pub fn mode_select_ports(&self) -> impl Iterator<Item = &CircuitPort> {
        self.ports.iter().filter(|p| p.mode_select)
    }

    /// Total width of every mode-select port.
    pub fn mode_bit_width(&self) -> u32 {
        self.mode_select_ports().map(|p| p.size).sum()
    }
}

/// Loads every `circuit_model` under `circuit_library`.
///
/// Fails if a LUT model's truth-table size is not `2^inputs`.
pub fn load_circuit_library(root: &Element) -> Result<BTreeMap<String, CircuitModel>, ArchError> {
    let Some(library) = root.child("circuit_library") else {
        return Ok(BTreeMap::new());
    };
    let mut models = BTreeMap::new();
    for model in library.children_named("circuit_model") {
        let name = model.require_str("name")?.to_string();
        let kind = model.require_str("type")?.to_string();
        let mut ports = Vec::new();
        for p in model.children_named("port") {
            let port_kind = match p.require_str("type")? {
                "input" => CircuitPortKind::Input,
                "output" => CircuitPortKind::Output,
                "sram" => CircuitPortKind::Sram,
                "clock" => CircuitPortKind::Clock,
                _ => CircuitPortKind::Other,
            };
            ports.push(CircuitPort {
                kind: port_kind,
                prefix: p.require_str("prefix")?.to_string(),
                size: p
                    .attr_int("size")
                    .and_then(|s| u32::try_from(s).ok())
                    .unwrap_or(1),
                mode_select: p.attr_flag("mode_select"),
                selected_circuit: p.attr_str("circuit_model_name").map(str::to_string),
                is_global: p.attr_flag("is_global"),
            });
        }
        let lut = if kind == "lut" {
            Some(lut_shape(&name, &ports)?)
        } else {
            None
        };
        models.insert(
            name.clone(),
            CircuitModel {
                name,
                kind,
                ports,
                lut,
            },
        );
    }
    Ok(models)
}

fn lut_shape(name: &str, ports: &[CircuitPort]) -> Result<LutShape, ArchError> {
    let inputs: u32 = ports
        .iter()
        .filter(|p| p.kind == CircuitPortKind::Input && !p.is_global)
        .map(|p| p.size)
        .sum();
    let ram_size: u64 = ports
        .iter()
        .filter(|p| p.kind == CircuitPortKind::Sram && !p.mode_select)
        .map(|p| u64::from(p.size))
        .sum();
    if 1u64.checked_shl(inputs) != Some(ram_size) {
        return Err(ArchError::LutSizeMismatch {
            model: name.to_string(),
            inputs,
            ram: ram_size,
        });
    }
    Ok(LutShape { inputs, ram_size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::CIRCUIT;
    use tessera_markup::parse_str;

    #[test]
    fn loads_lut_with_mode_select() {
        let models = load_circuit_library(&parse_str(CIRCUIT).unwrap()).unwrap();
        let lut = &models["frac_lut2"];
        assert_eq!(lut.lut, Some(LutShape { inputs: 2, ram_size: 4 }));
        assert_eq!(lut.mode_bit_width(), 1);
        assert_eq!(lut.mode_select_ports().next().unwrap().prefix, "mode");
        assert!(models["mux_tree"].lut.is_none());
    }

    #[test]
    fn global_inputs_are_not_counted() {
        let text = CIRCUIT.replace(
            "(port\nAtype output",
            "(port\nAtype input\nAprefix reset\nAis_global true\n)port\n(port\nAtype output",
        );
        let models = load_circuit_library(&parse_str(&text).unwrap()).unwrap();
        assert_eq!(models["frac_lut2"].lut.unwrap().inputs, 2);
    }

    #[test]
    fn inconsistent_lut_is_fatal() {
        let text = CIRCUIT.replace("Aprefix sram\nAsize 4", "Aprefix sram\nAsize 8");
        let err = load_circuit_library(&parse_str(&text).unwrap()).unwrap_err();
        assert!(matches!(err, ArchError::LutSizeMismatch { inputs: 2, ram: 8, .. }));
    }

    #[test]
    fn missing_library_is_empty() {
        let root = parse_str("(openfpga_architecture\n)openfpga_architecture\n").unwrap();
        assert!(load_circuit_library(&root).unwrap().is_empty());
    }
}
