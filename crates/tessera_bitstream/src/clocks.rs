//! Cross-check of packed clock pins against repack pin constraints.

use crate::context::PassContext;
use tessera_design::{PackedDesign, PackedDir, RepackConstraints};
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, Origin};

const CLOCK_MISMATCH: DiagnosticCode = DiagnosticCode {
    category: Category::Unresolved,
    number: 440,
};

/// Reports every top-level clock pin whose net disagrees with the repack
/// constraints. Returns the number of disagreements.
pub fn check_clock_constraints(
    ctx: &PassContext<'_>,
    design: &PackedDesign,
    constraints: &RepackConstraints,
) -> usize {
    let mut mismatches = 0;
    for block in design.blocks.iter().filter(|b| !b.is_open()) {
        let root = block.pb_name();
        let clocks = block.ports.iter().filter(|p| p.dir == PackedDir::Clock);
        for port in clocks {
            for (bit, pin) in port.pins.iter().enumerate() {
                let Some(net) = pin.net() else {
                    continue;
                };
                let expected = constraints.net_for(root, &port.name, bit as u32);
                let problem = match expected {
                    Some("OPEN") => Some("is constrained to stay open".to_string()),
                    Some(want) if want != net => Some(format!("is constrained to net '{want}'")),
                    Some(_) => None,
                    None if constraints.mentions(net) => {
                        Some("is not the pin constrained for this net".to_string())
                    }
                    None => None,
                };
                if let Some(problem) = problem {
                    mismatches += 1;
                    ctx.sink.emit(Diagnostic::warning(
                        CLOCK_MISMATCH,
                        format!("{root}.{}[{bit}] of block '{}' carries '{net}' but {problem}", port.name, block.name),
                        Origin::context("repack constraints"),
                    ));
                }
            }
        }
    }
    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Fixture};
    use tessera_design::{packed_from_markup, PinConstraint};
    use tessera_markup::parse_str;

    fn constraint(port: &str, bit: u32, net: &str) -> PinConstraint {
        PinConstraint {
            pb_type: "clb".into(),
            port: port.into(),
            bit,
            net: net.into(),
        }
    }

    fn check(pins: Vec<PinConstraint>) -> (usize, Fixture) {
        let f = Fixture::new();
        let design = packed_from_markup(&parse_str(fixtures::PACKED).unwrap()).unwrap();
        let n = check_clock_constraints(&f.ctx(), &design, &RepackConstraints { pins });
        (n, f)
    }

    #[test]
    fn matching_constraint_is_silent() {
        let (n, f) = check(vec![constraint("clk", 0, "clk")]);
        assert_eq!(n, 0);
        assert!(f.sink.diagnostics().is_empty());
    }

    #[test]
    fn net_on_wrong_pin() {
        let (n, f) = check(vec![constraint("clk", 1, "clk")]);
        assert_eq!(n, 1);
        assert_eq!(f.sink.counts().unresolved, 1);
    }

    #[test]
    fn pin_pinned_elsewhere_or_open() {
        assert_eq!(check(vec![constraint("clk", 0, "other")]).0, 1);
        assert_eq!(check(vec![constraint("clk", 0, "OPEN")]).0, 1);
    }

    #[test]
    fn no_constraints() {
        assert_eq!(check(Vec::new()).0, 0);
    }
}
