//! Routing pass: every hop of every routed net selects its driver on the
//! switch-box or connection-box mux of the driven node.

use crate::context::PassContext;
use crate::select_code::SelectCodes;
use crate::store::{ConfigBitMap, Rank};
use serde::Serialize;
use tessera_design::RoutedNet;
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, Origin};

const NOT_A_DRIVER: DiagnosticCode = DiagnosticCode {
    category: Category::Unresolved,
    number: 430,
};

/// Routing counters.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
pub struct RoutingStats {
    /// Nets walked.
    pub nets: usize,
    /// Global nets skipped.
    pub global: usize,
    /// Hops that selected a mux input.
    pub selections: usize,
    /// Hops whose driver is not an input of the driven node's mux.
    pub unresolved: usize,
}

/// Applies every routed hop to `map`.
pub fn apply_routing(
    ctx: &PassContext<'_>,
    map: &mut ConfigBitMap,
    codes: &mut SelectCodes,
    nets: &[RoutedNet],
) -> RoutingStats {
    let mut stats = RoutingStats::default();
    for net in nets {
        if net.global {
            stats.global += 1;
            continue;
        }
        stats.nets += 1;
        for (src, sink) in net.hops() {
            // Nodes driven by a single edge have no mux.
            let Some(mux) = ctx.fabric.mux_of(sink) else {
                continue;
            };
            let bits = mux.index_of(src).and_then(|idx| codes.bits(mux.width(), idx));
            let Some(bits) = bits else {
                stats.unresolved += 1;
                ctx.sink.emit(Diagnostic::warning(
                    NOT_A_DRIVER,
                    format!("node {src} does not drive node {sink} through '{}'", mux.path),
                    Origin::context(format!("net '{}'", net.name)),
                ));
                continue;
            };
            map.write_bits(&mux.path, &bits, Rank::Routing, ctx.sink);
            stats.selections += 1;
        }
    }
    stats
}
