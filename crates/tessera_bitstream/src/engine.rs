//! The bitstream engine: loads every input, runs the passes in order and
//! serializes the result.
//!
//! Pass order is fixed: default initialization, packing, LUT contents,
//! routing, clock checks, then overrides. Precedence ranks make the outcome
//! independent of write order, but defaults must come first since no later
//! pass creates bits.

use crate::clocks::check_clock_constraints;
use crate::compare::{apply_overrides, diff};
use crate::context::PassContext;
use crate::defaults::initialize_defaults;
use crate::error::OutputError;
use crate::lut::{apply_lut_contents, LutReport};
use crate::packing::{apply_packing, PackingStats};
use crate::routing::{apply_routing, RoutingStats};
use crate::select_code::SelectCodes;
use crate::serialize::{load_bitstream, render, write_output};
use crate::store::ConfigBitMap;
use serde::Serialize;
use tessera_annotate::{load_annotations, AnnotationError};
use tessera_arch::{ArchError, ArchitectureModel};
use tessera_common::{ContentHash, InternalError};
use tessera_config::{ConfigError, OutputFormat, ResolvedInputs, RunConfig};
use tessera_design::{
    load_coord_map, load_packed_design, load_placement, load_repack_constraints, load_routing,
    load_synth_luts, DesignError, PackedDesign, Placement, RepackConstraints, RoutedNet, SynthLuts,
};
use tessera_diagnostics::{CategoryCounts, DiagnosticSink};
use tessera_markup::{read_markup_file, MarkupError};
use tessera_rrg::{RoutingFabric, RrgError};
use thiserror::Error;

/// A fatal error that stops a run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The run configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// An architecture file is not well-formed markup.
    #[error(transparent)]
    Markup(#[from] MarkupError),
    /// The architecture is inconsistent.
    #[error(transparent)]
    Arch(#[from] ArchError),
    /// The annotations are inconsistent.
    #[error(transparent)]
    Annotation(#[from] AnnotationError),
    /// The routing graph cannot be loaded.
    #[error(transparent)]
    Rrg(#[from] RrgError),
    /// A design-side input cannot be loaded.
    #[error(transparent)]
    Design(#[from] DesignError),
    /// The bitstream cannot be written, or a prior/override cannot be read.
    #[error(transparent)]
    Output(#[from] OutputError),
    /// An engine invariant was broken.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Design-side inputs of one run.
#[derive(Clone, Debug, Default)]
pub struct DesignInputs {
    /// Packed-design tree.
    pub packed: PackedDesign,
    /// Placement.
    pub placement: Placement,
    /// Routed nets.
    pub routing: Vec<RoutedNet>,
    /// Synthesized LUT truth tables.
    pub luts: Option<SynthLuts>,
    /// Repack pin constraints.
    pub repack: Option<RepackConstraints>,
}

/// Engine knobs.
#[derive(Clone, Copy, Debug)]
pub struct EngineOptions {
    /// Default of every select bit of a clock-selecting mux.
    pub clock_default: char,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { clock_default: '0' }
    }
}

/// Result of running every bit-writing pass.
#[derive(Debug)]
pub struct Synthesis {
    /// The final bit map.
    pub map: ConfigBitMap,
    /// Packing counters.
    pub packing: PackingStats,
    /// Routing counters.
    pub routing: RoutingStats,
    /// One entry per resolved LUT.
    pub luts: Vec<LutReport>,
    /// Clock pins disagreeing with the repack constraints.
    pub clock_mismatches: usize,
}

/// Runs every bit-writing pass over `design`.
pub fn synthesize(ctx: &PassContext<'_>, design: &DesignInputs, options: EngineOptions) -> Synthesis {
    let mut map = initialize_defaults(ctx, options.clock_default);
    let mut codes = SelectCodes::new();
    let packing = apply_packing(ctx, &mut map, &mut codes, &design.packed, &design.placement);
    let luts = apply_lut_contents(ctx, &mut map, &packing.sites, design.luts.as_ref());
    let routing = apply_routing(ctx, &mut map, &mut codes, &design.routing);
    let clock_mismatches = design
        .repack
        .as_ref()
        .map_or(0, |r| check_clock_constraints(ctx, &design.packed, r));
    Synthesis {
        map,
        packing: packing.stats,
        routing,
        luts,
        clock_mismatches,
    }
}

/// Bit counts of a comparison against the prior bitstream.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct DiffCounts {
    /// Bits with a different value.
    pub changed: usize,
    /// Bits only in the prior bitstream.
    pub only_prior: usize,
    /// Bits only in this run's output.
    pub only_output: usize,
}

/// End-of-run summary.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    /// Design name.
    pub design: String,
    /// Output file.
    pub output: String,
    /// Output format.
    pub format: OutputFormat,
    /// Number of configuration bits.
    pub bits: usize,
    /// Accepted writes per precedence rank.
    pub writes: [usize; 4],
    /// Writes to nonexistent bits.
    pub missing: usize,
    /// Writes dropped for precedence.
    pub conflicts: usize,
    /// Bits replaced by override files.
    pub overridden: usize,
    /// Packing counters.
    pub packing: PackingStats,
    /// Routing counters.
    pub routing: RoutingStats,
    /// LUTs written.
    pub luts: usize,
    /// Clock pins disagreeing with the repack constraints.
    pub clock_mismatches: usize,
    /// Warnings and errors per category.
    pub diagnostics: CategoryCounts,
    /// XXH3-128 of the serialized output.
    pub hash: String,
    /// Comparison against the prior bitstream, when one was given.
    pub prior: Option<DiffCounts>,
}

impl RunSummary {
    /// Returns `true` if any recoverable problem was recorded.
    pub fn incomplete(&self) -> bool {
        self.missing > 0 || self.diagnostics.unresolved > 0
    }
}

/// Fails before any input is read when the output needs a coordinate map
/// and none is configured.
pub fn preflight(config: &RunConfig, resolved: &ResolvedInputs) -> Result<(), OutputError> {
    if resolved.coord_map.is_some() {
        return Ok(());
    }
    match config.output.format {
        OutputFormat::Rows => Err(OutputError::MissingCoordMap("rows")),
        OutputFormat::Xml if config.output.xml_addresses => Err(OutputError::MissingCoordMap("xml")),
        _ => Ok(()),
    }
}

fn load_design(resolved: &ResolvedInputs) -> Result<DesignInputs, DesignError> {
    Ok(DesignInputs {
        packed: load_packed_design(&resolved.packed)?,
        placement: load_placement(&resolved.place)?,
        routing: load_routing(&resolved.route)?,
        luts: resolved.synth.as_deref().map(load_synth_luts).transpose()?,
        repack: resolved.repack.as_deref().map(load_repack_constraints).transpose()?,
    })
}

/// Runs a whole build as configured and writes the output file.
///
/// Recoverable problems land in `sink`; only untrustworthy inputs and
/// output failures are returned as errors.
pub fn run_from_config(
    config: &RunConfig,
    resolved: &ResolvedInputs,
    sink: &DiagnosticSink,
) -> Result<RunSummary, EngineError> {
    preflight(config, resolved)?;

    let logical = read_markup_file(&resolved.arch)?;
    let circuit = read_markup_file(&resolved.circuit)?;
    let arch = ArchitectureModel::from_elements(&logical, &circuit)?;
    let annotations = load_annotations(resolved.annotations.as_deref(), &circuit, &arch, sink)?;
    let fabric = RoutingFabric::load(&resolved.rrg, resolved.rrg_cache.as_deref())?;
    let design = load_design(resolved)?;
    let coords = resolved.coord_map.as_deref().map(load_coord_map).transpose()?;

    let ctx = PassContext {
        arch: &arch,
        annotations: &annotations,
        fabric: &fabric,
        sink,
    };
    let options = EngineOptions {
        clock_default: config.engine.clock_mux_default,
    };
    let mut synthesis = synthesize(&ctx, &design, options);
    let created = synthesis.map.len();

    for path in &resolved.overrides {
        apply_overrides(&mut synthesis.map, &load_bitstream(path)?, sink);
    }
    if synthesis.map.len() != created {
        return Err(InternalError::new(format!(
            "bit map grew from {created} to {} after default initialization",
            synthesis.map.len()
        ))
        .into());
    }

    let bits = synthesis.map.values();
    let addressed = match config.output.format {
        OutputFormat::Xml if !config.output.xml_addresses => None,
        _ => coords.as_ref(),
    };
    let text = render(config.output.format, &bits, addressed)?;
    write_output(&resolved.output, &text)?;

    let prior = match &resolved.prior {
        Some(path) => {
            let d = diff(&load_bitstream(path)?, &bits);
            Some(DiffCounts {
                changed: d.changed.len(),
                only_prior: d.only_left.len(),
                only_output: d.only_right.len(),
            })
        }
        None => None,
    };

    let stats = synthesis.map.stats();
    Ok(RunSummary {
        design: config.design.name.clone(),
        output: resolved.output.display().to_string(),
        format: config.output.format,
        bits: bits.len(),
        writes: stats.writes,
        missing: stats.missing,
        conflicts: stats.conflicts,
        overridden: stats.overridden,
        packing: synthesis.packing,
        routing: synthesis.routing,
        luts: synthesis.luts.len(),
        clock_mismatches: synthesis.clock_mismatches,
        diagnostics: sink.counts(),
        hash: ContentHash::from_bytes(text.as_bytes()).to_string(),
        prior,
    })
}
