//! Resolution of configured input paths against the configuration directory.

use crate::types::{OutputFormat, RunConfig};
use std::path::{Path, PathBuf};

/// Every input and output location of one build, as concrete paths.
#[derive(Debug, Clone)]
pub struct ResolvedInputs {
    /// Logical architecture description.
    pub arch: PathBuf,
    /// Physical/circuit architecture description.
    pub circuit: PathBuf,
    /// Routing-resource graph.
    pub rrg: PathBuf,
    /// Packed-design tree.
    pub packed: PathBuf,
    /// Placement table.
    pub place: PathBuf,
    /// Routing result.
    pub route: PathBuf,
    /// Post-synthesis structural source.
    pub synth: Option<PathBuf>,
    /// Declarative annotation file.
    pub annotations: Option<PathBuf>,
    /// Repack pin constraints.
    pub repack: Option<PathBuf>,
    /// Coordinate map.
    pub coord_map: Option<PathBuf>,
    /// Prior bitstream.
    pub prior: Option<PathBuf>,
    /// Override bitstreams, in merge order.
    pub overrides: Vec<PathBuf>,
    /// Routing-graph snapshot cache.
    pub rrg_cache: Option<PathBuf>,
    /// Output file.
    pub output: PathBuf,
}

/// Resolves every path of `config` relative to `base_dir`.
///
/// Absolute paths are kept as they are. When no output path is configured the
/// output lands at `<base_dir>/<design.name>.<ext>`.
pub fn resolve_inputs(config: &RunConfig, base_dir: &Path) -> ResolvedInputs {
    let at = |p: &str| -> PathBuf {
        let path = Path::new(p);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    };
    let opt = |p: &Option<String>| p.as_deref().map(at);
    let inputs = &config.inputs;
    let output = match &config.output.path {
        Some(p) => at(p),
        None => base_dir.join(default_output_name(&config.design.name, config.output.format)),
    };
    ResolvedInputs {
        arch: at(&inputs.arch),
        circuit: at(&inputs.circuit),
        rrg: at(&inputs.rrg),
        packed: at(&inputs.packed),
        place: at(&inputs.place),
        route: at(&inputs.route),
        synth: opt(&inputs.synth),
        annotations: opt(&inputs.annotations),
        repack: opt(&inputs.repack),
        coord_map: opt(&inputs.coord_map),
        prior: opt(&inputs.prior),
        overrides: inputs.overrides.iter().map(|p| at(p)).collect(),
        rrg_cache: opt(&inputs.rrg_cache),
        output,
    }
}

fn default_output_name(design: &str, format: OutputFormat) -> String {
    format!("{design}.{}", format.extension())
}
