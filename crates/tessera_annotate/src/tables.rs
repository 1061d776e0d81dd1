//! Replica-expanded annotation tables.

use crate::error::AnnotationError;
use crate::file::{parse_annotation_file, AnnotationRecord, PinTarget};
use crate::pb::{load_pb_annotations, PbAnnotations};
use std::collections::HashMap;
use std::path::Path;
use tessera_arch::ArchitectureModel;
use tessera_common::HierPath;
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Origin};
use tessera_markup::Element;

/// Key of an annotation mapping: a logical selection on one concrete pin.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct MappingKey {
    /// Logical pb instance path, relative to the tile.
    pub path: HierPath,
    /// Port name.
    pub port: String,
    /// Bit within the port.
    pub bit: u32,
    /// Logical input index selected.
    pub index: u32,
}

/// A concrete physical selection.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PhysicalTarget {
    /// Physical pb instance path, relative to the tile.
    pub path: HierPath,
    /// Port name.
    pub port: String,
    /// Bit within the port.
    pub bit: u32,
    /// Input index to select.
    pub index: u32,
}

/// Annotation mappings and settings, one entry per concrete replica, plus
/// the pb-type annotations of the circuit architecture.
#[derive(Clone, Debug, Default)]
pub struct AnnotationTables {
    mappings: HashMap<MappingKey, Vec<PhysicalTarget>>,
    settings: HashMap<HierPath, Vec<PhysicalTarget>>,
    /// pb-type annotations.
    pub pb: PbAnnotations,
}

const DUPLICATE_KEY: DiagnosticCode = DiagnosticCode {
    category: Category::Structure,
    number: 110,
};
const DIGIT_RANGE: DiagnosticCode = DiagnosticCode {
    category: Category::Structure,
    number: 111,
};
const UNKNOWN_PATH: DiagnosticCode = DiagnosticCode {
    category: Category::Unresolved,
    number: 410,
};

impl AnnotationTables {
    /// Returns the physical selections realizing `key`.
    pub fn mapping(&self, key: &MappingKey) -> Option<&[PhysicalTarget]> {
        self.mappings.get(key).map(Vec::as_slice)
    }

    /// Returns the physical selections applied when mode instance `path` is packed.
    pub fn setting(&self, path: &HierPath) -> Option<&[PhysicalTarget]> {
        self.settings.get(path).map(Vec::as_slice)
    }

    /// Number of concrete mapping entries.
    pub fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    /// Number of concrete setting entries.
    pub fn setting_count(&self) -> usize {
        self.settings.len()
    }

    /// Expands parsed records into concrete table entries.
    ///
    /// Unknown paths are dropped with an `Unresolved` diagnostic; a duplicate
    /// key with different targets keeps the first and reports once.
    pub fn build(
        records: &[AnnotationRecord],
        arch: &ArchitectureModel,
        pb: PbAnnotations,
        sink: &DiagnosticSink,
    ) -> Self {
        let mut tables = Self {
            pb,
            ..Self::default()
        };
        for record in records {
            match record {
                AnnotationRecord::Setting {
                    line,
                    logical,
                    targets,
                } => {
                    if !mode_path_exists(arch, logical) {
                        unknown(sink, *line, logical);
                        continue;
                    }
                    for inst in instances(arch, logical) {
                        let Some(concrete) = tables.concrete_targets(arch, &inst, targets, *line, sink)
                        else {
                            continue;
                        };
                        insert_once(&mut tables.settings, inst.clone(), concrete, sink, || {
                            inst.to_string()
                        });
                    }
                }
                AnnotationRecord::Mapping {
                    line,
                    logical,
                    port,
                    bit,
                    index,
                    targets,
                } => {
                    let known = arch
                        .tree()
                        .by_path(logical)
                        .is_some_and(|p| p.path.len() == logical.len() && p.port(port).is_some());
                    if !known {
                        unknown(sink, *line, logical);
                        continue;
                    }
                    for inst in instances(arch, logical) {
                        let Some(concrete) = tables.concrete_targets(arch, &inst, targets, *line, sink)
                        else {
                            continue;
                        };
                        let key = MappingKey {
                            path: inst,
                            port: port.clone(),
                            bit: *bit,
                            index: *index,
                        };
                        let label = format!("{}:{port}[{bit}]:{index}", key.path);
                        insert_once(&mut tables.mappings, key, concrete, sink, || label);
                    }
                }
            }
        }
        tables
    }

    fn concrete_targets(
        &self,
        arch: &ArchitectureModel,
        logical: &HierPath,
        targets: &[PinTarget],
        line: usize,
        sink: &DiagnosticSink,
    ) -> Option<Vec<PhysicalTarget>> {
        let mut out = Vec::with_capacity(targets.len());
        for t in targets {
            if arch.tree().by_path(&t.path).is_none_or(|p| p.path.len() != t.path.len()) {
                unknown(sink, line, &t.path);
                return None;
            }
            let Some(path) = self.pb.map_replica_digits(arch, logical, &t.path) else {
                sink.emit(
                    Diagnostic::warning(
                        DIGIT_RANGE,
                        format!("replica of '{logical}' has no counterpart in '{}'", t.path),
                        Origin::file_line("annotations", line),
                    )
                    .with_note("check physical_pb_type_index_factor/offset"),
                );
                return None;
            };
            out.push(PhysicalTarget {
                path,
                port: t.port.clone(),
                bit: t.bit,
                index: t.index,
            });
        }
        Some(out)
    }
}

fn insert_once<K: std::hash::Hash + Eq>(
    table: &mut HashMap<K, Vec<PhysicalTarget>>,
    key: K,
    targets: Vec<PhysicalTarget>,
    sink: &DiagnosticSink,
    label: impl FnOnce() -> String,
) {
    match table.get(&key) {
        Some(existing) if *existing != targets => {
            let label = label();
            sink.emit_once(
                format!("annotation:{label}"),
                Diagnostic::warning(
                    DUPLICATE_KEY,
                    format!("conflicting annotations for '{label}'; keeping the first"),
                    Origin::context(label.clone()),
                ),
            );
        }
        Some(_) => {}
        None => {
            table.insert(key, targets);
        }
    }
}

fn unknown(sink: &DiagnosticSink, line: usize, path: &HierPath) {
    sink.emit(Diagnostic::warning(
        UNKNOWN_PATH,
        format!("annotation path '{path}' does not exist in the architecture"),
        Origin::file_line("annotations", line),
    ));
}

fn mode_path_exists(arch: &ArchitectureModel, path: &HierPath) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    let Some(mode) = path.last() else {
        return false;
    };
    path.len() % 2 == 0
        && arch
            .tree()
            .by_path(&parent)
            .is_some_and(|pb| pb.mode_index(&mode.name).is_some())
}

/// Every concrete replica of `written`; subscripts already present are kept fixed.
fn instances(arch: &ArchitectureModel, written: &HierPath) -> Vec<HierPath> {
    let template = written.template();
    arch.replica_context(&template)
        .replicas()
        .map(|ctx| ctx.apply(&template))
        .filter(|inst| {
            written
                .segments()
                .iter()
                .zip(inst.segments())
                .all(|(w, i)| w.index.is_none() || w.index == i.index)
        })
        .collect()
}

/// Loads pb-type annotations from `circuit` and, when given, the annotation file.
pub fn load_annotations(
    file: Option<&Path>,
    circuit: &Element,
    arch: &ArchitectureModel,
    sink: &DiagnosticSink,
) -> Result<AnnotationTables, AnnotationError> {
    let pb = load_pb_annotations(circuit, arch)?;
    let records = match file {
        Some(path) => parse_annotation_file(&tessera_common::read_input_to_string(path)?)?,
        None => Vec::new(),
    };
    Ok(AnnotationTables::build(&records, arch, pb, sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{arch, CIRCUIT};
    use tessera_markup::parse_str;

    fn build(text: &str) -> (AnnotationTables, DiagnosticSink) {
        let arch = arch();
        let pb = load_pb_annotations(&parse_str(CIRCUIT).unwrap(), &arch).unwrap();
        let sink = DiagnosticSink::new();
        let records = parse_annotation_file(text).unwrap();
        (AnnotationTables::build(&records, &arch, pb, &sink), sink)
    }

    #[test]
    fn setting_expands_over_replicas() {
        let (t, sink) = build("clb.clb.fle.n1_lut2 clb.clb.fle.physical.frac:in[0] 1\n");
        assert_eq!(t.setting_count(), 4);
        let key = HierPath::parse("clb[1].clb.fle[0].n1_lut2").unwrap();
        let targets = t.setting(&key).unwrap();
        assert_eq!(targets[0].path.to_string(), "clb[1].clb.fle[0].physical.frac[0]");
        assert_eq!(targets[0].index, 1);
        assert!(!sink.has_errors());
    }

    #[test]
    fn fixed_subscripts_restrict_expansion() {
        let (t, _) = build("clb[0].clb.fle[1].n1_lut2 clb.clb.fle.physical.frac:in[0] 1\n");
        assert_eq!(t.setting_count(), 1);
        assert!(t
            .setting(&HierPath::parse("clb[0].clb.fle[1].n1_lut2").unwrap())
            .is_some());
    }

    #[test]
    fn mapping_keys_carry_logical_selection() {
        let (t, _) = build("clb.clb.fle.n1_lut2.lut2:in[1]:0 clb.clb.fle.physical.frac:in 1 0 0 1\n");
        assert_eq!(t.mapping_count(), 4);
        let key = MappingKey {
            path: HierPath::parse("clb[0].clb.fle[1].n1_lut2.lut2[0]").unwrap(),
            port: "in".into(),
            bit: 1,
            index: 0,
        };
        let targets = t.mapping(&key).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].path.to_string(), "clb[0].clb.fle[1].physical.frac[0]");
        assert_eq!((targets[1].bit, targets[1].index), (0, 1));
    }

    #[test]
    fn duplicate_with_different_targets_keeps_first() {
        let (t, sink) = build(
            "clb.clb.fle.n1_lut2 clb.clb.fle.physical.frac:in[0] 1\n\
             clb.clb.fle.n1_lut2 clb.clb.fle.physical.frac:in[0] 0\n",
        );
        let key = HierPath::parse("clb[0].clb.fle[0].n1_lut2").unwrap();
        assert_eq!(t.setting(&key).unwrap()[0].index, 1);
        assert_eq!(sink.counts().structure, 4);
    }

    #[test]
    fn identical_duplicate_is_silent() {
        let (_, sink) = build(
            "clb.clb.fle.n1_lut2 clb.clb.fle.physical.frac:in[0] 1\n\
             clb.clb.fle.n1_lut2 clb.clb.fle.physical.frac:in[0] 1\n",
        );
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn unknown_paths_are_unresolved() {
        let (t, sink) = build(
            "clb.clb.fle.bogus clb.clb.fle.physical.frac:in[0] 1\n\
             clb.clb.fle.n1_lut2.lut2:nope[0]:0 clb.clb.fle.physical.frac:in 0 0\n\
             clb.clb.fle.n1_lut2 clb.clb.nothere:in[0] 1\n",
        );
        assert_eq!(t.setting_count(), 0);
        assert_eq!(t.mapping_count(), 0);
        assert_eq!(sink.counts().unresolved, 6);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("design.ann");
        std::fs::write(&path, "clb.clb.fle.n1_lut2 clb.clb.fle.physical.frac:in[0] 1\n").unwrap();
        let arch = arch();
        let sink = DiagnosticSink::new();
        let t = load_annotations(Some(&path), &parse_str(CIRCUIT).unwrap(), &arch, &sink).unwrap();
        assert_eq!(t.setting_count(), 4);
        assert_eq!(t.pb.len(), 3);
    }
}
