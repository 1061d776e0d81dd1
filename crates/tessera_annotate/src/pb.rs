//! pb-type annotations declared by the circuit architecture.

use crate::error::AnnotationError;
use std::collections::BTreeMap;
use tessera_arch::{ArchitectureModel, PbId};
use tessera_common::{HierPath, Segment};
use tessera_markup::Element;

/// What a logical pb-type is annotated with.
#[derive(Clone, Debug, PartialEq)]
pub enum PbAnnotation {
    /// Implemented by another pb-type of the physical tree.
    PhysicalAlias {
        /// The physical pb-type.
        physical: PbId,
        /// Scale applied to replica digits.
        factor: f64,
        /// Offset added after scaling.
        offset: i64,
    },
    /// Implemented by a circuit model, with its default mode bits.
    Circuit {
        /// Circuit model name.
        model: String,
        /// Default mode-bit pattern, first character is bit 0.
        mode_bits: Option<String>,
    },
    /// Declares which mode is the physical one.
    PhysicalMode,
}

/// Every pb-type annotation, keyed by logical pb-type.
#[derive(Clone, Debug, Default)]
pub struct PbAnnotations {
    by_pb: BTreeMap<PbId, PbAnnotation>,
}

impl PbAnnotations {
    /// Returns the annotation of `pb`.
    pub fn get(&self, pb: PbId) -> Option<&PbAnnotation> {
        self.by_pb.get(&pb)
    }

    /// Returns `(physical, factor, offset)` if `pb` is aliased.
    pub fn physical_alias(&self, pb: PbId) -> Option<(PbId, f64, i64)> {
        match self.by_pb.get(&pb)? {
            PbAnnotation::PhysicalAlias {
                physical,
                factor,
                offset,
            } => Some((*physical, *factor, *offset)),
            _ => None,
        }
    }

    /// Returns the circuit model name and default mode bits of `pb`.
    pub fn circuit_of(&self, pb: PbId) -> Option<(&str, Option<&str>)> {
        match self.by_pb.get(&pb)? {
            PbAnnotation::Circuit { model, mode_bits } => {
                Some((model.as_str(), mode_bits.as_deref()))
            }
            _ => None,
        }
    }

    /// Iterates over `(pb, model, bits)` for every circuit alias with mode bits.
    pub fn mode_bit_defaults(&self) -> impl Iterator<Item = (PbId, &str, &str)> {
        self.by_pb.iter().filter_map(|(&pb, ann)| match ann {
            PbAnnotation::Circuit {
                model,
                mode_bits: Some(bits),
            } => Some((pb, model.as_str(), bits.as_str())),
            _ => None,
        })
    }

    /// Number of annotated pb-types.
    pub fn len(&self) -> usize {
        self.by_pb.len()
    }

    /// Returns `true` when nothing is annotated.
    pub fn is_empty(&self) -> bool {
        self.by_pb.is_empty()
    }

    /// Maps the replica digits of a logical instance path onto the template of
    /// a physical pb-type.
    ///
    /// The k-th pb-type segment of `physical` receives the k-th digit of
    /// `logical`, scaled by `factor` and shifted by `offset` when the logical
    /// pb-type at that depth is aliased; levels the logical path lacks get 0.
    /// Returns `None` if a resulting digit falls outside its level's
    /// replication.
    pub fn map_replica_digits(
        &self,
        arch: &ArchitectureModel,
        logical: &HierPath,
        physical: &HierPath,
    ) -> Option<HierPath> {
        let logical_segments = logical.segments();
        let mut out = Vec::with_capacity(physical.len());
        for (pos, seg) in physical.template().segments().iter().enumerate() {
            if pos % 2 == 1 {
                out.push(seg.clone());
                continue;
            }
            let mut digit = i64::from(
                logical_segments
                    .get(pos)
                    .and_then(|s| s.index)
                    .unwrap_or(0),
            );
            let logical_pb = (pos < logical.len())
                .then(|| arch.tree().by_path(&logical.prefix(pos + 1)))
                .flatten();
            if let Some((_, factor, offset)) =
                logical_pb.and_then(|pb| self.physical_alias(pb.id))
            {
                digit = (digit as f64 * factor).floor() as i64 + offset;
            }
            let radix = arch.replication(&physical.prefix(pos + 1))?;
            let digit = u32::try_from(digit).ok().filter(|&d| d < radix)?;
            out.push(Segment::indexed(seg.name.clone(), digit));
        }
        Some(HierPath::from_segments(out))
    }
}

/// Reads `pb_type_annotations` from the circuit architecture root.
pub fn load_pb_annotations(
    circuit: &Element,
    arch: &ArchitectureModel,
) -> Result<PbAnnotations, AnnotationError> {
    let mut out = PbAnnotations::default();
    let Some(section) = circuit.child("pb_type_annotations") else {
        return Ok(out);
    };
    for e in section.children_named("pb_type") {
        let name = e.require_str("name").map_err(tessera_arch::ArchError::from)?;
        let alias = e.attr_str("physical_pb_type_name");
        let model = e.attr_str("circuit_model_name");
        let mode = e.attr_str("physical_mode_name");
        if [alias.is_some(), model.is_some(), mode.is_some()]
            .iter()
            .filter(|&&b| b)
            .count()
            > 1
        {
            return Err(AnnotationError::Conflicting(name.to_string()));
        }
        let logical = arch.resolve_pb_name(name)?;
        let annotation = if let Some(alias) = alias {
            let physical = arch.resolve_pb_name(alias)?;
            PbAnnotation::PhysicalAlias {
                physical: physical.id,
                factor: e
                    .attr("physical_pb_type_index_factor")
                    .and_then(|v| v.as_float())
                    .unwrap_or(1.0),
                offset: e.attr_int("physical_pb_type_index_offset").unwrap_or(0),
            }
        } else if let Some(model) = model {
            let circuit = arch
                .circuit(model)
                .ok_or_else(|| AnnotationError::UnknownCircuit {
                    pb: name.to_string(),
                    model: model.to_string(),
                })?;
            let mode_bits = e.attr_str("mode_bits").map(str::to_string);
            if let Some(bits) = &mode_bits {
                if !bits.chars().all(|c| c == '0' || c == '1') {
                    return Err(AnnotationError::BadModeBits {
                        pb: name.to_string(),
                        bits: bits.clone(),
                    });
                }
                if bits.len() != circuit.mode_bit_width() as usize {
                    return Err(AnnotationError::ModeBitsWidth {
                        pb: name.to_string(),
                        expected: circuit.mode_bit_width(),
                        found: bits.len(),
                    });
                }
            }
            PbAnnotation::Circuit {
                model: model.to_string(),
                mode_bits,
            }
        } else if let Some(mode) = mode {
            let pb = arch.pb(logical.id);
            if mode != "physical" || pb.mode_index(mode).is_none() {
                return Err(AnnotationError::BadPhysicalMode {
                    pb: name.to_string(),
                    mode: mode.to_string(),
                });
            }
            PbAnnotation::PhysicalMode
        } else {
            continue;
        };
        out.by_pb.insert(logical.id, annotation);
    }
    Ok(out)
}
