//! The declarative annotation file.
//!
//! Whitespace-separated fields, `#` starts a comment. A line with an odd
//! field count is a setting:
//!
//! ```text
//! clb.clb.fle.n1_lut2  clb.clb.fle.physical.frac:mode[0] 1
//! ```
//!
//! A line with an even field count whose first field contains `:` is a
//! mapping from one logical selection to physical selections:
//!
//! ```text
//! clb.clb.fle.n1_lut2.lut2:in[1]:0  clb.clb.fle.physical.frac:in  1 0
//! ```

use crate::error::AnnotationError;
use tessera_common::HierPath;

/// A physical pin and the input to select on the mux driving it.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PinTarget {
    /// Physical pb-type path, as written.
    pub path: HierPath,
    /// Port name.
    pub port: String,
    /// Bit within the port.
    pub bit: u32,
    /// Input index to select.
    pub index: u32,
}

/// One parsed line.
#[derive(Clone, PartialEq, Debug)]
pub enum AnnotationRecord {
    /// Apply `targets` whenever logical mode `logical` is packed.
    Setting {
        /// 1-based line number.
        line: usize,
        /// Logical mode path.
        logical: HierPath,
        /// Physical selections.
        targets: Vec<PinTarget>,
    },
    /// Realize selection `index` on `logical.port[bit]` with `targets`.
    Mapping {
        /// 1-based line number.
        line: usize,
        /// Logical pb-type path.
        logical: HierPath,
        /// Logical port.
        port: String,
        /// Bit within the logical port.
        bit: u32,
        /// Logical input index.
        index: u32,
        /// Physical selections.
        targets: Vec<PinTarget>,
    },
}

fn number(line: usize, text: &str) -> Result<u32, AnnotationError> {
    text.parse().map_err(|_| AnnotationError::Malformed {
        line,
        reason: format!("expected a number, found '{text}'"),
    })
}

fn path(line: usize, text: &str) -> Result<HierPath, AnnotationError> {
    HierPath::parse(text).map_err(|e| AnnotationError::Malformed {
        line,
        reason: e.to_string(),
    })
}

/// Splits `port[bit]`.
fn pin(line: usize, text: &str) -> Result<(String, u32), AnnotationError> {
    let parsed = path(line, text)?;
    match parsed.segments() {
        [seg] => match seg.index {
            Some(bit) => Ok((seg.name.clone(), bit)),
            None => Err(AnnotationError::Malformed {
                line,
                reason: format!("pin '{text}' lacks a bit subscript"),
            }),
        },
        _ => Err(AnnotationError::Malformed {
            line,
            reason: format!("expected port[bit], found '{text}'"),
        }),
    }
}

/// Parses the whole file.
pub fn parse_annotation_file(text: &str) -> Result<Vec<AnnotationRecord>, AnnotationError> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or("");
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() % 2 == 1 {
            if fields.len() < 3 {
                return Err(AnnotationError::Malformed {
                    line,
                    reason: "setting needs at least one target".to_string(),
                });
            }
            let mut targets = Vec::new();
            for pair in fields[1..].chunks(2) {
                let (ppath, ppin) = pair[0].split_once(':').ok_or_else(|| {
                    AnnotationError::Malformed {
                        line,
                        reason: format!("expected path:port[bit], found '{}'", pair[0]),
                    }
                })?;
                let (port, bit) = pin(line, ppin)?;
                targets.push(PinTarget {
                    path: path(line, ppath)?,
                    port,
                    bit,
                    index: number(line, pair[1])?,
                });
            }
            out.push(AnnotationRecord::Setting {
                line,
                logical: path(line, fields[0])?,
                targets,
            });
        } else {
            let parts: Vec<&str> = fields[0].split(':').collect();
            let [lpath, lpin, lindex] = parts[..] else {
                return Err(AnnotationError::Malformed {
                    line,
                    reason: "mapping key must be path:port[bit]:index".to_string(),
                });
            };
            if fields.len() < 4 {
                return Err(AnnotationError::Malformed {
                    line,
                    reason: "mapping needs at least one bit/index pair".to_string(),
                });
            }
            let (ppath, pport) = fields[1].split_once(':').ok_or_else(|| {
                AnnotationError::Malformed {
                    line,
                    reason: format!("expected path:port, found '{}'", fields[1]),
                }
            })?;
            let ppath = path(line, ppath)?;
            let mut targets = Vec::new();
            for pair in fields[2..].chunks(2) {
                targets.push(PinTarget {
                    path: ppath.clone(),
                    port: pport.to_string(),
                    bit: number(line, pair[0])?,
                    index: number(line, pair[1])?,
                });
            }
            let (port, bit) = pin(line, lpin)?;
            out.push(AnnotationRecord::Mapping {
                line,
                logical: path(line, lpath)?,
                port,
                bit,
                index: number(line, lindex)?,
                targets,
            });
        }
    }
    Ok(out)
}
