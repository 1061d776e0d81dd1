//! Pin references and bus-range expansion.
//!
//! Interconnect declarations name pins with bus references such as
//! `fle[3:0].out`, `clb.I[7:0]` or `ble4.in[2]`. [`expand_bus_ref`] turns one
//! reference into concrete [`PinRef`]s, block instances outermost and bits
//! innermost. A range `[a:b]` expands in the direction written, so `[3:0]`
//! yields `3, 2, 1, 0`.

use crate::error::ArchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tessera_common::HierPath;

/// One concrete pin: `block.port[bit]` for the enclosing pb-type, or
/// `block[index].port[bit]` for a child instance.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct PinRef {
    /// The pb-type name.
    pub block: String,
    /// Child instance index; `None` for the enclosing pb-type.
    pub index: Option<u32>,
    /// Port name.
    pub port: String,
    /// Bit within the port.
    pub bit: u32,
}

impl PinRef {
    /// A pin of the enclosing pb-type.
    pub fn parent(block: impl Into<String>, port: impl Into<String>, bit: u32) -> Self {
        Self {
            block: block.into(),
            index: None,
            port: port.into(),
            bit,
        }
    }

    /// A pin of child instance `index`.
    pub fn child(block: impl Into<String>, index: u32, port: impl Into<String>, bit: u32) -> Self {
        Self {
            block: block.into(),
            index: Some(index),
            port: port.into(),
            bit,
        }
    }

    /// Returns `port[bit]`.
    pub fn pin_name(&self) -> String {
        format!("{}[{}]", self.port, self.bit)
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}].{}[{}]", self.block, self.port, self.bit),
            None => write!(f, "{}.{}[{}]", self.block, self.port, self.bit),
        }
    }
}

impl FromStr for PinRef {
    type Err = ArchError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let bad = |reason: &str| ArchError::BadReference {
            reference: text.to_string(),
            reason: reason.to_string(),
        };
        let path = HierPath::parse(text).map_err(|e| bad(&e.to_string()))?;
        let [block, port] = path.segments() else {
            return Err(bad("expected block.port[bit]"));
        };
        let bit = port.index.ok_or_else(|| bad("missing bit subscript"))?;
        Ok(Self {
            block: block.name.clone(),
            index: block.index,
            port: port.name.clone(),
            bit,
        })
    }
}

/// Which indices a bus reference selects.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Selector {
    /// No subscript: every index.
    All,
    /// `[i]`
    One(u32),
    /// `[a:b]`, in the order written.
    Range(u32, u32),
}

impl Selector {
    fn expand(self, bound: u32) -> Result<Vec<u32>, String> {
        let out = match self {
            Selector::All => (0..bound).collect(),
            Selector::One(i) => vec![i],
            Selector::Range(a, b) => expand_range(a, b),
        };
        match out.iter().find(|&&i| i >= bound) {
            Some(i) => Err(format!("index {i} out of range 0..{bound}")),
            None => Ok(out),
        }
    }
}

/// Expands `[a:b]` in the direction written.
pub fn expand_range(a: u32, b: u32) -> Vec<u32> {
    if a <= b {
        (a..=b).collect()
    } else {
        (b..=a).rev().collect()
    }
}

/// A parsed but unexpanded bus reference.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BusRef {
    /// pb-type name.
    pub block: String,
    /// Instance selection.
    pub block_sel: Selector,
    /// Port name.
    pub port: String,
    /// Bit selection.
    pub bit_sel: Selector,
}

fn parse_part(part: &str) -> Result<(String, Selector), String> {
    let Some(open) = part.find('[') else {
        if part.is_empty() || part.contains(']') {
            return Err(format!("malformed component '{part}'"));
        }
        return Ok((part.to_string(), Selector::All));
    };
    let name = &part[..open];
    let inner = part[open + 1..]
        .strip_suffix(']')
        .ok_or_else(|| format!("unterminated subscript in '{part}'"))?;
    if name.is_empty() {
        return Err(format!("missing name in '{part}'"));
    }
    let num = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| format!("non-numeric subscript in '{part}'"))
    };
    let sel = match inner.split_once(':') {
        Some((a, b)) => Selector::Range(num(a)?, num(b)?),
        None => Selector::One(num(inner)?),
    };
    Ok((name.to_string(), sel))
}

/// Parses `block[sel].port[sel]`.
pub fn parse_bus_ref(text: &str) -> Result<BusRef, ArchError> {
    let bad = |reason: String| ArchError::BadReference {
        reference: text.to_string(),
        reason,
    };
    let (block_part, port_part) = text
        .split_once('.')
        .ok_or_else(|| bad("expected block.port".to_string()))?;
    let (block, block_sel) = parse_part(block_part).map_err(bad)?;
    let (port, bit_sel) = parse_part(port_part).map_err(bad)?;
    Ok(BusRef {
        block,
        block_sel,
        port,
        bit_sel,
    })
}

/// Answers port questions for the pb-types visible from one mode.
pub trait PortScope {
    /// Returns `(instances, width)` for `block.port`: `instances` is `None`
    /// for the enclosing pb-type and `Some(num_pb)` for a child. `indexed`
    /// tells whether the reference carried a block subscript, which decides
    /// between a parent and a child of the same name.
    fn lookup(&self, block: &str, indexed: bool, port: &str) -> Option<(Option<u32>, u32)>;
}

/// Expands one bus reference into concrete pins.
pub fn expand_bus_ref(text: &str, scope: &impl PortScope) -> Result<Vec<PinRef>, ArchError> {
    let bus = parse_bus_ref(text)?;
    let bad = |reason: String| ArchError::BadReference {
        reference: text.to_string(),
        reason,
    };
    let (instances, width) = scope
        .lookup(&bus.block, bus.block_sel != Selector::All, &bus.port)
        .ok_or_else(|| bad(format!("no port '{}' on '{}'", bus.port, bus.block)))?;
    let bits = bus.bit_sel.expand(width).map_err(bad)?;
    let mut out = Vec::new();
    match instances {
        None => {
            if !matches!(bus.block_sel, Selector::All | Selector::One(0)) {
                return Err(bad("enclosing pb-type cannot be indexed".to_string()));
            }
            for &bit in &bits {
                out.push(PinRef::parent(&bus.block, &bus.port, bit));
            }
        }
        Some(num_pb) => {
            for idx in bus.block_sel.expand(num_pb).map_err(bad)? {
                for &bit in &bits {
                    out.push(PinRef::child(&bus.block, idx, &bus.port, bit));
                }
            }
        }
    }
    Ok(out)
}

/// Expands a whitespace-separated list of bus references, in order.
pub fn expand_bus_list(text: &str, scope: &impl PortScope) -> Result<Vec<PinRef>, ArchError> {
    let mut out = Vec::new();
    for reference in text.split_whitespace() {
        out.extend(expand_bus_ref(reference, scope)?);
    }
    Ok(out)
}
