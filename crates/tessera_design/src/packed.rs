//! The packed-design tree (`.net`).
//!
//! Every `block` names an instance (`fle[1]`), an optional mode, and its
//! port pins. A pin of a non-leaf block holds a connection string
//! `src.port[bit]->interconnect` naming the pin that drives it and the
//! element that carries the connection; pins of top-level and leaf blocks
//! hold net names. Unused pins and blocks are `open`.

use crate::error::{read_text, DesignError};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use tessera_arch::PinRef;
use tessera_common::Segment;
use tessera_markup::{parse_str, Element};

static RE_CONNECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][\w$]*)(?:\[(\d+)\])?\.([A-Za-z_][\w$]*)\[(\d+)\]->(\S+)$").unwrap()
});

/// A parsed connection string.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Connection {
    /// The driving pin.
    pub source: PinRef,
    /// The interconnect element carrying the connection.
    pub interconnect: String,
}

impl Connection {
    /// Parses `src[i].port[bit]->name`, returning `None` on any other shape.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = RE_CONNECTION.captures(text)?;
        let index = match caps.get(2) {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        };
        Some(Self {
            source: PinRef {
                block: caps[1].to_string(),
                index,
                port: caps[3].to_string(),
                bit: caps[4].parse().ok()?,
            },
            interconnect: caps[5].to_string(),
        })
    }
}

/// The value on one pin of a packed port.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PinValue {
    /// Unused.
    Open,
    /// A net name.
    Net(String),
    /// A connection string.
    Connection(Connection),
}

impl PinValue {
    fn classify(token: &str) -> Self {
        if token == "open" {
            PinValue::Open
        } else if token.contains("->") {
            match Connection::parse(token) {
                Some(c) => PinValue::Connection(c),
                None => PinValue::Net(token.to_string()),
            }
        } else {
            PinValue::Net(token.to_string())
        }
    }

    /// Returns the net name, if this pin carries one.
    pub fn net(&self) -> Option<&str> {
        match self {
            PinValue::Net(n) => Some(n),
            _ => None,
        }
    }
}

/// Direction of a packed port.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PackedDir {
    /// `<inputs>`
    Input,
    /// `<outputs>`
    Output,
    /// `<clocks>`
    Clock,
}

/// One port of a packed block.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PackedPort {
    /// Port name.
    pub name: String,
    /// Port direction.
    pub dir: PackedDir,
    /// One value per pin, bit 0 first.
    pub pins: Vec<PinValue>,
}

/// One block of the packed-design tree.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PackedBlock {
    /// Block name; `open` when the instance is unused.
    pub name: String,
    /// Instance segment, e.g. `fle[1]`.
    pub instance: Segment,
    /// Selected mode, if any.
    pub mode: Option<String>,
    /// Ports in file order.
    pub ports: Vec<PackedPort>,
    /// Rotation map per input port: for each physical pin, the logical pin
    /// it carries.
    pub rotations: BTreeMap<String, Vec<Option<u32>>>,
    /// Child blocks.
    pub children: Vec<PackedBlock>,
}

impl PackedBlock {
    /// Returns `true` if the instance is unused.
    pub fn is_open(&self) -> bool {
        self.name == "open"
    }

    /// pb-type name of the instance.
    pub fn pb_name(&self) -> &str {
        &self.instance.name
    }

    /// Returns the port named `name`.
    pub fn port(&self, name: &str) -> Option<&PackedPort> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Returns the child instance `name[index]`.
    pub fn child(&self, name: &str, index: u32) -> Option<&PackedBlock> {
        self.children
            .iter()
            .find(|c| c.instance.name == name && c.instance.index == Some(index))
    }

    /// Returns the rotation map of input port `port`.
    pub fn rotation(&self, port: &str) -> Option<&[Option<u32>]> {
        self.rotations.get(port).map(Vec::as_slice)
    }
}

/// The whole packed design.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PackedDesign {
    /// Top-level blocks, one per placed cluster.
    pub blocks: Vec<PackedBlock>,
}

impl PackedDesign {
    /// Returns the top-level block named `name`.
    pub fn block(&self, name: &str) -> Option<&PackedBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }
}

/// Reads a packed design in markup form.
pub fn load_packed_design(path: &Path) -> Result<PackedDesign, DesignError> {
    packed_from_markup(&parse_str(&read_text(path)?)?)
}

/// Converts the markup root (`FPGA_packed_netlist[0]`) into a [`PackedDesign`].
pub fn packed_from_markup(root: &Element) -> Result<PackedDesign, DesignError> {
    if root.name != "block" {
        return Err(DesignError::malformed(
            "packed",
            0,
            format!("root element is <{}>, expected <block>", root.name),
        ));
    }
    let blocks = root
        .children_named("block")
        .map(block)
        .collect::<Result<_, _>>()?;
    Ok(PackedDesign { blocks })
}

fn block(el: &Element) -> Result<PackedBlock, DesignError> {
    let name = el.require_str("name")?.to_string();
    let inst_text = el.require_str("instance")?;
    let instance = parse_instance(inst_text)
        .ok_or_else(|| DesignError::malformed("packed", 0, format!("bad instance '{inst_text}'")))?;

    let mut ports = Vec::new();
    let mut rotations = BTreeMap::new();
    for (section, dir) in [
        ("inputs", PackedDir::Input),
        ("outputs", PackedDir::Output),
        ("clocks", PackedDir::Clock),
    ] {
        let Some(group) = el.child(section) else { continue };
        for port in group.children_named("port") {
            ports.push(PackedPort {
                name: port.require_str("name")?.to_string(),
                dir,
                pins: port.text().split_whitespace().map(PinValue::classify).collect(),
            });
        }
        for rot in group.children_named("port_rotation_map") {
            let map = rot
                .text()
                .split_whitespace()
                .map(|t| match t {
                    "open" => Ok(None),
                    _ => t.parse::<u32>().map(Some).map_err(|_| {
                        DesignError::malformed("packed", 0, format!("bad rotation entry '{t}' in {name}"))
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            rotations.insert(rot.require_str("name")?.to_string(), map);
        }
    }

    let children = el
        .children_named("block")
        .map(block)
        .collect::<Result<_, _>>()?;
    Ok(PackedBlock {
        name,
        instance,
        mode: el.attr_str("mode").map(str::to_string),
        ports,
        rotations,
        children,
    })
}

fn parse_instance(text: &str) -> Option<Segment> {
    let (name, rest) = text.split_once('[')?;
    let index = rest.strip_suffix(']')?.parse().ok()?;
    (!name.is_empty()).then(|| Segment::indexed(name, index))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NET: &str = "\
(block
Aname top.net
Ainstance FPGA_packed_netlist[0]
(block
Aname n_out
Ainstance clb[0]
Amode clb
(inputs
(port
Aname I
-a b open open
)port
)inputs
(outputs
(port
Aname O
-fle[0].out[0]->direct_out open
)port
)outputs
(block
Aname n_out
Ainstance fle[0]
Amode n1_lut2
(inputs
(port
Aname in
-clb.I[1]->crossbar clb.I[0]->crossbar
)port
)inputs
(block
Aname n_out
Ainstance lut2[0]
(inputs
(port
Aname in
-a b
)port
(port_rotation_map
Aname in
-1 open
)port_rotation_map
)inputs
)block
)block
(block
Aname open
Ainstance fle[1]
)block
)block
)block
";

    fn design() -> PackedDesign {
        packed_from_markup(&parse_str(NET).unwrap()).unwrap()
    }

    #[test]
    fn parses_connection_strings() {
        let c = Connection::parse("fle[3].out[0]->direct_out").unwrap();
        assert_eq!(c.source, PinRef::child("fle", 3, "out", 0));
        assert_eq!(c.interconnect, "direct_out");
        let c = Connection::parse("clb.I[7]->crossbar").unwrap();
        assert_eq!(c.source, PinRef::parent("clb", "I", 7));
        assert!(Connection::parse("clb.I->x").is_none());
    }

    #[test]
    fn reads_tree() {
        let d = design();
        let clb = d.block("n_out").unwrap();
        assert_eq!(clb.instance, Segment::indexed("clb", 0));
        assert_eq!(clb.mode.as_deref(), Some("clb"));
        assert_eq!(clb.port("I").unwrap().pins[1], PinValue::Net("b".to_string()));
        assert_eq!(clb.port("I").unwrap().pins[2], PinValue::Open);
        assert!(clb.child("fle", 1).unwrap().is_open());

        let fle = clb.child("fle", 0).unwrap();
        let PinValue::Connection(c) = &fle.port("in").unwrap().pins[0] else {
            panic!("expected connection");
        };
        assert_eq!(c.source, PinRef::parent("clb", "I", 1));

        let lut = fle.child("lut2", 0).unwrap();
        assert_eq!(lut.rotation("in").unwrap(), &[Some(1), None]);
        assert_eq!(lut.mode, None);
    }

    #[test]
    fn wrong_root_is_rejected() {
        let root = parse_str("(netlist\n)netlist\n").unwrap();
        assert!(packed_from_markup(&root).is_err());
    }
}
