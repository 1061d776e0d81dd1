//! Routing result (`.route`).
//!
//! Each `Net n (name)` header starts a net; each `Node:` line lists one node
//! of the route tree in traversal order. A node already seen in the same net
//! restarts a branch from that point.

use crate::error::{read_text, DesignError};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

static RE_NET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Net\s+(\d+)\s+\((.+?)\)(.*)$").unwrap());
static RE_NODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Node:\s*(\d+)\s+(\w+)").unwrap());

/// One routed net.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RoutedNet {
    /// Net number.
    pub id: u32,
    /// Net name.
    pub name: String,
    /// `true` for global nets, which carry no node list.
    pub global: bool,
    /// Nodes in traversal order.
    pub nodes: Vec<u32>,
}

impl RoutedNet {
    /// Returns every `(driver, driven)` hop of the route tree.
    pub fn hops(&self) -> Vec<(u32, u32)> {
        let mut seen = HashSet::new();
        let mut prev: Option<u32> = None;
        let mut out = Vec::new();
        for &node in &self.nodes {
            if !seen.insert(node) {
                prev = Some(node);
                continue;
            }
            if let Some(p) = prev {
                out.push((p, node));
            }
            prev = Some(node);
        }
        out
    }
}

/// Reads a routing result file.
pub fn load_routing(path: &Path) -> Result<Vec<RoutedNet>, DesignError> {
    parse_routing(&read_text(path)?)
}

/// Parses routing result text.
pub fn parse_routing(content: &str) -> Result<Vec<RoutedNet>, DesignError> {
    let mut nets: Vec<RoutedNet> = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if let Some(caps) = RE_NET.captures(line) {
            nets.push(RoutedNet {
                id: caps[1].parse().map_err(|_| {
                    DesignError::malformed("route", line_no + 1, "net number out of range")
                })?,
                name: caps[2].to_string(),
                global: caps[3].contains("global"),
                nodes: Vec::new(),
            });
        } else if let Some(caps) = RE_NODE.captures(line) {
            let net = nets.last_mut().ok_or_else(|| {
                DesignError::malformed("route", line_no + 1, "node line before any net")
            })?;
            net.nodes.push(caps[1].parse().map_err(|_| {
                DesignError::malformed("route", line_no + 1, "node id out of range")
            })?);
        }
    }
    Ok(nets)
}
