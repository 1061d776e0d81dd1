//! Structured hierarchical paths.
//!
//! Every dotted name in the toolchain (pb-type templates, concrete block
//! instances, configuration-bit paths) is parsed once into a [`HierPath`]: an
//! ordered list of [`Segment`]s, each a name with an optional subscript.
//! Paths compare and hash structurally, so `mem_out[2]` sorts before
//! `mem_out[10]` and subscripts are never stripped with text substitution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One component of a [`HierPath`]: `name` or `name[index]`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Segment {
    /// The component name.
    pub name: String,
    /// The replica subscript, if any.
    pub index: Option<u32>,
}

impl Segment {
    /// Creates a segment without a subscript.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    /// Creates a segment with a subscript.
    pub fn indexed(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }

    /// Returns a copy of this segment with the subscript removed.
    pub fn template(&self) -> Self {
        Self::named(self.name.clone())
    }

    fn parse(text: &str, whole: &str) -> Result<Self, PathParseError> {
        if text.is_empty() {
            return Err(PathParseError::EmptySegment(whole.to_string()));
        }
        match text.find('[') {
            None => {
                if text.contains(']') {
                    return Err(PathParseError::BadSubscript(text.to_string()));
                }
                Ok(Self::named(text))
            }
            Some(open) => {
                let name = &text[..open];
                let rest = &text[open + 1..];
                let digits = rest
                    .strip_suffix(']')
                    .ok_or_else(|| PathParseError::BadSubscript(text.to_string()))?;
                if name.is_empty() {
                    return Err(PathParseError::EmptySegment(whole.to_string()));
                }
                let index = digits
                    .parse::<u32>()
                    .map_err(|_| PathParseError::BadSubscript(text.to_string()))?;
                Ok(Self::indexed(name, index))
            }
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Errors produced when parsing a dotted path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathParseError {
    /// A path contained an empty component (e.g. `a..b`).
    #[error("empty path component in '{0}'")]
    EmptySegment(String),
    /// A component had a malformed or non-numeric subscript.
    #[error("malformed subscript in '{0}'")]
    BadSubscript(String),
}

/// A dotted hierarchical path such as `clb[0].default.fle[3].mem_out[1]`.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct HierPath {
    segments: Vec<Segment>,
}

impl HierPath {
    /// Creates an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a path from an ordered list of segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Parses a dotted path. Equivalent to `str::parse`.
    pub fn parse(text: &str) -> Result<Self, PathParseError> {
        text.parse()
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Appends a segment in place.
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: Segment) -> Self {
        let mut out = self.clone();
        out.segments.push(segment);
        out
    }

    /// Returns a new path with every segment of `other` appended.
    pub fn join(&self, other: &HierPath) -> Self {
        let mut out = self.clone();
        out.segments.extend(other.segments.iter().cloned());
        out
    }

    /// Returns the path without its last segment, or `None` when empty.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Self::from_segments(
                self.segments[..self.segments.len() - 1].to_vec(),
            ))
        }
    }

    /// Returns the first `len` segments as a new path.
    pub fn prefix(&self, len: usize) -> Self {
        Self::from_segments(self.segments[..len.min(self.segments.len())].to_vec())
    }

    /// Returns the last segment.
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Returns the same path with every subscript removed.
    pub fn template(&self) -> Self {
        Self::from_segments(self.segments.iter().map(Segment::template).collect())
    }

    /// Returns `true` if `prefix` is a leading sub-path of `self`.
    pub fn starts_with(&self, prefix: &HierPath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// Replaces the subscript of the segment at `position`.
    pub fn set_index(&mut self, position: usize, index: Option<u32>) {
        if let Some(seg) = self.segments.get_mut(position) {
            seg.index = index;
        }
    }

    /// Returns the configuration-memory bit `<self>.mem_out[bit]`.
    pub fn mem_bit(&self, bit: u32) -> Self {
        self.child(Segment::indexed("mem_out", bit))
    }
}

impl FromStr for HierPath {
    type Err = PathParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::new());
        }
        let segments = text
            .split('.')
            .map(|part| Segment::parse(part, text))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }
}

impl fmt::Display for HierPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_roundtrip() {
        let p = HierPath::parse("clb[0].default.fle[3].mem_out[1]").unwrap();
        assert_eq!(p.len(), 4);
        assert_eq!(p.segments()[1], Segment::named("default"));
        assert_eq!(p.to_string(), "clb[0].default.fle[3].mem_out[1]");
    }

    #[test]
    fn empty_text_is_empty_path() {
        assert!(HierPath::parse("").unwrap().is_empty());
    }

    #[test]
    fn rejects_empty_component() {
        assert!(matches!(
            HierPath::parse("a..b"),
            Err(PathParseError::EmptySegment(_))
        ));
    }

    #[test]
    fn rejects_bad_subscript() {
        assert!(HierPath::parse("a[x]").is_err());
        assert!(HierPath::parse("a[1").is_err());
        assert!(HierPath::parse("a]").is_err());
    }

    #[test]
    fn numeric_subscripts_sort_numerically() {
        let base = HierPath::parse("mux").unwrap();
        let mut bits = vec![base.mem_bit(10), base.mem_bit(2), base.mem_bit(0)];
        bits.sort();
        let shown: Vec<_> = bits.iter().map(|b| b.to_string()).collect();
        assert_eq!(shown, ["mux.mem_out[0]", "mux.mem_out[2]", "mux.mem_out[10]"]);
    }

    #[test]
    fn template_strips_every_subscript() {
        let p = HierPath::parse("clb[2].fle[7].lut4[0]").unwrap();
        assert_eq!(p.template().to_string(), "clb.fle.lut4");
    }

    #[test]
    fn prefix_parent_and_starts_with() {
        let p = HierPath::parse("a[1].b.c[2]").unwrap();
        let parent = p.parent().unwrap();
        assert_eq!(parent.to_string(), "a[1].b");
        assert!(p.starts_with(&parent));
        assert!(!parent.starts_with(&p));
        assert_eq!(p.prefix(1).to_string(), "a[1]");
        assert_eq!(p.prefix(99), p);
    }

    #[test]
    fn structural_equality_ignores_formatting() {
        let a = HierPath::parse(" a.b[3] ").unwrap();
        let b = HierPath::from_segments(vec![Segment::named("a"), Segment::indexed("b", 3)]);
        assert_eq!(a, b);
    }

    #[test]
    fn serde_roundtrip() {
        let p = HierPath::parse("x[1].y").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        let back: HierPath = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
