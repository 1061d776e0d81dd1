//! Streaming record reader.

use crate::error::MarkupError;
use crate::tree::{Element, Node};
use std::io::BufRead;
use std::path::Path;

/// Parses a record stream held in memory.
pub fn parse_str(text: &str) -> Result<Element, MarkupError> {
    parse_reader(text.as_bytes())
}

/// Reads and parses a (possibly gzip-compressed) markup file.
pub fn read_markup_file(path: &Path) -> Result<Element, MarkupError> {
    let reader = tessera_common::open_input(path)?;
    parse_reader(reader)
}

/// Parses a record stream, one record per line.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Element, MarkupError> {
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let record = line.trim_end_matches('\r');
        let mut chars = record.chars();
        let Some(tag) = chars.next() else {
            continue;
        };
        let body = chars.as_str();
        match tag {
            '(' => {
                let name = body.trim();
                if name.is_empty() {
                    return Err(MarkupError::MissingName { line: line_no });
                }
                if stack.is_empty() && root.is_some() {
                    return Err(MarkupError::MultipleRoots {
                        name: name.to_string(),
                        line: line_no,
                    });
                }
                stack.push(Element::new(name));
            }
            ')' => {
                let name = body.trim();
                if name.is_empty() {
                    return Err(MarkupError::MissingName { line: line_no });
                }
                let Some(done) = stack.pop() else {
                    return Err(MarkupError::UnexpectedClose {
                        found: name.to_string(),
                        line: line_no,
                    });
                };
                if done.name != name {
                    return Err(MarkupError::MismatchedClose {
                        expected: done.name,
                        found: name.to_string(),
                        line: line_no,
                    });
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(done)),
                    None => root = Some(done),
                }
            }
            'A' => {
                let current = stack
                    .last_mut()
                    .ok_or(MarkupError::ContentOutsideElement { line: line_no })?;
                let (name, value) = body.split_once(' ').unwrap_or((body, ""));
                if name.is_empty() {
                    return Err(MarkupError::MissingName { line: line_no });
                }
                current.set_attr(name, unescape(value));
            }
            '-' => {
                let current = stack
                    .last_mut()
                    .ok_or(MarkupError::ContentOutsideElement { line: line_no })?;
                let text = unescape(body);
                match current.children.last_mut() {
                    Some(Node::Text(prev)) => {
                        prev.push('\n');
                        prev.push_str(&text);
                    }
                    _ => current.children.push(Node::Text(text)),
                }
            }
            '?' => {}
            other => {
                return Err(MarkupError::UnknownRecord {
                    tag: other,
                    line: line_no,
                })
            }
        }
    }

    if let Some(open) = stack.pop() {
        return Err(MarkupError::Unclosed(open.name));
    }
    root.ok_or(MarkupError::Empty)
}

/// Decodes `\n`, `\t` and `\\` escapes.
pub(crate) fn unescape(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::AttrKind;

    const RRG: &str = "\
?xml version=\"1.0\"
(rr_graph
Atool_name vpr
(rr_nodes
(node
Aid 0
Atype CHANX
Acapacity 1
)node
(node
Aid 1
Atype IPIN
)node
)rr_nodes
)rr_graph
";

    #[test]
    fn parses_nested_tree() {
        let root = parse_str(RRG).unwrap();
        assert_eq!(root.name, "rr_graph");
        assert_eq!(root.attr_str("tool_name"), Some("vpr"));
        let nodes: Vec<_> = root.child("rr_nodes").unwrap().children_named("node").collect();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].attr("id").unwrap().kind(), AttrKind::Int(0));
        assert_eq!(nodes[1].attr_str("type"), Some("IPIN"));
    }

    #[test]
    fn text_records_join_with_newlines() {
        let root = parse_str("(port\n-clb.I[0]\n-open\n)port\n").unwrap();
        assert_eq!(root.text(), "clb.I[0]\nopen");
    }

    #[test]
    fn escapes_are_decoded() {
        let root = parse_str("(a\nAv x\\ty\n-line\\nnext \\\\\n)a\n").unwrap();
        assert_eq!(root.attr_str("v"), Some("x\ty"));
        assert_eq!(root.text(), "line\nnext \\");
    }

    #[test]
    fn attribute_without_value_is_empty() {
        let root = parse_str("(a\nAflag\n)a\n").unwrap();
        assert_eq!(root.attr_str("flag"), Some(""));
    }

    #[test]
    fn mismatched_close_is_fatal() {
        let err = parse_str("(a\n(b\n)a\n").unwrap_err();
        assert!(matches!(
            err,
            MarkupError::MismatchedClose { ref expected, ref found, line: 3 }
                if expected == "b" && found == "a"
        ));
    }

    #[test]
    fn stray_close_is_fatal() {
        assert!(matches!(
            parse_str(")a\n").unwrap_err(),
            MarkupError::UnexpectedClose { .. }
        ));
    }

    #[test]
    fn unclosed_is_fatal() {
        assert!(matches!(
            parse_str("(a\n(b\n)b\n").unwrap_err(),
            MarkupError::Unclosed(name) if name == "a"
        ));
    }

    #[test]
    fn attribute_outside_element_is_fatal() {
        assert!(matches!(
            parse_str("Ax 1\n").unwrap_err(),
            MarkupError::ContentOutsideElement { line: 1 }
        ));
    }

    #[test]
    fn unknown_tag_is_fatal() {
        assert!(matches!(
            parse_str("(a\n*junk\n)a\n").unwrap_err(),
            MarkupError::UnknownRecord { tag: '*', line: 2 }
        ));
    }

    #[test]
    fn two_roots_are_fatal() {
        assert!(matches!(
            parse_str("(a\n)a\n(b\n)b\n").unwrap_err(),
            MarkupError::MultipleRoots { .. }
        ));
    }

    #[test]
    fn empty_input_is_fatal() {
        assert!(matches!(parse_str("\n\n").unwrap_err(), MarkupError::Empty));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.pyx");
        std::fs::write(&path, RRG).unwrap();
        assert_eq!(read_markup_file(&path).unwrap().name, "rr_graph");
    }
}
