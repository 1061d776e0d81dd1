//! The in-memory element tree.

use crate::error::MarkupError;
use crate::value::AttrValue;
use serde::{Deserialize, Serialize};

/// A child of an [`Element`]: either a nested element or a run of text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// Text content.
    Text(String),
}

/// One element: a tag name, attributes in source order, and children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// The tag name.
    pub name: String,
    /// Attributes in the order they were read.
    pub attrs: Vec<(String, AttrValue)>,
    /// Child elements and text.
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: adds an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: adds a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Builder: adds a text child.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Sets an attribute, replacing an existing one of the same name.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = AttrValue::classify(value);
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Returns the attribute `name`.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns the text of attribute `name`.
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).map(AttrValue::as_str)
    }

    /// Returns attribute `name` as an integer.
    pub fn attr_int(&self, name: &str) -> Option<i64> {
        self.attr(name).and_then(AttrValue::as_int)
    }

    /// Returns `true` if attribute `name` is the literal `true`.
    pub fn attr_flag(&self, name: &str) -> bool {
        self.attr(name).is_some_and(AttrValue::as_bool)
    }

    /// Returns the text of attribute `name`, or a [`MarkupError::MissingAttribute`].
    pub fn require_str(&self, name: &str) -> Result<&str, MarkupError> {
        self.attr_str(name).ok_or_else(|| self.missing(name))
    }

    /// Returns attribute `name` as an integer, or a [`MarkupError::MissingAttribute`]
    /// when it is absent or not an integer.
    pub fn require_int(&self, name: &str) -> Result<i64, MarkupError> {
        self.attr_int(name).ok_or_else(|| self.missing(name))
    }

    fn missing(&self, attr: &str) -> MarkupError {
        MarkupError::MissingAttribute {
            element: self.name.clone(),
            attr: attr.to_string(),
        }
    }

    /// Iterates over child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Iterates over child elements named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    /// Returns the first child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Returns the concatenated text content of this element.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let Node::Text(t) = child {
                out.push_str(t);
            }
        }
        out
    }

    /// Iterates depth-first over every descendant element named `name`.
    pub fn descendants_named<'a>(&'a self, name: &'a str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        let mut stack: Vec<&Element> = self.elements().collect();
        stack.reverse();
        while let Some(e) = stack.pop() {
            if e.name == name {
                out.push(e);
            }
            let mut kids: Vec<&Element> = e.elements().collect();
            kids.reverse();
            stack.extend(kids);
        }
        out
    }
}
