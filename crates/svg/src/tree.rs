//! The owned element tree that templates are rewritten in.
//!
//! `roxmltree` documents are read-only, so parsed documents are copied into
//! this structure. Text lives in `Node::Text` children, in document order.
use std::fmt;

use crate::SVG_NAMESPACE;

/// A namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    pub namespace: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(namespace: Option<&str>, local: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local: local.to_string(),
        }
    }

    /// A name in the SVG namespace.
    pub fn svg(local: &str) -> Self {
        Self::new(Some(SVG_NAMESPACE), local)
    }

    /// A name without a namespace, as used by most attributes.
    pub fn plain(local: &str) -> Self {
        Self::new(None, local)
    }

    pub fn is_svg(&self, local: &str) -> bool {
        self.namespace.as_deref() == Some(SVG_NAMESPACE) && self.local == local
    }
}

impl fmt::Display for ExpandedName {
    /// Clark notation, `{namespace}local`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: ExpandedName,
    pub value: String,
}

/// A namespace declaration (`xmlns` or `xmlns:prefix`) made on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: ExpandedName,
    pub attributes: Vec<Attribute>,
    pub namespaces: Vec<Namespace>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: ExpandedName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            namespaces: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates an empty element in the SVG namespace.
    pub fn svg(local: &str) -> Self {
        Self::new(ExpandedName::svg(local))
    }

    /// True if this is the SVG element `local`.
    pub fn is(&self, local: &str) -> bool {
        self.name.is_svg(local)
    }

    /// Looks up an attribute without a namespace.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attr_ns(None, local)
    }

    pub fn attr_ns(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace.as_deref() == namespace && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, local: &str) -> bool {
        self.attr(local).is_some()
    }

    /// Sets an attribute without a namespace, replacing any existing value in place.
    pub fn set_attr(&mut self, local: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.name.namespace.is_none() && a.name.local == local)
        {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute {
                name: ExpandedName::plain(local),
                value,
            }),
        }
    }

    pub fn with_attr(mut self, local: &str, value: impl Into<String>) -> Self {
        self.set_attr(local, value);
        self
    }

    pub fn remove_attr(&mut self, local: &str) -> Option<String> {
        let index = self
            .attributes
            .iter()
            .position(|a| a.name.namespace.is_none() && a.name.local == local)?;
        Some(self.attributes.remove(index).value)
    }

    pub fn push(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.push(child);
        self
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// Removes and returns all element children, dropping text and comments.
    pub fn take_elements(&mut self) -> Vec<Element> {
        std::mem::take(&mut self.children)
            .into_iter()
            .filter_map(|node| match node {
                Node::Element(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    /// Removes the `index`-th element child (counting elements only).
    pub fn remove_element(&mut self, index: usize) -> Option<Element> {
        let position = self
            .children
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n, Node::Element(_)))
            .nth(index)
            .map(|(i, _)| i)?;
        match self.children.remove(position) {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Removes every child, keeping attributes and namespace declarations.
    pub fn clear_children(&mut self) {
        self.children.clear();
    }
}
