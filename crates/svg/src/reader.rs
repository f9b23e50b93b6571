//! Builds an owned [`Element`] tree from a `roxmltree` document.
use std::fs;
use std::path::Path;

use crate::error::SvgError;
use crate::tree::{Attribute, Element, ExpandedName, Namespace, Node};
use crate::XML_NAMESPACE;

/// Parses an XML document and returns its root element.
pub fn parse_document(text: &str) -> Result<Element, SvgError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options)?;
    Ok(convert_element(doc.root_element(), None))
}

/// Parses an XML document and requires its root to be an `svg:svg` element.
pub fn parse_svg(text: &str) -> Result<Element, SvgError> {
    let root = parse_document(text)?;
    if !root.is("svg") {
        return Err(SvgError::NotSvg(root.name.to_string()));
    }
    Ok(root)
}

/// Reads and parses an SVG file.
pub fn read_svg_file(path: &Path) -> Result<Element, SvgError> {
    let text = fs::read_to_string(path)?;
    log::debug!("Parsing SVG from '{}'", path.display());
    parse_svg(&text)
}

fn convert_element(node: roxmltree::Node<'_, '_>, parent: Option<roxmltree::Node<'_, '_>>) -> Element {
    let tag = node.tag_name();
    let mut element = Element::new(ExpandedName::new(tag.namespace(), tag.name()));

    element.namespaces = node
        .namespaces()
        .filter(|ns| ns.uri() != XML_NAMESPACE)
        .filter(|ns| {
            parent.is_none_or(|p| {
                !p.namespaces()
                    .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
            })
        })
        .map(|ns| Namespace {
            prefix: ns.name().map(str::to_string),
            uri: ns.uri().to_string(),
        })
        .collect();

    element.attributes = node
        .attributes()
        .map(|attr| Attribute {
            name: ExpandedName::new(attr.namespace(), attr.name()),
            value: attr.value().to_string(),
        })
        .collect();

    for child in node.children() {
        if child.is_element() {
            element.push(convert_element(child, Some(node)));
        } else if child.is_text() {
            element.push_text(child.text().unwrap_or_default());
        } else if child.is_comment() {
            element
                .children
                .push(Node::Comment(child.text().unwrap_or_default().to_string()));
        }
    }

    element
}
