//! Serializes an [`Element`] tree with `quick-xml`.
//!
//! Prefixes are chosen from the namespace declarations carried by the tree.
//! Elements built programmatically (or moved out of their original document)
//! get the declarations they need added on the fly.
use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::SvgError;
use crate::tree::{Element, ExpandedName, Namespace, Node};
use crate::{
    INKSCAPE_NAMESPACE, SODIPODI_NAMESPACE, SVG_NAMESPACE, XLINK_NAMESPACE, XML_NAMESPACE,
};

/// Writes `root` as a standalone document, with an XML declaration.
pub fn write_document<W: Write>(root: &Element, out: W) -> Result<(), SvgError> {
    let mut writer = Writer::new(out);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    emit(&mut writer, Event::Text(BytesText::new("\n")))?;
    let mut scope = Vec::new();
    write_element(&mut writer, root, &mut scope)
}

/// Serializes `root` as a standalone document into a string.
pub fn to_svg_string(root: &Element) -> Result<String, SvgError> {
    let mut buf = Vec::new();
    write_document(root, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Serializes a single element without an XML declaration.
pub fn to_fragment_string(element: &Element) -> Result<String, SvgError> {
    let mut buf = Vec::new();
    let mut writer = Writer::new(&mut buf);
    let mut scope = Vec::new();
    write_element(&mut writer, element, &mut scope)?;
    drop(writer);
    Ok(String::from_utf8(buf)?)
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), SvgError> {
    writer
        .write_event(event)
        .map_err(|e| SvgError::Write(e.to_string()))
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    element: &Element,
    scope: &mut Vec<Namespace>,
) -> Result<(), SvgError> {
    let scope_len = scope.len();
    let mut declared: Vec<Namespace> = element.namespaces.clone();
    scope.extend(declared.iter().cloned());

    let tag = qualify(&element.name, true, scope, &mut declared);
    let attr_names: Vec<String> = element
        .attributes
        .iter()
        .map(|a| qualify(&a.name, false, scope, &mut declared))
        .collect();

    let mut start = BytesStart::new(tag.as_str());
    for ns in &declared {
        let key = match &ns.prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        start.push_attribute((key.as_str(), ns.uri.as_str()));
    }
    for (name, attr) in attr_names.iter().zip(&element.attributes) {
        start.push_attribute((name.as_str(), attr.value.as_str()));
    }

    if element.children.is_empty() {
        emit(writer, Event::Empty(start))?;
    } else {
        emit(writer, Event::Start(start))?;
        for child in &element.children {
            match child {
                Node::Element(e) => write_element(writer, e, scope)?,
                Node::Text(text) => emit(writer, Event::Text(BytesText::new(text)))?,
                Node::Comment(text) => {
                    emit(writer, Event::Comment(BytesText::from_escaped(text.as_str())))?
                }
            }
        }
        emit(writer, Event::End(BytesEnd::new(tag.as_str())))?;
    }

    scope.truncate(scope_len);
    Ok(())
}

/// Returns the prefixed name to write for `name`, declaring its namespace if nothing in
/// scope binds it. Attributes never use the default namespace.
fn qualify(
    name: &ExpandedName,
    is_element: bool,
    scope: &mut Vec<Namespace>,
    declared: &mut Vec<Namespace>,
) -> String {
    let Some(uri) = name.namespace.as_deref() else {
        return name.local.clone();
    };
    if uri == XML_NAMESPACE {
        return format!("xml:{}", name.local);
    }

    if let Some(prefix) = lookup_prefix(scope, uri, is_element) {
        return with_prefix(prefix.as_deref(), &name.local);
    }

    let prefix = if is_element && uri == SVG_NAMESPACE && !default_bound(scope) {
        None
    } else {
        Some(preferred_prefix(uri, scope))
    };
    let ns = Namespace {
        prefix: prefix.clone(),
        uri: uri.to_string(),
    };
    scope.push(ns.clone());
    declared.push(ns);
    with_prefix(prefix.as_deref(), &name.local)
}

fn lookup_prefix(scope: &[Namespace], uri: &str, allow_default: bool) -> Option<Option<String>> {
    scope
        .iter()
        .rev()
        .filter(|ns| ns.uri == uri && (allow_default || ns.prefix.is_some()))
        .find(|ns| {
            // the prefix must not be rebound further in
            scope
                .iter()
                .rev()
                .find(|inner| inner.prefix == ns.prefix)
                .is_some_and(|inner| inner.uri == uri)
        })
        .map(|ns| ns.prefix.clone())
}

fn default_bound(scope: &[Namespace]) -> bool {
    scope.iter().any(|ns| ns.prefix.is_none())
}

fn preferred_prefix(uri: &str, scope: &[Namespace]) -> String {
    let known = match uri {
        SVG_NAMESPACE => Some("svg"),
        XLINK_NAMESPACE => Some("xlink"),
        INKSCAPE_NAMESPACE => Some("inkscape"),
        SODIPODI_NAMESPACE => Some("sodipodi"),
        _ => None,
    };
    let taken = |p: &str| scope.iter().any(|ns| ns.prefix.as_deref() == Some(p));
    if let Some(prefix) = known.filter(|p| !taken(p)) {
        return prefix.to_string();
    }
    (0..)
        .map(|i| format!("ns{}", i))
        .find(|p| !taken(p))
        .unwrap_or_default()
}

fn with_prefix(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_svg;

    #[test]
    fn test_round_trip_preserves_prefixes() {
        let source = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="1in" height="1in"><use xlink:href="#a"/><text>a &amp; b</text></svg>"##;
        let root = parse_svg(source).unwrap();
        let written = to_fragment_string(&root).unwrap();
        assert!(written.starts_with("<svg "));
        assert!(written.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
        assert!(written.contains(r#"xmlns:xlink="http://www.w3.org/1999/xlink""#));
        assert!(written.contains(r##"<use xlink:href="#a"/>"##));
        assert!(written.contains("<text>a &amp; b</text>"));
        assert_eq!(parse_svg(&written).unwrap(), root);
    }

    #[test]
    fn test_detached_element_declares_svg_namespace() {
        let group = Element::svg("g").with_child(Element::svg("rect").with_attr("x", "1"));
        let written = to_fragment_string(&group).unwrap();
        assert_eq!(
            written,
            r#"<g xmlns="http://www.w3.org/2000/svg"><rect x="1"/></g>"#
        );
    }

    #[test]
    fn test_detached_namespaced_attribute_gets_prefix() {
        let mut group = Element::svg("g");
        group.attributes.push(crate::tree::Attribute {
            name: ExpandedName::new(Some(INKSCAPE_NAMESPACE), "label"),
            value: "Layer".to_string(),
        });
        let written = to_fragment_string(&group).unwrap();
        assert!(written.contains(r#"xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape""#));
        assert!(written.contains(r#"inkscape:label="Layer""#));
    }

    #[test]
    fn test_document_has_declaration() {
        let root = Element::svg("svg").with_attr("width", "1in");
        let written = to_svg_string(&root).unwrap();
        assert!(written.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(written.ends_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="1in"/>"#));
    }
}
