//! Splits a template document into directive scripts, a static skeleton and the
//! graphical fragments instantiated per label.
use log::debug;
use svglabel_svg::{Element, Node, is_graphics, is_group, is_text_container, script_text_of};
use svglabel_units::{AreaDimension, LengthDimension};

use crate::config::Markers;
use crate::error::TemplateError;

/// The script sources found in a document, markers stripped, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directives {
    pub init: String,
    pub rows: Vec<String>,
    pub ends: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectiveKind {
    Init,
    Row,
    End,
}

fn classify<'t>(text: &'t str, markers: &Markers) -> Option<(DirectiveKind, &'t str)> {
    let text = text.trim_start();
    [
        (DirectiveKind::Init, &markers.init),
        (DirectiveKind::Row, &markers.row),
        (DirectiveKind::End, &markers.end),
    ]
    .into_iter()
    .find_map(|(kind, marker)| text.strip_prefix(marker.as_str()).map(|code| (kind, code)))
}

/// Removes directive text containers from `element` and the groups below it,
/// recording their scripts.
fn collect(element: &mut Element, markers: &Markers, found: &mut Vec<(DirectiveKind, String)>) {
    for node in std::mem::take(&mut element.children) {
        let mut child = match node {
            Node::Element(child) => child,
            other => {
                element.children.push(other);
                continue;
            }
        };
        if is_text_container(&child) {
            let text = script_text_of(&child);
            if let Some((kind, code)) = classify(&text, markers) {
                debug!("Found {:?} directive", kind);
                found.push((kind, code.to_string()));
                continue;
            }
        } else if is_group(&child) {
            collect(&mut child, markers, found);
        }
        element.children.push(Node::Element(child));
    }
}

/// Removes every directive block from the document and returns their scripts.
///
/// Exactly one init block is required.
pub fn extract_directives(root: &mut Element, markers: &Markers) -> Result<Directives, TemplateError> {
    let mut found = Vec::new();
    collect(root, markers, &mut found);

    let mut directives = Directives::default();
    let mut inits = Vec::new();
    for (kind, code) in found {
        match kind {
            DirectiveKind::Init => inits.push(code),
            DirectiveKind::Row => directives.rows.push(code),
            DirectiveKind::End => directives.ends.push(code),
        }
    }
    directives.init = match <[String; 1]>::try_from(inits) {
        Ok([init]) => init,
        Err(inits) if inits.is_empty() => return Err(TemplateError::MissingInitBlock(markers.init.clone())),
        Err(inits) => {
            return Err(TemplateError::MultipleInitBlocks {
                marker: markers.init.clone(),
                count: inits.len(),
            });
        }
    };
    Ok(directives)
}

/// A document with its directives removed, split for instantiation.
#[derive(Debug, Clone)]
pub struct SplitDocument {
    /// The root with only its non-graphical children.
    pub skeleton: Element,
    /// Top-level graphical elements, in document order.
    pub fragments: Vec<Element>,
    /// The declared width and height.
    pub size: AreaDimension,
    /// User units per pixel on each axis.
    pub view_box_scale: (f64, f64),
}

fn dimension(root: &Element, name: &'static str) -> Result<LengthDimension, TemplateError> {
    let value = root.attr(name).ok_or(TemplateError::MissingDimension(name))?;
    Ok(value.parse()?)
}

/// The ratio of viewBox size to declared size. Only a zero viewBox origin is supported.
pub fn view_box_scale(root: &Element, size: AreaDimension) -> Result<(f64, f64), TemplateError> {
    let Some(view_box) = root.attr("viewBox") else {
        return Ok((1.0, 1.0));
    };
    let numbers: Vec<f64> = view_box
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|_| TemplateError::ViewBox(view_box.to_string()))?;
    match numbers.as_slice() {
        [x, y, width, height] if *x == 0.0 && *y == 0.0 => {
            Ok((width / size.0.to_px(), height / size.1.to_px()))
        }
        _ => Err(TemplateError::ViewBox(view_box.to_string())),
    }
}

/// Reads the document size and moves the graphical top-level children into fragments.
pub fn partition(mut root: Element) -> Result<SplitDocument, TemplateError> {
    let size = (dimension(&root, "width")?, dimension(&root, "height")?);
    let view_box_scale = view_box_scale(&root, size)?;

    let mut fragments = Vec::new();
    for node in std::mem::take(&mut root.children) {
        match node {
            Node::Element(element) if is_graphics(&element) => fragments.push(element),
            other => root.children.push(other),
        }
    }
    debug!("Split template into {} fragments", fragments.len());
    Ok(SplitDocument {
        skeleton: root,
        fragments,
        size,
        view_box_scale,
    })
}
