//! Tag classification and text helpers shared by the splitter and renderer.
use crate::tree::{Element, Node};

/// Elements that hold text content directly and may carry directives or commands.
pub const TEXT_CONTAINER_TAGS: [&str; 2] = ["text", "flowRoot"];

/// Line and span elements nested inside a text container.
pub const TEXT_INNER_TAGS: [&str; 2] = ["tspan", "flowPara"];

/// Top-level elements that are instantiated per label rather than kept in the skeleton.
pub const GRAPHICS_TAGS: [&str; 13] = [
    "circle", "ellipse", "image", "line", "mesh", "path", "polygon", "polyline", "rect", "text",
    "flowRoot", "use", "g",
];

pub fn is_text_container(element: &Element) -> bool {
    TEXT_CONTAINER_TAGS.iter().any(|tag| element.is(tag))
}

pub fn is_text_inner(element: &Element) -> bool {
    TEXT_INNER_TAGS.iter().any(|tag| element.is(tag))
}

pub fn is_graphics(element: &Element) -> bool {
    GRAPHICS_TAGS.iter().any(|tag| element.is(tag))
}

pub fn is_group(element: &Element) -> bool {
    element.is("g")
}

/// Text before the first child element.
fn leading_text(element: &Element) -> String {
    element
        .children
        .iter()
        .map_while(|node| match node {
            Node::Text(t) => Some(t.as_str()),
            Node::Comment(_) => Some(""),
            Node::Element(_) => None,
        })
        .collect()
}

/// The text of a container: its leading text followed by the text of each nested
/// span or line, concatenated. Text trailing a nested element is not included.
pub fn text_of(element: &Element) -> String {
    let mut text = leading_text(element);
    for child in element.elements().filter(|e| is_text_inner(e)) {
        text.push_str(&text_of(child));
    }
    text
}

/// Like [`text_of`], but each direct line element starts a new line, so scripts typed
/// as several lines in an editor keep their line structure.
pub fn script_text_of(element: &Element) -> String {
    let leading = leading_text(element);
    let mut lines: Vec<String> = Vec::new();
    if !leading.trim().is_empty() {
        lines.push(leading);
    }
    lines.extend(
        element
            .elements()
            .filter(|e| is_text_inner(e))
            .map(text_of),
    );
    lines.join("\n")
}

/// Calls `f` on `element`, then recurses into its `svg:g` children.
///
/// Children are collected after `f` returns, so `f` may restructure the element.
pub fn visit_groups_mut<E, F>(element: &mut Element, f: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Element) -> Result<(), E>,
{
    f(element)?;
    for child in element.elements_mut().filter(|e| is_group(e)) {
        visit_groups_mut(child, f)?;
    }
    Ok(())
}
