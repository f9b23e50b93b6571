//! A small mutable SVG document model.
//!
//! Documents are parsed with `roxmltree` into an owned [`Element`] tree, rewritten
//! in place, and written back out with `quick-xml`.

pub mod error;
pub mod reader;
pub mod text;
pub mod tree;
pub mod writer;

pub use error::SvgError;
pub use reader::{parse_document, parse_svg, read_svg_file};
pub use text::{
    is_graphics, is_group, is_text_container, is_text_inner, script_text_of, text_of,
    visit_groups_mut,
};
pub use tree::{Attribute, Element, ExpandedName, Namespace, Node};
pub use writer::{to_fragment_string, to_svg_string, write_document};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const INKSCAPE_NAMESPACE: &str = "http://www.inkscape.org/namespaces/inkscape";
pub const SODIPODI_NAMESPACE: &str = "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd";
