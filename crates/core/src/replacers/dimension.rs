//! Overrides length attributes on a group's contents.
use svglabel_svg::Element;
use svglabel_units::LengthDimension;

use crate::error::TemplateError;
use crate::geometry::px_string;
use crate::render::RenderContext;
use crate::replacer::GroupReplacer;

/// Sets each named attribute, in pixels, on every element of the group.
/// Every element must already carry every attribute.
#[derive(Debug, Clone)]
pub struct DimensionModifier {
    pub attributes: Vec<(String, LengthDimension)>,
}

impl GroupReplacer for DimensionModifier {
    fn name(&self) -> &'static str {
        "DimensionModifier"
    }

    fn process_group(
        &self,
        _ctx: &RenderContext<'_>,
        mut elements: Vec<Element>,
    ) -> Result<Vec<Element>, TemplateError> {
        for element in &mut elements {
            for (name, value) in &self.attributes {
                if !element.has_attr(name) {
                    return Err(TemplateError::MissingAttribute {
                        element: element.name.local.clone(),
                        attribute: name.clone(),
                    });
                }
                element.set_attr(name, px_string(value.to_px()));
            }
        }
        Ok(elements)
    }
}
