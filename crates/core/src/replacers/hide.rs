use svglabel_svg::Element;

use crate::error::TemplateError;
use crate::render::RenderContext;
use crate::replacer::GroupReplacer;

/// Removes the group's contents when `hidden` is set.
#[derive(Debug, Clone)]
pub struct Hide {
    pub hidden: bool,
}

impl GroupReplacer for Hide {
    fn name(&self) -> &'static str {
        "Hide"
    }

    fn process_group(
        &self,
        _ctx: &RenderContext<'_>,
        elements: Vec<Element>,
    ) -> Result<Vec<Element>, TemplateError> {
        if self.hidden {
            Ok(Vec::new())
        } else {
            Ok(elements)
        }
    }
}
