use svglabel_svg::Element;

use crate::error::TemplateError;
use crate::render::RenderContext;
use crate::replacer::{GroupReplacer, Replacer};

/// Runs several replacers in sequence, each on the previous one's output.
#[derive(Debug, Clone)]
pub struct Compose {
    pub replacers: Vec<Replacer>,
}

impl GroupReplacer for Compose {
    fn name(&self) -> &'static str {
        "Compose"
    }

    fn process_group(
        &self,
        ctx: &RenderContext<'_>,
        elements: Vec<Element>,
    ) -> Result<Vec<Element>, TemplateError> {
        self.replacers
            .iter()
            .try_fold(elements, |elements, replacer| replacer.apply(ctx, elements))
    }
}
