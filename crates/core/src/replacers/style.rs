//! Style overrides on a group's contents.
use svglabel_svg::{Element, is_text_container};

use crate::error::TemplateError;
use crate::render::RenderContext;
use crate::replacer::GroupReplacer;

/// Sets one `style` property on each element of the group.
#[derive(Debug, Clone)]
pub struct StyleModifier {
    pub property: String,
    pub value: String,
    /// Only touch text containers, leaving shapes alone.
    pub text_only: bool,
}

impl StyleModifier {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            text_only: false,
        }
    }

    pub fn fill(color: impl Into<String>) -> Self {
        Self::new("fill", color)
    }

    pub fn stroke(color: impl Into<String>) -> Self {
        Self::new("stroke", color)
    }

    pub fn text_color(color: impl Into<String>) -> Self {
        Self {
            text_only: true,
            ..Self::fill(color)
        }
    }

    /// Drops any existing entry for the property and appends the new one.
    fn restyle(&self, style: Option<&str>) -> String {
        let prefix = format!("{}:", self.property);
        let mut entries: Vec<&str> = style
            .unwrap_or_default()
            .split(';')
            .filter(|entry| !entry.trim().is_empty() && !entry.trim_start().starts_with(&prefix))
            .collect();
        let new_entry = format!("{}{}", prefix, self.value);
        entries.push(&new_entry);
        entries.join(";")
    }
}

impl GroupReplacer for StyleModifier {
    fn name(&self) -> &'static str {
        if self.text_only { "TextColor" } else { "StyleModifier" }
    }

    fn process_group(
        &self,
        _ctx: &RenderContext<'_>,
        mut elements: Vec<Element>,
    ) -> Result<Vec<Element>, TemplateError> {
        for element in elements
            .iter_mut()
            .filter(|e| !self.text_only || is_text_container(e))
        {
            let style = self.restyle(element.attr("style"));
            element.set_attr("style", style);
        }
        Ok(elements)
    }
}
