//! The instance renderer: command dispatch and text interpolation over a copied
//! template tree.
use std::path::{Path, PathBuf};

use log::debug;
use svglabel_script::{Interpreter, Value, parse_expression};
use svglabel_svg::{Element, Node, is_text_container, is_text_inner, script_text_of, visit_groups_mut};

use crate::config::Markers;
use crate::error::TemplateError;
use crate::host::{LabelScope, LabelValue};
use crate::replacers::matrix::MatrixEncoders;

/// Everything a render pass and its replacers need, borrowed from the template.
#[derive(Clone)]
pub struct RenderContext<'a> {
    pub interpreter: &'a Interpreter<LabelValue>,
    pub markers: &'a Markers,
    pub encoders: &'a MatrixEncoders,
    /// Relative resource paths resolve against this directory.
    pub base_dir: PathBuf,
}

impl<'a> RenderContext<'a> {
    /// The same context, resolving resources against another directory.
    pub fn with_base_dir(&self, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..self.clone()
        }
    }

    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Copies `fragments` into a new `<g>` and renders it for one scope.
    pub fn render_fragments(
        &self,
        fragments: &[Element],
        scope: &LabelScope,
    ) -> Result<Element, TemplateError> {
        let mut instance = Element::svg("g");
        for fragment in fragments {
            instance.push(fragment.clone());
        }
        self.render_in_place(&mut instance, scope)?;
        Ok(instance)
    }

    /// Renders `root` and every group reachable from it through groups.
    pub fn render_in_place(&self, root: &mut Element, scope: &LabelScope) -> Result<(), TemplateError> {
        visit_groups_mut(root, &mut |group: &mut Element| self.render_group(group, scope))
    }

    /// Dispatches the group's command block, if any, then interpolates its text.
    fn render_group(&self, group: &mut Element, scope: &LabelScope) -> Result<(), TemplateError> {
        let commands: Vec<usize> = group
            .elements()
            .enumerate()
            .filter(|(_, e)| is_text_container(e) && self.is_command(e))
            .map(|(i, _)| i)
            .collect();

        match commands.as_slice() {
            [] => {}
            [index] => {
                let Some(command) = group.remove_element(*index) else {
                    return Ok(());
                };
                self.run_command(group, &command, scope)?;
            }
            many => return Err(TemplateError::AmbiguousCommand(many.len())),
        }

        // the replacer's output may contain text too
        for child in group.elements_mut().filter(|e| is_text_container(e)) {
            self.interpolate_text(child, scope)?;
        }
        Ok(())
    }

    fn is_command(&self, element: &Element) -> bool {
        script_text_of(element).starts_with(&self.markers.command)
    }

    fn run_command(
        &self,
        group: &mut Element,
        command: &Element,
        scope: &LabelScope,
    ) -> Result<(), TemplateError> {
        let text = script_text_of(command);
        let marker = self.markers.command.as_str();
        let code = text.trim_start_matches(marker).trim_end_matches(marker).trim();

        let value = self.interpreter.evaluate(&parse_expression(code)?, scope)?;
        let replacer = match value {
            Value::Host(LabelValue::Replacer(replacer)) => replacer,
            other => {
                return Err(TemplateError::ReplacerType {
                    got: other.type_name().to_string(),
                    code: code.to_string(),
                });
            }
        };

        debug!("Applying {} to group {:?}", replacer.name(), group.attr("id"));
        let contents = group.take_elements();
        for element in replacer.apply(self, contents)? {
            group.push(element);
        }
        Ok(())
    }

    /// Interpolates every text node of a text container, including the text
    /// between and after its inner line elements.
    fn interpolate_text(&self, element: &mut Element, scope: &LabelScope) -> Result<(), TemplateError> {
        for node in &mut element.children {
            match node {
                Node::Text(text) => *text = self.interpreter.interpolate(text, scope)?,
                Node::Element(child) if is_text_inner(child) => self.interpolate_text(child, scope)?,
                _ => {}
            }
        }
        Ok(())
    }
}
