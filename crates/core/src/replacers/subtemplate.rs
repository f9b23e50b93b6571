//! Renders another SVG file as a label instance inside a rect area.
use svglabel_script::Value;
use svglabel_svg::Element;
use svglabel_units::{AreaDimension, LengthDimension};

use crate::error::TemplateError;
use crate::geometry::{Align, Scaling, place};
use crate::host::{LabelScope, ScriptValue, prelude};
use crate::render::RenderContext;
use crate::replacer::{RectArea, RectReplacer};
use crate::replacers::svg::LoadedSvg;

/// Variables bound in a subtemplate instance, in addition to the prelude.
pub type Env = Vec<(String, ScriptValue)>;

fn instance_scope(env: &Env, area: AreaDimension) -> LabelScope {
    let mut scope = prelude();
    scope.set("_area_width", Value::Length(area.0));
    scope.set("_area_height", Value::Length(area.1));
    for (name, value) in env {
        scope.set(name.clone(), value.clone());
    }
    scope
}

/// Renders a copy of the loaded document, resolving its own resources next to it.
fn render_instance(
    ctx: &RenderContext<'_>,
    loaded: &LoadedSvg,
    scope: &LabelScope,
) -> Result<Element, TemplateError> {
    let mut root = loaded.root.clone();
    ctx.with_base_dir(loaded.base_dir()).render_in_place(&mut root, scope)?;
    Ok(root)
}

#[derive(Debug, Clone)]
pub struct Subtemplate {
    /// `None` leaves the area empty.
    pub filename: Option<String>,
    pub env: Env,
    pub scaling: Scaling,
    pub align: Align,
}

impl RectReplacer for Subtemplate {
    fn name(&self) -> &'static str {
        "Subtemplate"
    }

    fn process_rect(&self, ctx: &RenderContext<'_>, rect: &RectArea) -> Result<Vec<Element>, TemplateError> {
        let Some(filename) = &self.filename else {
            return Ok(Vec::new());
        };
        let loaded = LoadedSvg::load(&ctx.resolve(filename))?;
        let scope = instance_scope(&self.env, rect.size());
        let instance = render_instance(ctx, &loaded, &scope)?;
        Ok(vec![place(
            instance,
            loaded.size,
            rect.origin(),
            rect.size(),
            self.scaling,
            self.align,
        )])
    }
}

/// Several instances of one subtemplate along an axis of the area.
#[derive(Debug, Clone)]
pub struct SubtemplateArray {
    pub filename: Option<String>,
    /// Each element's position as a fraction of the area along the array axis, and its variables.
    pub elements: Vec<(f64, Env)>,
    pub vertical: bool,
    pub scaling: Scaling,
    pub align: Align,
}

impl SubtemplateArray {
    /// The slot of the element at `position`: a line across the area with no extent
    /// along the array axis.
    fn slot(&self, rect: &RectArea, position: f64) -> (AreaDimension, AreaDimension) {
        if self.vertical {
            (
                (rect.x, rect.y + rect.height * position),
                (rect.width, LengthDimension::zero()),
            )
        } else {
            (
                (rect.x + rect.width * position, rect.y),
                (LengthDimension::zero(), rect.height),
            )
        }
    }
}

impl RectReplacer for SubtemplateArray {
    fn name(&self) -> &'static str {
        "SubtemplateArray"
    }

    fn process_rect(&self, ctx: &RenderContext<'_>, rect: &RectArea) -> Result<Vec<Element>, TemplateError> {
        let Some(filename) = &self.filename else {
            return Ok(Vec::new());
        };
        let loaded = LoadedSvg::load(&ctx.resolve(filename))?;

        self.elements
            .iter()
            .map(|(position, env)| {
                let (origin, area) = self.slot(rect, *position);
                let scope = instance_scope(env, rect.size());
                let instance = render_instance(ctx, &loaded, &scope)?;
                Ok(place(instance, loaded.size, origin, area, self.scaling, self.align))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;
    use crate::config::Markers;
    use crate::replacers::matrix::MatrixEncoders;
    use std::fs;
    use std::path::Path;
    use svglabel_script::{FunctionRegistry, Interpreter};
    use svglabel_svg::text_of;

    const PART: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><text>{label}:{_area_height}</text></svg>"#;

    fn run(dir: &Path, replacer: &dyn RectReplacer) -> Result<Vec<Element>, TemplateError> {
        let mut functions = FunctionRegistry::default();
        builtins::register(&mut functions);
        let interpreter = Interpreter::new(functions);
        let markers = Markers::default();
        let encoders = MatrixEncoders::default();
        let ctx = RenderContext {
            interpreter: &interpreter,
            markers: &markers,
            encoders: &encoders,
            base_dir: dir.to_path_buf(),
        };
        let area = RectArea {
            x: LengthDimension::px(0.0),
            y: LengthDimension::px(0.0),
            width: LengthDimension::px(100.0),
            height: LengthDimension::px(10.0),
            element: Element::svg("rect"),
        };
        replacer.process_rect(&ctx, &area)
    }

    fn env(label: &str) -> Env {
        vec![("label".to_string(), Value::str(label))]
    }

    fn rendered_text(placed: &Element) -> String {
        let svg = placed.elements().next().unwrap();
        text_of(svg.elements().next().unwrap())
    }

    #[test]
    fn test_subtemplate_renders_with_env() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("part.svg"), PART).unwrap();
        let replacer = Subtemplate {
            filename: Some("part.svg".to_string()),
            env: env("M3"),
            scaling: Scaling::Fit,
            align: Align::Center,
        };
        let out = run(dir.path(), &replacer).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].attr("transform"), Some("translate(45, 0) scale(1)"));
        assert_eq!(rendered_text(&out[0]), "M3:10");
    }

    #[test]
    fn test_none_filename_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let replacer = Subtemplate {
            filename: None,
            env: Vec::new(),
            scaling: Scaling::Fit,
            align: Align::Center,
        };
        assert!(run(dir.path(), &replacer).unwrap().is_empty());
    }

    #[test]
    fn test_array_places_elements_along_axis() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("part.svg"), PART).unwrap();
        let replacer = SubtemplateArray {
            filename: Some("part.svg".to_string()),
            elements: vec![(0.0, env("a")), (0.5, env("b"))],
            vertical: false,
            scaling: Scaling::Fit,
            align: Align::Center,
        };
        let out = run(dir.path(), &replacer).unwrap();
        assert_eq!(out.len(), 2);
        // zero-width slots: only the height constrains the scale, centered on the position
        assert_eq!(out[0].attr("transform"), Some("translate(-5, 0) scale(1)"));
        assert_eq!(out[1].attr("transform"), Some("translate(45, 0) scale(1)"));
        assert_eq!(rendered_text(&out[0]), "a:10");
        assert_eq!(rendered_text(&out[1]), "b:10");
    }
}
