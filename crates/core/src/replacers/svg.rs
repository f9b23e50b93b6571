//! Embeds an external SVG file in a rect area.
use std::path::{Path, PathBuf};

use svglabel_svg::{Element, read_svg_file};
use svglabel_units::{AreaDimension, LengthDimension};

use crate::error::TemplateError;
use crate::geometry::{Align, Scaling, place};
use crate::render::RenderContext;
use crate::replacer::{RectArea, RectReplacer};

/// A loaded SVG document and its declared size.
#[derive(Debug, Clone)]
pub struct LoadedSvg {
    pub path: PathBuf,
    pub root: Element,
    pub size: AreaDimension,
}

impl LoadedSvg {
    /// Reads `path`, which must be an `svg` document declaring `width` and `height`.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let root = read_svg_file(path).map_err(|source| TemplateError::Resource {
            path: path.to_path_buf(),
            source,
        })?;
        let dimension = |name: &str| -> Result<LengthDimension, TemplateError> {
            let value = root.attr(name).ok_or_else(|| TemplateError::MissingAttribute {
                element: format!("svg in {}", path.display()),
                attribute: name.to_string(),
            })?;
            Ok(value.parse()?)
        };
        let size = (dimension("width")?, dimension("height")?);
        Ok(Self {
            path: path.to_path_buf(),
            root,
            size,
        })
    }

    /// The directory relative paths inside this document resolve against.
    pub fn base_dir(&self) -> PathBuf {
        self.path.parent().map(Path::to_path_buf).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct SvgImage {
    pub filename: String,
    pub scaling: Scaling,
    pub align: Align,
}

impl RectReplacer for SvgImage {
    fn name(&self) -> &'static str {
        "Svg"
    }

    fn process_rect(&self, ctx: &RenderContext<'_>, rect: &RectArea) -> Result<Vec<Element>, TemplateError> {
        let loaded = LoadedSvg::load(&ctx.resolve(&self.filename))?;
        Ok(vec![place(
            loaded.root,
            loaded.size,
            rect.origin(),
            rect.size(),
            self.scaling,
            self.align,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Markers;
    use crate::replacers::matrix::MatrixEncoders;
    use std::fs;
    use svglabel_script::Interpreter;

    const LOGO: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="5"><rect width="10" height="5"/></svg>"#;

    fn render(dir: &Path, image: &SvgImage) -> Result<Vec<Element>, TemplateError> {
        let interpreter = Interpreter::default();
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
            width: LengthDimension::px(40.0),
            height: LengthDimension::px(10.0),
            element: Element::svg("rect"),
        };
        image.process_rect(&ctx, &area)
    }

    #[test]
    fn test_fit_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("logo.svg"), LOGO).unwrap();
        let image = SvgImage {
            filename: "logo.svg".to_string(),
            scaling: Scaling::Fit,
            align: Align::Center,
        };
        let out = render(dir.path(), &image).unwrap();
        // scale 2 makes it 20x10, centered in 40x10
        assert_eq!(out[0].attr("transform"), Some("translate(10, 0) scale(2)"));
        assert!(out[0].elements().next().unwrap().is("svg"));
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = SvgImage {
            filename: "missing.svg".to_string(),
            scaling: Scaling::None,
            align: Align::Center,
        };
        assert!(matches!(render(dir.path(), &image), Err(TemplateError::Resource { .. })));
    }

    #[test]
    fn test_loaded_svg_requires_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.svg");
        fs::write(&path, r#"<svg xmlns="http://www.w3.org/2000/svg" width="3"/>"#).unwrap();
        let result = LoadedSvg::load(&path);
        assert!(matches!(
            result,
            Err(TemplateError::MissingAttribute { attribute, .. }) if attribute == "height"
        ));
    }
}
