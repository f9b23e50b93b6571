//! The group-replacer protocol.
//!
//! A command block in a group evaluates to a [`Replacer`], which receives the
//! group's remaining children and returns the children to put in their place.
//! Rect replacers are the common special case: the group holds a single `rect`
//! that only marks out the area to fill.
use std::fmt;
use std::rc::Rc;

use svglabel_svg::Element;
use svglabel_units::{AreaDimension, LengthDimension};

use crate::error::TemplateError;
use crate::render::RenderContext;

/// Transforms arbitrary group contents.
pub trait GroupReplacer: fmt::Debug {
    /// The name shown in errors, e.g. `StyleModifier`.
    fn name(&self) -> &'static str;

    fn process_group(
        &self,
        ctx: &RenderContext<'_>,
        elements: Vec<Element>,
    ) -> Result<Vec<Element>, TemplateError>;
}

/// Fills the area of a group's single `rect`.
pub trait RectReplacer: fmt::Debug {
    fn name(&self) -> &'static str;

    fn process_rect(
        &self,
        ctx: &RenderContext<'_>,
        rect: &RectArea,
    ) -> Result<Vec<Element>, TemplateError>;
}

/// The geometry of a placeholder `rect`.
#[derive(Debug, Clone)]
pub struct RectArea {
    pub x: LengthDimension,
    pub y: LengthDimension,
    pub width: LengthDimension,
    pub height: LengthDimension,
    pub element: Element,
}

impl RectArea {
    /// Reads the rect's geometry. `x` and `y` default to zero; `width` and
    /// `height` are required.
    pub fn from_element(element: Element) -> Result<Self, TemplateError> {
        let length = |name: &str, default: Option<LengthDimension>| -> Result<LengthDimension, TemplateError> {
            match (element.attr(name), default) {
                (Some(value), _) => Ok(value.parse()?),
                (None, Some(default)) => Ok(default),
                (None, None) => Err(TemplateError::MissingAttribute {
                    element: element.name.local.clone(),
                    attribute: name.to_string(),
                }),
            }
        };
        let x = length("x", Some(LengthDimension::zero()))?;
        let y = length("y", Some(LengthDimension::zero()))?;
        let width = length("width", None)?;
        let height = length("height", None)?;
        Ok(Self {
            x,
            y,
            width,
            height,
            element,
        })
    }

    pub fn origin(&self) -> AreaDimension {
        (self.x, self.y)
    }

    pub fn size(&self) -> AreaDimension {
        (self.width, self.height)
    }
}

/// A replacer produced by a command block.
#[derive(Debug, Clone)]
pub enum Replacer {
    Group(Rc<dyn GroupReplacer>),
    Rect(Rc<dyn RectReplacer>),
}

impl Replacer {
    pub fn group(replacer: impl GroupReplacer + 'static) -> Self {
        Replacer::Group(Rc::new(replacer))
    }

    pub fn rect(replacer: impl RectReplacer + 'static) -> Self {
        Replacer::Rect(Rc::new(replacer))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Replacer::Group(r) => r.name(),
            Replacer::Rect(r) => r.name(),
        }
    }

    /// Runs the replacer on a group's contents (without the command block).
    /// Rect replacers fail unless the contents are exactly one `rect`.
    pub fn apply(
        &self,
        ctx: &RenderContext<'_>,
        elements: Vec<Element>,
    ) -> Result<Vec<Element>, TemplateError> {
        match self {
            Replacer::Group(replacer) => replacer.process_group(ctx, elements),
            Replacer::Rect(replacer) => {
                let shape_error = |elements: &[Element]| TemplateError::ExpectedSingleRect {
                    replacer: replacer.name().to_string(),
                    got: elements.iter().map(|e| e.name.local.clone()).collect(),
                };
                match <[Element; 1]>::try_from(elements) {
                    Ok([element]) if element.is("rect") => {
                        let area = RectArea::from_element(element)?;
                        replacer.process_rect(ctx, &area)
                    }
                    Ok(single) => Err(shape_error(&single)),
                    Err(elements) => Err(shape_error(&elements)),
                }
            }
        }
    }
}

/// Replacers are equal only if they are the same instance.
impl PartialEq for Replacer {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Replacer::Group(a), Replacer::Group(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            (Replacer::Rect(a), Replacer::Rect(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }
}
