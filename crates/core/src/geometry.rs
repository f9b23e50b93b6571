//! Alignment and scaling of generated content inside a target area.
use std::fmt;
use std::str::FromStr;

use svglabel_script::format_number;
use svglabel_svg::Element;
use svglabel_units::{AreaDimension, LengthDimension};

/// Where content sits inside a larger area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    TopLeft,
    Top,
    TopRight,
    Left,
    #[default]
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

/// Position along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn offset(self, content: LengthDimension, area: LengthDimension) -> LengthDimension {
        match self {
            Anchor::Start => content * 0.0,
            Anchor::Middle => (area - content) / 2.0,
            Anchor::End => area - content,
        }
    }
}

impl Align {
    /// Script names, in the order of the variants.
    pub const NAMES: [(&'static str, Align); 9] = [
        ("top_left", Align::TopLeft),
        ("top", Align::Top),
        ("top_right", Align::TopRight),
        ("left", Align::Left),
        ("center", Align::Center),
        ("right", Align::Right),
        ("bottom_left", Align::BottomLeft),
        ("bottom", Align::Bottom),
        ("bottom_right", Align::BottomRight),
    ];

    pub fn name(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, align)| *align == self)
            .map_or("center", |(name, _)| name)
    }

    fn anchors(self) -> (Anchor, Anchor) {
        use Anchor::*;
        match self {
            Align::TopLeft => (Start, Start),
            Align::Top => (Middle, Start),
            Align::TopRight => (End, Start),
            Align::Left => (Start, Middle),
            Align::Center => (Middle, Middle),
            Align::Right => (End, Middle),
            Align::BottomLeft => (Start, End),
            Align::Bottom => (Middle, End),
            Align::BottomRight => (End, End),
        }
    }

    /// The translation that aligns `content` within `area`, where `(0, 0)` puts both
    /// top-left corners together.
    pub fn offset(self, content: AreaDimension, area: AreaDimension) -> AreaDimension {
        let (x, y) = self.anchors();
        (x.offset(content.0, area.0), y.offset(content.1, area.1))
    }
}

impl FromStr for Align {
    type Err = String;

    /// Accepts the script names, plus `bot` as short for `bottom`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let normalized = match normalized.strip_prefix("bot") {
            Some(rest) if !rest.starts_with("tom") => format!("bottom{}", rest),
            _ => normalized,
        };
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, align)| *align)
            .ok_or_else(|| format!("unknown alignment '{}'", s))
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How loaded content is sized into its area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scaling {
    /// Keep the content's own size.
    None,
    /// Scale uniformly to the largest size that fits.
    #[default]
    Fit,
}

impl Scaling {
    pub fn name(self) -> &'static str {
        match self {
            Scaling::None => "none",
            Scaling::Fit => "fit",
        }
    }

    /// The uniform scale factor for `content` placed in `area`. An area axis of zero
    /// extent does not constrain the scale; if neither axis does, the scale is 1.
    pub fn factor(self, content: AreaDimension, area: AreaDimension) -> f64 {
        match self {
            Scaling::None => 1.0,
            Scaling::Fit => {
                let axis = |content: LengthDimension, area: LengthDimension| {
                    (area.to_px() > 0.0 && content.to_px() > 0.0).then(|| area.to_px() / content.to_px())
                };
                match (axis(content.0, area.0), axis(content.1, area.1)) {
                    (Some(x), Some(y)) => x.min(y),
                    (Some(s), None) | (None, Some(s)) => s,
                    (None, None) => 1.0,
                }
            }
        }
    }
}

impl FromStr for Scaling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Scaling::None),
            "fit" => Ok(Scaling::Fit),
            _ => Err(format!("unknown scaling '{}'", s)),
        }
    }
}

/// Formats a pixel value for a `transform` attribute.
pub fn px_string(px: f64) -> String {
    format_number(px)
}

/// Positions `content` (an element of size `content_size`) in the area at `origin`.
///
/// Without scaling, the element's own `x`/`y` are set. When fitting, it is wrapped
/// in a group that translates and scales it.
pub fn place(
    mut content: Element,
    content_size: AreaDimension,
    origin: AreaDimension,
    area: AreaDimension,
    scaling: Scaling,
    align: Align,
) -> Element {
    let scale = scaling.factor(content_size, area);
    let scaled = (content_size.0 * scale, content_size.1 * scale);
    let (dx, dy) = align.offset(scaled, area);
    let x = origin.0 + dx;
    let y = origin.1 + dy;

    match scaling {
        Scaling::None => {
            content.set_attr("x", x.to_svg_string());
            content.set_attr("y", y.to_svg_string());
            content
        }
        Scaling::Fit => Element::svg("g")
            .with_attr(
                "transform",
                format!(
                    "translate({}, {}) scale({})",
                    px_string(x.to_px()),
                    px_string(y.to_px()),
                    px_string(scale)
                ),
            )
            .with_child(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svglabel_units::LengthUnit;

    fn px(v: f64) -> LengthDimension {
        LengthDimension::px(v)
    }

    #[test]
    fn test_align_offsets() {
        let content = (px(10.0), px(4.0));
        let area = (px(30.0), px(10.0));
        assert_eq!(Align::TopLeft.offset(content, area), (px(0.0), px(0.0)));
        assert_eq!(Align::Center.offset(content, area), (px(10.0), px(3.0)));
        assert_eq!(Align::BottomRight.offset(content, area), (px(20.0), px(6.0)));
        assert_eq!(Align::Top.offset(content, area), (px(10.0), px(0.0)));
    }

    #[test]
    fn test_align_names() {
        assert_eq!("center".parse::<Align>(), Ok(Align::Center));
        assert_eq!("BOT_RIGHT".parse::<Align>(), Ok(Align::BottomRight));
        assert_eq!("bottom_left".parse::<Align>(), Ok(Align::BottomLeft));
        assert!("middle".parse::<Align>().is_err());
        for (name, align) in Align::NAMES {
            assert_eq!(align.name(), name);
        }
    }

    #[test]
    fn test_fit_uses_smaller_axis() {
        let content = (px(100.0), px(50.0));
        assert_eq!(Scaling::Fit.factor(content, (px(50.0), px(50.0))), 0.5);
        assert_eq!(Scaling::Fit.factor(content, (px(400.0), px(100.0))), 2.0);
        assert_eq!(Scaling::None.factor(content, (px(50.0), px(50.0))), 1.0);
    }

    #[test]
    fn test_fit_ignores_zero_extent_axis() {
        let content = (px(100.0), px(50.0));
        assert_eq!(Scaling::Fit.factor(content, (px(0.0), px(25.0))), 0.5);
        assert_eq!(Scaling::Fit.factor(content, (px(0.0), px(0.0))), 1.0);
    }

    #[test]
    fn test_place_none_sets_position() {
        let mm = |v| LengthDimension::new(v, LengthUnit::Millimeter);
        let placed = place(
            Element::svg("svg"),
            (mm(10.0), mm(10.0)),
            (mm(5.0), mm(5.0)),
            (mm(20.0), mm(10.0)),
            Scaling::None,
            Align::Center,
        );
        assert_eq!(placed.attr("x"), Some("10mm"));
        assert_eq!(placed.attr("y"), Some("5mm"));
    }

    #[test]
    fn test_place_fit_wraps_in_group() {
        let placed = place(
            Element::svg("svg"),
            (px(10.0), px(10.0)),
            (px(0.0), px(0.0)),
            (px(40.0), px(20.0)),
            Scaling::Fit,
            Align::Center,
        );
        assert!(placed.is("g"));
        assert_eq!(placed.attr("transform"), Some("translate(10, 0) scale(2)"));
        assert_eq!(placed.elements().count(), 1);
    }
}
