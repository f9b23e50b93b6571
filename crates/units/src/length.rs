//! Length units and unit-tagged length values.
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use crate::error::UnitError;
use crate::parser::parse_length;

/// Pixels per inch, as defined by CSS and SVG.
pub const PX_PER_INCH: f64 = 96.0;

/// A unit of length that a number can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Inch,
    Millimeter,
    Centimeter,
    Point,
    /// Raw user units. Serialized without a suffix.
    Pixel,
}

impl LengthUnit {
    pub const ALL: [LengthUnit; 5] = [
        LengthUnit::Inch,
        LengthUnit::Millimeter,
        LengthUnit::Centimeter,
        LengthUnit::Point,
        LengthUnit::Pixel,
    ];

    /// Number of pixels in one of this unit.
    pub fn pixels(self) -> f64 {
        match self {
            LengthUnit::Inch => PX_PER_INCH,
            LengthUnit::Millimeter => PX_PER_INCH / 25.4,
            LengthUnit::Centimeter => PX_PER_INCH / 2.5,
            LengthUnit::Point => PX_PER_INCH / 72.0,
            LengthUnit::Pixel => 1.0,
        }
    }

    /// The suffix used when writing a value of this unit into an SVG attribute.
    pub fn svg_suffix(self) -> &'static str {
        match self {
            LengthUnit::Inch => "in",
            LengthUnit::Millimeter => "mm",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Point => "pt",
            LengthUnit::Pixel => "",
        }
    }

    /// Looks up a unit by suffix. Both `""` and `"px"` map to pixels.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "in" => Some(LengthUnit::Inch),
            "mm" => Some(LengthUnit::Millimeter),
            "cm" => Some(LengthUnit::Centimeter),
            "pt" => Some(LengthUnit::Point),
            "" | "px" => Some(LengthUnit::Pixel),
            _ => None,
        }
    }

    /// The name this unit is bound to in label scripts.
    pub fn script_name(self) -> &'static str {
        match self {
            LengthUnit::Inch => "inch",
            LengthUnit::Millimeter => "mm",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Point => "pt",
            LengthUnit::Pixel => "px",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.script_name())
    }
}

/// A numeric length tagged with its unit.
///
/// Equality and ordering compare the pixel value, so `1in == 25.4mm`.
/// Adding or subtracting values of different units falls back to pixels.
#[derive(Debug, Clone, Copy)]
pub struct LengthDimension {
    pub value: f64,
    pub unit: LengthUnit,
}

/// A pair of independent lengths, as (x, y) or (width, height).
pub type AreaDimension = (LengthDimension, LengthDimension);

impl LengthDimension {
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    pub fn px(value: f64) -> Self {
        Self::new(value, LengthUnit::Pixel)
    }

    pub fn zero() -> Self {
        Self::px(0.0)
    }

    pub fn to_px(self) -> f64 {
        self.value * self.unit.pixels()
    }

    /// Re-expresses this length in another unit, keeping its magnitude.
    pub fn to_unit(self, unit: LengthUnit) -> Self {
        if unit == self.unit {
            return self;
        }
        Self::new(self.to_px() / unit.pixels(), unit)
    }

    /// The canonical `<value><suffix>` form used for SVG attributes.
    pub fn to_svg_string(self) -> String {
        self.to_string()
    }
}

impl Default for LengthDimension {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for LengthDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.svg_suffix())
    }
}

impl FromStr for LengthDimension {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_length(s)
    }
}

impl PartialEq for LengthDimension {
    fn eq(&self, other: &Self) -> bool {
        self.to_px() == other.to_px()
    }
}

impl PartialOrd for LengthDimension {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.to_px().partial_cmp(&other.to_px())
    }
}

impl Add for LengthDimension {
    type Output = LengthDimension;

    fn add(self, rhs: Self) -> Self::Output {
        if self.unit != rhs.unit {
            LengthDimension::px(self.to_px() + rhs.to_px())
        } else {
            LengthDimension::new(self.value + rhs.value, self.unit)
        }
    }
}

impl Sub for LengthDimension {
    type Output = LengthDimension;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.unit != rhs.unit {
            LengthDimension::px(self.to_px() - rhs.to_px())
        } else {
            LengthDimension::new(self.value - rhs.value, self.unit)
        }
    }
}

impl Mul<f64> for LengthDimension {
    type Output = LengthDimension;

    fn mul(self, rhs: f64) -> Self::Output {
        LengthDimension::new(self.value * rhs, self.unit)
    }
}

impl Mul<LengthDimension> for f64 {
    type Output = LengthDimension;

    fn mul(self, rhs: LengthDimension) -> Self::Output {
        rhs * self
    }
}

impl Div<f64> for LengthDimension {
    type Output = LengthDimension;

    fn div(self, rhs: f64) -> Self::Output {
        LengthDimension::new(self.value / rhs, self.unit)
    }
}

impl Neg for LengthDimension {
    type Output = LengthDimension;

    fn neg(self) -> Self::Output {
        LengthDimension::new(-self.value, self.unit)
    }
}

impl Sum for LengthDimension {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.reduce(|acc, next| acc + next).unwrap_or_default()
    }
}
