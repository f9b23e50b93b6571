//! Built-in replacers.
//!
//! Rect replacers (barcodes, embedded files) fill the area of a placeholder
//! `rect`; group replacers (style and visibility modifiers) rewrite the group's
//! existing contents.

pub mod code128;
pub mod compose;
pub mod dimension;
pub mod encoders;
pub mod hide;
pub mod matrix;
pub mod style;
pub mod subtemplate;
pub mod svg;

pub use code128::Code128;
pub use compose::Compose;
pub use dimension::DimensionModifier;
pub use encoders::{DataMatrixEncoder, QrEncoder};
pub use hide::Hide;
pub use matrix::{MatrixCode, MatrixEncoder, MatrixEncoders, ModuleMatrix, Symbology};
pub use style::StyleModifier;
pub use subtemplate::{Env, Subtemplate, SubtemplateArray};
pub use svg::{LoadedSvg, SvgImage};
