//! Unit-aware length values for label layout.
//!
//! Lengths keep the unit they were written in, so values read from a template
//! are written back the same way. Arithmetic between mismatched units falls
//! back to pixels.

pub mod error;
pub mod length;
pub mod parser;

pub use error::UnitError;
pub use length::{AreaDimension, LengthDimension, LengthUnit, PX_PER_INCH};
pub use parser::parse_length;
