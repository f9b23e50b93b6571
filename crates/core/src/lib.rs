//! # svglabel-core
//!
//! The label template engine:
//! - **splitter**: separates directive scripts, the static skeleton and the
//!   per-label graphical fragments of a template document
//! - **render**: instantiates fragments for one row, dispatching command blocks
//!   to replacers and interpolating text
//! - **replacer** / **replacers**: the replacer protocol and the built-in
//!   barcodes, embedded documents and style modifiers
//! - **sheet**: page geometry and label tiling
//! - **template**: the loaded template and its row, page and end entry points
//!
//! Script evaluation comes from `svglabel-script`; the label vocabulary
//! (`LabelSheet`, `Code128`, ...) is registered by [`builtins::register`].

pub mod builtins;
pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod render;
pub mod replacer;
pub mod replacers;
pub mod row;
pub mod sheet;
pub mod splitter;
pub mod template;

pub use config::Markers;
pub use error::TemplateError;
pub use geometry::{Align, Scaling};
pub use host::{LabelScope, LabelValue, ScriptValue, prelude};
pub use render::RenderContext;
pub use replacer::{GroupReplacer, RectArea, RectReplacer, Replacer};
pub use replacers::{MatrixEncoder, MatrixEncoders, ModuleMatrix};
pub use row::Row;
pub use sheet::LabelSheet;
pub use template::{Template, TemplateBuilder};

// Re-export the foundation crates
pub use svglabel_script as script;
pub use svglabel_svg as svg;
pub use svglabel_units as units;
