//! # svglabel
//!
//! Batch label generation: loads an annotated SVG template, fills it from a CSV
//! table, and writes one sheet per page of labels, optionally converting the
//! sheets to PDF through Inkscape.
//!
//! The template engine itself lives in `svglabel-core`; this crate is the glue
//! around it:
//! - **table**: CSV input
//! - **pipeline**: page chunking and sheet output
//! - **export**: the Inkscape shell converter

pub mod error;
pub mod export;
pub mod pipeline;
pub mod table;

pub use error::PipelineError;
pub use export::InkscapeConverter;
pub use pipeline::{LabelJob, LabelJobBuilder, OutputFormat, render_sheets, sheet_path};
pub use table::{read_csv, read_csv_from};

// Re-export the engine
pub use svglabel_core as core;
pub use svglabel_core::{Markers, Row, Template, TemplateBuilder, TemplateError};
pub use svglabel_svg::{to_svg_string, write_document};
