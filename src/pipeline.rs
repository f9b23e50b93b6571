//! Drives a template over a whole table: one sheet per page of rows, written to
//! numbered files and optionally converted to PDF.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use svglabel_core::{Row, Template, TemplateError};
use svglabel_svg::{Element, write_document};

use crate::error::PipelineError;
use crate::export::InkscapeConverter;
use crate::table::read_csv;

/// The sheet file format, inferred from the output extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    /// Written as SVG next to the target, then converted by Inkscape.
    Pdf,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("svg") => Ok(OutputFormat::Svg),
            Some("pdf") => Ok(OutputFormat::Pdf),
            _ => Err(PipelineError::Config(format!(
                "Cannot infer the output format of '{}', expected .svg or .pdf",
                path.display()
            ))),
        }
    }
}

/// The file of the `index`-th sheet (zero-based): the output path itself for the
/// first sheet, then `name_2.ext`, `name_3.ext`, ...
pub fn sheet_path(output: &Path, index: usize) -> PathBuf {
    if index == 0 {
        return output.to_path_buf();
    }
    let stem = output.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!("{}_{}.{}", stem, index + 1, ext.to_string_lossy()),
        None => format!("{}_{}", stem, index + 1),
    };
    output.with_file_name(name)
}

/// Renders the table as sheets of at most `labels_per_sheet` labels each.
/// The last sheet may be partial; an empty table gives no sheets.
pub fn render_sheets(template: &Template, table: &[Row]) -> Result<Vec<Element>, TemplateError> {
    table
        .chunks(template.sheet().labels_per_sheet())
        .map(|page| template.render_sheet(page))
        .collect()
}

/// A builder for creating a [`LabelJob`].
#[derive(Default)]
pub struct LabelJobBuilder {
    template: Option<Template>,
    table: Option<Vec<Row>>,
    output: Option<PathBuf>,
    converter: Option<bool>,
}

impl LabelJobBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }

    /// Loads a template file; its directory becomes the resource base directory.
    pub fn with_template_file(self, path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        Ok(self.with_template(Template::load(path)?))
    }

    pub fn with_table(mut self, table: Vec<Row>) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_csv(self, path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        Ok(self.with_table(read_csv(path)?))
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Whether PDF outputs are converted through Inkscape. Enabled by default;
    /// when disabled, only the intermediate SVG sheets are written.
    pub fn with_converter(mut self, enabled: bool) -> Self {
        self.converter = Some(enabled);
        self
    }

    pub fn build(self) -> Result<LabelJob, PipelineError> {
        let missing = |what: &str| PipelineError::Config(format!("No {} has been configured", what));
        let template = self.template.ok_or_else(|| missing("template"))?;
        let table = self.table.ok_or_else(|| missing("table"))?;
        let output = self.output.ok_or_else(|| missing("output path"))?;
        let format = OutputFormat::from_path(&output)?;
        Ok(LabelJob {
            template,
            table,
            output,
            format,
            convert: format == OutputFormat::Pdf && self.converter.unwrap_or(true),
        })
    }
}

/// A configured batch: template, table and output target.
pub struct LabelJob {
    template: Template,
    table: Vec<Row>,
    output: PathBuf,
    format: OutputFormat,
    convert: bool,
}

impl LabelJob {
    pub fn builder() -> LabelJobBuilder {
        LabelJobBuilder::new()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Writes every sheet, runs the template's end scripts once, and returns the
    /// paths of the files produced, in page order.
    pub fn run(self) -> Result<Vec<PathBuf>, PipelineError> {
        let mut converter = if self.convert {
            Some(InkscapeConverter::start()?)
        } else {
            None
        };

        let mut written = Vec::new();
        for (index, sheet) in render_sheets(&self.template, &self.table)?.iter().enumerate() {
            let target = sheet_path(&self.output, index);
            let svg_path = match self.format {
                OutputFormat::Svg => target.clone(),
                OutputFormat::Pdf => target.with_extension("svg"),
            };
            let mut file = BufWriter::new(File::create(&svg_path)?);
            write_document(sheet, &mut file)?;
            file.flush()?;
            info!("Wrote sheet {} to '{}'", index + 1, svg_path.display());

            match converter.as_mut() {
                Some(converter) => {
                    converter.convert(&svg_path, &target)?;
                    written.push(target);
                }
                None => written.push(svg_path),
            }
        }

        if let Some(mut converter) = converter {
            converter.close()?;
        }
        self.template.run_end()?;
        Ok(written)
    }
}
