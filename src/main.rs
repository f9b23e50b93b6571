use std::path::PathBuf;

use clap::Parser;
use svglabel::{LabelJobBuilder, PipelineError};

/// Fills an SVG label template with the rows of a CSV table.
#[derive(Debug, Parser)]
#[command(name = "svglabel", version, about)]
struct Cli {
    /// The SVG template, carrying an init directive block.
    template: PathBuf,
    /// The CSV table; its header row names the fields.
    data: PathBuf,
    /// The first output sheet; .svg or .pdf. Further sheets are numbered.
    output: PathBuf,
    /// Write the intermediate SVG sheets without converting them to PDF.
    #[arg(long)]
    no_convert: bool,
}

fn main() -> Result<(), PipelineError> {
    env_logger::init();
    let cli = Cli::parse();

    println!("Loading template from {}", cli.template.display());
    let builder = LabelJobBuilder::new().with_template_file(&cli.template)?;

    println!("Loading data from {}", cli.data.display());
    let job = builder
        .with_csv(&cli.data)?
        .with_output(&cli.output)
        .with_converter(!cli.no_convert)
        .build()?;

    println!("Generating {:?} sheets to {}...", job.format(), cli.output.display());
    let written = job.run()?;

    for path in &written {
        println!("Successfully generated {}", path.display());
    }
    if written.is_empty() {
        println!("The table has no rows, no sheets were written");
    }
    Ok(())
}
