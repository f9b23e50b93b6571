mod common;

use std::fs;

use common::{INIT_2X2, TestResult, instances, label_svg, texts};
use svglabel::{LabelJob, OutputFormat, PipelineError, read_csv};
use svglabel_svg::read_svg_file;

const PART: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20mm" height="10mm"><text>[{label}]</text></svg>"#;

const TABLE: &str = "id,name,part\n0,item0,M3\n1,item1,M4\n2,item2,M5\n3,item3,M6\n4,item4,M8\n";

fn write_fixture(dir: &std::path::Path) -> std::io::Result<()> {
    let body = "<text>{name}</text>\
                <g><text>🏷 Subtemplate('part.svg', {'label': part})</text><rect width=\"20mm\" height=\"10mm\"/></g>";
    fs::write(dir.join("label.svg"), label_svg(INIT_2X2, body))?;
    fs::write(dir.join("part.svg"), PART)?;
    fs::write(dir.join("table.csv"), TABLE)
}

#[test]
fn test_job_writes_numbered_sheets() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir()?;
    write_fixture(dir.path())?;

    let job = LabelJob::builder()
        .with_template_file(dir.path().join("label.svg"))?
        .with_csv(dir.path().join("table.csv"))?
        .with_output(dir.path().join("out.svg"))
        .build()?;
    assert_eq!(job.format(), OutputFormat::Svg);

    let written = job.run()?;
    assert_eq!(written, vec![dir.path().join("out.svg"), dir.path().join("out_2.svg")]);

    let first = read_svg_file(&written[0])?;
    assert_eq!(first.attr("width"), Some("100mm"));
    assert_eq!(instances(&first).len(), 4);
    assert_eq!(texts(&first)[..2], ["item0".to_string(), "[M3]".to_string()]);

    let second = read_svg_file(&written[1])?;
    assert_eq!(texts(&second), vec!["item4".to_string(), "[M8]".to_string()]);
    Ok(())
}

#[test]
fn test_pdf_job_without_converter_keeps_svg() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_fixture(dir.path())?;

    let written = LabelJob::builder()
        .with_template_file(dir.path().join("label.svg"))?
        .with_table(read_csv(dir.path().join("table.csv"))?[..2].to_vec())
        .with_output(dir.path().join("out.pdf"))
        .with_converter(false)
        .build()?
        .run()?;
    assert_eq!(written, vec![dir.path().join("out.svg")]);
    assert!(!dir.path().join("out.pdf").exists());
    Ok(())
}

#[test]
fn test_end_script_failure_is_reported() -> TestResult {
    let dir = tempfile::tempdir()?;
    let body = "<text># svglabel: end\nassert(false, 'done')</text>";
    fs::write(dir.path().join("label.svg"), label_svg(INIT_2X2, body))?;

    let result = LabelJob::builder()
        .with_template_file(dir.path().join("label.svg"))?
        .with_table(Vec::new())
        .with_output(dir.path().join("out.svg"))
        .build()?
        .run();
    assert!(matches!(result, Err(PipelineError::Template(_))));
    assert!(!dir.path().join("out.svg").exists());
    Ok(())
}

#[test]
fn test_missing_template_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = LabelJob::builder().with_template_file(dir.path().join("absent.svg"));
    assert!(matches!(result, Err(PipelineError::Template(_))));
}
