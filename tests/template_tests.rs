mod common;

use common::{INIT_2X2, TestResult, count_elements, instances, label_svg, numbered_rows, texts};
use svglabel::{Row, Template, TemplateError, render_sheets, to_svg_string};
use svglabel::core::script::ScriptError;

#[test]
fn test_row_script_formats_fields() -> TestResult {
    let body = "<text># svglabel: row\nlabel = f\"{row['barcode']} = {description}{row['spaced thing']}\"</text>\
                <text>{label}</text>";
    let template = Template::parse(&label_svg(INIT_2X2, body))?;
    let row = Row::new()
        .with("id", "0")
        .with("barcode", "B00")
        .with("description", "zero")
        .with("spaced thing", "a");

    let instance = template.apply_instance(&row, std::slice::from_ref(&row), 0)?;
    assert_eq!(texts(&instance), vec!["B00 = zeroa".to_string()]);
    Ok(())
}

#[test]
fn test_page_capacity() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();
    let template = Template::parse(&label_svg(INIT_2X2, "<text>{name}</text>"))?;
    let table = numbered_rows(5);

    assert!(matches!(
        template.apply_page(&table),
        Err(TemplateError::PageOverflow { capacity: 4, rows: 5 })
    ));

    let sheets = render_sheets(&template, &table)?;
    assert_eq!(sheets.len(), 2);
    assert_eq!(instances(&sheets[0]).len(), 4);
    assert_eq!(texts(&sheets[1]), vec!["item4".to_string()]);
    assert_eq!(sheets[1].attr("width"), Some("100mm"));
    Ok(())
}

#[test]
fn test_flip_reverses_columns_only() -> TestResult {
    let flipped_init = "# svglabel: init\nsheet = LabelSheet((100mm, 50mm), (0mm, 0mm), (2, 2), flip_x=true)";
    let plain = Template::parse(&label_svg(INIT_2X2, "<text>{name}</text>"))?;
    let flipped = Template::parse(&label_svg(flipped_init, "<text>{name}</text>"))?;
    let table = numbered_rows(4);

    let plain_page = plain.apply_page(&table)?;
    let flipped_page = flipped.apply_page(&table)?;
    let transforms = |page: &svglabel_svg::Element| -> Vec<String> {
        page.elements()
            .map(|i| i.attr("transform").unwrap_or_default().to_string())
            .collect()
    };
    let plain_slots = transforms(&plain_page);
    let flipped_slots = transforms(&flipped_page);

    assert_eq!(flipped_slots[0], plain_slots[1]);
    assert_eq!(flipped_slots[1], plain_slots[0]);
    assert_eq!(flipped_slots[2], plain_slots[3]);
    assert_eq!(flipped_slots[3], plain_slots[2]);
    Ok(())
}

#[test]
fn test_rendering_is_deterministic() -> TestResult {
    let body = "<g><text>🏷 Code128(id, 0.25mm)</text><rect x=\"1mm\" y=\"1mm\" width=\"40mm\" height=\"10mm\"/></g>\
                <text>{upper(name)}</text>";
    let source = label_svg(INIT_2X2, body);
    let table = numbered_rows(3);

    let first = to_svg_string(&Template::parse(&source)?.render_sheet(&table)?)?;
    let second = to_svg_string(&Template::parse(&source)?.render_sheet(&table)?)?;
    assert_eq!(first, second);
    assert!(first.contains("ITEM2"));
    Ok(())
}

#[test]
fn test_barcode_fills_rect() -> TestResult {
    let body = "<g><text>🏷 Code128(barcode, 0.4mm)</text><rect x=\"2mm\" y=\"2mm\" width=\"40mm\" height=\"10mm\"/></g>";
    let template = Template::parse(&label_svg(INIT_2X2, body))?;
    let row = Row::new().with("barcode", "B00");

    let instance = template.apply_instance(&row, std::slice::from_ref(&row), 0)?;
    // start, three data symbols and the checksum, then the stop pattern
    assert_eq!(count_elements(&instance, "rect"), 5 * 3 + 4);
    assert!(texts(&instance).is_empty());
    Ok(())
}

#[test]
fn test_barcode_overflow() -> TestResult {
    // 88 modules of 0.5mm do not fit in 40mm
    let body = "<g><text>🏷 Code128(barcode, 0.5mm)</text><rect width=\"40mm\" height=\"10mm\"/></g>";
    let template = Template::parse(&label_svg(INIT_2X2, body))?;
    let row = Row::new().with("barcode", "B00");

    let result = template.apply_page(std::slice::from_ref(&row));
    assert!(matches!(result, Err(TemplateError::Overflow(_))));
    Ok(())
}

#[test]
fn test_ambiguous_command() -> TestResult {
    let body = "<g><text>🏷 Hide(false)</text><text>🏷 Hide(false)</text><rect width=\"1\" height=\"1\"/></g>";
    let template = Template::parse(&label_svg(INIT_2X2, body))?;
    let result = template.apply_page(&numbered_rows(1));
    assert!(matches!(result, Err(TemplateError::AmbiguousCommand(2))));
    Ok(())
}

#[test]
fn test_command_must_be_replacer() -> TestResult {
    let body = "<g><text>🏷 name</text><rect width=\"1\" height=\"1\"/></g>";
    let template = Template::parse(&label_svg(INIT_2X2, body))?;
    let result = template.apply_page(&numbered_rows(1));
    assert!(matches!(result, Err(TemplateError::ReplacerType { got, .. }) if got == "str"));
    Ok(())
}

#[test]
fn test_rect_replacer_needs_single_rect() -> TestResult {
    let body = "<g><text>🏷 Code128(name, 0.1mm)</text><rect width=\"1\" height=\"1\"/><circle r=\"1\"/></g>";
    let template = Template::parse(&label_svg(INIT_2X2, body))?;
    let result = template.apply_page(&numbered_rows(1));
    assert!(matches!(
        result,
        Err(TemplateError::ExpectedSingleRect { replacer, got }) if replacer == "Code128" && got == ["rect", "circle"]
    ));
    Ok(())
}

#[test]
fn test_hide_by_field() -> TestResult {
    let body = "<g><text>🏷 Hide(name == 'item1')</text><text>{name}</text></g>";
    let template = Template::parse(&label_svg(INIT_2X2, body))?;
    let page = template.apply_page(&numbered_rows(3))?;
    assert_eq!(texts(&page), vec!["item0".to_string(), "item2".to_string()]);
    Ok(())
}

#[test]
fn test_init_block_count() {
    let missing = r#"<svg xmlns="http://www.w3.org/2000/svg" width="50mm" height="25mm"><text>hello</text></svg>"#;
    assert!(matches!(Template::parse(missing), Err(TemplateError::MissingInitBlock(_))));

    let duplicated = label_svg(INIT_2X2, &format!("<g><text>{}</text></g>", INIT_2X2));
    assert!(matches!(
        Template::parse(&duplicated),
        Err(TemplateError::MultipleInitBlocks { count: 2, .. })
    ));
}

#[test]
fn test_missing_sheet() {
    let result = Template::parse(&label_svg("# svglabel: init\npage = 1", ""));
    assert!(matches!(result, Err(TemplateError::MissingSheet)));
}

#[test]
fn test_missing_width() {
    let source = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" height="25mm"><text>{}</text></svg>"#,
        INIT_2X2
    );
    assert!(matches!(
        Template::parse(&source),
        Err(TemplateError::MissingDimension("width"))
    ));
}

#[test]
fn test_row_assertion_aborts_page() -> TestResult {
    let body = "<text># svglabel: row\nassert(id != '1', 'row 1 rejected')</text><text>{name}</text>";
    let template = Template::parse(&label_svg(INIT_2X2, body))?;
    let result = template.apply_page(&numbered_rows(2));
    assert!(matches!(
        result,
        Err(TemplateError::Script(ScriptError::Assertion(message))) if message == "row 1 rejected"
    ));
    Ok(())
}

#[test]
fn test_end_script_sees_all_pages() -> TestResult {
    let init = format!("{}\nseen = []", INIT_2X2);
    let body = "<text># svglabel: row\nappend(seen, name)\nlocal = 1</text>\
                <text># svglabel: end\nassert(len(seen) == 6, 'saw ' + str(len(seen)))</text>";
    let template = Template::parse(&label_svg(&init, body))?;

    let sheets = render_sheets(&template, &numbered_rows(6))?;
    assert_eq!(sheets.len(), 2);
    assert!(template.global("local").is_none());
    template.run_end()?;
    Ok(())
}

#[test]
fn test_matrix_codes_need_no_setup() -> TestResult {
    let body = "<g><text>🏷 QrCode(name, 0.5mm)</text><rect width=\"40mm\" height=\"20mm\"/></g>\
                <g><text>🏷 DataMatrix(name, 0.5mm)</text><rect width=\"40mm\" height=\"20mm\"/></g>";
    let template = Template::parse(&label_svg(INIT_2X2, body))?;
    let page = template.apply_page(&numbered_rows(1))?;
    assert_eq!(count_elements(&page, "path"), 2);
    assert_eq!(count_elements(&page, "rect"), 0);
    Ok(())
}

#[test]
fn test_oversized_script_result_is_an_error() -> TestResult {
    let body = "<text># svglabel: row\nx = 'a' * 100000000000000000000</text><text>{name}</text>";
    let template = Template::parse(&label_svg(INIT_2X2, body))?;
    let result = template.apply_page(&numbered_rows(1));
    assert!(matches!(result, Err(TemplateError::Script(ScriptError::TypeError(_)))));
    Ok(())
}

#[test]
fn test_oversized_grid_is_rejected_at_load() {
    let init = "# svglabel: init\nsheet = LabelSheet((100mm, 50mm), (0mm, 0mm), (10000000000, 10000000000))";
    let result = Template::parse(&label_svg(init, ""));
    assert!(matches!(
        result,
        Err(TemplateError::Script(ScriptError::Argument { function, .. })) if function == "LabelSheet"
    ));
}
