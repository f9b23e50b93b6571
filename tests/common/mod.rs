#![allow(dead_code)]

use svglabel::Row;
use svglabel_svg::{Element, text_of};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A 100mm x 50mm sheet holding a 2 x 2 grid of 50mm x 25mm labels.
pub const INIT_2X2: &str = "# svglabel: init\nsheet = LabelSheet((100mm, 50mm), (0mm, 0mm), (2, 2))";

/// A 50mm x 25mm label template: an init block followed by `body`.
pub fn label_svg(init: &str, body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="50mm" height="25mm"><defs/><text>{}</text>{}</svg>"#,
        init, body
    )
}

pub fn numbered_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| Row::new().with("id", i.to_string()).with("name", format!("item{}", i)))
        .collect()
}

/// The label instances of a rendered sheet document.
pub fn instances(sheet: &Element) -> Vec<&Element> {
    sheet
        .elements()
        .find(|e| e.is("g"))
        .map(|page| page.elements().collect())
        .unwrap_or_default()
}

/// The content of every `text` element below `element`, in document order.
pub fn texts(element: &Element) -> Vec<String> {
    let mut out = Vec::new();
    collect_texts(element, &mut out);
    out
}

fn collect_texts(element: &Element, out: &mut Vec<String>) {
    for child in element.elements() {
        if child.is("text") {
            out.push(text_of(child));
        } else {
            collect_texts(child, out);
        }
    }
}

/// The number of elements named `local` below `element`.
pub fn count_elements(element: &Element, local: &str) -> usize {
    element
        .elements()
        .map(|child| usize::from(child.is(local)) + count_elements(child, local))
        .sum()
}
