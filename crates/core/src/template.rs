//! The loaded template: split document, init results, and the per-row and
//! per-page rendering entry points.
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::debug;
use svglabel_script::{
    Bindings, FunctionRegistry, Interpreter, Script, ScriptFunction, Scope, Value, format_number,
    is_identifier, parse_script,
};
use svglabel_svg::{Element, parse_svg, read_svg_file};
use svglabel_units::AreaDimension;

use crate::builtins;
use crate::config::Markers;
use crate::error::TemplateError;
use crate::geometry::px_string;
use crate::host::{LabelScope, LabelValue, ScriptValue, prelude};
use crate::render::RenderContext;
use crate::replacers::{MatrixEncoder, MatrixEncoders};
use crate::row::{Row, table_value};
use crate::sheet::LabelSheet;
use crate::splitter::{extract_directives, partition};

/// Configures and loads a [`Template`].
pub struct TemplateBuilder {
    markers: Markers,
    base_dir: Option<PathBuf>,
    functions: FunctionRegistry<LabelValue>,
    encoders: MatrixEncoders,
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        let mut functions = FunctionRegistry::default();
        builtins::register(&mut functions);
        Self {
            markers: Markers::default(),
            base_dir: None,
            functions,
            encoders: MatrixEncoders::with_defaults(),
        }
    }
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// Directory that relative resource paths resolve against. Defaults to the
    /// template file's directory, or the working directory for parsed sources.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Adds or replaces a script function.
    pub fn with_function(mut self, name: &str, function: ScriptFunction<LabelValue>) -> Self {
        self.functions.register(name, function);
        self
    }

    /// Replaces the encoder used by `QrCode` (`"qr"`) or `DataMatrix` (`"datamatrix"`).
    /// Both have built-in defaults.
    pub fn with_matrix_encoder(mut self, name: &str, encoder: Box<dyn MatrixEncoder>) -> Self {
        self.encoders.register(name, encoder);
        self
    }

    pub fn parse(self, source: &str) -> Result<Template, TemplateError> {
        self.build(parse_svg(source)?)
    }

    pub fn load(mut self, path: impl AsRef<Path>) -> Result<Template, TemplateError> {
        let path = path.as_ref();
        let root = read_svg_file(path).map_err(|source| TemplateError::Resource {
            path: path.to_path_buf(),
            source,
        })?;
        if self.base_dir.is_none() {
            self.base_dir = path.parent().map(Path::to_path_buf);
        }
        self.build(root)
    }

    /// Splits the document and runs its init script.
    pub fn build(self, mut root: Element) -> Result<Template, TemplateError> {
        let directives = extract_directives(&mut root, &self.markers)?;
        let interpreter = Interpreter::new(self.functions);

        let mut init_scope = prelude();
        interpreter.run(&directives.init, &mut init_scope)?;
        let sheet = match init_scope.get("sheet") {
            Some(Value::Host(LabelValue::Sheet(sheet))) => sheet.clone(),
            Some(other) => return Err(TemplateError::SheetType(other.type_name().to_string())),
            None => return Err(TemplateError::MissingSheet),
        };

        let parse_all = |sources: &[String]| -> Result<Vec<Script>, TemplateError> {
            sources
                .iter()
                .map(|source| parse_script(source).map_err(TemplateError::from))
                .collect()
        };
        let row_scripts = parse_all(&directives.rows)?;
        let end_scripts = parse_all(&directives.ends)?;

        let split = partition(root)?;
        debug!(
            "Loaded template: {} row scripts, {} end scripts, {} labels per sheet",
            row_scripts.len(),
            end_scripts.len(),
            sheet.labels_per_sheet()
        );

        Ok(Template {
            skeleton: split.skeleton,
            fragments: split.fragments,
            size: split.size,
            view_box_scale: split.view_box_scale,
            global: init_scope.freeze(),
            row_scripts,
            end_scripts,
            sheet,
            markers: self.markers,
            interpreter,
            encoders: self.encoders,
            base_dir: self.base_dir.unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

/// A label template, ready to render rows. Immutable once built.
pub struct Template {
    skeleton: Element,
    fragments: Vec<Element>,
    size: AreaDimension,
    view_box_scale: (f64, f64),
    global: Rc<Bindings<LabelValue>>,
    row_scripts: Vec<Script>,
    end_scripts: Vec<Script>,
    sheet: LabelSheet,
    markers: Markers,
    interpreter: Interpreter<LabelValue>,
    encoders: MatrixEncoders,
    base_dir: PathBuf,
}

impl Template {
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    /// Parses a template from SVG source with the default configuration.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        TemplateBuilder::default().parse(source)
    }

    /// Loads a template file with the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        TemplateBuilder::default().load(path)
    }

    pub fn sheet(&self) -> &LabelSheet {
        &self.sheet
    }

    /// The label size.
    pub fn size(&self) -> AreaDimension {
        self.size
    }

    pub fn skeleton(&self) -> &Element {
        &self.skeleton
    }

    pub fn fragments(&self) -> &[Element] {
        &self.fragments
    }

    pub fn view_box_scale(&self) -> (f64, f64) {
        self.view_box_scale
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// A global binding made by the init script.
    pub fn global(&self, name: &str) -> Option<&ScriptValue> {
        self.global.get(name)
    }

    pub fn context(&self) -> RenderContext<'_> {
        RenderContext {
            interpreter: &self.interpreter,
            markers: &self.markers,
            encoders: &self.encoders,
            base_dir: self.base_dir.clone(),
        }
    }

    /// An empty sheet document: the skeleton sized to the page.
    pub fn create_sheet(&self) -> Element {
        let mut sheet = self.skeleton.clone();
        let (page_width, page_height) = self.sheet.page();
        if sheet.has_attr("viewBox") {
            let (sx, sy) = self.view_box_scale;
            sheet.set_attr(
                "viewBox",
                format!(
                    "0 0 {} {}",
                    format_number(sx * page_width.to_px()),
                    format_number(sy * page_height.to_px())
                ),
            );
        }
        sheet.set_attr("width", page_width.to_svg_string());
        sheet.set_attr("height", page_height.to_svg_string());
        sheet
    }

    /// Binds the row and runs the row scripts over the global scope.
    fn row_scope(&self, row: &Row, table: &ScriptValue, row_num: usize) -> Result<LabelScope, TemplateError> {
        let mut scope = Scope::over(Rc::clone(&self.global));
        for (name, value) in row.iter().filter(|(name, _)| is_identifier(name)) {
            scope.set(name, Value::str(value));
        }
        scope.set("row", row.to_value());
        scope.set("table", table.clone());
        scope.set("row_num", Value::Number(row_num as f64));
        for script in &self.row_scripts {
            self.interpreter.execute(script, &mut scope)?;
        }
        Ok(scope)
    }

    fn render_row(&self, row: &Row, table: &ScriptValue, row_num: usize) -> Result<Element, TemplateError> {
        let scope = self.row_scope(row, table, row_num)?;
        self.context().render_fragments(&self.fragments, &scope)
    }

    /// Renders one label for `row`, at the template's own origin.
    pub fn apply_instance(&self, row: &Row, table: &[Row], row_num: usize) -> Result<Element, TemplateError> {
        self.render_row(row, &table_value(table), row_num)
    }

    /// Renders one label per row, each moved into its grid slot, as a single group.
    /// `table` and `row_num` seen by row scripts are relative to this page.
    pub fn apply_page(&self, table: &[Row]) -> Result<Element, TemplateError> {
        let capacity = self.sheet.labels_per_sheet();
        if table.len() > capacity {
            return Err(TemplateError::PageOverflow {
                capacity,
                rows: table.len(),
            });
        }

        let table_value = table_value(table);
        let (sx, sy) = self.view_box_scale;
        let mut page = Element::svg("g");
        for (index, row) in table.iter().enumerate() {
            let mut instance = self.render_row(row, &table_value, index)?;
            let (x, y) = self.sheet.offset(self.size, index);
            instance.set_attr(
                "transform",
                format!("translate({}, {})", px_string(x.to_px() * sx), px_string(y.to_px() * sy)),
            );
            page.push(instance);
        }
        debug!("Assembled page of {} labels", table.len());
        Ok(page)
    }

    /// A complete sheet document for up to one page of rows.
    pub fn render_sheet(&self, table: &[Row]) -> Result<Element, TemplateError> {
        let page = self.apply_page(table)?;
        Ok(self.create_sheet().with_child(page))
    }

    /// Runs the end scripts once, after all pages. Consumes the template.
    pub fn run_end(self) -> Result<(), TemplateError> {
        let mut scope = Scope::over(Rc::clone(&self.global));
        for script in &self.end_scripts {
            self.interpreter.execute(script, &mut scope)?;
        }
        debug!("Ran {} end scripts", self.end_scripts.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svglabel_svg::text_of;

    fn template(init: &str, body: &str) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="1in" height="0.5in"><text>{}</text>{}</svg>"#,
            init, body
        )
    }

    const INIT: &str = "# svglabel: init\nsheet = LabelSheet((3in, 1in), (0.5in, 0in), (2, 2))";

    fn rows(n: usize) -> Vec<Row> {
        (0..n).map(|i| Row::new().with("name", format!("n{}", i))).collect()
    }

    #[test]
    fn test_sheet_from_init() {
        let template = Template::parse(&template(INIT, "")).unwrap();
        assert_eq!(template.sheet().labels_per_sheet(), 4);
        assert!(template.fragments().is_empty());
    }

    #[test]
    fn test_missing_and_mistyped_sheet() {
        let missing = Template::parse(&template("# svglabel: init\nx = 1", ""));
        assert!(matches!(missing, Err(TemplateError::MissingSheet)));
        let mistyped = Template::parse(&template("# svglabel: init\nsheet = 1", ""));
        assert!(matches!(mistyped, Err(TemplateError::SheetType(t)) if t == "number"));
    }

    #[test]
    fn test_create_sheet_uses_page_size() {
        let template = Template::parse(&template(INIT, "")).unwrap();
        let sheet = template.create_sheet();
        assert_eq!(sheet.attr("width"), Some("3in"));
        assert_eq!(sheet.attr("height"), Some("1in"));
        assert!(!sheet.has_attr("viewBox"));
    }

    #[test]
    fn test_apply_page_places_instances() {
        let _ = env_logger::builder().is_test(true).try_init();
        let template = Template::parse(&template(INIT, "<text>{name}</text>")).unwrap();
        let page = template.apply_page(&rows(3)).unwrap();
        let instances: Vec<&Element> = page.elements().collect();
        assert_eq!(instances.len(), 3);
        // margins: x = (3 - (2 + 0.5)) / 2 = 0.25in, y = 0
        assert_eq!(instances[0].attr("transform"), Some("translate(24, 0)"));
        assert_eq!(instances[1].attr("transform"), Some("translate(168, 0)"));
        assert_eq!(instances[2].attr("transform"), Some("translate(24, 48)"));
        assert_eq!(text_of(instances[2].elements().next().unwrap()), "n2");
    }

    #[test]
    fn test_page_overflow_before_rendering() {
        // the row script would fail, but the overflow is reported first
        let source = template(INIT, "<text># svglabel: row\nassert(false, 'rendered')</text>");
        let template = Template::parse(&source).unwrap();
        assert!(matches!(
            template.apply_page(&rows(5)),
            Err(TemplateError::PageOverflow { capacity: 4, rows: 5 })
        ));
    }

    #[test]
    fn test_view_box_scaling() {
        let source = r#"<svg xmlns="http://www.w3.org/2000/svg" width="1in" height="0.5in" viewBox="0 0 192 96"><text># svglabel: init
sheet = LabelSheet((3in, 1in), (0.5in, 0in), (2, 2))</text></svg>"#;
        let template = Template::parse(source).unwrap();
        assert_eq!(template.view_box_scale(), (2.0, 2.0));
        assert_eq!(template.create_sheet().attr("viewBox"), Some("0 0 576 192"));
        let page = template.apply_page(&rows(2)).unwrap();
        let second = page.elements().nth(1).unwrap();
        assert_eq!(second.attr("transform"), Some("translate(336, 0)"));
    }

    #[test]
    fn test_row_fields_and_scripts() {
        let body = "<text># svglabel: row\nlabel = upper(name) + '/' + str(row_num)</text><text>{label} of {len(table)}</text>";
        let template = Template::parse(&template(INIT, body)).unwrap();
        let table = rows(2);
        let instance = template.apply_instance(&table[1], &table, 1).unwrap();
        assert_eq!(text_of(instance.elements().next().unwrap()), "N1/1 of 2");
    }

    #[test]
    fn test_non_identifier_fields_only_in_row() {
        let body = "<text>{row['part no']}</text>";
        let template = Template::parse(&template(INIT, body)).unwrap();
        let row = Row::new().with("part no", "A7");
        let instance = template.apply_instance(&row, std::slice::from_ref(&row), 0).unwrap();
        assert_eq!(text_of(instance.elements().next().unwrap()), "A7");
    }

    #[test]
    fn test_run_end() {
        let _ = env_logger::builder().is_test(true).try_init();
        let source = template(
            INIT,
            "<text># svglabel: end\nassert(len(seen) == 0, 'nothing appended')</text><text># svglabel: init\n</text>",
        );
        // two init blocks
        assert!(Template::parse(&source).is_err());

        let init = format!("{}\nseen = []", INIT);
        let body = "<text># svglabel: row\nappend(seen, name)</text><text># svglabel: end\nassert(len(seen) == 2, 'seen ' + str(len(seen)))</text>";
        let template = Template::parse(&template(&init, body)).unwrap();
        template.apply_page(&rows(2)).unwrap();
        template.run_end().unwrap();
    }
}
