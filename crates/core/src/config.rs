//! Template configuration.

/// The literal prefixes that identify directive and command blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    /// Starts the single block run once when the template is loaded.
    pub init: String,
    /// Starts a block run once per row.
    pub row: String,
    /// Starts a block run once after all pages.
    pub end: String,
    /// Starts a command block inside a group; the rest is a replacer expression.
    pub command: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            init: "# svglabel: init".to_string(),
            row: "# svglabel: row".to_string(),
            end: "# svglabel: end".to_string(),
            command: "🏷".to_string(),
        }
    }
}
