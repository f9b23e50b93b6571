use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    #[error("can't parse length dimension '{input}': {message}")]
    Parse { input: String, message: String },

    #[error("unknown length unit '{suffix}' in '{input}'")]
    UnknownUnit { input: String, suffix: String },
}
