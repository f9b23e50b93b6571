use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("Script parse error in '{input}': {message}")]
    Parse { input: String, message: String },

    #[error("name '{0}' is not defined")]
    UnknownVariable(String),

    #[error("function '{0}' is not defined")]
    UnknownFunction(String),

    #[error("{type_name} has no attribute '{name}'")]
    UnknownAttribute { type_name: String, name: String },

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Function '{function}' error: {message}")]
    Argument { function: String, message: String },

    #[error("Index error: {0}")]
    Index(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("assertion failed: {0}")]
    Assertion(String),
}
