//! Error types for the Pattern interpreter

use thiserror::Error;

/// Pattern interpreter errors
///
/// Every error is fatal: the first one raised anywhere in the pipeline halts
/// the run and is handed back to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Lexing / parsing
    /// Syntax error encountered while tokenizing or parsing
    ///
    /// **Triggered by:** Unknown characters, unterminated strings, unexpected tokens, empty source
    /// **Example:** `drawLine(0, 0, 10 10);` (missing `,`)
    #[error("Syntax error at line {line}, column {col}: {message}")]
    SyntaxError {
        /// Line number where error occurred
        line: usize,
        /// Column number where error occurred
        col: usize,
        /// Error description
        message: String,
    },

    // Runtime errors
    /// Read or write of a name not bound in any enclosing scope
    ///
    /// **Triggered by:** Using or assigning a variable before declaring it
    /// **Example:** `x = 1;` (when `int x;` never ran)
    /// **Prevention:** Declare with `int x;` or `string x;` first
    #[error("Undeclared variable: {name}")]
    UndeclaredVariable {
        /// Variable name
        name: String,
    },

    /// Redeclaration of a variable or function in the same scope
    #[error("Duplicate declaration of {kind} '{name}'")]
    DuplicateDeclaration {
        /// What was declared twice (`variable` or `function`)
        kind: &'static str,
        /// Declared name
        name: String,
    },

    /// Type mismatch error
    ///
    /// **Triggered by:** Operator/operand mismatch, non-`int` condition, assignment,
    /// argument or return type mismatch, `scanf()` assigned to a non-`int` target
    /// **Example:** `"a" - 1`, `if ("yes") { ... }`
    #[error("Type error: {message}")]
    TypeError {
        /// Error description
        message: String,
    },

    /// Division by zero error
    ///
    /// **Triggered by:** Integer division with a zero divisor
    /// **Example:** `x = 10 / 0;`
    #[error("Division by zero")]
    DivisionByZero,

    /// Function call with the wrong number of arguments
    #[error("Function '{name}' expects {expected} arguments, got {got}")]
    ArityError {
        /// Function name
        name: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Call to a name with no matching function declaration
    #[error("Undeclared function: {name}")]
    UndeclaredFunction {
        /// Function name
        name: String,
    },

    /// Function calls nested deeper than the configured limit
    ///
    /// **Triggered by:** Unbounded or very deep recursion
    /// **Example:** `void spin() { spin(); } spin();`
    #[error("Call depth limit of {limit} exceeded calling '{name}'")]
    RecursionLimit {
        /// Function whose call crossed the limit
        name: String,
        /// Configured maximum call depth
        limit: usize,
    },

    // External errors
    /// Reading standard input or writing output failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// Create a syntax error at a source position
    pub fn syntax(line: usize, col: usize, message: impl Into<String>) -> Self {
        Error::SyntaxError {
            line,
            col,
            message: message.into(),
        }
    }

    /// Create a type error with a message
    pub fn type_error(message: impl Into<String>) -> Self {
        Error::TypeError {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Result type for Pattern operations
pub type Result<T> = std::result::Result<T, Error>;
