//! # Pattern - a scripting language for thread-art patterns
//!
//! A small C-like language with two value types (`int` and `string`),
//! functions, `if`/`while` control flow and three domain statements that
//! describe a thread-art drawing: `setup`, `changeThread` and `drawLine`.
//!
//! ## Quick Start
//!
//! ```rust
//! use patternlang::run_with_io;
//!
//! # fn main() -> patternlang::Result<()> {
//! let code = r#"
//!     setup { frameSize = 100; threadColor = "red"; };
//!
//!     int fact(int n) {
//!         if (n < 2) { return 1; }
//!         return n * fact(n - 1);
//!     }
//!
//!     void main() {
//!         changeThread("blue");
//!         drawLine(0, 0, fact(3), 10);
//!     }
//! "#;
//!
//! let output = run_with_io(code, &b""[..], Vec::new())?;
//! assert_eq!(
//!     String::from_utf8(output).unwrap(),
//!     "Setup: frameSize=100, threadColor=red\n\
//!      Changing thread color to blue\n\
//!      Drawing line from (0, 0) to (6, 10)\n"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Source → strip_comments → Tokenizer → Parser → AST → Evaluator → output
//! ```
//!
//! - [`Tokenizer`] - produces tokens on demand, one token of lookahead
//! - [`Parser`] - recursive descent into a [`Program`]
//! - [`Evaluator`] - walks the AST against an [`Environment`]
//! - [`Value`] - runtime `int` / `string` values
//!
//! ## Error Handling
//!
//! Every failure is a single [`Error`]; the first one halts the run.
//!
//! ```rust
//! # use patternlang::{run_with_io, Error};
//! let err = run_with_io("int x; x = 10 / 0;", &b""[..], Vec::new()).unwrap_err();
//! assert_eq!(err, Error::DivisionByZero);
//! ```

/// Version of the Pattern interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod types;

use std::io::{BufRead, Write};
use std::thread;

// Re-export main types
pub use error::{Error, Result};
pub use lexer::{strip_comments, tokenize, Token, TokenKind, Tokenizer};
pub use parser::{parse_program, Node, Parser, Program};
pub use runtime::{Environment, EvalConfig, Evaluator, ScopeId, Value};
pub use types::{ReturnType, Type};

/// Stack size of the thread programs are evaluated on
///
/// Parsing and evaluation recurse on the native stack. This leaves room for
/// [`runtime::DEFAULT_MAX_CALL_DEPTH`] nested calls in unoptimized builds.
pub const EVAL_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Runs a program against the process's standard input and output
pub fn run(source: &str) -> Result<()> {
    run_with_config(source, EvalConfig::default())
}

/// Runs a program against standard input and output with a custom configuration
pub fn run_with_config(source: &str, config: EvalConfig) -> Result<()> {
    on_eval_stack(move || {
        let program = parse_program(source)?;
        Evaluator::new().with_config(config).run(&program)
    })
}

/// Runs a program with custom input and output, returning the output channel
pub fn run_with_io<R, W>(source: &str, input: R, output: W) -> Result<W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    on_eval_stack(move || {
        let program = parse_program(source)?;
        let mut evaluator = Evaluator::with_io(input, output);
        evaluator.run(&program)?;
        Ok(evaluator.into_output())
    })
}

/// Runs `task` to completion on a scoped thread with [`EVAL_STACK_SIZE`] of stack
fn on_eval_stack<T, F>(task: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> Result<T> + Send,
{
    thread::scope(|scope| {
        let handle = thread::Builder::new()
            .name("patternlang-eval".to_string())
            .stack_size(EVAL_STACK_SIZE)
            .spawn_scoped(scope, task)?;
        handle
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    })
}
