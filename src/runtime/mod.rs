//! Runtime execution for Pattern programs

mod environment;
mod evaluator;
mod value;

pub use environment::{Environment, ScopeId};
pub use evaluator::{EvalConfig, Evaluator, DEFAULT_MAX_CALL_DEPTH};
pub use value::Value;
