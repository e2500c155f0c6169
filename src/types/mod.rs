//! # Pattern Type System
//!
//! Pattern has exactly two value types, `int` and `string`, plus `void` as a
//! function return type. Types are checked while the program runs; there is
//! no separate checking pass.
//!
//! ```text
//! int count;            // declared int, starts at 0
//! string color = "red"; // declared string, starts at "" then assigned
//! void draw(int n) { ... }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::runtime::Value;

/// Value type of a variable, parameter or expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// 64-bit signed integer
    Int,
    /// Text string
    Text,
}

impl Type {
    /// The value a fresh declaration of this type is bound to
    pub fn default_value(self) -> Value {
        match self {
            Type::Int => Value::Int(0),
            Type::Text => Value::Text(String::new()),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Text => write!(f, "string"),
        }
    }
}

/// Declared return type of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnType {
    /// Function yields a value of this type
    Value(Type),
    /// Function yields nothing
    Void,
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReturnType::Value(ty) => write!(f, "{}", ty),
            ReturnType::Void => write!(f, "void"),
        }
    }
}
