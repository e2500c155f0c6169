use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Type;

/// Runtime value representation
///
/// The variant is the value's type tag, so a value and its [`Type`] can never
/// disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit integer value
    Int(i64),
    /// String value
    Text(String),
}

impl Value {
    /// Returns the type of this value
    pub fn ty(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Text(_) => Type::Text,
        }
    }

    /// Returns true if the value is truthy in a boolean context
    ///
    /// Integers are truthy when non-zero, strings when non-empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Text(s) => !s.is_empty(),
        }
    }

    /// Converts a boolean into the language's `1` / `0` integers
    pub fn from_bool(b: bool) -> Self {
        Value::Int(i64::from(b))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Textual form written by `print` and the drawing statements
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag() {
        assert_eq!(Value::Int(3).ty(), Type::Int);
        assert_eq!(Value::from("red").ty(), Type::Text);
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Int(-1).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(!Value::from("").is_truthy());
    }

    #[test]
    fn test_display_is_unquoted() {
        assert_eq!(Value::Int(-42).to_string(), "-42");
        assert_eq!(Value::from("blue").to_string(), "blue");
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(Value::from_bool(true), Value::Int(1));
        assert_eq!(Value::from_bool(false), Value::Int(0));
    }
}
