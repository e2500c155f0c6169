use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

use crate::types::{ReturnType, Type};

/// Complete Pattern program: the top-level statements wrapped in one block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Top-level block
    pub block: Block,
}

/// Sequence of statements sharing the scope they are evaluated in
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    /// Statements in source order
    pub statements: Vec<Node>,
}

impl Block {
    /// Creates a block from its statements
    pub fn new(statements: Vec<Node>) -> Self {
        Block { statements }
    }
}

/// AST node
///
/// Expressions and statements share one closed set of variants; the evaluator
/// matches on it exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    // Literals
    /// Integer literal
    IntLiteral(i64),
    /// String literal
    StringLiteral(String),

    /// Variable reference
    Var(String),

    /// Unary `!`, `+`, `-`
    UnaryOp {
        /// Unary operator to apply
        op: UnaryOp,
        /// Operand expression
        operand: Box<Node>,
    },

    /// Arithmetic `+ - * /`
    BinaryOp {
        /// Binary operator to apply
        op: BinaryOp,
        /// Left operand expression
        left: Box<Node>,
        /// Right operand expression
        right: Box<Node>,
    },

    /// Logical `&&` / `||` (both operands always evaluated)
    BooleanOp {
        /// Boolean operator to apply
        op: BooleanOp,
        /// Left operand expression
        left: Box<Node>,
        /// Right operand expression
        right: Box<Node>,
    },

    /// Comparison `== != < > <= >=`
    RelationalOp {
        /// Relational operator to apply
        op: RelationalOp,
        /// Left operand expression
        left: Box<Node>,
        /// Right operand expression
        right: Box<Node>,
    },

    /// Variable declaration or assignment
    Assign {
        /// Target variable name
        name: String,
        /// Declaration type or value expression
        kind: AssignKind,
    },

    /// Nested statement block
    Block(Block),

    /// If statement
    If {
        /// Condition expression, must evaluate to `int`
        condition: Box<Node>,
        /// Block executed when the condition is truthy
        then_block: Block,
        /// Optional block executed otherwise
        else_block: Option<Block>,
    },

    /// While loop
    While {
        /// Loop condition, re-evaluated after every iteration
        condition: Box<Node>,
        /// Loop body
        body: Block,
    },

    /// `scanf()`: one integer read from standard input
    ScanInput,

    /// Return statement
    Return(Option<Box<Node>>),

    /// Function declaration
    FunctionDecl(Rc<FunctionDecl>),

    /// Function call
    FunctionCall {
        /// Name of the function to call
        name: String,
        /// Argument expressions, evaluated in the caller's scope
        args: Vec<Node>,
    },

    /// `print(expr)`
    Print(Box<Node>),

    /// `setup { frameSize = ...; threadColor = ...; };`
    Setup {
        /// Frame size literal
        frame_size: Box<Node>,
        /// Thread color literal
        thread_color: Box<Node>,
    },

    /// `drawLine(x1, y1, x2, y2)`
    DrawLine {
        /// Start x
        x1: Box<Node>,
        /// Start y
        y1: Box<Node>,
        /// End x
        x2: Box<Node>,
        /// End y
        y2: Box<Node>,
    },

    /// `changeThread(color)`
    ChangeThread(Box<Node>),

    /// Empty statement
    NoOp,
}

/// The two modes of [`Node::Assign`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssignKind {
    /// `int x;` binds a new name to the type's default value
    Declare(Type),
    /// `x = expr;` overwrites an existing binding
    Set(Box<Node>),
}

/// A declared function, shared read-only between the AST and the scope that registers it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Declared return type
    pub return_type: ReturnType,
    /// Function name
    pub name: String,
    /// Ordered parameters
    pub params: Vec<Param>,
    /// Function body
    pub body: Block,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: Type,
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition or concatenation (+)
    Add,
    /// Subtraction operator (-)
    Sub,
    /// Multiplication operator (*)
    Mul,
    /// Division operator (/)
    Div,
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanOp {
    /// Logical AND (&&)
    And,
    /// Logical OR (||)
    Or,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationalOp {
    /// Equality operator (==)
    Eq,
    /// Inequality operator (!=)
    NotEq,
    /// Less than operator (<)
    Lt,
    /// Greater than operator (>)
    Gt,
    /// Less than or equal operator (<=)
    LtEq,
    /// Greater than or equal operator (>=)
    GtEq,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical NOT operator (!x)
    Not,
    /// Unary plus (+x)
    Plus,
    /// Negation operator (-x)
    Neg,
}

impl RelationalOp {
    /// Applies the comparison to two ordered operands
    pub fn compare<T: PartialOrd + ?Sized>(self, left: &T, right: &T) -> bool {
        match self {
            RelationalOp::Eq => left == right,
            RelationalOp::NotEq => left != right,
            RelationalOp::Lt => left < right,
            RelationalOp::Gt => left > right,
            RelationalOp::LtEq => left <= right,
            RelationalOp::GtEq => left >= right,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BooleanOp::And => write!(f, "&&"),
            BooleanOp::Or => write!(f, "||"),
        }
    }
}

impl fmt::Display for RelationalOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RelationalOp::Eq => write!(f, "=="),
            RelationalOp::NotEq => write!(f, "!="),
            RelationalOp::Lt => write!(f, "<"),
            RelationalOp::Gt => write!(f, ">"),
            RelationalOp::LtEq => write!(f, "<="),
            RelationalOp::GtEq => write!(f, ">="),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Plus => write!(f, "+"),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}
