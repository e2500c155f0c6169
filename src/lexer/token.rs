use serde::{Deserialize, Serialize};

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Original text of the token
    pub lexeme: String,
    /// Line number where token appears (1-indexed)
    pub line: usize,
    /// Column number where token starts (1-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: String, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme,
            line,
            column,
        }
    }
}

/// All possible token types in Pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    /// Integer literal
    Number(i64),
    /// String literal (quotes stripped)
    StringLiteral(String),

    // Identifiers
    /// Identifier that is not a keyword
    Identifier(String),

    // Domain keywords
    /// `setup`
    Setup,
    /// `frameSize`
    FrameSize,
    /// `threadColor`
    ThreadColor,
    /// `drawLine`
    DrawLine,
    /// `changeThread`
    ChangeThread,

    // Control flow keywords
    /// `if`
    If,
    /// `else`
    Else,
    /// `while`
    While,
    /// `return`
    Return,

    // Builtin keywords
    /// `print`
    Print,
    /// `scanf`
    Scanf,

    // Type keywords
    /// `int`
    Int,
    /// `string`
    String,
    /// `void`
    Void,

    // Operators
    /// Plus operator (+)
    Plus,
    /// Minus operator (-)
    Minus,
    /// Star operator (*)
    Star,
    /// Slash operator (/)
    Slash,
    /// Logical NOT operator (!)
    Not,
    /// Logical AND operator (&&)
    And,
    /// Logical OR operator (||)
    Or,
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
    /// Assignment operator (=)
    Assign,

    // Delimiters
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,
    /// Left brace {
    LeftBrace,
    /// Right brace }
    RightBrace,
    /// Comma delimiter
    Comma,
    /// Semicolon delimiter
    Semicolon,

    // Special
    /// End of file marker
    Eof,
}

impl TokenKind {
    /// Check if token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Setup
                | TokenKind::FrameSize
                | TokenKind::ThreadColor
                | TokenKind::DrawLine
                | TokenKind::ChangeThread
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::Return
                | TokenKind::Print
                | TokenKind::Scanf
                | TokenKind::Int
                | TokenKind::String
                | TokenKind::Void
        )
    }

    /// Get keyword from string, `None` for plain identifiers
    pub fn keyword(s: &str) -> Option<TokenKind> {
        let kind = match s {
            "setup" => TokenKind::Setup,
            "frameSize" => TokenKind::FrameSize,
            "threadColor" => TokenKind::ThreadColor,
            "drawLine" => TokenKind::DrawLine,
            "changeThread" => TokenKind::ChangeThread,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "return" => TokenKind::Return,
            "print" => TokenKind::Print,
            "scanf" => TokenKind::Scanf,
            "int" => TokenKind::Int,
            "string" => TokenKind::String,
            "void" => TokenKind::Void,
            _ => return None,
        };
        Some(kind)
    }

    /// Human-readable name used in syntax error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::StringLiteral(_) => "string literal".to_string(),
            TokenKind::Identifier(name) => format!("identifier `{}`", name),
            TokenKind::Eof => "end of file".to_string(),
            other => format!("`{}`", other),
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let text = match self {
            TokenKind::Number(n) => return write!(f, "{}", n),
            TokenKind::StringLiteral(s) => return write!(f, "\"{}\"", s),
            TokenKind::Identifier(id) => return write!(f, "{}", id),
            TokenKind::Setup => "setup",
            TokenKind::FrameSize => "frameSize",
            TokenKind::ThreadColor => "threadColor",
            TokenKind::DrawLine => "drawLine",
            TokenKind::ChangeThread => "changeThread",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Return => "return",
            TokenKind::Print => "print",
            TokenKind::Scanf => "scanf",
            TokenKind::Int => "int",
            TokenKind::String => "string",
            TokenKind::Void => "void",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Not => "!",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Assign => "=",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Eof => "EOF",
        };
        f.write_str(text)
    }
}
