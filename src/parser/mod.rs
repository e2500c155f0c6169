//! Pattern Parser Module
//!
//! Parses the token stream into an Abstract Syntax Tree (AST).

mod ast;
mod grammar;

pub use ast::{
    AssignKind, BinaryOp, Block, BooleanOp, FunctionDecl, Node, Param, Program, RelationalOp,
    UnaryOp,
};
pub use grammar::Parser;

use crate::error::{Error, Result};
use crate::lexer::{strip_comments, Tokenizer};

/// Strips comments and parses a complete program
///
/// Source that is empty or only whitespace once comments are removed is a
/// syntax error.
pub fn parse_program(source: &str) -> Result<Program> {
    let code = strip_comments(source);
    if code.trim().is_empty() {
        return Err(Error::syntax(
            1,
            1,
            "source must not be empty or consist only of whitespace",
        ));
    }

    let tokenizer = Tokenizer::new(&code)?;
    Parser::new(tokenizer).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_rejected() {
        assert!(matches!(
            parse_program("   \n\t"),
            Err(Error::SyntaxError { .. })
        ));
        assert!(matches!(
            parse_program("/* only a comment */\n"),
            Err(Error::SyntaxError { .. })
        ));
    }

    #[test]
    fn test_comments_removed_before_lexing() {
        let program = parse_program("/* set x */ x = 1; /* # not a token */").unwrap();
        assert_eq!(program.block.statements.len(), 1);
    }

    #[test]
    fn test_positions_survive_block_comments() {
        let source = "/* header\n line two\n line three */\nint x;\nx = 1\ny = 2;";
        assert_eq!(
            parse_program(source),
            Err(Error::syntax(
                6,
                1,
                "Expected `;` after assignment, found identifier `y`"
            ))
        );
    }
}
