//! Lexical analysis for Pattern
//!
//! Strips block comments and converts source text into a stream of tokens
//! pulled one at a time by the parser.

mod prepro;
mod token;
mod tokenizer;

pub use prepro::strip_comments;
pub use token::{Token, TokenKind};
pub use tokenizer::{tokenize, Tokenizer};
