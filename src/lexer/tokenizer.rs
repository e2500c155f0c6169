use super::token::{Token, TokenKind};
use crate::error::{Error, Result};

/// On-demand tokenizer with one token of lookahead
///
/// The tokenizer never backtracks: [`Tokenizer::current`] is the lookahead
/// token and [`Tokenizer::next_token`] replaces it with the following one.
/// Once the end of input is reached every further call yields `Eof` again.
pub struct Tokenizer {
    /// Source code as character vector
    source: Vec<char>,
    /// Start position of current token
    start: usize,
    /// Current position in source
    position: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Line where the token being scanned starts
    start_line: usize,
    /// Column where the token being scanned starts
    start_column: usize,
    /// Lookahead token
    current: Token,
}

impl Tokenizer {
    /// Creates a tokenizer and scans the first token
    pub fn new(source: &str) -> Result<Self> {
        let mut tokenizer = Tokenizer {
            source: source.chars().collect(),
            start: 0,
            position: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            current: Token::new(TokenKind::Eof, String::new(), 1, 1),
        };
        tokenizer.next_token()?;
        Ok(tokenizer)
    }

    /// The lookahead token
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Advances past whitespace and scans the next token into the lookahead slot
    pub fn next_token(&mut self) -> Result<&Token> {
        self.skip_whitespace();
        self.start = self.position;
        self.start_line = self.line;
        self.start_column = self.column;

        self.current = if self.is_at_end() {
            self.make_token(TokenKind::Eof)
        } else {
            self.scan_token()?
        };
        Ok(&self.current)
    }

    fn scan_token(&mut self) -> Result<Token> {
        let c = self.advance();

        let kind = match c {
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,

            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,

            '=' => {
                if self.match_char('=') {
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.match_char('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Not
                }
            }
            '<' => {
                if self.match_char('=') {
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.match_char('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '&' if self.match_char('&') => TokenKind::And,
            '|' if self.match_char('|') => TokenKind::Or,

            '"' => self.scan_string()?,
            c if c.is_ascii_digit() => self.scan_number()?,
            c if c.is_alphabetic() => self.scan_identifier_or_keyword(),

            _ => {
                return Err(Error::syntax(
                    self.start_line,
                    self.start_column,
                    format!("unknown token '{}'", c),
                ));
            }
        };

        Ok(self.make_token(kind))
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    fn scan_string(&mut self) -> Result<TokenKind> {
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != '"' {
            value.push(self.advance());
        }

        if self.is_at_end() {
            return Err(Error::syntax(
                self.start_line,
                self.start_column,
                "unterminated string literal",
            ));
        }

        self.advance(); // Closing "
        Ok(TokenKind::StringLiteral(value))
    }

    fn scan_number(&mut self) -> Result<TokenKind> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let text = self.lexeme();
        let value: i64 = text.parse().map_err(|_| {
            Error::syntax(
                self.start_line,
                self.start_column,
                format!("integer literal out of range: {}", text),
            )
        })?;
        Ok(TokenKind::Number(value))
    }

    fn scan_identifier_or_keyword(&mut self) -> TokenKind {
        while self.peek().is_alphanumeric() {
            self.advance();
        }

        let text = self.lexeme();
        TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier(text))
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.position];
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.position]
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.position] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.position].iter().collect()
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.lexeme(), self.start_line, self.start_column)
    }
}

/// Scans the whole source, returning every token up to and including `Eof`
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokenizer = Tokenizer::new(source)?;
    let mut tokens = vec![tokenizer.current().clone()];
    while tokenizer.current().kind != TokenKind::Eof {
        tokens.push(tokenizer.next_token()?.clone());
    }
    Ok(tokens)
}
