use std::rc::Rc;

use super::ast::{
    AssignKind, BinaryOp, Block, BooleanOp, FunctionDecl, Node, Param, Program, RelationalOp,
    UnaryOp,
};
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind, Tokenizer};
use crate::types::{ReturnType, Type};

/// Recursive-descent parser for Pattern source
///
/// Pulls tokens from the [`Tokenizer`] on demand with one token of lookahead
/// and stops at the first syntax error.
pub struct Parser {
    tokenizer: Tokenizer,
    /// Number of function bodies currently being parsed
    function_depth: usize,
}

impl Parser {
    /// Creates a parser over a primed tokenizer
    pub fn new(tokenizer: Tokenizer) -> Self {
        Parser {
            tokenizer,
            function_depth: 0,
        }
    }

    /// Parses statements until end of file and wraps them in a single block
    pub fn parse(&mut self) -> Result<Program> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        tracing::debug!(statements = statements.len(), "parsed program");
        Ok(Program {
            block: Block::new(statements),
        })
    }

    /// Statement dispatcher
    fn parse_statement(&mut self) -> Result<Node> {
        match self.peek() {
            TokenKind::Setup => self.parse_setup(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Identifier(_) => self.parse_identifier_statement(),
            TokenKind::DrawLine => self.parse_draw_line(),
            TokenKind::ChangeThread => self.parse_change_thread(),
            TokenKind::LeftBrace => Ok(Node::Block(self.parse_block()?)),
            TokenKind::Print => self.parse_print(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Int | TokenKind::String | TokenKind::Void => self.parse_declaration(),
            TokenKind::Semicolon => {
                self.advance()?;
                Ok(Node::NoOp)
            }
            _ => Err(self.expected_error("a statement")),
        }
    }

    /// `{ statement* }`
    fn parse_block(&mut self) -> Result<Block> {
        self.consume(TokenKind::LeftBrace, "at start of block")?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        self.consume(TokenKind::RightBrace, "at end of block")?;
        Ok(Block::new(statements))
    }

    /// `setup { frameSize = lit ; threadColor = lit ; } ;`
    fn parse_setup(&mut self) -> Result<Node> {
        self.consume(TokenKind::Setup, "")?;
        self.consume(TokenKind::LeftBrace, "after `setup`")?;
        let frame_size = self.parse_setting(TokenKind::FrameSize)?;
        let thread_color = self.parse_setting(TokenKind::ThreadColor)?;
        self.consume(TokenKind::RightBrace, "after setup settings")?;
        self.consume(TokenKind::Semicolon, "after setup block")?;

        Ok(Node::Setup {
            frame_size: Box::new(frame_size),
            thread_color: Box::new(thread_color),
        })
    }

    /// `name = NUMBER|STRING ;` inside a setup block
    fn parse_setting(&mut self, name: TokenKind) -> Result<Node> {
        let context = format!("`{}` setting", name);
        self.consume(name, "in setup block")?;
        self.consume(TokenKind::Assign, &format!("after {}", context))?;

        let value = match self.peek() {
            TokenKind::Number(n) => Node::IntLiteral(*n),
            TokenKind::StringLiteral(s) => Node::StringLiteral(s.clone()),
            _ => return Err(self.expected_error(&format!("number or string for {}", context))),
        };
        self.advance()?;

        self.consume(TokenKind::Semicolon, &format!("after {}", context))?;
        Ok(value)
    }

    /// `if ( expr ) block [ else block ]`
    fn parse_if(&mut self) -> Result<Node> {
        self.consume(TokenKind::If, "")?;
        let condition = self.parse_condition("if")?;
        let then_block = self.parse_block()?;

        let else_block = if self.check(&TokenKind::Else) {
            self.advance()?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Node::If {
            condition: Box::new(condition),
            then_block,
            else_block,
        })
    }

    /// `while ( expr ) block`
    fn parse_while(&mut self) -> Result<Node> {
        self.consume(TokenKind::While, "")?;
        let condition = self.parse_condition("while")?;
        let body = self.parse_block()?;

        Ok(Node::While {
            condition: Box::new(condition),
            body,
        })
    }

    /// Parenthesized condition of `if` / `while`
    fn parse_condition(&mut self, keyword: &str) -> Result<Node> {
        self.consume(TokenKind::LeftParen, &format!("after `{}`", keyword))?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, &format!("after `{}` condition", keyword))?;
        Ok(condition)
    }

    /// `IDENTIFIER = expr ;` or `IDENTIFIER ( args ) ;`
    fn parse_identifier_statement(&mut self) -> Result<Node> {
        let name = self.consume_identifier("")?;

        match self.peek() {
            TokenKind::Assign => {
                self.advance()?;
                let value = self.parse_expression()?;
                self.consume(TokenKind::Semicolon, "after assignment")?;
                Ok(Node::Assign {
                    name,
                    kind: AssignKind::Set(Box::new(value)),
                })
            }
            TokenKind::LeftParen => {
                let args = self.parse_call_args(&name)?;
                self.consume(TokenKind::Semicolon, "after function call")?;
                Ok(Node::FunctionCall { name, args })
            }
            _ => Err(self.expected_error(&format!("`=` or `(` after identifier `{}`", name))),
        }
    }

    /// `drawLine ( expr , expr , expr , expr ) ;`
    fn parse_draw_line(&mut self) -> Result<Node> {
        self.consume(TokenKind::DrawLine, "")?;
        self.consume(TokenKind::LeftParen, "after `drawLine`")?;
        let x1 = self.parse_expression()?;
        self.consume(TokenKind::Comma, "after first drawLine argument")?;
        let y1 = self.parse_expression()?;
        self.consume(TokenKind::Comma, "after second drawLine argument")?;
        let x2 = self.parse_expression()?;
        self.consume(TokenKind::Comma, "after third drawLine argument")?;
        let y2 = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "after fourth drawLine argument")?;
        self.consume(TokenKind::Semicolon, "after drawLine")?;

        Ok(Node::DrawLine {
            x1: Box::new(x1),
            y1: Box::new(y1),
            x2: Box::new(x2),
            y2: Box::new(y2),
        })
    }

    /// `changeThread ( expr ) ;`
    fn parse_change_thread(&mut self) -> Result<Node> {
        self.consume(TokenKind::ChangeThread, "")?;
        self.consume(TokenKind::LeftParen, "after `changeThread`")?;
        let color = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "after changeThread argument")?;
        self.consume(TokenKind::Semicolon, "after changeThread")?;
        Ok(Node::ChangeThread(Box::new(color)))
    }

    /// `print ( expr ) ;`
    fn parse_print(&mut self) -> Result<Node> {
        self.consume(TokenKind::Print, "")?;
        self.consume(TokenKind::LeftParen, "after `print`")?;
        let value = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "after print argument")?;
        self.consume(TokenKind::Semicolon, "after print")?;
        Ok(Node::Print(Box::new(value)))
    }

    /// `return [expr] ;`, only inside a function body
    fn parse_return(&mut self) -> Result<Node> {
        if self.function_depth == 0 {
            return Err(self.syntax_error("`return` outside of a function body"));
        }
        self.consume(TokenKind::Return, "")?;

        if self.check(&TokenKind::Semicolon) {
            self.advance()?;
            return Ok(Node::Return(None));
        }

        let value = self.parse_expression()?;
        self.consume(TokenKind::Semicolon, "after return value")?;
        Ok(Node::Return(Some(Box::new(value))))
    }

    /// Variable declaration (`int x;`, `string s = "a";`) or function declaration
    fn parse_declaration(&mut self) -> Result<Node> {
        let return_type = match self.advance()?.kind {
            TokenKind::Int => ReturnType::Value(Type::Int),
            TokenKind::String => ReturnType::Value(Type::Text),
            _ => ReturnType::Void,
        };
        let name = self.consume_identifier(&format!("after `{}`", return_type))?;

        if self.check(&TokenKind::LeftParen) {
            return self.parse_function_decl(return_type, name);
        }

        let ty = match return_type {
            ReturnType::Value(ty) => ty,
            ReturnType::Void => {
                return Err(self.expected_error(&format!("`(` after void function `{}`", name)))
            }
        };
        let declare = Node::Assign {
            name: name.clone(),
            kind: AssignKind::Declare(ty),
        };

        match self.peek() {
            TokenKind::Semicolon => {
                self.advance()?;
                Ok(declare)
            }
            TokenKind::Assign => {
                self.advance()?;
                let value = self.parse_expression()?;
                self.consume(TokenKind::Semicolon, "after declaration")?;
                let assign = Node::Assign {
                    name,
                    kind: AssignKind::Set(Box::new(value)),
                };
                Ok(Node::Block(Block::new(vec![declare, assign])))
            }
            _ => Err(self.expected_error(&format!("`;` or `=` after declaration of `{}`", name))),
        }
    }

    /// `TYPE name ( params ) block`, with the type and name already consumed
    fn parse_function_decl(&mut self, return_type: ReturnType, name: String) -> Result<Node> {
        self.consume(TokenKind::LeftParen, "after function name")?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                let ty = self.parse_value_type()?;
                let param_name = self.consume_identifier("for parameter name")?;
                params.push(Param {
                    name: param_name,
                    ty,
                });
                if !self.check(&TokenKind::Comma) {
                    break;
                }
                self.advance()?;
            }
        }
        self.consume(TokenKind::RightParen, "after function parameters")?;

        self.function_depth += 1;
        let body = self.parse_block();
        self.function_depth -= 1;

        Ok(Node::FunctionDecl(Rc::new(FunctionDecl {
            return_type,
            name,
            params,
            body: body?,
        })))
    }

    /// `int` or `string`
    fn parse_value_type(&mut self) -> Result<Type> {
        let ty = match self.peek() {
            TokenKind::Int => Type::Int,
            TokenKind::String => Type::Text,
            _ => return Err(self.expected_error("parameter type `int` or `string`")),
        };
        self.advance()?;
        Ok(ty)
    }

    /// `expression := term (( + | - | && | || | relational ) term)*`
    ///
    /// Every operator at this level shares one precedence and associates left.
    fn parse_expression(&mut self) -> Result<Node> {
        let mut result = self.parse_term()?;

        while let Some(op) = ExprOp::from_token(self.peek()) {
            self.advance()?;
            let left = Box::new(result);
            let right = Box::new(self.parse_term()?);
            result = match op {
                ExprOp::Binary(op) => Node::BinaryOp { op, left, right },
                ExprOp::Boolean(op) => Node::BooleanOp { op, left, right },
                ExprOp::Relational(op) => Node::RelationalOp { op, left, right },
            };
        }

        Ok(result)
    }

    /// `term := factor (( * | / ) factor)*`
    fn parse_term(&mut self) -> Result<Node> {
        let mut result = self.parse_factor()?;

        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_factor()?;
            result = Node::BinaryOp {
                op,
                left: Box::new(result),
                right: Box::new(right),
            };
        }

        Ok(result)
    }

    /// ```text
    /// factor := ! factor | scanf() | ( expr ) | (+|-) factor
    ///         | NUMBER | STRING | IDENTIFIER [( args )]
    /// ```
    fn parse_factor(&mut self) -> Result<Node> {
        match self.peek().clone() {
            TokenKind::Not => {
                self.advance()?;
                Ok(unary(UnaryOp::Not, self.parse_factor()?))
            }
            TokenKind::Plus => {
                self.advance()?;
                Ok(unary(UnaryOp::Plus, self.parse_factor()?))
            }
            TokenKind::Minus => {
                self.advance()?;
                Ok(unary(UnaryOp::Neg, self.parse_factor()?))
            }
            TokenKind::Scanf => {
                self.advance()?;
                self.consume(TokenKind::LeftParen, "after `scanf`")?;
                self.consume(TokenKind::RightParen, "after `scanf(`")?;
                Ok(Node::ScanInput)
            }
            TokenKind::LeftParen => {
                self.advance()?;
                let inner = self.parse_expression()?;
                self.consume(TokenKind::RightParen, "after parenthesized expression")?;
                Ok(inner)
            }
            TokenKind::Number(n) => {
                self.advance()?;
                Ok(Node::IntLiteral(n))
            }
            TokenKind::StringLiteral(s) => {
                self.advance()?;
                Ok(Node::StringLiteral(s))
            }
            TokenKind::Identifier(name) => {
                self.advance()?;
                if self.check(&TokenKind::LeftParen) {
                    let args = self.parse_call_args(&name)?;
                    Ok(Node::FunctionCall { name, args })
                } else {
                    Ok(Node::Var(name))
                }
            }
            _ => Err(self.expected_error("an expression")),
        }
    }

    /// `( [expr {, expr}] )`
    fn parse_call_args(&mut self, name: &str) -> Result<Vec<Node>> {
        self.consume(TokenKind::LeftParen, &format!("after `{}`", name))?;

        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.check(&TokenKind::Comma) {
                    break;
                }
                self.advance()?;
            }
        }

        self.consume(
            TokenKind::RightParen,
            &format!("after arguments of `{}`", name),
        )?;
        Ok(args)
    }

    fn is_at_end(&self) -> bool {
        self.peek() == &TokenKind::Eof
    }

    fn peek(&self) -> &TokenKind {
        &self.tokenizer.current().kind
    }

    /// Returns the lookahead token and pulls the next one
    fn advance(&mut self) -> Result<Token> {
        let token = self.tokenizer.current().clone();
        self.tokenizer.next_token()?;
        Ok(token)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    fn consume(&mut self, kind: TokenKind, context: &str) -> Result<Token> {
        if self.check(&kind) {
            self.advance()
        } else if context.is_empty() {
            Err(self.expected_error(&kind.describe()))
        } else {
            Err(self.expected_error(&format!("{} {}", kind.describe(), context)))
        }
    }

    fn consume_identifier(&mut self, context: &str) -> Result<String> {
        match self.peek() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            _ if context.is_empty() => Err(self.expected_error("identifier")),
            _ => Err(self.expected_error(&format!("identifier {}", context))),
        }
    }

    /// Helper to create a syntax error at the lookahead token
    fn syntax_error(&self, message: impl Into<String>) -> Error {
        let token = self.tokenizer.current();
        Error::syntax(token.line, token.column, message)
    }

    /// Helper to create a syntax error with expected/found pattern
    fn expected_error(&self, expected: &str) -> Error {
        self.syntax_error(format!(
            "Expected {}, found {}",
            expected,
            self.peek().describe()
        ))
    }
}

/// Operators parsed at the single `expression` precedence level
#[derive(Clone, Copy)]
enum ExprOp {
    Binary(BinaryOp),
    Boolean(BooleanOp),
    Relational(RelationalOp),
}

impl ExprOp {
    fn from_token(kind: &TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => ExprOp::Binary(BinaryOp::Add),
            TokenKind::Minus => ExprOp::Binary(BinaryOp::Sub),
            TokenKind::And => ExprOp::Boolean(BooleanOp::And),
            TokenKind::Or => ExprOp::Boolean(BooleanOp::Or),
            TokenKind::Eq => ExprOp::Relational(RelationalOp::Eq),
            TokenKind::NotEq => ExprOp::Relational(RelationalOp::NotEq),
            TokenKind::Lt => ExprOp::Relational(RelationalOp::Lt),
            TokenKind::Gt => ExprOp::Relational(RelationalOp::Gt),
            TokenKind::LtEq => ExprOp::Relational(RelationalOp::LtEq),
            TokenKind::GtEq => ExprOp::Relational(RelationalOp::GtEq),
            _ => return None,
        };
        Some(op)
    }
}

fn unary(op: UnaryOp, operand: Node) -> Node {
    Node::UnaryOp {
        op,
        operand: Box::new(operand),
    }
}
