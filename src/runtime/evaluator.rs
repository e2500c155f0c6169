use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::parser::{
    AssignKind, BinaryOp, Block, BooleanOp, FunctionDecl, Node, Program, RelationalOp, UnaryOp,
};
use crate::runtime::{Environment, ScopeId, Value};
use crate::types::{ReturnType, Type};

/// Tree-walking evaluator for Pattern programs
///
/// Walks the AST against an [`Environment`], reading `scanf()` input from `R`
/// and writing `print` and drawing output to `W`:
/// - top-level statements run in the global scope
/// - every function call gets a fresh scope whose parent is the global scope
/// - blocks never open a scope of their own
pub struct Evaluator<R, W> {
    /// Variable and function bindings
    env: Environment,
    /// Source of `scanf()` lines
    input: R,
    /// Destination of program output
    output: W,
    /// Run configuration
    config: EvalConfig,
    /// Number of function calls currently executing
    call_depth: usize,
}

/// Configuration for a program run
#[derive(Clone, Debug)]
pub struct EvalConfig {
    /// Call the entry-point function after the top-level statements, if declared
    pub invoke_main: bool,
    /// Name of the entry-point function
    pub entry_point: String,
    /// Maximum number of nested function calls before the run fails
    ///
    /// Each call recurses on the native stack; [`crate::EVAL_STACK_SIZE`] is
    /// sized for the default.
    pub max_call_depth: usize,
}

/// Default nesting limit for function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            invoke_main: true,
            entry_point: "main".to_string(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Result of evaluating one node
#[derive(Debug)]
enum Flow {
    /// Evaluation finished; expressions carry their value
    Normal(Option<Value>),
    /// A `return` is unwinding to the enclosing call
    Return(Option<Value>),
}

impl Evaluator<StdinLock<'static>, Stdout> {
    /// Creates an evaluator wired to the process's standard input and output
    pub fn new() -> Self {
        Evaluator::with_io(io::stdin().lock(), io::stdout())
    }
}

impl Default for Evaluator<StdinLock<'static>, Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead, W: Write> Evaluator<R, W> {
    /// Creates an evaluator with custom input and output channels
    pub fn with_io(input: R, output: W) -> Self {
        Evaluator {
            env: Environment::new(),
            input,
            output,
            config: EvalConfig::default(),
            call_depth: 0,
        }
    }

    /// Replaces the run configuration
    pub fn with_config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// The evaluator's symbol table
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// The output channel
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Consumes the evaluator, returning the output channel
    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs the top-level block, then the entry-point function if one was declared
    pub fn run(&mut self, program: &Program) -> Result<()> {
        let global = self.env.global();
        self.execute_block(&program.block, global)?;

        if self.config.invoke_main && self.env.has_function(global, &self.config.entry_point) {
            let entry = self.config.entry_point.clone();
            tracing::debug!(function = %entry, "invoking entry point");
            self.call_function(&entry, &[], global)?;
        }

        self.output.flush()?;
        Ok(())
    }

    fn evaluate(&mut self, node: &Node, scope: ScopeId) -> Result<Flow> {
        let value = match node {
            Node::IntLiteral(n) => Value::Int(*n),
            Node::StringLiteral(s) => Value::Text(s.clone()),
            Node::Var(name) => self.env.get(scope, name)?.clone(),
            Node::UnaryOp { op, operand } => self.eval_unary(*op, operand, scope)?,
            Node::BinaryOp { op, left, right } => self.eval_binary(*op, left, right, scope)?,
            Node::BooleanOp { op, left, right } => self.eval_boolean(*op, left, right, scope)?,
            Node::RelationalOp { op, left, right } => {
                self.eval_relational(*op, left, right, scope)?
            }
            Node::Assign { name, kind } => self.eval_assign(name, kind, scope)?,
            Node::ScanInput => self.read_int()?,

            Node::Block(block) => return self.execute_block(block, scope),

            Node::If {
                condition,
                then_block,
                else_block,
            } => {
                if self.eval_condition(condition, scope, "if")? {
                    return self.execute_block(then_block, scope);
                }
                return match else_block {
                    Some(block) => self.execute_block(block, scope),
                    None => Ok(Flow::Normal(None)),
                };
            }

            Node::While { condition, body } => {
                while self.eval_condition(condition, scope, "while")? {
                    if let Flow::Return(value) = self.execute_block(body, scope)? {
                        return Ok(Flow::Return(value));
                    }
                }
                return Ok(Flow::Normal(None));
            }

            Node::Return(expr) => {
                let value = match expr {
                    Some(expr) => Some(self.eval_value(expr, scope)?),
                    None => None,
                };
                return Ok(Flow::Return(value));
            }

            Node::FunctionDecl(decl) => {
                self.env.declare_function(scope, Rc::clone(decl))?;
                tracing::debug!(
                    function = %decl.name,
                    params = decl.params.len(),
                    "declared function"
                );
                return Ok(Flow::Normal(None));
            }

            Node::FunctionCall { name, args } => {
                return Ok(Flow::Normal(self.call_function(name, args, scope)?));
            }

            Node::Print(expr) => {
                let value = self.eval_value(expr, scope)?;
                writeln!(self.output, "{}", value)?;
                value
            }

            Node::Setup {
                frame_size,
                thread_color,
            } => {
                let frame_size = self.eval_value(frame_size, scope)?;
                let thread_color = self.eval_value(thread_color, scope)?;
                writeln!(
                    self.output,
                    "Setup: frameSize={}, threadColor={}",
                    frame_size, thread_color
                )?;
                return Ok(Flow::Normal(None));
            }

            Node::DrawLine { x1, y1, x2, y2 } => {
                let x1 = self.eval_value(x1, scope)?;
                let y1 = self.eval_value(y1, scope)?;
                let x2 = self.eval_value(x2, scope)?;
                let y2 = self.eval_value(y2, scope)?;
                writeln!(
                    self.output,
                    "Drawing line from ({}, {}) to ({}, {})",
                    x1, y1, x2, y2
                )?;
                return Ok(Flow::Normal(None));
            }

            Node::ChangeThread(color) => {
                let color = self.eval_value(color, scope)?;
                writeln!(self.output, "Changing thread color to {}", color)?;
                return Ok(Flow::Normal(None));
            }

            Node::NoOp => return Ok(Flow::Normal(None)),
        };

        Ok(Flow::Normal(Some(value)))
    }

    /// Runs statements in order in `scope`, stopping at the first `return`
    fn execute_block(&mut self, block: &Block, scope: ScopeId) -> Result<Flow> {
        for statement in &block.statements {
            if let Flow::Return(value) = self.evaluate(statement, scope)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal(None))
    }

    /// Evaluates a node that must produce a value
    fn eval_value(&mut self, node: &Node, scope: ScopeId) -> Result<Value> {
        match self.evaluate(node, scope)? {
            Flow::Normal(Some(value)) => Ok(value),
            _ => match node {
                Node::FunctionCall { name, .. } => Err(Error::type_error(format!(
                    "void function '{}' used as a value",
                    name
                ))),
                _ => Err(Error::type_error("statement used as a value")),
            },
        }
    }

    fn eval_condition(&mut self, condition: &Node, scope: ScopeId, keyword: &str) -> Result<bool> {
        match self.eval_value(condition, scope)? {
            Value::Int(n) => Ok(n != 0),
            other => Err(Error::type_error(format!(
                "condition of '{}' must be int, got {}",
                keyword,
                other.ty()
            ))),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Node, scope: ScopeId) -> Result<Value> {
        match (op, self.eval_value(operand, scope)?) {
            (UnaryOp::Not, Value::Int(n)) => Ok(Value::from_bool(n == 0)),
            (UnaryOp::Plus, Value::Int(n)) => Ok(Value::Int(n)),
            (UnaryOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
            (op, other) => Err(Error::type_error(format!(
                "unary '{}' requires int, got {}",
                op,
                other.ty()
            ))),
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Node,
        right: &Node,
        scope: ScopeId,
    ) -> Result<Value> {
        let left = self.eval_value(left, scope)?;
        let right = self.eval_value(right, scope)?;

        match (op, left, right) {
            (BinaryOp::Add, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(b))),
            (BinaryOp::Add, Value::Text(a), Value::Text(b)) => Ok(Value::Text(a + &b)),
            (BinaryOp::Add, Value::Text(a), Value::Int(b)) => {
                Ok(Value::Text(format!("{}{}", a, b)))
            }
            (BinaryOp::Add, Value::Int(a), Value::Text(b)) => {
                Ok(Value::Text(format!("{}{}", a, b)))
            }
            (BinaryOp::Sub, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(b))),
            (BinaryOp::Mul, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(b))),
            (BinaryOp::Div, Value::Int(_), Value::Int(0)) => Err(Error::DivisionByZero),
            // Truncates toward zero
            (BinaryOp::Div, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_div(b))),
            (op, left, right) => Err(Error::type_error(format!(
                "operation '{}' not allowed between {} and {}",
                op,
                left.ty(),
                right.ty()
            ))),
        }
    }

    fn eval_boolean(
        &mut self,
        op: BooleanOp,
        left: &Node,
        right: &Node,
        scope: ScopeId,
    ) -> Result<Value> {
        // Both sides always run
        let left = self.eval_value(left, scope)?.is_truthy();
        let right = self.eval_value(right, scope)?.is_truthy();

        Ok(Value::from_bool(match op {
            BooleanOp::And => left && right,
            BooleanOp::Or => left || right,
        }))
    }

    fn eval_relational(
        &mut self,
        op: RelationalOp,
        left: &Node,
        right: &Node,
        scope: ScopeId,
    ) -> Result<Value> {
        let left = self.eval_value(left, scope)?;
        let right = self.eval_value(right, scope)?;

        let result = match (&left, &right) {
            (Value::Int(a), Value::Int(b)) => op.compare(a, b),
            (Value::Text(a), Value::Text(b)) => op.compare(a.as_str(), b.as_str()),
            _ => {
                return Err(Error::type_error(format!(
                    "comparison '{}' not allowed between {} and {}",
                    op,
                    left.ty(),
                    right.ty()
                )))
            }
        };
        Ok(Value::from_bool(result))
    }

    fn eval_assign(&mut self, name: &str, kind: &AssignKind, scope: ScopeId) -> Result<Value> {
        match kind {
            AssignKind::Declare(ty) => {
                let value = ty.default_value();
                self.env.declare(scope, name, value.clone())?;
                Ok(value)
            }
            AssignKind::Set(expr) => {
                if matches!(**expr, Node::ScanInput) {
                    let target = self.env.get(scope, name)?.ty();
                    if target != Type::Int {
                        return Err(Error::type_error(format!(
                            "scanf() can only be assigned to int variables, but '{}' is {}",
                            name, target
                        )));
                    }
                }

                let value = self.eval_value(expr, scope)?;
                self.env.assign(scope, name, value.clone())?;
                Ok(value)
            }
        }
    }

    /// Blocks until one line of standard input is available and parses it as an integer
    fn read_int(&mut self) -> Result<Value> {
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let text = line.trim();

        text.parse::<i64>().map(Value::Int).map_err(|_| {
            Error::type_error(format!("scanf() expected int, got {:?}", text))
        })
    }

    /// Calls a globally declared function
    ///
    /// Arguments are evaluated in the caller's `scope`; the body runs in a
    /// fresh scope parented to the global scope. Returns `None` for void
    /// functions.
    fn call_function(
        &mut self,
        name: &str,
        args: &[Node],
        scope: ScopeId,
    ) -> Result<Option<Value>> {
        let global = self.env.global();
        let decl = self.env.get_function(global, name)?;

        if args.len() != decl.params.len() {
            return Err(Error::ArityError {
                name: name.to_string(),
                expected: decl.params.len(),
                got: args.len(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for (param, arg) in decl.params.iter().zip(args) {
            let value = self.eval_value(arg, scope)?;
            if value.ty() != param.ty {
                return Err(Error::type_error(format!(
                    "argument '{}' of '{}' expects {}, got {}",
                    param.name,
                    name,
                    param.ty,
                    value.ty()
                )));
            }
            values.push(value);
        }

        if self.call_depth >= self.config.max_call_depth {
            return Err(Error::RecursionLimit {
                name: name.to_string(),
                limit: self.config.max_call_depth,
            });
        }

        let local = self.env.enter_scope(global);
        self.call_depth += 1;
        tracing::debug!(
            function = name,
            args = values.len(),
            depth = self.call_depth,
            "calling function"
        );

        let outcome = self.execute_body(&decl, values, local);

        self.call_depth -= 1;
        self.env.exit_scope(local);

        let returned = match outcome? {
            Flow::Return(value) => Some(value),
            Flow::Normal(_) => None,
        };

        match decl.return_type {
            ReturnType::Void => Ok(None),
            ReturnType::Value(ty) => match returned {
                None => Ok(Some(ty.default_value())),
                Some(Some(value)) if value.ty() == ty => Ok(Some(value)),
                Some(Some(value)) => Err(Error::type_error(format!(
                    "function '{}' must return {}, returned {}",
                    name,
                    ty,
                    value.ty()
                ))),
                Some(None) => Err(Error::type_error(format!(
                    "function '{}' must return {}, returned nothing",
                    name, ty
                ))),
            },
        }
    }

    fn execute_body(
        &mut self,
        decl: &FunctionDecl,
        values: Vec<Value>,
        local: ScopeId,
    ) -> Result<Flow> {
        for (param, value) in decl.params.iter().zip(values) {
            self.env.declare(local, &param.name, value)?;
        }
        self.execute_block(&decl.body, local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;

    fn eval_with_input(source: &str, input: &str) -> Result<String> {
        let program = parse_program(source)?;
        let mut evaluator = Evaluator::with_io(input.as_bytes(), Vec::new());
        evaluator.run(&program)?;
        Ok(String::from_utf8(evaluator.into_output()).unwrap())
    }

    fn eval(source: &str) -> Result<String> {
        eval_with_input(source, "")
    }

    fn eval_expr(expr: &str) -> Result<Value> {
        let program = parse_program(&format!("x = {};", expr))?;
        let Some(Node::Assign {
            kind: AssignKind::Set(value),
            ..
        }) = program.block.statements.first()
        else {
            panic!("expected assignment");
        };
        let mut evaluator = Evaluator::with_io(&b""[..], Vec::new());
        let global = evaluator.env.global();
        evaluator.eval_value(value, global)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval_expr("1 + 2 * 3").unwrap(), Value::Int(7));
        assert_eq!(eval_expr("(1 + 2) * 3").unwrap(), Value::Int(9));
        assert_eq!(eval_expr("10 - 4 - 3").unwrap(), Value::Int(3));
        assert_eq!(eval_expr("-5 + +2").unwrap(), Value::Int(-3));
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        assert_eq!(eval_expr("7 / 2").unwrap(), Value::Int(3));
        assert_eq!(eval_expr("-7 / 2").unwrap(), Value::Int(-3));
        assert_eq!(eval_expr("7 / -2").unwrap(), Value::Int(-3));
        assert_eq!(eval_expr("-7 / -2").unwrap(), Value::Int(3));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval_expr("1 / 0"), Err(Error::DivisionByZero));
        assert_eq!(eval_expr("0 / (2 - 2)"), Err(Error::DivisionByZero));
    }

    #[test]
    fn test_concatenation_order() {
        assert_eq!(eval_expr("\"x\" + 1").unwrap(), Value::from("x1"));
        assert_eq!(eval_expr("1 + \"x\"").unwrap(), Value::from("1x"));
        assert_eq!(eval_expr("\"a\" + \"b\"").unwrap(), Value::from("ab"));
    }

    #[test]
    fn test_arithmetic_type_errors() {
        for expr in ["\"a\" - 1", "2 * \"b\"", "\"a\" / \"b\"", "-\"a\"", "!\"a\""] {
            assert!(
                matches!(eval_expr(expr), Err(Error::TypeError { .. })),
                "{} should be a type error",
                expr
            );
        }
    }

    #[test]
    fn test_not() {
        assert_eq!(eval_expr("!0").unwrap(), Value::Int(1));
        assert_eq!(eval_expr("!7").unwrap(), Value::Int(0));
    }

    #[test]
    fn test_boolean_ops() {
        assert_eq!(eval_expr("1 && 2").unwrap(), Value::Int(1));
        assert_eq!(eval_expr("1 && 0").unwrap(), Value::Int(0));
        assert_eq!(eval_expr("0 || 3").unwrap(), Value::Int(1));
        assert_eq!(eval_expr("0 || 0").unwrap(), Value::Int(0));
        assert_eq!(eval_expr("\"a\" && 1").unwrap(), Value::Int(1));
    }

    #[test]
    fn test_relational_ops() {
        assert_eq!(eval_expr("2 < 3").unwrap(), Value::Int(1));
        assert_eq!(eval_expr("3 <= 2").unwrap(), Value::Int(0));
        assert_eq!(eval_expr("\"abc\" < \"abd\"").unwrap(), Value::Int(1));
        assert_eq!(eval_expr("\"b\" >= \"a\"").unwrap(), Value::Int(1));
        assert_eq!(eval_expr("\"a\" == \"a\"").unwrap(), Value::Int(1));
        assert!(matches!(
            eval_expr("1 == \"1\""),
            Err(Error::TypeError { .. })
        ));
    }

    #[test]
    fn test_boolean_evaluates_both_sides() {
        let source = r#"
            int calls;
            int x;
            int touch() { calls = calls + 1; return 0; }
            x = touch() && touch();
            x = 1 || touch();
            print(calls);
        "#;
        assert_eq!(eval(source).unwrap(), "3\n");
    }

    #[test]
    fn test_print_echoes_values() {
        assert_eq!(eval("print(1 + 1); print(\"hi\");").unwrap(), "2\nhi\n");
    }

    #[test]
    fn test_if_else() {
        let source = "int x; x = 5; if (x > 3) { print(x); } else { print(0); }";
        assert_eq!(eval(source).unwrap(), "5\n");
        let source = "int x; x = 1; if (x > 3) { print(x); } else { print(0); }";
        assert_eq!(eval(source).unwrap(), "0\n");
    }

    #[test]
    fn test_while_countdown() {
        let source = "int n; n = 3; while (n > 0) { print(n); n = n - 1; }";
        assert_eq!(eval(source).unwrap(), "3\n2\n1\n");
    }

    #[test]
    fn test_non_int_condition() {
        assert!(matches!(
            eval("if (\"yes\") { print(1); }"),
            Err(Error::TypeError { .. })
        ));
        assert!(matches!(
            eval("while (\"\") { }"),
            Err(Error::TypeError { .. })
        ));
    }

    #[test]
    fn test_blocks_share_scope() {
        let source = "{ int x; x = 4; } print(x);";
        assert_eq!(eval(source).unwrap(), "4\n");
        let source = "int x; if (1) { int x; }";
        assert!(matches!(
            eval(source),
            Err(Error::DuplicateDeclaration { .. })
        ));
    }

    #[test]
    fn test_scanf() {
        let source = "int n; n = scanf(); print(n * 2);";
        assert_eq!(eval_with_input(source, "21\n").unwrap(), "42\n");
        assert_eq!(eval_with_input(source, "  -4  \n").unwrap(), "-8\n");
    }

    #[test]
    fn test_scanf_rejects_text() {
        let source = "int n; n = scanf();";
        assert!(matches!(
            eval_with_input(source, "abc\n"),
            Err(Error::TypeError { .. })
        ));
        assert!(matches!(
            eval_with_input(source, ""),
            Err(Error::TypeError { .. })
        ));
    }

    #[test]
    fn test_scanf_into_string_target() {
        let source = "string s; s = scanf();";
        let err = eval_with_input(source, "5\n").unwrap_err();
        assert!(err.to_string().contains("scanf() can only be assigned to int"));
    }

    #[test]
    fn test_domain_statements() {
        let source = r#"setup { frameSize = 100; threadColor = "red"; };
changeThread("blue");
drawLine(0, 0, 10, 10);"#;
        assert_eq!(
            eval(source).unwrap(),
            "Setup: frameSize=100, threadColor=red\n\
             Changing thread color to blue\n\
             Drawing line from (0, 0) to (10, 10)\n"
        );
    }

    #[test]
    fn test_entry_point_config() {
        let program =
            parse_program("void main() { print(1); } void start() { print(2); }").unwrap();

        let mut evaluator = Evaluator::with_io(&b""[..], Vec::new()).with_config(EvalConfig {
            entry_point: "start".to_string(),
            ..EvalConfig::default()
        });
        evaluator.run(&program).unwrap();
        assert_eq!(evaluator.output(), b"2\n");

        let mut evaluator = Evaluator::with_io(&b""[..], Vec::new()).with_config(EvalConfig {
            invoke_main: false,
            ..EvalConfig::default()
        });
        evaluator.run(&program).unwrap();
        assert!(evaluator.output().is_empty());
    }

    #[test]
    fn test_call_scope_is_released() {
        let program =
            parse_program("int f(int n) { int local; return n; } int r; r = f(3);").unwrap();
        let mut evaluator = Evaluator::with_io(&b""[..], Vec::new());
        evaluator.run(&program).unwrap();
        assert_eq!(evaluator.env().scope_depth(), 1);
    }

    fn run_with_depth(source: &str, max_call_depth: usize) -> Result<String> {
        let program = parse_program(source)?;
        let mut evaluator = Evaluator::with_io(&b""[..], Vec::new()).with_config(EvalConfig {
            max_call_depth,
            ..EvalConfig::default()
        });
        evaluator.run(&program)?;
        Ok(String::from_utf8(evaluator.into_output()).unwrap())
    }

    const COUNTDOWN: &str = "int down(int n) { if (n == 0) { return 0; } return down(n - 1); }";

    #[test]
    fn test_call_depth_limit_boundary() {
        // down(9) keeps ten calls active at once
        let source = format!("{} print(down(9));", COUNTDOWN);
        assert_eq!(run_with_depth(&source, 10).unwrap(), "0\n");

        let source = format!("{} print(down(10));", COUNTDOWN);
        assert_eq!(
            run_with_depth(&source, 10),
            Err(Error::RecursionLimit {
                name: "down".to_string(),
                limit: 10
            })
        );
    }

    #[test]
    fn test_call_depth_counts_entry_point() {
        let source = "void main() { inner(); } void inner() { }";
        assert!(matches!(
            run_with_depth(source, 1),
            Err(Error::RecursionLimit { .. })
        ));
        assert_eq!(run_with_depth(source, 2).unwrap(), "");
    }

    #[test]
    fn test_unbounded_recursion_fails_cleanly() {
        let program = parse_program("void spin() { spin(); } spin();").unwrap();
        let mut evaluator = Evaluator::with_io(&b""[..], Vec::new()).with_config(EvalConfig {
            max_call_depth: 50,
            ..EvalConfig::default()
        });
        assert!(matches!(
            evaluator.run(&program),
            Err(Error::RecursionLimit { limit: 50, .. })
        ));
        assert_eq!(evaluator.env().scope_depth(), 1);
    }
}
