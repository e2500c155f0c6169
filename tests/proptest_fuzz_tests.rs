//! Property-based tests for the Pattern lexer, parser and evaluator
//!
//! These tests use proptest to generate random inputs and verify that:
//! 1. The lexer and parser never panic on arbitrary input
//! 2. Integer division truncates toward zero for every sign combination
//! 3. Concatenation and comparison follow their typing rules for any operands

use patternlang::{parse_program, run_with_io, tokenize, Error, Result};
use proptest::prelude::*;

fn run(source: &str) -> Result<String> {
    let output = run_with_io(source, &b""[..], Vec::new())?;
    Ok(String::from_utf8(output).expect("program output is UTF-8"))
}

/// Prints a single expression and returns the printed line
fn eval_printed(expr: &str) -> Result<String> {
    let output = run(&format!("print({});", expr))?;
    Ok(output.trim_end_matches('\n').to_string())
}

/// Source text for an integer; negatives go through unary minus
fn int_source(n: i64) -> String {
    if n < 0 {
        format!("(-{})", n.unsigned_abs())
    } else {
        n.to_string()
    }
}

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

/// Generate random strings that might break the lexer
fn arbitrary_source_string() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[\x00-\x7F]{0,300}").unwrap()
}

/// Generate token soup built from the language's own vocabulary
fn pattern_like_string() -> impl Strategy<Value = String> {
    prop::collection::vec(pattern_token(), 0..60).prop_map(|tokens| tokens.join(" "))
}

fn pattern_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("{".to_string()),
        Just("}".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        Just(";".to_string()),
        Just(",".to_string()),
        Just("=".to_string()),
        // Keywords
        Just("setup".to_string()),
        Just("frameSize".to_string()),
        Just("threadColor".to_string()),
        Just("drawLine".to_string()),
        Just("changeThread".to_string()),
        Just("if".to_string()),
        Just("else".to_string()),
        Just("while".to_string()),
        Just("print".to_string()),
        Just("return".to_string()),
        Just("int".to_string()),
        Just("string".to_string()),
        Just("void".to_string()),
        // Operators
        Just("+".to_string()),
        Just("-".to_string()),
        Just("*".to_string()),
        Just("/".to_string()),
        Just("!".to_string()),
        Just("&&".to_string()),
        Just("||".to_string()),
        Just("==".to_string()),
        Just("<=".to_string()),
        Just(">".to_string()),
        // Literals and names
        (0i64..1000).prop_map(|n| n.to_string()),
        r#""[a-z ]{0,10}""#.prop_map(|s| s),
        "[a-z][a-zA-Z0-9]{0,8}".prop_map(|s| s),
    ]
}

/// Relational operators
fn relational_op() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["==", "!=", "<", ">", "<=", ">="])
}

proptest! {
    /// The lexer should never panic on arbitrary input
    #[test]
    fn lexer_never_panics(source in arbitrary_source_string()) {
        let _ = tokenize(&source);
    }

    /// The parser should never panic on language-shaped token soup
    #[test]
    fn parser_never_panics(source in pattern_like_string()) {
        let _ = parse_program(&source);
    }

    /// Parser handles deeply nested parentheses
    #[test]
    fn parser_handles_deep_nesting(depth in 1usize..200) {
        let source = format!("print({}1{});", "(".repeat(depth), ")".repeat(depth));
        prop_assert!(parse_program(&source).is_ok());
    }

    /// Parser reports unbalanced braces as syntax errors
    #[test]
    fn parser_rejects_unbalanced_braces(opens in 0usize..20, closes in 0usize..20) {
        prop_assume!(opens != closes);
        let source = format!("{};{}", "{".repeat(opens), "}".repeat(closes));
        let is_syntax_error = matches!(parse_program(&source), Err(Error::SyntaxError { .. }));
        prop_assert!(is_syntax_error);
    }

    /// Division truncates toward zero for every sign combination
    #[test]
    fn division_truncates_toward_zero(a in -100_000i64..100_000, b in -1000i64..1000) {
        prop_assume!(b != 0);
        let printed = eval_printed(&format!("{} / {}", int_source(a), int_source(b))).unwrap();
        prop_assert_eq!(printed, (a / b).to_string());
    }

    /// Division by zero never produces a value
    #[test]
    fn division_by_zero_always_fails(a in -1_000_000_000_000i64..1_000_000_000_000) {
        let result = eval_printed(&format!("{} / 0", int_source(a)));
        prop_assert_eq!(result, Err(Error::DivisionByZero));
    }

    /// Mixed concatenation keeps operand order
    #[test]
    fn concatenation_keeps_operand_order(text in "[a-z]{0,12}", n in 0i64..1_000_000) {
        let left = eval_printed(&format!("\"{}\" + {}", text, n)).unwrap();
        prop_assert_eq!(left, format!("{}{}", text, n));

        let right = eval_printed(&format!("{} + \"{}\"", n, text)).unwrap();
        prop_assert_eq!(right, format!("{}{}", n, text));
    }

    /// Concatenation groups associatively
    #[test]
    fn concatenation_is_associative(a in "[a-z]{0,6}", b in "[a-z]{0,6}", c in "[a-z]{0,6}") {
        let flat = eval_printed(&format!("\"{}\" + \"{}\" + \"{}\"", a, b, c)).unwrap();
        let grouped = eval_printed(&format!("\"{}\" + (\"{}\" + \"{}\")", a, b, c)).unwrap();
        prop_assert_eq!(flat, grouped);
    }

    /// Comparing an int with a string fails for every relational operator
    #[test]
    fn cross_type_comparison_fails(op in relational_op(), n in 0i64..1000, text in "[a-z]{0,8}") {
        let int_first = eval_printed(&format!("{} {} \"{}\"", n, op, text));
        let is_type_error = matches!(int_first, Err(Error::TypeError { .. }));
        prop_assert!(is_type_error);

        let text_first = eval_printed(&format!("\"{}\" {} {}", text, op, n));
        let is_type_error = matches!(text_first, Err(Error::TypeError { .. }));
        prop_assert!(is_type_error);
    }

    /// Integer comparisons agree with Rust's ordering
    #[test]
    fn int_comparison_matches_ordering(a in -1000i64..1000, b in -1000i64..1000) {
        let expected = [a == b, a != b, a < b, a > b, a <= b, a >= b];
        for (op, want) in ["==", "!=", "<", ">", "<=", ">="].iter().zip(expected) {
            let expr = format!("{} {} {}", int_source(a), op, int_source(b));
            let printed = eval_printed(&expr).unwrap();
            prop_assert_eq!(printed, if want { "1" } else { "0" });
        }
    }

    /// Redeclaring a variable in the same scope always fails
    #[test]
    fn redeclaration_always_fails(
        name in "[a-z][a-zA-Z0-9]{0,8}",
        first in prop::bool::ANY,
        second in prop::bool::ANY
    ) {
        prop_assume!(!is_keyword(&name));
        let ty = |is_int: bool| if is_int { "int" } else { "string" };
        let source = format!("{} {}; {} {};", ty(first), name, ty(second), name);
        let is_duplicate = matches!(run(&source), Err(Error::DuplicateDeclaration { .. }));
        prop_assert!(is_duplicate);
    }

    /// A function-local declaration shadows a global of the same name
    #[test]
    fn function_local_shadows_global(
        name in "[a-z][a-zA-Z0-9]{0,8}",
        global in 0i64..100,
        local in 0i64..100
    ) {
        prop_assume!(!is_keyword(&name) && name != "f");
        let source = format!(
            "int {n}; {n} = {g}; \
             int f() {{ int {n}; {n} = {l}; return {n}; }} \
             print(f()); print({n});",
            n = name, g = global, l = local
        );
        prop_assert_eq!(run(&source).unwrap(), format!("{}\n{}\n", local, global));
    }
}

fn is_keyword(name: &str) -> bool {
    matches!(
        name,
        "setup" | "frameSize" | "threadColor" | "drawLine" | "changeThread" | "if" | "else"
            | "while" | "return" | "print" | "scanf" | "int" | "string" | "void"
    )
}
