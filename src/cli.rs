//! Command-line argument parsing.
//!
//! Usage:
//!   patternlang [--no-main] [--entry NAME] [--dump-tokens|--dump-ast] FILE.pattern

use std::path::PathBuf;

use crate::runtime::EvalConfig;

/// Required extension of source files
pub const SOURCE_EXTENSION: &str = "pattern";

/// Usage line printed after argument errors
pub const USAGE: &str =
    "Usage: patternlang [--no-main] [--entry NAME] [--dump-tokens|--dump-ast] FILE.pattern";

/// Parsed command-line arguments.
#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    /// Source file to run.
    pub file: PathBuf,
    /// What to do with the file.
    pub mode: Mode,
    /// Skip calling the entry point (`--no-main`).
    pub no_main: bool,
    /// Entry-point override (`--entry NAME`).
    pub entry: Option<String>,
}

/// What the binary does with the source file.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Mode {
    /// Parse and evaluate (default).
    #[default]
    Run,
    /// Print the token stream as JSON (`--dump-tokens`).
    DumpTokens,
    /// Print the AST as JSON (`--dump-ast`).
    DumpAst,
}

impl CliArgs {
    /// Evaluator configuration selected by the flags
    pub fn eval_config(&self) -> EvalConfig {
        let mut config = EvalConfig {
            invoke_main: !self.no_main,
            ..EvalConfig::default()
        };
        if let Some(entry) = &self.entry {
            config.entry_point = entry.clone();
        }
        config
    }
}

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            positional.extend(argv[i + 1..].iter().cloned());
            break;
        }

        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        match arg {
            "--no-main" => args.no_main = true,
            "--dump-tokens" => args.mode = set_mode(args.mode, Mode::DumpTokens)?,
            "--dump-ast" => args.mode = set_mode(args.mode, Mode::DumpAst)?,
            "--entry" => {
                i += 1;
                let name = argv
                    .get(i)
                    .ok_or_else(|| "--entry requires a function name".to_owned())?;
                args.entry = Some(name.clone());
            }
            _ => {
                if let Some(name) = arg.strip_prefix("--entry=") {
                    args.entry = Some(name.to_owned());
                } else {
                    return Err(format!("unknown option: {arg}"));
                }
            }
        }
        i += 1;
    }

    match positional.len() {
        0 => return Err("missing source file".to_owned()),
        1 => args.file = PathBuf::from(positional.remove(0)),
        n => return Err(format!("too many arguments ({n})")),
    }

    if args.file.extension().and_then(|ext| ext.to_str()) != Some(SOURCE_EXTENSION) {
        return Err(format!(
            "source file must have a .{} extension: {}",
            SOURCE_EXTENSION,
            args.file.display()
        ));
    }

    Ok(args)
}

fn set_mode(current: Mode, requested: Mode) -> Result<Mode, String> {
    if current != Mode::Run && current != requested {
        return Err("--dump-tokens and --dump-ast are mutually exclusive".to_owned());
    }
    Ok(requested)
}
