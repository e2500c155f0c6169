//! Runs a Pattern source file.
//!
//! Usage: patternlang [--no-main] [--entry NAME] [--dump-tokens|--dump-ast] FILE.pattern

use std::fs;
use std::process;

use anyhow::Context;
use patternlang::cli::{self, CliArgs, Mode};
use patternlang::{parse_program, run_with_config, strip_comments, tokenize};

fn main() {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("patternlang: {err}");
            eprintln!("{}", cli::USAGE);
            process::exit(1);
        }
    };

    if let Err(err) = execute(&args) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn execute(args: &CliArgs) -> anyhow::Result<()> {
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read '{}'", args.file.display()))?;

    match args.mode {
        Mode::DumpTokens => {
            let tokens = tokenize(&strip_comments(&source))?;
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        }
        Mode::DumpAst => {
            let program = parse_program(&source)?;
            println!("{}", serde_json::to_string_pretty(&program)?);
        }
        Mode::Run => run_with_config(&source, args.eval_config())?,
    }

    Ok(())
}
