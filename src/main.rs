//! Command-line front end for the translator.
//!
//! Usage:
//!   rexplain '<pattern>'                 - explain a pattern
//!   rexplain --string-syntax '"<lit>"'   - decode a quoted literal first
//!   rexplain --syntax-help               - describe dialect and vocabulary
//!
//! Reads the pattern from stdin when no argument is given.

use std::io::Read;
use std::process;

use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("rexplain")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate a backslash-escaped regexp into a readable tree")
        .arg(
            Arg::new("pattern")
                .help("The pattern to explain; read from stdin when omitted")
                .index(1),
        )
        .arg(
            Arg::new("string-syntax")
                .long("string-syntax")
                .help("Treat the input as a double-quoted string literal and decode it first")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("syntax-help")
                .long("syntax-help")
                .help("Describe the input dialect and the output vocabulary")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("syntax-help") {
        println!("{}", regex_explain::syntax_help());
        return;
    }

    let pattern = matches.get_one::<String>("pattern").cloned();
    if let Err(err) = run(pattern, matches.get_flag("string-syntax")) {
        eprintln!("rexplain: {err}");
        process::exit(1);
    }
}

fn run(pattern: Option<String>, string_syntax: bool) -> anyhow::Result<()> {
    let mut input = match pattern {
        Some(p) => p,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading pattern from stdin")?;
            buf
        }
    };

    // patterns read from stdin usually carry the shell's trailing newline
    if input.ends_with('\n') {
        input.pop();
    }

    if string_syntax {
        input = regex_explain::document::decode_string_literal(input.trim())
            .context("input is not a double-quoted string literal")?;
    }

    let rendered = regex_explain::explain(&input)?;
    println!("{rendered}");
    Ok(())
}
