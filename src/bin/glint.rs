//! Command-line interface for glint
//!
//! Tokenizes a file (or stdin with `-`) with one of the registered grammars
//! and prints the stream in a chosen format.
//!
//! Usage:
//!   glint `<path>` [--syntax `<name>`] [--format table|json|summary]
//!   glint --list-syntaxes

use std::collections::BTreeMap;
use std::io::Read;

use clap::{Arg, ArgAction, Command};

use glint::{tokenize, GrammarRegistry, Options, Token};

fn main() {
    env_logger::init();

    let matches = Command::new("glint")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A grammar-driven tokenizer for syntax highlighting")
        .arg(
            Arg::new("path")
                .help("Path to the source file, or '-' for stdin")
                .required_unless_present("list-syntaxes")
                .index(1),
        )
        .arg(
            Arg::new("syntax")
                .long("syntax")
                .short('s')
                .help("Grammar to tokenize with")
                .default_value("ecmascript"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format: 'table', 'json', or 'summary'")
                .default_value("table"),
        )
        .arg(
            Arg::new("list-syntaxes")
                .long("list-syntaxes")
                .help("List registered grammars and exit")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let registry = GrammarRegistry::with_defaults().unwrap_or_else(|e| {
        eprintln!("Grammar error: {}", e);
        std::process::exit(1);
    });

    if matches.get_flag("list-syntaxes") {
        for name in registry.names() {
            println!("{}", name);
        }
        return;
    }

    let path = matches.get_one::<String>("path").unwrap();
    let syntax = matches.get_one::<String>("syntax").unwrap();
    let format = matches.get_one::<String>("format").unwrap();

    let source = read_source(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        std::process::exit(1);
    });

    let mut tokenizer = tokenize(&source, &Options::syntax(syntax), &registry).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let tokens: Vec<Token> = tokenizer.by_ref().collect();

    match format.as_str() {
        "table" => print_table(&tokens),
        "json" => print_json(&tokens),
        "summary" => print_summary(&tokens, tokenizer.depth()),
        other => {
            eprintln!("Unknown format: {}", other);
            std::process::exit(1);
        }
    }
}

fn read_source(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        std::fs::read_to_string(path)
    }
}

fn print_table(tokens: &[Token]) {
    for token in tokens {
        let role = token
            .punctuator
            .map(|p| format!("{}", p))
            .unwrap_or_default();
        println!(
            "{:>4}:{:<3} {:>2} {:<12} {:<10} {:?}",
            token.line,
            token.column,
            token.depth,
            token.kind.to_string(),
            role,
            token.text
        );
    }
}

fn print_json(tokens: &[Token]) {
    let output = serde_json::to_string_pretty(tokens).unwrap_or_else(|e| {
        eprintln!("Serialization error: {}", e);
        std::process::exit(1);
    });
    println!("{}", output);
}

fn print_summary(tokens: &[Token], depth: usize) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.kind.to_string()).or_default() += 1;
    }
    for (kind, count) in &counts {
        println!("{:<12} {}", kind, count);
    }
    println!("tokens       {}", tokens.len());
    if depth > 0 {
        println!("unterminated {}", depth);
    }
}
