//! glint: a grammar-driven tokenizer for syntax highlighting
//!
//! A forward-only, lazy lexer built around grammars rather than hand-written
//! scanners. A grammar describes matcher patterns, keyword and punctuator
//! tables, and delimiter pairs (comments, quotes, closures, interpolation
//! spans); the engine handles nesting, folding, line/column tracking, and
//! fault recovery uniformly for every grammar.
//!
//! Tokenization is total: any input yields a finite token stream whose texts
//! concatenate back to the source byte for byte. Malformed input never
//! errors; unrecognized text and mismatched delimiters surface as in-band
//! `fault` tokens and unterminated groups simply leave the tokenizer at a
//! non-zero depth.
//!
//! ```no_run
//! use glint::{tokenize, GrammarRegistry, Options};
//!
//! let registry = GrammarRegistry::with_defaults()?;
//! for token in tokenize("const x = 1;", &Options::default(), &registry)? {
//!     println!("{:?} {:?}", token.kind, token.text);
//! }
//! # Ok::<(), glint::Error>(())
//! ```

pub mod builder;
pub mod construct;
pub mod context;
pub mod driver;
pub mod error;
pub mod grammar;
pub mod grammars;
pub mod grouping;
pub mod matcher;
pub mod token;

pub use driver::{tokenize, Tokenizer};
pub use error::Error;
pub use grammar::{
    After, Delegation, Grammar, GrammarBuilder, GrammarRegistry, GroupDef, GroupKind, Options,
};
pub use matcher::{Entity, Matcher};
pub use token::{Punctuator, Token, TokenKind};
