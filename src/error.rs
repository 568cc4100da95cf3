//! Configuration errors
//!
//! The engine's error surface is deliberately tiny: everything that depends
//! on the *input text* is recovered in-band as `fault`-kinded tokens so a
//! consumer rendering a live stream never aborts mid-render. Only setup
//! mistakes (a syntax nobody registered, a grammar pattern that does not
//! compile) escape as hard errors, and they do so at `tokenize()` call time,
//! before any token is produced.

use thiserror::Error;

/// A setup or configuration error, surfaced before tokenization starts.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested syntax name is not present in the registry.
    #[error("unknown syntax `{0}`")]
    UnknownSyntax(String),

    /// A grammar pattern failed to compile.
    #[error("invalid pattern for `{grammar}`: {message}")]
    InvalidPattern { grammar: String, message: String },
}
