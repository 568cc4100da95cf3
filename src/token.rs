//! Token types emitted by the tokenizer
//!
//! A [`Token`] is the unit of output of the engine: a span of source text plus
//! its semantic tag, structural role, and position bookkeeping. Tokens are
//! immutable once yielded to the consumer; the only mutation they ever see is
//! in-place folding inside the driver, before emission (see the builder
//! module).
//!
//! The `kind` field carries the semantic tag used for styling ("keyword",
//! "comment", ...). The `punctuator` field carries the structural role of
//! delimiter-ish tokens (opener, closer, operator, ...). The two are
//! independent axes: an opening brace has `kind = Punctuation` and
//! `punctuator = Some(Opener)`.

use serde::Serialize;

/// The semantic tag of a token.
///
/// Grammars pick a default kind per goal (a comment goal defaults to
/// `Comment`, a string goal to `Quote`); matcher entities resolve more
/// specific kinds per capture (keyword, identifier, number, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Plain text with no more specific classification
    Text,
    /// Horizontal whitespace (spaces, tabs)
    Whitespace,
    /// Leading whitespace of a line
    Inset,
    /// A line terminator (`\n`, `\r\n`, `\r`)
    Break,
    /// A word that is neither keyword nor identifier in the active syntax
    Word,
    /// A reserved word of the active syntax
    Keyword,
    /// An identifier per the syntax's identifier pattern
    Identifier,
    /// A numeric literal
    Number,
    /// A structural symbol (delimiters, operators); see [`Punctuator`]
    Punctuation,
    /// Body text of a quoted construct
    Quote,
    /// Body text of a comment construct
    Comment,
    /// Body text of a literal construct (fenced blocks, pattern literals)
    Literal,
    /// A matched span with no specific entity (catch-all alternative)
    Sequence,
    /// In-band recovery tag: text no grammar rule accounts for, or a
    /// delimiter that does not close the innermost open group
    Fault,
}

impl TokenKind {
    /// Whether this kind is pure layout (no semantic content of its own).
    pub fn is_whitespace(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Inset | TokenKind::Break
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Text => "text",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Inset => "inset",
            TokenKind::Break => "break",
            TokenKind::Word => "word",
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Quote => "quote",
            TokenKind::Comment => "comment",
            TokenKind::Literal => "literal",
            TokenKind::Sequence => "sequence",
            TokenKind::Fault => "fault",
        };
        write!(f, "{}", name)
    }
}

/// The structural role of a punctuator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Punctuator {
    /// Opens a nested group (`{`, `(`, `[`)
    Opener,
    /// Closes the innermost open group
    Closer,
    /// Plain operator (`+`, `*`, `!`)
    Operator,
    /// Assignment-like operator (`=`, `+=`)
    Assigner,
    /// Joins constructs without separating statements (`=>`, `.`)
    Combinator,
    /// Separates statements or clauses (`;`, `,`)
    Breaker,
    /// Binds tighter than a breaker despite similar shape (`:` in some goals)
    Nonbreaker,
    /// Opens an interpolation span inside a quoted goal (`${`)
    Span,
    /// Quote delimiter opening a string goal
    Quote,
    /// Comment delimiter opening a comment goal
    Comment,
}

impl std::fmt::Display for Punctuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Punctuator::Opener => "opener",
            Punctuator::Closer => "closer",
            Punctuator::Operator => "operator",
            Punctuator::Assigner => "assigner",
            Punctuator::Combinator => "combinator",
            Punctuator::Breaker => "breaker",
            Punctuator::Nonbreaker => "nonbreaker",
            Punctuator::Span => "span",
            Punctuator::Quote => "quote",
            Punctuator::Comment => "comment",
        };
        write!(f, "{}", name)
    }
}

/// One emitted token.
///
/// Positions are byte-based: `offset` into the source, `line` counted from 0,
/// `column` as byte distance from the last line break. `inset` is the leading
/// whitespace of the token's line, captured for consumers that re-indent or
/// segment output per line. `breaks` counts line terminators spanned by
/// `text` itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub punctuator: Option<Punctuator>,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub inset: String,
    pub breaks: usize,
    /// Human-readable id of the owning context (derived from the parent chain)
    pub context_id: String,
    /// Nesting depth of the owning context (root = 0)
    pub depth: usize,
    /// Goal lineage joined with spaces, plus an `in-<goal>` suffix when nested
    pub hint: String,
}

impl Token {
    /// Whether this token opened a group (any opener role, including quote
    /// and comment delimiters in opening position).
    pub fn opens_group(&self) -> bool {
        matches!(
            self.punctuator,
            Some(Punctuator::Opener)
                | Some(Punctuator::Span)
                | Some(Punctuator::Quote)
                | Some(Punctuator::Comment)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(format!("{}", TokenKind::Keyword), "keyword");
        assert_eq!(format!("{}", TokenKind::Fault), "fault");
        assert_eq!(format!("{}", TokenKind::Break), "break");
    }

    #[test]
    fn test_punctuator_display() {
        assert_eq!(format!("{}", Punctuator::Opener), "opener");
        assert_eq!(format!("{}", Punctuator::Nonbreaker), "nonbreaker");
    }

    #[test]
    fn test_whitespace_kinds() {
        assert!(TokenKind::Whitespace.is_whitespace());
        assert!(TokenKind::Break.is_whitespace());
        assert!(TokenKind::Inset.is_whitespace());
        assert!(!TokenKind::Comment.is_whitespace());
    }
}
