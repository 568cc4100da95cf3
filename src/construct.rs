//! Rolling construct history
//!
//! A short ordered list of the most recent significant tokens in the current
//! statement, used to disambiguate keyword-vs-identifier positions (a word
//! after `.` is a member access, never a keyword). Rebuilt additively per
//! token and reset on statement-terminating punctuation.

use crate::token::{Token, TokenKind};

/// How many recent texts to retain; older entries fall off the front.
const HISTORY: usize = 8;

#[derive(Debug, Default)]
pub struct Construct {
    texts: Vec<String>,
}

impl Construct {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an emitted token. Layout and comment tokens are not
    /// significant (line breaks never reset the history); `;` terminates
    /// the running statement at any depth, `,` only at the top level
    /// (nested commas are argument or element separators, not statement
    /// boundaries).
    pub fn record(&mut self, token: &Token) {
        if token.kind.is_whitespace() || token.kind == TokenKind::Comment {
            return;
        }
        if token.text == ";" || (token.text == "," && token.depth == 0) {
            self.reset();
            return;
        }
        if self.texts.len() == HISTORY {
            self.texts.remove(0);
        }
        self.texts.push(token.text.clone());
    }

    pub fn reset(&mut self) {
        self.texts.clear();
    }

    pub fn previous_text(&self) -> Option<&str> {
        self.texts.last().map(String::as_str)
    }

    /// Whether a keyword may be recognized at the current position.
    pub fn allows_keyword(&self) -> bool {
        self.previous_text() != Some(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Punctuator;

    fn token(text: &str, kind: TokenKind) -> Token {
        Token {
            text: text.to_string(),
            kind,
            punctuator: if text == "." {
                Some(Punctuator::Combinator)
            } else {
                None
            },
            offset: 0,
            line: 0,
            column: 0,
            inset: String::new(),
            breaks: 0,
            context_id: "test".to_string(),
            depth: 0,
            hint: "test".to_string(),
        }
    }

    #[test]
    fn test_keyword_blocked_after_member_access() {
        let mut construct = Construct::new();
        construct.record(&token("obj", TokenKind::Identifier));
        assert!(construct.allows_keyword());
        construct.record(&token(".", TokenKind::Punctuation));
        assert!(!construct.allows_keyword());
    }

    #[test]
    fn test_statement_terminator_resets() {
        let mut construct = Construct::new();
        construct.record(&token(".", TokenKind::Punctuation));
        construct.record(&token(";", TokenKind::Punctuation));
        assert_eq!(construct.previous_text(), None);
        assert!(construct.allows_keyword());
    }

    #[test]
    fn test_nested_comma_does_not_reset() {
        let mut construct = Construct::new();
        construct.record(&token("f", TokenKind::Identifier));

        let mut comma = token(",", TokenKind::Punctuation);
        comma.depth = 1;
        construct.record(&comma);
        // The argument separator is recorded, not a statement boundary.
        assert_eq!(construct.previous_text(), Some(","));

        construct.record(&token(",", TokenKind::Punctuation));
        assert_eq!(construct.previous_text(), None);
    }

    #[test]
    fn test_layout_tokens_ignored() {
        let mut construct = Construct::new();
        construct.record(&token(".", TokenKind::Punctuation));
        construct.record(&token(" ", TokenKind::Whitespace));
        construct.record(&token("\n", TokenKind::Break));
        assert_eq!(construct.previous_text(), Some("."));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut construct = Construct::new();
        for i in 0..32 {
            construct.record(&token(&format!("t{}", i), TokenKind::Identifier));
        }
        assert_eq!(construct.previous_text(), Some("t31"));
    }
}
