//! Token construction, line tracking, and folding
//!
//! The builder turns a resolved match into a [`Token`], maintaining the
//! running line index and the offset just past the most recent line
//! terminator so line/column come out of two integers instead of a source
//! rescan. Break counting is a single pass over the matched text.
//!
//! Folding merges a new token into the immediately preceding one instead of
//! emitting it separately. It only applies inside goals that opt in via
//! `flatten`, never across a context boundary, and never to delimiters or
//! fault tokens: a run of unrecognized text must not masquerade as one
//! large valid token. When the goal also opts into `fold`, the merged token
//! takes the goal's default kind (this is how a comment opener and its body
//! become one `comment` token).
//!
//! A match whose text mixes inset and a trailing break is emitted as
//! matched; per-line segmentation belongs to a downstream consumer.

use crate::context::{Context, Goal};
use crate::token::{Punctuator, Token, TokenKind};

/// Count line terminators in one pass. `\r\n` counts once.
pub fn count_breaks(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => count += 1,
            b'\r' => {
                count += 1;
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    count
}

/// Running position state for one tokenizer run.
#[derive(Debug, Default)]
pub struct TokenBuilder {
    line: usize,
    /// Offset just past the most recent line terminator.
    last_break_end: usize,
    /// Leading whitespace of the current line.
    inset: String,
}

impl TokenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn last_break_end(&self) -> usize {
        self.last_break_end
    }

    /// Build a token for `text` at `offset` and advance the position state.
    pub fn build(
        &mut self,
        text: &str,
        offset: usize,
        kind: TokenKind,
        punctuator: Option<Punctuator>,
        context: &Context,
        hint: String,
    ) -> Token {
        let breaks = count_breaks(text);
        let column = offset.saturating_sub(self.last_break_end);

        // Whitespace at column zero is the line's inset.
        let kind = if kind == TokenKind::Whitespace && column == 0 {
            TokenKind::Inset
        } else {
            kind
        };
        let inset = if kind == TokenKind::Inset {
            text.to_string()
        } else {
            self.inset.clone()
        };

        let token = Token {
            text: text.to_string(),
            kind,
            punctuator,
            offset,
            line: self.line,
            column,
            inset,
            breaks,
            context_id: context.id.clone(),
            depth: context.depth,
            hint,
        };
        self.advance_over(text, offset);
        token
    }

    /// Advance the position state over `text` without building a token
    /// (used when a span is handed to a delegated sub-tokenizer).
    pub fn advance_over(&mut self, text: &str, offset: usize) {
        let breaks = count_breaks(text);
        if breaks > 0 {
            self.line += breaks;
            // Position just past the last terminator in the text. A bare
            // `\r` can follow a `\n`, so the later of the two wins; a `\r\n`
            // pair always ends on the `\n`.
            let last = match (text.rfind('\n'), text.rfind('\r')) {
                (Some(n), Some(r)) => Some(n.max(r)),
                (Some(n), None) => Some(n),
                (None, Some(r)) => Some(r),
                (None, None) => None,
            };
            if let Some(i) = last {
                self.last_break_end = offset + i + 1;
            }
            self.inset.clear();
        } else if offset == self.last_break_end && text.chars().all(|c| c == ' ' || c == '\t') {
            self.inset = text.to_string();
        }
    }
}

/// Whether `next` may merge into `prev` under `goal`'s folding rules.
pub fn can_fold(prev: &Token, next: &Token, goal: &Goal) -> bool {
    if !goal.flatten {
        return false;
    }
    if prev.context_id != next.context_id {
        return false;
    }
    if next.punctuator.is_some() {
        return false;
    }
    // The preceding token may be the group's own opening delimiter (a
    // comment body folds into its `//`), but never a closer.
    if !(prev.punctuator.is_none() || prev.opens_group()) {
        return false;
    }
    if prev.kind == TokenKind::Fault || next.kind == TokenKind::Fault {
        return false;
    }
    prev.kind == next.kind || goal.fold
}

/// Merge `next` into `prev` in place. Folding is an update, never a
/// replacement: the preceding token keeps its position fields.
pub fn fold(prev: &mut Token, next: Token, goal: &Goal) {
    debug_assert_eq!(
        prev.offset + prev.text.len(),
        next.offset,
        "folded tokens must be contiguous"
    );
    prev.text.push_str(&next.text);
    prev.breaks += next.breaks;
    if goal.fold {
        prev.kind = goal.kind;
    }
}
