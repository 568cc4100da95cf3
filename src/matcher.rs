//! Pattern matcher wrapper
//!
//! A [`Matcher`] wraps one compiled regex whose top-level alternatives are
//! each wrapped in a capture group, plus an ordered list of [`Entity`]
//! resolvers, one per capture group. Matching at an offset returns the span
//! that matched and the index of the single participating capture; the
//! driver resolves that entity to a token kind (a fixed tag, or a callback
//! that inspects the captured text and the in-flight match state).
//!
//! The matcher never looks behind and never re-scans: it always continues
//! from the end of the previous match (or a fast-forward target). When the
//! underlying regex skips text (a grammar whose alternatives do not cover
//! every character), the skipped gap is returned first as an entity-less
//! match so the token stream still covers the source byte for byte; the
//! driver tags such gaps as faults.

use std::ops::Range;

use regex::Regex;

use crate::construct::Construct;
use crate::context::Goal;
use crate::error::Error;
use crate::grammar::Grammar;
use crate::token::TokenKind;

/// State visible to entity hooks while a match is being resolved.
///
/// Hooks may record side effects here; the only one the engine acts on is
/// `punctuator_candidate`, which routes the match through the grouping state
/// machine.
pub struct MatchState<'a> {
    pub grammar: &'a Grammar,
    pub goal: &'a Goal,
    pub construct: &'a Construct,
    /// Set by the punctuation entity: this text may open, close, or be an
    /// ordinary in-goal punctuator, to be resolved by grouping.
    pub punctuator_candidate: bool,
}

/// Resolves one capture group of a matcher pattern.
pub type EntityHook = fn(&str, &mut MatchState<'_>) -> TokenKind;

/// One entity per capture group: a constant semantic tag, or a callback.
#[derive(Debug, Clone, Copy)]
pub enum Entity {
    Tag(TokenKind),
    Hook(EntityHook),
}

/// A raw match: the matched byte range and the participating capture group
/// index, if any. `entity: None` marks a gap the pattern did not cover.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatch {
    pub range: Range<usize>,
    pub entity: Option<usize>,
}

/// A compiled pattern plus its per-capture entities.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    entities: Vec<Entity>,
}

impl Matcher {
    /// Compile a matcher pattern. `entities` must have one element per
    /// top-level capture group, in order; nested groups must be
    /// non-capturing so that exactly one capture participates per match.
    pub fn new(grammar: &str, pattern: &str, entities: Vec<Entity>) -> Result<Self, Error> {
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidPattern {
            grammar: grammar.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { regex, entities })
    }

    /// Produce the next match at or after `at`. Returns `None` at end of
    /// input. A match that starts past `at` is split: the gap is returned
    /// first, entity-less, and the real match is found on the next call.
    pub fn find_at(&self, source: &str, at: usize) -> Option<RawMatch> {
        if at >= source.len() {
            return None;
        }
        let caps = match self.regex.captures_at(source, at) {
            Some(caps) => caps,
            // Nothing matches anywhere in the remainder: emit it as one gap.
            None => {
                return Some(RawMatch {
                    range: at..source.len(),
                    entity: None,
                })
            }
        };
        let whole = caps.get(0)?.range();
        if whole.start > at {
            return Some(RawMatch {
                range: at..whole.start,
                entity: None,
            });
        }

        let participating = (1..caps.len()).find(|&i| caps.get(i).is_some());
        #[cfg(debug_assertions)]
        {
            let count = (1..caps.len()).filter(|&i| caps.get(i).is_some()).count();
            debug_assert!(
                count <= 1,
                "matcher alternatives must be mutually exclusive; {} captures participated",
                count
            );
        }

        Some(RawMatch {
            range: whole,
            entity: participating.map(|i| i - 1),
        })
    }

    /// Look up the entity for a participating capture index.
    pub fn entity(&self, index: usize) -> Option<Entity> {
        self.entities.get(index).copied()
    }
}

/// Standard entity hooks shared by the bundled grammars.
pub mod entities {
    use super::MatchState;
    use crate::token::TokenKind;

    /// Resolve a word to keyword / identifier / plain word.
    ///
    /// A keyword is demoted to an identifier when the construct history says
    /// the word sits in a member position (for example after `.`), and a
    /// non-keyword word is only an identifier when it satisfies the
    /// grammar's identifier pattern.
    pub fn words(text: &str, state: &mut MatchState<'_>) -> TokenKind {
        if state.grammar.keywords.contains(text) && state.construct.allows_keyword() {
            return TokenKind::Keyword;
        }
        let looks_like_identifier = match &state.grammar.maybe_identifier {
            Some(pattern) => pattern.is_match(text),
            None => true,
        };
        if looks_like_identifier {
            TokenKind::Identifier
        } else {
            TokenKind::Word
        }
    }

    /// Mark the match as a punctuator candidate; grouping resolves the rest.
    pub fn punctuation(_text: &str, state: &mut MatchState<'_>) -> TokenKind {
        state.punctuator_candidate = true;
        TokenKind::Punctuation
    }
}
