//! The tokenizer driver
//!
//! A [`Tokenizer`] is a forward-only scan over one source string: repeatedly
//! match at the current offset, route punctuator candidates through
//! grouping, build the token, and yield it. It implements `Iterator`; one
//! `next()` performs driver steps until a token seals (folding means a token
//! is only final once its successor refuses to merge into it).
//!
//! After-effects requested by group hooks run after the triggering token:
//! fast-forward emits the skipped body as a single token of the group goal's
//! kind and resumes at the target; delegation tokenizes a sub-span with a
//! fresh driver over another grammar, rebases and re-hints the resulting
//! tokens, and splices them into the stream. A scan that fails to advance
//! the cursor ends the run, so every input yields a finite sequence.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, trace};

use crate::builder::{can_fold, fold, TokenBuilder};
use crate::construct::Construct;
use crate::context::{ContextStack, Goal, Group};
use crate::error::Error;
use crate::grammar::{After, Delegation, Grammar, GrammarRegistry, Options};
use crate::grouping::{Grouping, Resolved};
use crate::matcher::{Entity, MatchState};
use crate::token::{Punctuator, Token, TokenKind};

/// Tokenize `source` with the syntax named in `options`.
///
/// The returned tokenizer is lazy: no work happens until it is pulled.
/// Fails only for configuration mistakes; malformed input never errors, it
/// surfaces as in-band `fault` tokens.
pub fn tokenize<'s>(
    source: &'s str,
    options: &Options,
    registry: &GrammarRegistry,
) -> Result<Tokenizer<'s>, Error> {
    let grammar = registry
        .get(&options.syntax)
        .ok_or_else(|| Error::UnknownSyntax(options.syntax.clone()))?;
    Ok(Tokenizer::new(source, grammar, registry.clone()))
}

/// One lazy tokenization run. Not restartable: tokenizing again takes a
/// fresh instance. Safe to abandon at any point.
pub struct Tokenizer<'s> {
    source: &'s str,
    grammar: Arc<Grammar>,
    registry: GrammarRegistry,
    stack: ContextStack,
    grouping: Grouping,
    construct: Construct,
    builder: TokenBuilder,
    offset: usize,
    /// Running hint for the current goal lineage.
    hint: String,
    /// Fold buffer: the last built token, still open to merging.
    pending: Option<Token>,
    /// Sealed tokens waiting to be yielded (delegation splices here).
    queue: VecDeque<Token>,
    done: bool,
}

impl<'s> Tokenizer<'s> {
    fn new(source: &'s str, grammar: Arc<Grammar>, registry: GrammarRegistry) -> Self {
        let stack = ContextStack::new(&grammar.name, Arc::clone(&grammar.root_goal));
        let hint = stack.hint_of(0);
        Self {
            source,
            grammar,
            registry,
            stack,
            grouping: Grouping::new(),
            construct: Construct::new(),
            builder: TokenBuilder::new(),
            offset: 0,
            hint,
            pending: None,
            queue: VecDeque::new(),
            done: false,
        }
    }

    /// Current nesting depth. After exhaustion, a non-zero depth means the
    /// input ended with unterminated groups.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// The context arena and stack, for diagnostics.
    pub fn contexts(&self) -> &ContextStack {
        &self.stack
    }

    fn finish(&mut self) {
        if !self.done {
            self.done = true;
            debug!(
                "tokenizer done: offset {}, depth {}, root {:?}",
                self.offset,
                self.stack.depth(),
                self.stack.root().counters
            );
        }
    }

    /// Seal-or-fold one built token.
    fn emit(&mut self, token: Token, goal: &Goal) {
        trace!("token: {:?} {:?}", token.kind, token.text);
        if let Some(prev) = self.pending.as_mut() {
            if can_fold(prev, &token, goal) {
                fold(prev, token, goal);
                return;
            }
        }
        if let Some(prev) = self.pending.replace(token) {
            self.queue.push_back(prev);
        }
    }

    /// Seal the fold buffer unconditionally (delegation boundaries).
    fn flush_pending(&mut self) {
        if let Some(prev) = self.pending.take() {
            self.queue.push_back(prev);
        }
    }

    /// One match-resolve-build step. Pushes sealed tokens into the queue and
    /// may set `done`.
    fn step(&mut self) {
        let grammar = Arc::clone(&self.grammar);
        let raw = {
            let matcher = grammar.matcher_for(&self.stack.current().goal);
            match matcher.find_at(self.source, self.offset) {
                Some(raw) => raw,
                None => {
                    self.finish();
                    return;
                }
            }
        };
        if raw.range.end <= raw.range.start {
            // Non-advancing scan: treated as end of input, not an error.
            self.finish();
            return;
        }
        let text = &self.source[raw.range.clone()];
        self.stack.record_capture();

        let entity = {
            let matcher = grammar.matcher_for(&self.stack.current().goal);
            raw.entity.and_then(|index| matcher.entity(index))
        };
        let mut punctuator_candidate = false;
        let mut kind = match entity {
            // A gap no pattern alternative covered.
            None => TokenKind::Fault,
            Some(Entity::Tag(kind)) => kind,
            Some(Entity::Hook(hook)) => {
                let goal = Arc::clone(&self.stack.current().goal);
                let mut state = MatchState {
                    grammar: &grammar,
                    goal: &goal,
                    construct: &self.construct,
                    punctuator_candidate: false,
                };
                let kind = hook(text, &mut state);
                punctuator_candidate = state.punctuator_candidate;
                kind
            }
        };

        let mut role = None;
        let mut opened: Option<Arc<Group>> = None;
        let mut closed: Option<Arc<Group>> = None;
        let mut context_index = self.stack.current_index();

        // Breaks and other non-punctuator matches may still close a group
        // whose closer is a line terminator.
        if punctuator_candidate || self.stack.closes_top(text) {
            match self
                .grouping
                .resolve(text, &grammar, &mut self.stack, &self.hint)
            {
                Resolved::Opened { context, group } => {
                    // The opening delimiter belongs to the new context.
                    context_index = context;
                    role = Some(group.punctuator);
                    self.hint = self.stack.hint_of(self.stack.current_index());
                    opened = Some(group);
                }
                Resolved::Closed { context, group } => {
                    // The closing delimiter belongs to the closed context.
                    context_index = context;
                    role = Some(Punctuator::Closer);
                    self.hint = self.stack.hint_of(self.stack.current_index());
                    closed = group;
                }
                Resolved::Punctuator(punctuator) => role = Some(punctuator),
                Resolved::Plain => {}
                Resolved::Fault(_) => kind = TokenKind::Fault,
            }
        }

        let token_hint = self.stack.hint_of(context_index);
        let goal = Arc::clone(&self.stack.get(context_index).goal);
        let token = self.builder.build(
            text,
            raw.range.start,
            kind,
            role,
            self.stack.get(context_index),
            token_hint,
        );
        self.stack.record_token_at(context_index);
        self.offset = raw.range.end;
        self.construct.record(&token);
        self.emit(token, &goal);

        if let Some(group) = opened {
            if let Some(hook) = group.open {
                if let Some(after) = hook(self.source, self.offset, &group) {
                    self.apply_after(after, &group);
                }
            }
        }
        if let Some(group) = closed {
            if let Some(hook) = group.close {
                if let Some(after) = hook(self.source, self.offset, &group) {
                    self.apply_after(after, &group);
                }
            }
        }
    }

    fn apply_after(&mut self, after: After, group: &Group) {
        match after {
            After::FastForward(target) => self.fast_forward(target, group),
            After::Delegate(delegation) => self.delegate(delegation),
        }
    }

    /// Emit `[offset, target)` as one token of the group goal's kind and
    /// resume scanning at `target`.
    fn fast_forward(&mut self, target: usize, group: &Group) {
        if target <= self.offset || target > self.source.len() {
            return;
        }
        let text = &self.source[self.offset..target];
        debug!("fast-forward over {} bytes", text.len());
        let context_index = self.stack.current_index();
        let goal = Arc::clone(&self.stack.get(context_index).goal);
        let token = self.builder.build(
            text,
            self.offset,
            group.goal.kind,
            None,
            self.stack.get(context_index),
            self.hint.clone(),
        );
        self.stack.record_token_at(context_index);
        self.offset = target;
        self.emit(token, &goal);
    }

    /// Tokenize a sub-span with another grammar and splice the result.
    fn delegate(&mut self, delegation: Delegation) {
        let Delegation { range, syntax } = delegation;
        if range.start < self.offset || range.end > self.source.len() || range.start >= range.end {
            return;
        }
        let grammar = match self.registry.get(&syntax) {
            Some(grammar) => grammar,
            None => {
                // Unknown delegated syntax: keep the body as one token of
                // the current goal rather than dropping text.
                debug!("delegation to unknown syntax {:?}; emitting body", syntax);
                let context_index = self.stack.current_index();
                let goal = Arc::clone(&self.stack.get(context_index).goal);
                let text = &self.source[self.offset..range.end];
                let token = self.builder.build(
                    text,
                    self.offset,
                    goal.kind,
                    None,
                    self.stack.get(context_index),
                    self.hint.clone(),
                );
                self.stack.record_token_at(context_index);
                self.offset = range.end;
                self.emit(token, &goal);
                return;
            }
        };

        // Any gap between the trigger and the delegated span stays in the
        // outer stream so token texts still concatenate to the source.
        if range.start > self.offset {
            let context_index = self.stack.current_index();
            let goal = Arc::clone(&self.stack.get(context_index).goal);
            let text = &self.source[self.offset..range.start];
            let token = self.builder.build(
                text,
                self.offset,
                goal.kind,
                None,
                self.stack.get(context_index),
                self.hint.clone(),
            );
            self.stack.record_token_at(context_index);
            self.offset = range.start;
            self.emit(token, &goal);
        }

        debug!("delegating {}..{} to {}", range.start, range.end, syntax);
        self.flush_pending();

        let base_line = self.builder.line();
        let base_column = range.start.saturating_sub(self.builder.last_break_end());
        let outer_depth = self.stack.depth();
        let outer_id = self.stack.current().id.clone();
        let outer_hint = self.hint.clone();

        // A fully independent run: own context stack, own caches. Only the
        // spliced token order is shared.
        let inner = Tokenizer::new(&self.source[range.clone()], grammar, self.registry.clone());
        for mut token in inner {
            token.offset += range.start;
            if token.line == 0 {
                token.column += base_column;
            }
            token.line += base_line;
            token.depth += outer_depth;
            token.context_id = format!("{} {}", outer_id, token.context_id);
            token.hint = format!("{} {}", outer_hint, token.hint);
            self.queue.push_back(token);
        }

        self.builder
            .advance_over(&self.source[range.clone()], range.start);
        self.offset = range.end;
    }
}

impl<'s> Iterator for Tokenizer<'s> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.queue.pop_front() {
                return Some(token);
            }
            if self.done {
                return self.pending.take();
            }
            self.step();
        }
    }
}
