//! Goals, groups, and the context stack
//!
//! A [`Goal`] is an immutable grammar sub-mode (top-level code, string body,
//! comment body, interpolation span); a [`Group`] is an immutable delimiter
//! pair that switches into a goal when opened. Both are defined once per
//! grammar and shared by reference.
//!
//! A [`Context`] is one live activation of a goal. Contexts form a tree via
//! parent references, but ownership is flat: all contexts live in an
//! append-only arena inside the [`ContextStack`] and refer to their parent by
//! index, never by pointer. The stack proper tracks only the currently open
//! nested contexts, alongside a parallel list of their closer strings for a
//! fast "does this text close anything open" test.
//!
//! Invariants:
//! - the root context exists exactly once per run, at depth 0, with no parent
//! - a context's depth is its parent's depth plus one
//! - the stack length always equals the current context's depth
//! - closing pops only from the top; a close request that does not match the
//!   top closer is a grouping fault, never a silent no-op

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use crate::grammar::{GroupHook, GroupKind};
use crate::token::{Punctuator, TokenKind};

/// An immutable grammar sub-mode descriptor.
#[derive(Debug)]
pub struct Goal {
    pub name: String,
    /// Default token kind inside this goal; also the fold target.
    pub kind: TokenKind,
    /// The construct kind this goal tokenizes the inside of; `None` for the
    /// top-level goal. Gates which group kinds may open while active.
    pub group_kind: Option<GroupKind>,
    /// Punctuator texts meaningful inside this goal. Empty = unrestricted.
    pub punctuators: HashSet<String>,
    /// Opener texts this goal recognizes. Empty = nothing opens here.
    pub openers: HashSet<String>,
    /// May adjacent same-kind tokens merge.
    pub flatten: bool,
    /// May merged tokens take on this goal's default kind.
    pub fold: bool,
}

impl Goal {
    /// Whether a group of `kind` may open while this goal is active.
    /// Precedence between allowed kinds is grouping's concern; this only
    /// rules kinds out (no new quote inside a comment, only interpolation
    /// spans inside a quote).
    pub fn allows(&self, kind: GroupKind) -> bool {
        match self.group_kind {
            None | Some(GroupKind::Closure) | Some(GroupKind::Span) => true,
            Some(GroupKind::Quote) => kind == GroupKind::Span,
            Some(GroupKind::Comment) => false,
        }
    }
}

/// An immutable delimiter-pair descriptor.
#[derive(Debug, Clone)]
pub struct Group {
    pub opener: String,
    pub closer: String,
    pub kind: GroupKind,
    /// The goal entered when this group opens.
    pub goal: Arc<Goal>,
    /// Declared role of the opening delimiter.
    pub punctuator: Punctuator,
    /// Invoked right after the group opens; may fast-forward past the body
    /// or delegate a sub-span to another grammar.
    pub open: Option<GroupHook>,
    /// Invoked right after the group closes.
    pub close: Option<GroupHook>,
    /// Whether interpolation spans may open inside this group.
    pub allow_spans: bool,
}

/// Per-context counters, folded into the parent when the context closes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub tokens: usize,
    pub captures: usize,
    pub nested_tokens: usize,
    pub nested_captures: usize,
    pub nested_contexts: usize,
}

/// One live, nested activation of a goal.
#[derive(Debug)]
pub struct Context {
    /// Human-readable id derived from the parent chain.
    pub id: String,
    /// Run-wide sequence number (root = 0).
    pub number: usize,
    pub depth: usize,
    /// Arena index of the parent; `None` only for the root.
    pub parent: Option<usize>,
    pub goal: Arc<Goal>,
    /// The group that opened this context; `None` only for the root.
    pub group: Option<Arc<Group>>,
    pub counters: Counters,
}

/// A close request that does not match the innermost open group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingFault {
    pub text: String,
    pub expected: Option<String>,
    pub depth: usize,
}

/// The arena of contexts plus the stack of currently open ones.
pub struct ContextStack {
    arena: Vec<Context>,
    /// Arena indices of open nested contexts; excludes the root.
    stack: Vec<usize>,
    /// Closer strings parallel to `stack`.
    closers: Vec<String>,
    sequence: usize,
}

impl ContextStack {
    /// Create the stack with its root context, which lives for the whole run.
    pub fn new(syntax: &str, root_goal: Arc<Goal>) -> Self {
        let root = Context {
            id: syntax.to_string(),
            number: 0,
            depth: 0,
            parent: None,
            goal: root_goal,
            group: None,
            counters: Counters::default(),
        };
        Self {
            arena: vec![root],
            stack: Vec::new(),
            closers: Vec::new(),
            sequence: 0,
        }
    }

    /// Current nesting depth; equals the current context's depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current_index(&self) -> usize {
        self.stack.last().copied().unwrap_or(0)
    }

    pub fn current(&self) -> &Context {
        &self.arena[self.current_index()]
    }

    pub fn get(&self, index: usize) -> &Context {
        &self.arena[index]
    }

    pub fn root(&self) -> &Context {
        &self.arena[0]
    }

    pub fn top_closer(&self) -> Option<&str> {
        self.closers.last().map(String::as_str)
    }

    /// Whether `text` closes the innermost open group. A group closed by a
    /// line break accepts any line terminator.
    pub fn closes_top(&self, text: &str) -> bool {
        match self.top_closer() {
            Some("\n") => matches!(text, "\n" | "\r\n" | "\r"),
            Some(closer) => closer == text,
            None => false,
        }
    }

    /// Whether `text` closes the innermost group or any ancestor group.
    pub fn closes_ancestor(&self, text: &str) -> bool {
        self.closers.iter().any(|closer| closer == text)
    }

    /// Open a nested context for `group` and make it current.
    pub fn push(&mut self, group: Arc<Group>) -> usize {
        let parent = self.current_index();
        self.sequence += 1;
        let number = self.sequence;
        let depth = self.stack.len() + 1;
        let id = format!("{} {}#{}", self.arena[parent].id, group.goal.name, number);
        debug!("context open: {} (closer {:?})", id, group.closer);

        self.arena[parent].counters.nested_contexts += 1;
        let index = self.arena.len();
        self.closers.push(group.closer.clone());
        self.arena.push(Context {
            id,
            number,
            depth,
            parent: Some(parent),
            goal: Arc::clone(&group.goal),
            group: Some(group),
            counters: Counters::default(),
        });
        self.stack.push(index);
        index
    }

    /// Close the innermost context if `text` matches its closer, folding its
    /// counters into the parent. Returns the closed context's arena index.
    pub fn pop(&mut self, text: &str) -> Result<usize, GroupingFault> {
        if !self.closes_top(text) {
            return Err(GroupingFault {
                text: text.to_string(),
                expected: self.top_closer().map(str::to_string),
                depth: self.depth(),
            });
        }
        // closes_top implies the stack is non-empty
        let index = match self.stack.pop() {
            Some(index) => index,
            None => {
                return Err(GroupingFault {
                    text: text.to_string(),
                    expected: None,
                    depth: 0,
                })
            }
        };
        self.closers.pop();

        let child = self.arena[index].counters;
        let parent = self.arena[index].parent.unwrap_or(0);
        let counters = &mut self.arena[parent].counters;
        counters.nested_tokens += child.tokens + child.nested_tokens;
        counters.nested_captures += child.captures + child.nested_captures;
        counters.nested_contexts += child.nested_contexts;
        debug!("context close: {}", self.arena[index].id);
        Ok(index)
    }

    pub fn record_token(&mut self) {
        let index = self.current_index();
        self.arena[index].counters.tokens += 1;
    }

    pub fn record_token_at(&mut self, index: usize) {
        self.arena[index].counters.tokens += 1;
    }

    pub fn record_capture(&mut self) {
        let index = self.current_index();
        self.arena[index].counters.captures += 1;
    }

    /// The descriptive hint for a context: active goal names from the root
    /// down (an ordered set, first occurrence wins), plus an `in-<goal>`
    /// suffix when nested. Purely metadata, never control flow.
    pub fn hint_of(&self, index: usize) -> String {
        let mut chain = Vec::new();
        let mut cursor = Some(index);
        while let Some(ix) = cursor {
            chain.push(ix);
            cursor = self.arena[ix].parent;
        }
        let mut names: Vec<&str> = Vec::new();
        for ix in chain.iter().rev() {
            let name = self.arena[*ix].goal.name.as_str();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        let mut hint = names.join(" ");
        let context = &self.arena[index];
        if context.depth > 0 {
            hint.push_str(&format!(" in-{}", context.goal.name));
        }
        hint
    }
}
