//! Grouping: the open/close state machine
//!
//! Given a punctuator candidate and the current goal, grouping decides
//! whether the text closes the innermost open group, opens a new one, or is
//! an ordinary in-goal punctuator. Closing is always attempted before
//! opening for the same literal text, so a delimiter that could do either
//! always closes.
//!
//! Opening consults the grammar's delimiter tables in fixed precedence order
//! (span > quote > comment > closure), skipping kinds the active goal
//! disallows. Resolved groups are memoized per `(hint, opener)` so repeated
//! openers in the same lexical position share one descriptor; ordinary
//! punctuator roles are memoized per literal text. Both caches are private
//! to one run.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::context::{ContextStack, Group, GroupingFault};
use crate::grammar::{Grammar, GroupKind};
use crate::token::Punctuator;

/// Opening precedence between group kinds.
const OPEN_PRECEDENCE: [GroupKind; 4] = [
    GroupKind::Span,
    GroupKind::Quote,
    GroupKind::Comment,
    GroupKind::Closure,
];

/// The outcome of resolving one punctuator candidate.
#[derive(Debug)]
pub enum Resolved {
    /// A group opened; the new context is current.
    Opened {
        context: usize,
        group: Arc<Group>,
    },
    /// The innermost group closed; its parent is current again.
    Closed {
        context: usize,
        group: Option<Arc<Group>>,
    },
    /// An ordinary in-goal punctuator with a structural role.
    Punctuator(Punctuator),
    /// An ordinary token with no structural role (body text of a folding
    /// goal that happens to look like a symbol).
    Plain,
    /// A closer that does not match the innermost open group.
    Fault(GroupingFault),
}

/// Per-run grouping caches.
#[derive(Debug, Default)]
pub struct Grouping {
    groups: HashMap<(String, String), Arc<Group>>,
    punctuators: HashMap<String, Punctuator>,
}

impl Grouping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a punctuator candidate against the current context.
    pub fn resolve(
        &mut self,
        text: &str,
        grammar: &Grammar,
        stack: &mut ContextStack,
        hint: &str,
    ) -> Resolved {
        // Close always wins over open for the same text.
        if stack.closes_top(text) {
            match stack.pop(text) {
                Ok(context) => {
                    let group = stack.get(context).group.clone();
                    return Resolved::Closed { context, group };
                }
                Err(fault) => return Resolved::Fault(fault),
            }
        }

        if stack.current().goal.openers.contains(text) {
            if let Some(group) = self.group_for(text, grammar, stack, hint) {
                let context = stack.push(Arc::clone(&group));
                return Resolved::Opened { context, group };
            }
        }

        // Inside a folding goal, body symbols carry no structural role so
        // they stay eligible for folding. This covers stray closers too: a
        // `}` in a string is string text.
        if stack.current().goal.fold {
            return Resolved::Plain;
        }

        // A closer for an ancestor group, or a known closer with nothing
        // open: emit as a fault token of the current goal, never pop.
        if stack.closes_ancestor(text) || grammar.known_closers.contains(text) {
            let fault = GroupingFault {
                text: text.to_string(),
                expected: stack.top_closer().map(str::to_string),
                depth: stack.depth(),
            };
            debug!("grouping fault: {:?}", fault);
            return Resolved::Fault(fault);
        }

        // Goals may restrict which symbols carry a role inside them;
        // anything outside the set stays plain. Empty = unrestricted.
        let punctuators = &stack.current().goal.punctuators;
        if !punctuators.is_empty() && !punctuators.contains(text) {
            return Resolved::Plain;
        }

        Resolved::Punctuator(self.classify(text, grammar))
    }

    /// Find or build the group descriptor for an opener in this position.
    fn group_for(
        &mut self,
        text: &str,
        grammar: &Grammar,
        stack: &ContextStack,
        hint: &str,
    ) -> Option<Arc<Group>> {
        let key = (hint.to_string(), text.to_string());
        if let Some(group) = self.groups.get(&key) {
            return Some(Arc::clone(group));
        }

        let current = stack.current();
        let spans_allowed = current
            .group
            .as_ref()
            .map_or(false, |group| group.allow_spans);

        for kind in OPEN_PRECEDENCE {
            if kind == GroupKind::Span && !spans_allowed {
                continue;
            }
            if !current.goal.allows(kind) {
                continue;
            }
            let def = match grammar.defs_for(kind).get(text) {
                Some(def) => def,
                None => continue,
            };
            let goal = match kind {
                // Closures continue the enclosing goal.
                GroupKind::Closure => Arc::clone(&current.goal),
                _ => Arc::clone(grammar.goal_for(kind)?),
            };
            let punctuator = match kind {
                GroupKind::Span => Punctuator::Span,
                GroupKind::Quote => Punctuator::Quote,
                GroupKind::Comment => Punctuator::Comment,
                GroupKind::Closure => Punctuator::Opener,
            };
            let group = Arc::new(Group {
                opener: def.opener.clone(),
                closer: def.closer.clone(),
                kind,
                goal,
                punctuator,
                open: def.open,
                close: def.close,
                allow_spans: def.allow_spans,
            });
            self.groups.insert(key, Arc::clone(&group));
            return Some(group);
        }
        None
    }

    /// Fixed-precedence role lookup over the grammar's symbol tables,
    /// memoized per literal text.
    fn classify(&mut self, text: &str, grammar: &Grammar) -> Punctuator {
        if let Some(role) = self.punctuators.get(text) {
            return *role;
        }
        let role = if grammar.assigners.contains(text) {
            Punctuator::Assigner
        } else if grammar.combinators.contains(text) {
            Punctuator::Combinator
        } else if grammar.nonbreakers.contains(text) {
            Punctuator::Nonbreaker
        } else if grammar.breakers.contains(text) {
            Punctuator::Breaker
        } else {
            if !grammar.operators.contains(text) {
                debug!("symbol {:?} is in no punctuator table, taking the operator role", text);
            }
            Punctuator::Operator
        };
        self.punctuators.insert(text.to_string(), role);
        role
    }
}
