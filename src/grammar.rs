//! Grammar tables and the syntax registry
//!
//! A [`Grammar`] is the immutable, registration-time description of one
//! syntax: its matcher patterns, keyword and punctuator sets, and the
//! delimiter tables (comments, quotes, closures, interpolation spans) the
//! grouping state machine draws groups from. Grammars are built once, shared
//! by `Arc`, and never mutated during a run; all per-run caches live in the
//! driver.
//!
//! There is no process-wide registry: callers own a [`GrammarRegistry`] and
//! pass it to `tokenize` explicitly, together with [`Options`] naming the
//! syntax to use.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::Arc;

use regex::Regex;

use crate::context::{Goal, Group};
use crate::error::Error;
use crate::matcher::Matcher;
use crate::token::TokenKind;

/// The four kinds of delimiter group a grammar can define, in opening
/// precedence order: span > quote > comment > closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    Span,
    Quote,
    Comment,
    Closure,
}

/// What the driver does after the token that triggered a group hook.
#[derive(Debug, Clone, PartialEq)]
pub enum After {
    /// Resume scanning at this offset; the skipped body is emitted as a
    /// single token of the group goal's kind.
    FastForward(usize),
    /// Tokenize a sub-span with another grammar and splice the result.
    Delegate(Delegation),
}

/// A delegated sub-tokenization: the byte range to hand off and the syntax
/// to tokenize it with. Scanning resumes at `range.end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Delegation {
    pub range: Range<usize>,
    pub syntax: String,
}

/// A group open/close hook: receives the whole source, the offset just past
/// the triggering delimiter, and the group descriptor.
pub type GroupHook = fn(&str, usize, &Group) -> Option<After>;

/// One delimiter-pair entry in a grammar table.
#[derive(Debug, Clone)]
pub struct GroupDef {
    pub opener: String,
    pub closer: String,
    pub open: Option<GroupHook>,
    pub close: Option<GroupHook>,
    pub allow_spans: bool,
}

impl GroupDef {
    pub fn pair(opener: &str, closer: &str) -> Self {
        Self {
            opener: opener.to_string(),
            closer: closer.to_string(),
            open: None,
            close: None,
            allow_spans: false,
        }
    }

    pub fn on_open(mut self, hook: GroupHook) -> Self {
        self.open = Some(hook);
        self
    }

    pub fn on_close(mut self, hook: GroupHook) -> Self {
        self.close = Some(hook);
        self
    }

    pub fn with_spans(mut self) -> Self {
        self.allow_spans = true;
        self
    }
}

/// The immutable description of one syntax.
pub struct Grammar {
    pub name: String,
    /// Top-level matcher, also the fallback for goals without an override.
    pub matcher: Matcher,
    /// Per-goal override matchers, keyed by the goal's group kind.
    pub goal_matchers: HashMap<GroupKind, Matcher>,
    pub keywords: HashSet<String>,
    pub assigners: HashSet<String>,
    pub combinators: HashSet<String>,
    pub operators: HashSet<String>,
    pub nonbreakers: HashSet<String>,
    pub breakers: HashSet<String>,
    pub comments: HashMap<String, GroupDef>,
    pub quotes: HashMap<String, GroupDef>,
    pub closures: HashMap<String, GroupDef>,
    /// Interpolation spans, openable only inside groups built `with_spans`.
    pub spans: HashMap<String, GroupDef>,
    /// Does this word look like an identifier in this syntax.
    pub maybe_identifier: Option<Regex>,
    pub root_goal: Arc<Goal>,
    /// Shared body goals per group kind (closures reuse the enclosing goal).
    goals: HashMap<GroupKind, Arc<Goal>>,
    /// All closer texts of closure/span groups, for stray-closer detection.
    pub known_closers: HashSet<String>,
}

impl Grammar {
    pub fn builder(name: &str) -> GrammarBuilder {
        GrammarBuilder::new(name)
    }

    /// The matcher to scan with while `goal` is active.
    pub fn matcher_for(&self, goal: &Goal) -> &Matcher {
        goal.group_kind
            .and_then(|kind| self.goal_matchers.get(&kind))
            .unwrap_or(&self.matcher)
    }

    /// The shared body goal for a group kind. Closures have no body goal of
    /// their own; they continue the enclosing goal.
    pub fn goal_for(&self, kind: GroupKind) -> Option<&Arc<Goal>> {
        self.goals.get(&kind)
    }

    /// The table a group of `kind` is defined in.
    pub fn defs_for(&self, kind: GroupKind) -> &HashMap<String, GroupDef> {
        match kind {
            GroupKind::Span => &self.spans,
            GroupKind::Quote => &self.quotes,
            GroupKind::Comment => &self.comments,
            GroupKind::Closure => &self.closures,
        }
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar").field("name", &self.name).finish()
    }
}

/// Step-by-step construction of an immutable [`Grammar`].
pub struct GrammarBuilder {
    name: String,
    goal_matchers: HashMap<GroupKind, Matcher>,
    keywords: HashSet<String>,
    assigners: HashSet<String>,
    combinators: HashSet<String>,
    operators: HashSet<String>,
    nonbreakers: HashSet<String>,
    breakers: HashSet<String>,
    comments: HashMap<String, GroupDef>,
    quotes: HashMap<String, GroupDef>,
    closures: HashMap<String, GroupDef>,
    spans: HashMap<String, GroupDef>,
    maybe_identifier: Option<Regex>,
    root_kind: TokenKind,
    root_flatten: bool,
}

fn string_set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl GrammarBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            goal_matchers: HashMap::new(),
            keywords: HashSet::new(),
            assigners: HashSet::new(),
            combinators: HashSet::new(),
            operators: HashSet::new(),
            nonbreakers: HashSet::new(),
            breakers: HashSet::new(),
            comments: HashMap::new(),
            quotes: HashMap::new(),
            closures: HashMap::new(),
            spans: HashMap::new(),
            maybe_identifier: None,
            root_kind: TokenKind::Text,
            root_flatten: false,
        }
    }

    pub fn keywords(mut self, words: &[&str]) -> Self {
        self.keywords = string_set(words);
        self
    }

    pub fn assigners(mut self, symbols: &[&str]) -> Self {
        self.assigners = string_set(symbols);
        self
    }

    pub fn combinators(mut self, symbols: &[&str]) -> Self {
        self.combinators = string_set(symbols);
        self
    }

    pub fn operators(mut self, symbols: &[&str]) -> Self {
        self.operators = string_set(symbols);
        self
    }

    pub fn nonbreakers(mut self, symbols: &[&str]) -> Self {
        self.nonbreakers = string_set(symbols);
        self
    }

    pub fn breakers(mut self, symbols: &[&str]) -> Self {
        self.breakers = string_set(symbols);
        self
    }

    pub fn comment(mut self, def: GroupDef) -> Self {
        self.comments.insert(def.opener.clone(), def);
        self
    }

    pub fn quote(mut self, def: GroupDef) -> Self {
        self.quotes.insert(def.opener.clone(), def);
        self
    }

    pub fn closure(mut self, def: GroupDef) -> Self {
        self.closures.insert(def.opener.clone(), def);
        self
    }

    pub fn span(mut self, def: GroupDef) -> Self {
        self.spans.insert(def.opener.clone(), def);
        self
    }

    pub fn goal_matcher(mut self, kind: GroupKind, matcher: Matcher) -> Self {
        self.goal_matchers.insert(kind, matcher);
        self
    }

    pub fn maybe_identifier(mut self, pattern: &str) -> Result<Self, Error> {
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidPattern {
            grammar: self.name.clone(),
            message: e.to_string(),
        })?;
        self.maybe_identifier = Some(regex);
        Ok(self)
    }

    /// Let adjacent same-kind tokens merge at the top level (markup-style
    /// grammars want this; code-style grammars usually do not).
    pub fn flatten_root(mut self) -> Self {
        self.root_flatten = true;
        self
    }

    /// Finish with the top-level matcher, deriving the shared goals.
    pub fn build(self, matcher: Matcher) -> Grammar {
        let mut root_openers: HashSet<String> = HashSet::new();
        root_openers.extend(self.quotes.keys().cloned());
        root_openers.extend(self.comments.keys().cloned());
        root_openers.extend(self.closures.keys().cloned());

        let mut known_closers: HashSet<String> = HashSet::new();
        for def in self.closures.values().chain(self.spans.values()) {
            known_closers.insert(def.closer.clone());
        }

        let root_goal = Arc::new(Goal {
            name: self.name.clone(),
            kind: self.root_kind,
            group_kind: None,
            punctuators: HashSet::new(),
            openers: root_openers.clone(),
            flatten: self.root_flatten,
            fold: false,
        });

        let mut goals = HashMap::new();
        goals.insert(
            GroupKind::Quote,
            Arc::new(Goal {
                name: "quote".to_string(),
                kind: TokenKind::Quote,
                group_kind: Some(GroupKind::Quote),
                punctuators: HashSet::new(),
                openers: self.spans.keys().cloned().collect(),
                flatten: true,
                fold: true,
            }),
        );
        goals.insert(
            GroupKind::Comment,
            Arc::new(Goal {
                name: "comment".to_string(),
                kind: TokenKind::Comment,
                group_kind: Some(GroupKind::Comment),
                punctuators: HashSet::new(),
                openers: HashSet::new(),
                flatten: true,
                fold: true,
            }),
        );
        goals.insert(
            GroupKind::Span,
            Arc::new(Goal {
                name: "span".to_string(),
                kind: self.root_kind,
                group_kind: Some(GroupKind::Span),
                punctuators: HashSet::new(),
                openers: root_openers,
                flatten: false,
                fold: false,
            }),
        );

        Grammar {
            name: self.name,
            matcher,
            goal_matchers: self.goal_matchers,
            keywords: self.keywords,
            assigners: self.assigners,
            combinators: self.combinators,
            operators: self.operators,
            nonbreakers: self.nonbreakers,
            breakers: self.breakers,
            comments: self.comments,
            quotes: self.quotes,
            closures: self.closures,
            spans: self.spans,
            maybe_identifier: self.maybe_identifier,
            root_goal,
            goals,
            known_closers,
        }
    }
}

/// An owned, explicit map from syntax name to grammar. Cheap to clone:
/// grammars are `Arc`-shared.
#[derive(Debug, Clone, Default)]
pub struct GrammarRegistry {
    grammars: HashMap<String, Arc<Grammar>>,
}

impl GrammarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the bundled demonstration grammars installed.
    pub fn with_defaults() -> Result<Self, Error> {
        let mut registry = Self::new();
        registry.register(crate::grammars::ecmascript::grammar()?);
        registry.register(crate::grammars::markup::grammar()?);
        Ok(registry)
    }

    pub fn register(&mut self, grammar: Grammar) {
        self.grammars
            .insert(grammar.name.clone(), Arc::new(grammar));
    }

    pub fn get(&self, syntax: &str) -> Option<Arc<Grammar>> {
        self.grammars.get(syntax).map(Arc::clone)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.grammars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Per-run tokenization options.
#[derive(Debug, Clone)]
pub struct Options {
    pub syntax: String,
}

impl Options {
    pub fn syntax(name: &str) -> Self {
        Self {
            syntax: name.to_string(),
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::syntax("ecmascript")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Entity;

    fn minimal_grammar() -> Grammar {
        let matcher = Matcher::new("demo", r"([a-z]+)", vec![Entity::Tag(TokenKind::Word)]).unwrap();
        Grammar::builder("demo")
            .quote(GroupDef::pair("\"", "\""))
            .comment(GroupDef::pair("//", "\n"))
            .closure(GroupDef::pair("{", "}"))
            .span(GroupDef::pair("${", "}"))
            .build(matcher)
    }

    #[test]
    fn test_root_goal_openers() {
        let grammar = minimal_grammar();
        let openers = &grammar.root_goal.openers;
        assert!(openers.contains("\""));
        assert!(openers.contains("//"));
        assert!(openers.contains("{"));
        // Spans open only inside span-allowing groups, never at the root.
        assert!(!openers.contains("${"));
    }

    #[test]
    fn test_known_closers_cover_closures_and_spans() {
        let grammar = minimal_grammar();
        assert!(grammar.known_closers.contains("}"));
        assert!(!grammar.known_closers.contains("\""));
    }

    #[test]
    fn test_matcher_for_falls_back_to_top_level() {
        let grammar = minimal_grammar();
        let quote_goal = grammar.goal_for(GroupKind::Quote).unwrap();
        // No override registered: the top-level matcher is used.
        let m = grammar.matcher_for(quote_goal);
        assert!(m.find_at("abc", 0).is_some());
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = GrammarRegistry::new();
        registry.register(minimal_grammar());
        assert!(registry.get("demo").is_some());
        assert!(registry.get("cobol").is_none());
        assert_eq!(registry.names(), vec!["demo"]);
    }
}
