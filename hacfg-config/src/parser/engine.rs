//! Packrat parsing engine
//!
//! Memoized recursive descent with ordered choice and unlimited
//! backtracking. Rules take a cursor position by value and return the
//! matched [`Node`]; the node's span end is the new cursor. A rule never
//! consumes input on failure, so backtracking is just reusing the old
//! position.
//!
//! Every named rule goes through [`Parser::rule`], which memoizes its
//! result (success or failure) by `(kind, position)`. Nodes share their
//! children, so storing or replaying a cached result is a reference-count
//! bump rather than a subtree copy. Terminals report
//! their failures to a furthest-failure tracker that becomes the
//! [`ParseError`] when the input is rejected.

use super::error::ParseError;
use super::terminal::CharClass;
use super::tree::{Node, NodeKind, Span};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Cache rule results by position
    pub memoize: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { memoize: true }
    }
}

/// Counters for one parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseStats {
    /// Named rule invocations, cache hits included
    pub rule_calls: usize,
    pub memo_hits: usize,
    /// Entries in the memo table at the end of the parse
    pub memo_entries: usize,
}

/// Memo key: a rule applied at a byte position
type MemoKey = (NodeKind, usize);

/// Grammar rule usable as a choice alternative
pub type RuleFn<'src> = fn(&mut Parser<'src>, usize) -> Option<Node>;

/// Parser state for one input
pub struct Parser<'src> {
    input: &'src str,
    config: ParserConfig,
    memo: HashMap<MemoKey, Option<Node>>,
    failure: usize,
    expected: BTreeSet<String>,
    stats: ParseStats,
}

impl<'src> Parser<'src> {
    pub fn new(input: &'src str) -> Self {
        Self::with_config(input, ParserConfig::default())
    }

    pub fn with_config(input: &'src str, config: ParserConfig) -> Self {
        Self {
            input,
            config,
            memo: HashMap::new(),
            failure: 0,
            expected: BTreeSet::new(),
            stats: ParseStats::default(),
        }
    }

    pub fn input(&self) -> &'src str {
        self.input
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Parse the whole input as a configuration
    pub fn parse(&mut self) -> Result<Node, ParseError> {
        self.memo.clear();
        self.failure = 0;
        self.expected.clear();
        self.stats = ParseStats::default();

        let result = self.configuration(0);
        self.stats.memo_entries = self.memo.len();
        tracing::debug!(
            "Parsed {} byte(s): {} rule call(s), {} memo hit(s), {} cached result(s)",
            self.input.len(),
            self.stats.rule_calls,
            self.stats.memo_hits,
            self.stats.memo_entries
        );

        match result {
            Some(root) if root.end() == self.input.len() => Ok(root),
            Some(root) => Err(self.error_at(root.end())),
            None => Err(self.error_at(0)),
        }
    }

    fn error_at(&mut self, pos: usize) -> ParseError {
        if self.expected.is_empty() {
            self.failure = pos;
            self.expected.insert("<EOF>".to_string());
        }
        let expected = self.expected.iter().cloned().collect();
        ParseError::new(self.input, self.failure, expected)
    }

    // ========================================
    // Rule plumbing
    // ========================================

    /// Run a named rule body at `pos`, memoized and tagged with `kind`
    pub(crate) fn rule(
        &mut self,
        kind: NodeKind,
        pos: usize,
        body: impl FnOnce(&mut Self, usize) -> Option<Node>,
    ) -> Option<Node> {
        self.stats.rule_calls += 1;
        // The start rule runs once per parse
        let memoize = self.config.memoize && kind != NodeKind::Configuration;
        if memoize {
            if let Some(cached) = self.memo.get(&(kind, pos)) {
                self.stats.memo_hits += 1;
                return cached.clone();
            }
        }

        let result = body(self, pos).map(|node| node.into_kind(kind));

        if memoize {
            self.memo.insert((kind, pos), result.clone());
        }
        result
    }

    /// Record a terminal failure
    fn fail(&mut self, pos: usize, expected: impl Into<String>) {
        if pos > self.failure {
            self.failure = pos;
            self.expected.clear();
        }
        if pos == self.failure {
            self.expected.insert(expected.into());
        }
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.input.get(pos..).and_then(|rest| rest.chars().next())
    }

    // ========================================
    // Terminals
    // ========================================

    pub(crate) fn literal(&mut self, pos: usize, text: &str) -> Option<Node> {
        let matched = self
            .input
            .get(pos..)
            .is_some_and(|rest| rest.starts_with(text));
        if matched {
            Some(Node::leaf(Span::new(pos, pos + text.len())))
        } else {
            self.fail(pos, format!("\"{text}\""));
            None
        }
    }

    pub(crate) fn class(&mut self, pos: usize, class: &CharClass) -> Option<Node> {
        match self.char_at(pos) {
            Some(c) if class.test(c) => Some(Node::leaf(Span::new(pos, pos + c.len_utf8()))),
            _ => {
                self.fail(pos, class.description);
                None
            }
        }
    }

    pub(crate) fn any_char(&mut self, pos: usize) -> Option<Node> {
        match self.char_at(pos) {
            Some(c) => Some(Node::leaf(Span::new(pos, pos + c.len_utf8()))),
            None => {
                self.fail(pos, "<any char>");
                None
            }
        }
    }

    // ========================================
    // Combinators
    // ========================================

    /// First literal of `texts` that matches
    pub(crate) fn one_of(&mut self, pos: usize, texts: &[&str]) -> Option<Node> {
        texts.iter().find_map(|text| self.literal(pos, text))
    }

    /// Ordered choice: first alternative that matches wins
    pub(crate) fn choice(&mut self, pos: usize, alternatives: &[RuleFn<'src>]) -> Option<Node> {
        alternatives.iter().find_map(|alternative| alternative(self, pos))
    }

    /// Always succeeds; a zero-width node at `pos` stands for "absent"
    pub(crate) fn optional(
        &mut self,
        pos: usize,
        body: impl FnOnce(&mut Self, usize) -> Option<Node>,
    ) -> Option<Node> {
        Some(body(self, pos).unwrap_or_else(|| Node::absent(pos)))
    }

    pub(crate) fn zero_or_more(
        &mut self,
        pos: usize,
        mut body: impl FnMut(&mut Self, usize) -> Option<Node>,
    ) -> Option<Node> {
        let mut children = Vec::new();
        let mut end = pos;
        while let Some(node) = body(self, end) {
            // A zero-width match would repeat forever
            if node.is_empty() {
                break;
            }
            end = node.end();
            children.push(node);
        }
        Some(Node::group(Span::new(pos, end), children))
    }

    pub(crate) fn one_or_more(
        &mut self,
        pos: usize,
        body: impl FnMut(&mut Self, usize) -> Option<Node>,
    ) -> Option<Node> {
        self.zero_or_more(pos, body)
            .filter(|node| !node.children.is_empty())
    }

    /// Positive lookahead, consumes nothing
    pub(crate) fn followed_by(
        &mut self,
        pos: usize,
        body: impl FnOnce(&mut Self, usize) -> Option<Node>,
    ) -> Option<Node> {
        body(self, pos).map(|_| Node::absent(pos))
    }

    /// Negative lookahead, consumes nothing
    pub(crate) fn not_followed_by(
        &mut self,
        pos: usize,
        body: impl FnOnce(&mut Self, usize) -> Option<Node>,
    ) -> Option<Node> {
        match body(self, pos) {
            Some(_) => None,
            None => Some(Node::absent(pos)),
        }
    }
}

/// Sequence builder.
///
/// ```ignore
/// let mut s = Seq::new(pos);
/// s.then(p.literal(s.end(), "acl"))?;
/// s.then(p.ws1(s.end()))?;
/// s.finish()
/// ```
pub(crate) struct Seq {
    start: usize,
    end: usize,
    children: Vec<Node>,
}

impl Seq {
    pub(crate) fn new(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
            children: Vec::new(),
        }
    }

    /// Cursor after the last matched element
    pub(crate) fn end(&self) -> usize {
        self.end
    }

    /// Append a matched element, or fail the sequence
    pub(crate) fn then(&mut self, node: Option<Node>) -> Option<()> {
        let node = node?;
        self.end = node.end();
        self.children.push(node);
        Some(())
    }

    pub(crate) fn finish(self) -> Option<Node> {
        Some(Node::group(Span::new(self.start, self.end), self.children))
    }
}
