//! Name-matching rules.
//!
//! Rules map free-text class names to an outcome (a color, a class type).
//! A [`RuleSet`] is evaluated in declaration order and the first matching rule
//! wins, so adding a rule never requires touching control flow.

use std::fmt;

/// A class name prepared for matching.
///
/// Matching is case-insensitive and treats `-`, `_` and runs of whitespace as
/// a single space, so `Non_Tumour` and `non -  tumour` normalize alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName(String);

impl NormalizedName {
    /// Normalize a raw class name.
    pub fn new(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
            .filter(|w| !w.is_empty())
            .collect();
        Self(words.join(" "))
    }

    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Predicate over a normalized name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePattern {
    /// Matches when the name contains any of the (lower-case) needles.
    AnyOf(&'static [&'static str]),
}

impl NamePattern {
    /// Check the pattern against a name. Never fails; an empty name matches nothing.
    pub fn matches(&self, name: &NormalizedName) -> bool {
        match self {
            Self::AnyOf(needles) => needles.iter().any(|n| name.as_str().contains(n)),
        }
    }
}

/// A named (pattern, outcome) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct NameRule<T> {
    id: &'static str,
    pattern: NamePattern,
    outcome: T,
}

impl<T> NameRule<T> {
    /// Create a rule.
    pub fn new(id: &'static str, pattern: NamePattern, outcome: T) -> Self {
        Self {
            id,
            pattern,
            outcome,
        }
    }

    /// Rule identifier, used in logs.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// The outcome produced when the rule matches.
    pub fn outcome(&self) -> &T {
        &self.outcome
    }
}

/// Ordered, first-match-wins rule list.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet<T> {
    rules: Vec<NameRule<T>>,
}

impl<T> Default for RuleSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RuleSet<T> {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule (builder pattern). Later rules have lower priority.
    pub fn with_rule(mut self, id: &'static str, pattern: NamePattern, outcome: T) -> Self {
        self.push(NameRule::new(id, pattern, outcome));
        self
    }

    /// Append a rule.
    pub fn push(&mut self, rule: NameRule<T>) {
        self.rules.push(rule);
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule identifiers in evaluation order.
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id).collect()
    }

    /// First rule whose pattern matches the name.
    pub fn first_match(&self, name: &NormalizedName) -> Option<&NameRule<T>> {
        self.rules.iter().find(|r| r.pattern.matches(name))
    }

    /// Outcome of the first matching rule.
    pub fn resolve(&self, name: &NormalizedName) -> Option<&T> {
        self.first_match(name).map(NameRule::outcome)
    }
}
