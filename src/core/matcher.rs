//! Field pattern matching
//!
//! A rule field is interpreted as one of three patterns:
//!
//! | Rule value      | Matches                                   |
//! |-----------------|-------------------------------------------|
//! | `*`             | any value, including the empty string     |
//! | `10.0.*`        | values starting with `10.0.`              |
//! | `tcp`           | exactly `tcp` (case-sensitive)            |
//!
//! Only the text before the first `*` is significant. `1*2*3` is the prefix
//! `1`, and `*.example.com` is the empty prefix, which matches everything.

/// Wildcard character in rule fields
pub const WILDCARD: char = '*';

/// Parsed form of a rule field, borrowing from the field text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern<'a> {
    /// `*`
    Any,
    /// Text before the first `*`
    Prefix(&'a str),
    /// No `*` at all
    Exact(&'a str),
}

impl<'a> Pattern<'a> {
    /// Parses a rule field. Never fails: every string is a valid pattern.
    pub fn parse(pattern: &'a str) -> Self {
        if pattern == "*" {
            return Pattern::Any;
        }
        match pattern.split_once(WILDCARD) {
            Some((prefix, _ignored)) => Pattern::Prefix(prefix),
            None => Pattern::Exact(pattern),
        }
    }

    pub fn is_match(self, value: &str) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Prefix(prefix) => value.starts_with(prefix),
            Pattern::Exact(expected) => value == expected,
        }
    }
}

/// Returns true if `value` satisfies the rule field `pattern`.
pub fn matches(value: &str, pattern: &str) -> bool {
    Pattern::parse(pattern).is_match(value)
}
