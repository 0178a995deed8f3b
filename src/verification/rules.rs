//! Ordered rule chains.
//!
//! A chain is a slice of rules checked front to back. Evaluation stops at the
//! first rule that reports a violation, so the order of a chain decides which
//! reason a request with several problems is refused for.

use tracing::trace;

use super::types::ReasonCode;

/// A single predicate paired with the reason it refuses for.
pub struct Rule<C> {
    /// Short identifier used in trace output.
    pub name: &'static str,
    pub reason: ReasonCode,
    /// Returns `true` when the context breaks this rule.
    pub violated: fn(&C) -> bool,
}

impl<C> Rule<C> {
    pub const fn new(name: &'static str, reason: ReasonCode, violated: fn(&C) -> bool) -> Self {
        Self {
            name,
            reason,
            violated,
        }
    }
}

/// Return the reason of the first rule in `rules` that `ctx` violates.
pub fn first_violation<C>(rules: &[Rule<C>], ctx: &C) -> Option<ReasonCode> {
    rules.iter().find_map(|rule| {
        if (rule.violated)(ctx) {
            trace!(rule = rule.name, code = rule.reason.code(), "Rule violated");
            Some(rule.reason)
        } else {
            None
        }
    })
}

/// `true` when a field is absent or holds an empty string.
pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}
