//! # Terminal Query Rules
//!
//! Decides whether `current` is the last query of its session, given the
//! query that follows it (or `None` at end of stream).
//!
//! The rules form an ordered list. Each rule either decides the outcome or
//! defers to the next one; the first rule that decides wins and the rest are
//! never evaluated.
//!
//! | # | Rule               | Matches when                                  | Verdict      |
//! |---|--------------------|-----------------------------------------------|--------------|
//! | 1 | `Clicked`          | `current` led to a click                      | terminal     |
//! | 2 | `EndOfStream`      | there is no next query                        | terminal     |
//! | 3 | `UserChanged`      | next query belongs to another user            | terminal     |
//! | 4 | `IndexChanged`     | next query targets another index              | terminal     |
//! | 5 | `WithinTimeWindow` | next query fired less than the window later   | not terminal |
//! | 6 | `QueryDiverged`    | edit distance exceeds the threshold           | terminal     |
//! | 7 | `Refinement`       | always                                        | not terminal |
//!
//! Rule 5 sits before rule 6: queries fired in quick succession are
//! keystroke-level edits of one search, whatever their text looks like.

use std::fmt;

use crate::distance;
use crate::policy::SessionPolicy;
use crate::record::SearchQuery;

/// Outcome of the rule list for one adjacent pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// `current` closes its session and is emitted.
    Terminal,
    /// `current` is refined by `next` and is dropped.
    Continues,
}

impl Verdict {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self == Verdict::Terminal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Clicked,
    EndOfStream,
    UserChanged,
    IndexChanged,
    WithinTimeWindow,
    QueryDiverged,
    Refinement,
}

/// Evaluation order. The position in this array is the rule's priority.
pub const RULES: [Rule; 7] = [
    Rule::Clicked,
    Rule::EndOfStream,
    Rule::UserChanged,
    Rule::IndexChanged,
    Rule::WithinTimeWindow,
    Rule::QueryDiverged,
    Rule::Refinement,
];

impl Rule {
    /// Returns `Some(verdict)` if this rule decides the pair, `None` to defer.
    pub fn evaluate<Q: SearchQuery>(
        self,
        policy: &SessionPolicy,
        current: &Q,
        next: Option<&Q>,
    ) -> Option<Verdict> {
        let matched = match (self, next) {
            (Rule::Clicked, _) => current.had_click(),
            (Rule::EndOfStream, next) => next.is_none(),
            (Rule::UserChanged, Some(next)) => current.user_id() != next.user_id(),
            (Rule::IndexChanged, Some(next)) => current.index_name() != next.index_name(),
            (Rule::WithinTimeWindow, Some(next)) => {
                within_window(policy.time_window_ms(), current.timestamp(), next.timestamp())
            }
            (Rule::QueryDiverged, Some(next)) => distance::exceeds(
                current.query_text(),
                next.query_text(),
                policy.edit_distance_threshold(),
            ),
            (Rule::Refinement, _) => true,
            // Pairwise rules cannot match without a next query.
            (_, None) => false,
        };
        matched.then_some(self.verdict())
    }

    /// The verdict this rule hands down when it matches.
    pub const fn verdict(self) -> Verdict {
        match self {
            Rule::WithinTimeWindow | Rule::Refinement => Verdict::Continues,
            _ => Verdict::Terminal,
        }
    }

    pub const fn describe(self) -> &'static str {
        match self {
            Rule::Clicked => "has a click",
            Rule::EndOfStream => "is the last query",
            Rule::UserChanged => "is followed by a query from another user",
            Rule::IndexChanged => "is followed by a query on another index",
            Rule::WithinTimeWindow => "is followed closely in time",
            Rule::QueryDiverged => "is too far in edit distance from the next query",
            Rule::Refinement => "is refined by the next query",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::Clicked => "clicked",
            Rule::EndOfStream => "end_of_stream",
            Rule::UserChanged => "user_changed",
            Rule::IndexChanged => "index_changed",
            Rule::WithinTimeWindow => "within_time_window",
            Rule::QueryDiverged => "query_diverged",
            Rule::Refinement => "refinement",
        };
        f.write_str(name)
    }
}

/// Unparsable timestamps never count as "within the window": the pair falls
/// through to the distance rule instead of being merged blindly.
#[inline]
fn within_window(window_ms: i64, current: Option<i64>, next: Option<i64>) -> bool {
    match (current, next) {
        (Some(current), Some(next)) => next.saturating_sub(current) < window_ms,
        _ => false,
    }
}

/// The rule that decided a pair, and its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub rule: Rule,
    pub verdict: Verdict,
}

/// Run the rule list over one adjacent pair.
pub fn decide<Q: SearchQuery>(policy: &SessionPolicy, current: &Q, next: Option<&Q>) -> Decision {
    RULES
        .iter()
        .find_map(|&rule| {
            rule.evaluate(policy, current, next)
                .map(|verdict| Decision { rule, verdict })
        })
        // Unreachable: `Refinement` always matches.
        .unwrap_or(Decision {
            rule: Rule::Refinement,
            verdict: Verdict::Continues,
        })
}

// =============================================================================
// Kani Proofs: Rule Priority
// =============================================================================

#[cfg(kani)]
mod proofs {
    use super::*;

    const USERS: [&str; 2] = ["alice", "bob"];
    const INDICES: [&str; 2] = ["products", "articles"];
    const QUERIES: [&str; 3] = ["cat", "cats", "dog"];

    struct Symbolic {
        user: usize,
        index: usize,
        query: usize,
        click: bool,
        ts: Option<i64>,
    }

    impl SearchQuery for Symbolic {
        fn user_id(&self) -> &str {
            USERS[self.user]
        }
        fn index_name(&self) -> &str {
            INDICES[self.index]
        }
        fn query_text(&self) -> &str {
            QUERIES[self.query]
        }
        fn had_click(&self) -> bool {
            self.click
        }
        fn timestamp(&self) -> Option<i64> {
            self.ts
        }
    }

    fn any_record() -> Symbolic {
        let user: usize = kani::any();
        let index: usize = kani::any();
        let query: usize = kani::any();
        kani::assume(user < USERS.len());
        kani::assume(index < INDICES.len());
        kani::assume(query < QUERIES.len());
        Symbolic {
            user,
            index,
            query,
            click: kani::any(),
            ts: kani::any(),
        }
    }

    /// **Proof: a clicked query always ends its session**
    #[kani::proof]
    #[kani::unwind(8)]
    fn verify_click_is_always_terminal() {
        let current = any_record();
        let next = any_record();
        kani::assume(current.click);
        let policy = SessionPolicy::default();

        let decision = decide(&policy, &current, Some(&next));
        assert!(decision.verdict.is_terminal());
        assert!(decide(&policy, &current, None).verdict.is_terminal());
    }

    /// **Proof: identity changes cannot be merged by the time window**
    #[kani::proof]
    #[kani::unwind(8)]
    fn verify_identity_change_is_terminal() {
        let current = any_record();
        let next = any_record();
        kani::assume(current.user != next.user || current.index != next.index);
        let policy = SessionPolicy::default();

        assert!(decide(&policy, &current, Some(&next)).verdict.is_terminal());
    }
}
