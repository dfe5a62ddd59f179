//! The inter-matcher dispatch carrier.

use crate::cursor::Iter;
use crate::matcher::{MatcherId, MatcherState};
use crate::value::Value;

/// A message returned by a matcher's `execute`/`success`/`failure` handler,
/// consumed by the [`Trampoline`](crate::trampoline) loop.
///
/// Internal transitions *within* a single matcher are direct function calls,
/// never messages. Only externally visible hand-offs between matchers go
/// through this type, which keeps the cache key space tied to the
/// transitions that actually matter for memoization.
#[derive(Debug, Clone)]
pub enum Message {
    /// Delegate to a child matcher at the given cursor.
    Execute {
        /// The matcher requesting the delegation (pushed as a suspended frame).
        parent: MatcherId,
        /// The parent's own state at the moment of delegation.
        parent_state: MatcherState,
        /// The matcher being delegated to.
        child: MatcherId,
        /// The state to enter the child with (usually [`MatcherState::Clean`]).
        child_state: MatcherState,
        /// The cursor to enter the child at.
        iter: Iter,
    },
    /// A matcher produced a value.
    Success {
        /// The final state of the matcher that just concluded.
        child_state: MatcherState,
        /// The cursor immediately after the consumed input.
        iter: Iter,
        /// The produced value.
        result: Value,
    },
    /// A matcher failed to match.
    Failure,
}

impl Message {
    /// Convenience constructor for [`Message::Execute`].
    pub(crate) fn execute(
        parent: MatcherId,
        parent_state: MatcherState,
        child: MatcherId,
        child_state: MatcherState,
        iter: Iter,
    ) -> Self {
        Message::Execute {
            parent,
            parent_state,
            child,
            child_state,
            iter,
        }
    }

    /// Convenience constructor for [`Message::Success`].
    pub(crate) fn success(child_state: MatcherState, iter: Iter, result: Value) -> Self {
        Message::Success {
            child_state,
            iter,
            result,
        }
    }
}
