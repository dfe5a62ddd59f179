//! The sub-parse memoization cache used by the cached trampoline variant.

use std::collections::HashMap;

use crate::cursor::Iter;
use crate::matcher::{MatcherId, MatcherState};
use crate::message::Message;

/// `(child_matcher_identity, child_state, iter)`: the triple that uniquely
/// identifies a sub-parse attempt. Cache keys include `child_state` so that
/// repeated entries to a backtracking matcher (whose state advances between
/// attempts) land on distinct keys; this is what makes the cache a pure
/// deduplicator rather than an unsound fixed-point engine (left recursion
/// remains a non-goal).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    pub(crate) matcher: MatcherId,
    pub(crate) state: MatcherState,
    pub(crate) iter: Iter,
}

/// Cache values are whole [`Message`]s, never partial states, so replaying a
/// hit is observably identical to the original dispatch.
pub(crate) type Cache = HashMap<CacheKey, Message>;
