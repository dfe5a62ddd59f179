//! The `Try` matcher and the freeze/thaw semantics that give this engine
//! Parsec-style committed backtracking.
//!
//! `Try(inner)` delegates to `inner` with expiration suspended
//! (`source.frozen` incremented on entry, decremented on exit). Because
//! `frozen > 0` makes [`Source::expire`] a no-op, a `Try` region may consume
//! input, fail, and be retried from before the region (the source still
//! holds those lines). Outside `Try`, each successful child's consumption is
//! permanent: the trampoline's post-`Success` expire releases everything
//! strictly before the new cursor, which is what lets this engine stream
//! unbounded input.

use crate::config::Config;
use crate::cursor::Iter;
use crate::error::{ConfigError, EngineError};
use crate::matcher::{Grammar, MatcherId, MatcherState};
use crate::message::Message;
use crate::source::Source;
use crate::value::Value;

/// `Try`'s `execute`: entering (or re-entering, to request the next
/// alternative inside `inner`) the frozen region.
pub(crate) fn enter<S: Source>(
    cfg: &mut Config<S>,
    grammar: &Grammar,
    try_matcher: MatcherId,
    inner: MatcherId,
    inner_state: Box<MatcherState>,
    iter: Iter,
) -> Result<Message, EngineError> {
    if !cfg.options.try_mode {
        return Err(EngineError::Config(ConfigError::new(format!(
            "matcher {} ({}) requires try_mode, but ParseOptions::try_mode is off",
            try_matcher,
            grammar.name_of(try_matcher),
        ))));
    }
    cfg.source.freeze();
    Ok(Message::execute(
        try_matcher,
        MatcherState::Try(inner_state.clone()),
        inner,
        *inner_state,
        iter,
    ))
}

/// `Try`'s `success`: thaw and re-wrap the inner matcher's final state.
pub(crate) fn exit_on_success<S: Source>(
    cfg: &mut Config<S>,
    inner_final_state: MatcherState,
    iter: Iter,
    result: Value,
) -> Result<Message, EngineError> {
    cfg.source.unfreeze();
    Ok(Message::success(
        MatcherState::Try(Box::new(inner_final_state)),
        iter,
        result,
    ))
}

/// `Try`'s `failure`: thaw and propagate. `inner`'s consumed-but-uncommitted
/// input is still buffered, so whoever retries from before this `Try` will
/// see it again.
pub(crate) fn exit_on_failure<S: Source>(cfg: &mut Config<S>) -> Result<Message, EngineError> {
    cfg.source.unfreeze();
    Ok(Message::Failure)
}
