//! The driver loop: an explicit, heap-stacked dispatcher that walks the
//! matcher tree without ever recursing through the host call stack, so that
//! grammars of arbitrary depth (including deeply recursive ones, via
//! [`crate::recursive`]) cannot blow the Rust stack.
//!
//! This is deliberately not a coroutine or a thread-per-alternative scheme,
//! just a `Vec` of suspended parent frames and a `loop` over [`Message`]
//! values.

use smallvec::SmallVec;

use crate::cache::{Cache, CacheKey};
use crate::config::Config;
use crate::cursor::Iter;
use crate::error::EngineError;
use crate::matcher::{self, Grammar, MatcherId, MatcherState};
use crate::message::Message;
use crate::source::Source;
use crate::value::Value;

/// A suspended parent context. In cached mode it additionally carries the
/// cache key under which to record the outcome once the delegated-to child
/// concludes.
struct Frame {
    matcher: MatcherId,
    state: MatcherState,
    cache_key: Option<CacheKey>,
}

/// Depth at which the frame stack switches from inline (`SmallVec`) storage
/// to a heap allocation. Most grammars nest a handful of levels deep for any
/// given input position; this just avoids an allocation for the common case
/// without capping recursion depth (the `Vec` fallback is unbounded).
const INLINE_FRAMES: usize = 16;

/// The two ways [`run`] can end without producing a [`Value`]: an ordinary,
/// ([`crate::error::Failure`]-reportable) "no", or a true abort.
pub(crate) enum RunError {
    /// The grammar did not match; caller should report
    /// `cfg.failures.into_failure()`.
    Failed,
    /// `Error` matcher fired, or the grammar/options were misconfigured.
    Engine(EngineError),
}

impl From<EngineError> for RunError {
    fn from(e: EngineError) -> Self {
        RunError::Engine(e)
    }
}

/// Run the trampoline to completion, selecting the cached or uncached
/// variant based on `cfg.options.cache`.
pub(crate) fn run<S: Source>(
    grammar: &Grammar,
    cfg: &mut Config<S>,
    root: MatcherId,
) -> Result<Value, RunError> {
    let mut cache: Option<Cache> = cfg.options.cache.then(Cache::new);
    let start = cfg.source.start();
    let mut stack: SmallVec<[Frame; INLINE_FRAMES]> = SmallVec::new();

    let mut msg = dispatch_execute(grammar, cfg, root, &MatcherState::Clean, start)?;

    loop {
        msg = match msg {
            Message::Execute {
                parent,
                parent_state,
                child,
                child_state,
                iter,
            } => {
                let cache_key = cache.as_ref().map(|_| CacheKey {
                    matcher: child,
                    state: child_state.clone(),
                    iter,
                });
                stack.push(Frame {
                    matcher: parent,
                    state: parent_state,
                    cache_key: cache_key.clone(),
                });
                trace_execute(cfg, grammar, parent, child, iter);
                if let (Some(cache), Some(key)) = (cache.as_ref(), cache_key.as_ref()) {
                    if let Some(hit) = cache.get(key) {
                        hit.clone()
                    } else {
                        dispatch_execute(grammar, cfg, child, &child_state, iter)?
                    }
                } else {
                    dispatch_execute(grammar, cfg, child, &child_state, iter)?
                }
            }

            Message::Success {
                child_state,
                iter,
                result,
            } => match stack.pop() {
                None => return Ok(result),
                Some(frame) => {
                    cfg.source.expire(iter);
                    let outcome = Message::success(child_state.clone(), iter, result.clone());
                    if let (Some(cache), Some(key)) = (cache.as_mut(), frame.cache_key) {
                        cache.insert(key, outcome);
                    }
                    trace_success(cfg, grammar, frame.matcher, iter, &result);
                    dispatch_success(
                        grammar,
                        cfg,
                        frame.matcher,
                        &frame.state,
                        &child_state,
                        iter,
                        result,
                    )?
                }
            },

            Message::Failure => match stack.pop() {
                None => return Err(RunError::Failed),
                Some(frame) => {
                    if let (Some(cache), Some(key)) = (cache.as_mut(), frame.cache_key) {
                        cache.insert(key, Message::Failure);
                    }
                    trace_failure(cfg, grammar, frame.matcher);
                    dispatch_failure(grammar, cfg, frame.matcher, &frame.state)?
                }
            },
        };
    }
}

fn dispatch_execute<S: Source>(
    grammar: &Grammar,
    cfg: &mut Config<S>,
    child: MatcherId,
    child_state: &MatcherState,
    iter: Iter,
) -> Result<Message, EngineError> {
    cfg.push_depth();
    let result = match matcher::execute(grammar, cfg, child, child_state, iter) {
        Ok(m) => Ok(m),
        Err(EngineError::Expired(_)) => Ok(Message::Failure),
        Err(e) => Err(e),
    };
    cfg.pop_depth();
    result
}

fn dispatch_success<S: Source>(
    grammar: &Grammar,
    cfg: &mut Config<S>,
    parent: MatcherId,
    parent_state: &MatcherState,
    child_final_state: &MatcherState,
    iter: Iter,
    result: Value,
) -> Result<Message, EngineError> {
    match matcher::on_success(grammar, cfg, parent, parent_state, child_final_state, iter, result) {
        Ok(m) => Ok(m),
        Err(EngineError::Expired(_)) => Ok(Message::Failure),
        Err(e) => Err(e),
    }
}

fn dispatch_failure<S: Source>(
    grammar: &Grammar,
    cfg: &mut Config<S>,
    parent: MatcherId,
    parent_state: &MatcherState,
) -> Result<Message, EngineError> {
    match matcher::on_failure(grammar, cfg, parent, parent_state) {
        Ok(m) => Ok(m),
        Err(EngineError::Expired(_)) => Ok(Message::Failure),
        Err(e) => Err(e),
    }
}

fn trace_execute<S: Source>(cfg: &Config<S>, grammar: &Grammar, parent: MatcherId, child: MatcherId, iter: Iter) {
    if let Some(trace) = &cfg.debug {
        trace.on_execute(iter, grammar.name_of(child), cfg.depth(), parent, child);
    }
}

fn trace_success<S: Source>(cfg: &Config<S>, grammar: &Grammar, parent: MatcherId, iter: Iter, result: &Value) {
    if let Some(trace) = &cfg.debug {
        trace.on_success(iter, grammar.name_of(parent), cfg.depth(), parent, result);
    }
}

fn trace_failure<S: Source>(cfg: &Config<S>, grammar: &Grammar, parent: MatcherId) {
    if let Some(trace) = &cfg.debug {
        let farthest = cfg.failures.farthest();
        trace.on_failure(farthest, grammar.name_of(parent), cfg.depth(), parent);
    }
}
