//! The matcher protocol and the grammar arena it dispatches over.
//!
//! A grammar is a read-only-once-built tree of [`MatcherKind`] nodes
//! addressed by [`MatcherId`] (a plain arena index rather than a
//! reference-counted pointer, so that recursive grammars, which need
//! cycles through named references, don't need `Rc`/`Weak` cycle
//! bookkeeping; see the `Ref` variant and [`crate::recursive`]).
//!
//! Every matcher kind implements the three protocol handlers by dispatching
//! on `(kind, state)` inside [`execute`]/[`on_success`]/[`on_failure`]
//! rather than through a virtual call, replacing open-recursive virtual
//! dispatch with a flat match. Handlers never recurse into the trampoline
//! themselves; they return a [`Message`] and yield.

use std::rc::Rc;

use crate::config::Config;
use crate::cursor::Iter;
use crate::error::EngineError;
use crate::message::Message;
use crate::primitive::{match_any, match_literal};
use crate::source::Source;
use crate::value::Value;

/// An index into a [`Grammar`]'s node arena. Stable for the lifetime of the
/// grammar; used both for cache-key identity and for cyclic/recursive
/// references.
pub type MatcherId = usize;

/// The tagged variant of matcher kinds this engine ships as its concrete,
/// open-extension matcher set. Additional kinds can be added to this enum
/// by implementers without touching the trampoline or the cache.
pub enum MatcherKind {
    /// Match an exact run of characters.
    Literal(Rc<str>),
    /// Match any single character ("dot").
    Any,
    /// Match each child in order, concatenating their values.
    Seq(Vec<MatcherId>),
    /// Try each child in order at the same cursor, taking the first match.
    Alt(Vec<MatcherId>),
    /// Match `child` between `min` and `max` (inclusive) times, greedily.
    Repeat {
        /// The repeated matcher.
        child: MatcherId,
        /// Minimum repetitions required for overall success.
        min: u32,
        /// Maximum repetitions attempted; `None` means unbounded.
        max: Option<u32>,
    },
    /// Apply a pure function to `child`'s result.
    Transform(MatcherId, Rc<dyn Fn(Value) -> Value>),
    /// A `Try` scope: see [`crate::try_scope`].
    Try(MatcherId),
    /// Unconditionally abort parsing with a [`crate::error::ParserError`].
    Error(Rc<str>),
    /// A named/recursive reference, resolved lazily to `target` once the
    /// grammar's cyclic definitions are complete (see
    /// [`Grammar::placeholder`]).
    Ref(MatcherId),
}

pub(crate) struct MatcherNode {
    pub(crate) name: Option<Rc<str>>,
    pub(crate) kind: MatcherKind,
}

/// A read-only-during-parsing arena of grammar nodes. Built once via the
/// reference builder methods in [`crate::primitive`] and
/// [`crate::try_scope`], then shared (by reference) across as many parses as
/// needed.
pub struct Grammar {
    nodes: Vec<MatcherNode>,
    root: Option<MatcherId>,
}

impl Grammar {
    /// An empty grammar arena.
    pub fn new() -> Self {
        Grammar {
            nodes: Vec::new(),
            root: None,
        }
    }

    pub(crate) fn push(&mut self, name: Option<&str>, kind: MatcherKind) -> MatcherId {
        let id = self.nodes.len();
        self.nodes.push(MatcherNode {
            name: name.map(Rc::from),
            kind,
        });
        id
    }

    /// Reserve a matcher id to be resolved later with [`Grammar::resolve`],
    /// for building grammars with cycles through named references.
    pub fn placeholder(&mut self) -> MatcherId {
        self.push(Some("ref"), MatcherKind::Ref(MatcherId::MAX))
    }

    /// Point a previously reserved [`Grammar::placeholder`] at `target`.
    pub fn resolve(&mut self, placeholder: MatcherId, target: MatcherId) {
        match &mut self.nodes[placeholder].kind {
            MatcherKind::Ref(t) => *t = target,
            _ => panic!("Grammar::resolve called on a matcher that isn't a placeholder"),
        }
    }

    /// Mark `id` as the grammar's entry point.
    pub fn set_root(&mut self, id: MatcherId) {
        self.root = Some(id);
    }

    /// The grammar's entry point.
    pub fn root(&self) -> MatcherId {
        self.root.expect("Grammar::set_root was never called")
    }

    pub(crate) fn node(&self, id: MatcherId) -> &MatcherNode {
        &self.nodes[id]
    }

    pub(crate) fn name_of(&self, id: MatcherId) -> &str {
        self.node(id).name.as_deref().unwrap_or("<matcher>")
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-matcher progress record. Two canonical singletons (`Clean`, `Dirty`)
/// plus one variant per stateful composite kind. Compared by value so that
/// two attempts at the same matcher and state are the same cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatcherState {
    /// Never executed.
    Clean,
    /// Exhausted: no further alternatives remain.
    Dirty,
    /// `Seq` progress: index of the child currently running, and the
    /// concatenated value of the children before it.
    Seq { idx: usize, acc: Value },
    /// `Alt` progress: index of the alternative currently running, and the
    /// cursor the whole alternation was entered at (needed to retry the
    /// next alternative from the same starting point on failure).
    Alt { idx: usize, at: Iter },
    /// `Repeat` progress: repetitions completed so far, their concatenated
    /// value, and the cursor after the last successful repetition (the
    /// fallback position if the next repetition attempt fails).
    Repeat {
        count: u32,
        acc: Value,
        last_iter: Iter,
    },
    /// `Try` progress: the inner matcher's own state.
    Try(Box<MatcherState>),
}

/// Entering a matcher (or re-entering a non-clean state to request the next
/// alternative). Returns the next [`Message`] to dispatch.
pub(crate) fn execute<S: Source>(
    grammar: &Grammar,
    cfg: &mut Config<S>,
    matcher: MatcherId,
    state: &MatcherState,
    iter: Iter,
) -> Result<Message, EngineError> {
    cfg.failures.note_attempt(iter);
    match (&grammar.node(matcher).kind, state) {
        (MatcherKind::Literal(lit), MatcherState::Clean) => match_literal(cfg, lit, iter),
        (MatcherKind::Literal(_), _) => Ok(Message::Failure),

        (MatcherKind::Any, MatcherState::Clean) => match_any(cfg, iter),
        (MatcherKind::Any, _) => Ok(Message::Failure),

        (MatcherKind::Seq(children), MatcherState::Clean) => {
            if children.is_empty() {
                return Ok(Message::success(MatcherState::Dirty, iter, Value::empty()));
            }
            Ok(Message::execute(
                matcher,
                MatcherState::Seq {
                    idx: 0,
                    acc: Value::empty(),
                },
                children[0],
                MatcherState::Clean,
                iter,
            ))
        }
        (MatcherKind::Seq(_), _) => Ok(Message::Failure),

        (MatcherKind::Alt(children), MatcherState::Clean) => {
            if children.is_empty() {
                return Ok(Message::Failure);
            }
            Ok(Message::execute(
                matcher,
                MatcherState::Alt { idx: 0, at: iter },
                children[0],
                MatcherState::Clean,
                iter,
            ))
        }
        (MatcherKind::Alt(children), MatcherState::Alt { idx, at }) => {
            let next = idx + 1;
            if next < children.len() {
                Ok(Message::execute(
                    matcher,
                    MatcherState::Alt { idx: next, at: *at },
                    children[next],
                    MatcherState::Clean,
                    *at,
                ))
            } else {
                Ok(Message::Failure)
            }
        }
        (MatcherKind::Alt(_), _) => Ok(Message::Failure),

        (MatcherKind::Repeat { child, .. }, MatcherState::Clean) => Ok(Message::execute(
            matcher,
            MatcherState::Repeat {
                count: 0,
                acc: Value::empty(),
                last_iter: iter,
            },
            *child,
            MatcherState::Clean,
            iter,
        )),
        (MatcherKind::Repeat { .. }, _) => Ok(Message::Failure),

        (MatcherKind::Transform(child, _), MatcherState::Clean) => Ok(Message::execute(
            matcher,
            MatcherState::Clean,
            *child,
            MatcherState::Clean,
            iter,
        )),
        (MatcherKind::Transform(..), _) => Ok(Message::Failure),

        (MatcherKind::Try(inner), MatcherState::Clean) => {
            crate::try_scope::enter(cfg, grammar, matcher, *inner, Box::new(MatcherState::Clean), iter)
        }
        (MatcherKind::Try(inner), MatcherState::Try(inner_state)) => {
            crate::try_scope::enter(cfg, grammar, matcher, *inner, inner_state.clone(), iter)
        }
        (MatcherKind::Try(_), _) => Ok(Message::Failure),

        (MatcherKind::Error(msg), _) => Err(EngineError::Parser(crate::error::ParserError {
            message: msg.to_string(),
            iter,
        })),

        (MatcherKind::Ref(target), state) => {
            if *target == MatcherId::MAX {
                return Err(EngineError::Config(crate::error::ConfigError::new(
                    "unresolved recursive reference",
                )));
            }
            match state {
                MatcherState::Clean => Ok(Message::execute(
                    matcher,
                    MatcherState::Clean,
                    *target,
                    MatcherState::Clean,
                    iter,
                )),
                _ => Ok(Message::Failure),
            }
        }
    }
}

/// A child delegated-to by `parent` has produced a value. Decide whether to
/// continue (another `Execute`), conclude (`Success`), or give up
/// (`Failure`).
pub(crate) fn on_success<S: Source>(
    grammar: &Grammar,
    cfg: &mut Config<S>,
    parent: MatcherId,
    parent_state: &MatcherState,
    child_final_state: &MatcherState,
    iter: Iter,
    result: Value,
) -> Result<Message, EngineError> {
    match (&grammar.node(parent).kind, parent_state) {
        (MatcherKind::Seq(children), MatcherState::Seq { idx, acc }) => {
            let acc = acc.clone().concat(result);
            let next_idx = idx + 1;
            if next_idx < children.len() {
                Ok(Message::execute(
                    parent,
                    MatcherState::Seq { idx: next_idx, acc },
                    children[next_idx],
                    MatcherState::Clean,
                    iter,
                ))
            } else {
                Ok(Message::success(MatcherState::Dirty, iter, acc))
            }
        }

        (MatcherKind::Alt(_), MatcherState::Alt { idx, .. }) => {
            Ok(Message::success(MatcherState::Alt { idx: *idx, at: iter }, iter, result))
        }

        (MatcherKind::Repeat { child, max, .. }, MatcherState::Repeat { count, acc, .. }) => {
            let acc = acc.clone().concat(result);
            let count = count + 1;
            if max.map_or(true, |m| count < m) {
                Ok(Message::execute(
                    parent,
                    MatcherState::Repeat {
                        count,
                        acc,
                        last_iter: iter,
                    },
                    *child,
                    MatcherState::Clean,
                    iter,
                ))
            } else {
                Ok(Message::success(MatcherState::Dirty, iter, acc))
            }
        }

        (MatcherKind::Transform(_, f), MatcherState::Clean) => {
            Ok(Message::success(MatcherState::Dirty, iter, f(result)))
        }

        (MatcherKind::Try(_), MatcherState::Try(_)) => {
            crate::try_scope::exit_on_success(cfg, child_final_state.clone(), iter, result)
        }

        (MatcherKind::Ref(_), MatcherState::Clean) => {
            Ok(Message::success(MatcherState::Dirty, iter, result))
        }

        (kind, state) => unreachable!(
            "on_success invoked for a matcher/state pair that never delegates: {} / {state:?}",
            matcher_kind_name(kind)
        ),
    }
}

/// A child of `parent` failed. Decide whether to try an alternative or
/// propagate the failure.
pub(crate) fn on_failure<S: Source>(
    grammar: &Grammar,
    cfg: &mut Config<S>,
    parent: MatcherId,
    parent_state: &MatcherState,
) -> Result<Message, EngineError> {
    match (&grammar.node(parent).kind, parent_state) {
        (MatcherKind::Seq(_), MatcherState::Seq { .. }) => Ok(Message::Failure),

        (MatcherKind::Alt(children), MatcherState::Alt { idx, at }) => {
            let next = idx + 1;
            if next < children.len() {
                Ok(Message::execute(
                    parent,
                    MatcherState::Alt { idx: next, at: *at },
                    children[next],
                    MatcherState::Clean,
                    *at,
                ))
            } else {
                Ok(Message::Failure)
            }
        }

        (MatcherKind::Repeat { min, .. }, MatcherState::Repeat { count, acc, last_iter }) => {
            if count >= min {
                Ok(Message::success(MatcherState::Dirty, *last_iter, acc.clone()))
            } else {
                Ok(Message::Failure)
            }
        }

        (MatcherKind::Transform(..), MatcherState::Clean) => Ok(Message::Failure),

        (MatcherKind::Try(_), MatcherState::Try(_)) => crate::try_scope::exit_on_failure(cfg),

        (MatcherKind::Ref(_), MatcherState::Clean) => Ok(Message::Failure),

        (kind, state) => unreachable!(
            "on_failure invoked for a matcher/state pair that never delegates: {} / {state:?}",
            matcher_kind_name(kind)
        ),
    }
}

fn matcher_kind_name(kind: &MatcherKind) -> &'static str {
    match kind {
        MatcherKind::Literal(_) => "literal",
        MatcherKind::Any => "any",
        MatcherKind::Seq(_) => "seq",
        MatcherKind::Alt(_) => "alt",
        MatcherKind::Repeat { .. } => "repeat",
        MatcherKind::Transform(..) => "transform",
        MatcherKind::Try(_) => "try",
        MatcherKind::Error(_) => "error",
        MatcherKind::Ref(_) => "ref",
    }
}
