//! The concrete leaf/combinator matcher set.
//!
//! The matcher protocol is an open extension point: anything implementing
//! it can sit in a [`Grammar`]. This module is the reference implementation,
//! enough of a matcher set (literal, dot, sequence, alternative,
//! repetition, transform) to exercise and demonstrate the execution engine.

use std::rc::Rc;

use crate::config::Config;
use crate::cursor::Iter;
use crate::error::EngineError;
use crate::matcher::{Grammar, MatcherId, MatcherKind};
use crate::message::Message;
use crate::matcher::MatcherState;
use crate::source::Source;
use crate::value::{Item, Value};

impl Grammar {
    /// Match an exact run of characters, producing a single [`Item::Text`].
    pub fn literal(&mut self, lit: impl AsRef<str>) -> MatcherId {
        self.push(
            Some("literal"),
            MatcherKind::Literal(Rc::from(lit.as_ref())),
        )
    }

    /// Match any single character, producing a single [`Item::Char`].
    pub fn any(&mut self) -> MatcherId {
        self.push(Some("any"), MatcherKind::Any)
    }

    /// Match each of `children` in order, concatenating their values.
    /// Panics if `children` is empty; use [`Grammar::literal`] with `""` for
    /// an always-succeeding, input-consuming-nothing matcher instead.
    pub fn seq(&mut self, children: impl Into<Vec<MatcherId>>) -> MatcherId {
        self.push(Some("seq"), MatcherKind::Seq(children.into()))
    }

    /// Try each of `children` in order at the same cursor; take the first
    /// match. Panics if `children` is empty.
    pub fn alt(&mut self, children: impl Into<Vec<MatcherId>>) -> MatcherId {
        let children = children.into();
        assert!(!children.is_empty(), "Grammar::alt requires at least one alternative");
        self.push(Some("alt"), MatcherKind::Alt(children))
    }

    /// Match `child` between `min` and `max` (inclusive) times, greedily.
    /// `max: None` means unbounded.
    pub fn repeat(&mut self, child: MatcherId, min: u32, max: Option<u32>) -> MatcherId {
        self.push(Some("repeat"), MatcherKind::Repeat { child, min, max })
    }

    /// `repeat(child, 0, None)`: zero or more.
    pub fn repeated(&mut self, child: MatcherId) -> MatcherId {
        self.repeat(child, 0, None)
    }

    /// `repeat(child, 1, None)`: one or more.
    pub fn repeated_at_least_one(&mut self, child: MatcherId) -> MatcherId {
        self.repeat(child, 1, None)
    }

    /// Apply a pure function to `child`'s produced value.
    pub fn transform<F: Fn(Value) -> Value + 'static>(&mut self, child: MatcherId, f: F) -> MatcherId {
        self.push(
            Some("transform"),
            MatcherKind::Transform(child, Rc::new(f)),
        )
    }

    /// Wrap `child` in a `Try` scope: see [`crate::try_scope`].
    pub fn try_(&mut self, child: MatcherId) -> MatcherId {
        self.push(Some("try"), MatcherKind::Try(child))
    }

    /// Unconditionally abort parsing at this point with `message`.
    pub fn error(&mut self, message: impl AsRef<str>) -> MatcherId {
        self.push(Some("error"), MatcherKind::Error(Rc::from(message.as_ref())))
    }
}

pub(crate) fn match_literal<S: Source>(
    cfg: &mut Config<S>,
    lit: &str,
    start: Iter,
) -> Result<Message, EngineError> {
    let mut cur = start;
    for expected in lit.chars() {
        if cfg.source.done(cur) {
            cfg.failures.record(cur, format!("{lit:?}"));
            return Ok(Message::Failure);
        }
        let (ch, next) = match cfg.source.next(cur) {
            Ok(pair) => pair,
            Err(expired) => return Err(EngineError::Expired(expired)),
        };
        if ch != expected {
            cfg.failures.record(cur, format!("{lit:?}"));
            return Ok(Message::Failure);
        }
        cur = next;
    }
    Ok(Message::success(
        MatcherState::Dirty,
        cur,
        Value::single(Item::Text(Rc::from(lit))),
    ))
}

pub(crate) fn match_any<S: Source>(cfg: &mut Config<S>, iter: Iter) -> Result<Message, EngineError> {
    if cfg.source.done(iter) {
        cfg.failures.record(iter, "any character".to_string());
        return Ok(Message::Failure);
    }
    let (ch, next) = match cfg.source.next(iter) {
        Ok(pair) => pair,
        Err(expired) => return Err(EngineError::Expired(expired)),
    };
    Ok(Message::success(
        MatcherState::Dirty,
        next,
        Value::single(Item::Char(ch)),
    ))
}
