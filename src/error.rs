//! Error taxonomy.
//!
//! Ordinary parse failure is a first-class value ([`Failure`]), not an
//! exception. [`ExpiredContent`] is an internal signal caught at every
//! trampoline dispatch and folded into an ordinary failure. [`ParserError`]
//! and [`ConfigError`] are true aborts: they propagate all the way out of
//! [`crate::parse`] rather than being absorbed by backtracking.

use crate::cursor::Iter;

/// Raised internally when a [`Source`](crate::source::Source) read passes
/// through a cursor that has already been expired. Never escapes the crate:
/// the trampoline converts every occurrence into an ordinary [`Failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExpiredContent {
    pub at: Iter,
}

/// A matcher ([`Error`](crate::matcher::MatcherKind::Error)) deciding the
/// input is unrecoverable. Bypasses backtracking entirely and propagates to
/// the caller of [`crate::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parser error at {iter}: {message}")]
pub struct ParserError {
    /// Human-readable description of why parsing was aborted.
    pub message: String,
    /// Cursor at which the abort was raised.
    pub iter: Iter,
}

/// A grammar- or invocation-level misconfiguration: a `Try`-required site
/// reached outside a `try`-enabled [`ParseOptions`](crate::options::ParseOptions),
/// or a [`Range`](crate::cursor::Range) slice spanning more than one line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);

impl ConfigError {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        ConfigError(msg.into())
    }
}

/// An ordinary, first-class parse failure: the boolean "no" outcome plus a
/// best-effort diagnostic summary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parse failed at {farthest}; expected one of {expected:?}")]
pub struct Failure {
    /// The farthest cursor any matcher reached during the attempt.
    pub farthest: Iter,
    /// Labels of the matchers that were tried at `farthest` and did not match.
    pub expected: Vec<String>,
}

/// Internal dispatch-layer error: either an [`ExpiredContent`] (caught by the
/// trampoline and folded into [`Message::Failure`](crate::message::Message))
/// or a true abort that must propagate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EngineError {
    Expired(ExpiredContent),
    Parser(ParserError),
    Config(ConfigError),
}

impl From<ExpiredContent> for EngineError {
    fn from(e: ExpiredContent) -> Self {
        EngineError::Expired(e)
    }
}

impl From<ParserError> for EngineError {
    fn from(e: ParserError) -> Self {
        EngineError::Parser(e)
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        EngineError::Config(e)
    }
}

/// The top-level error returned by [`crate::parse`]: either an ordinary
/// [`Failure`] or an abort that bypassed backtracking entirely.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Ordinary parse failure; the grammar simply did not match.
    #[error(transparent)]
    Failed(#[from] Failure),
    /// `Error` matcher fired, or the grammar/options were misconfigured.
    #[error(transparent)]
    Parser(#[from] ParserError),
    /// `Error` matcher fired, or the grammar/options were misconfigured.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
