//! Per-parse state threaded through every dispatch: the source, the active
//! options, and the running failure-diagnostic tracker.

use std::cmp::Ordering;

use crate::cursor::Iter;
use crate::debug::DebugTrace;
use crate::error::Failure;
use crate::options::ParseOptions;
use crate::source::Source;

/// Tracks the farthest cursor any matcher reached and what was expected
/// there, for the best-effort summary attached to an ordinary [`Failure`].
#[derive(Debug)]
pub(crate) struct FailureTracker {
    farthest: Iter,
    expected: Vec<String>,
}

impl FailureTracker {
    fn new(start: Iter) -> Self {
        Self {
            farthest: start,
            expected: Vec::new(),
        }
    }

    /// Record an attempt (successful or not) reaching `iter`.
    pub(crate) fn note_attempt(&mut self, iter: Iter) {
        if iter > self.farthest {
            self.farthest = iter;
            self.expected.clear();
        }
    }

    /// Record that `label` was expected but did not match at `iter`.
    pub(crate) fn record(&mut self, iter: Iter, label: impl Into<String>) {
        match iter.cmp(&self.farthest) {
            Ordering::Greater => {
                self.farthest = iter;
                self.expected = vec![label.into()];
            }
            Ordering::Equal => self.expected.push(label.into()),
            Ordering::Less => {}
        }
    }

    pub(crate) fn farthest(&self) -> Iter {
        self.farthest
    }

    pub(crate) fn into_failure(self) -> Failure {
        Failure {
            farthest: self.farthest,
            expected: self.expected,
        }
    }
}

/// Bundles everything a matcher handler needs besides the grammar itself.
pub(crate) struct Config<'s, S: Source> {
    pub(crate) source: &'s mut S,
    pub(crate) options: ParseOptions,
    pub(crate) failures: FailureTracker,
    pub(crate) debug: Option<DebugTrace>,
    depth: usize,
}

impl<'s, S: Source> Config<'s, S> {
    pub(crate) fn new(source: &'s mut S, options: ParseOptions) -> Self {
        let start = source.start();
        Config {
            source,
            debug: options.debug.then(DebugTrace::new),
            options,
            failures: FailureTracker::new(start),
            depth: 0,
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn push_depth(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn pop_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
