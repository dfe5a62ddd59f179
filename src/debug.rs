//! The structured, stable-format trace overlay.
//!
//! When `ParseOptions::debug` is set, the trampoline emits one line per
//! dispatch step through [`tracing`] (so callers wire up whatever
//! `tracing-subscriber` layer they like) in a fixed textual format, which
//! is also handy for snapshot-testing a grammar's exact evaluation order.

use crate::cursor::Iter;
use crate::matcher::MatcherId;
use crate::value::Value;

const PREVIEW_WIDTH: usize = 12;

/// Emits one stable-format trace line per `Execute`/`Success`/`Failure`
/// dispatch step.
pub(crate) struct DebugTrace;

impl DebugTrace {
    pub(crate) fn new() -> Self {
        DebugTrace
    }

    pub(crate) fn on_execute(
        &self,
        iter: Iter,
        preview: &str,
        depth: usize,
        parent: MatcherId,
        child: MatcherId,
    ) {
        let line = format!(
            "{},{}:{} {} {}{}->{}",
            iter.line,
            iter.col,
            pad_preview(preview),
            depth,
            indent(depth),
            parent,
            child,
        );
        tracing::debug!(target: "tramparse::trace", "{line}");
    }

    pub(crate) fn on_success(&self, iter: Iter, preview: &str, depth: usize, parent: MatcherId, result: &Value) {
        let line = format!(
            "{},{}:{} {} {}{}<-{}",
            iter.line,
            iter.col,
            pad_preview(preview),
            depth,
            indent(depth),
            parent,
            short(result),
        );
        tracing::debug!(target: "tramparse::trace", "{line}");
    }

    pub(crate) fn on_failure(&self, iter: Iter, preview: &str, depth: usize, parent: MatcherId) {
        let line = format!(
            "{},{}:{} {} {}{}<-!!!",
            iter.line,
            iter.col,
            pad_preview(preview),
            depth,
            indent(depth),
            parent,
        );
        tracing::debug!(target: "tramparse::trace", "{line}");
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn pad_preview(preview: &str) -> String {
    let escaped: String = preview
        .chars()
        .take(PREVIEW_WIDTH)
        .map(|c| match c {
            '\n' => '\u{2424}', // visible newline glyph
            '\t' => ' ',
            other => other,
        })
        .collect();
    format!("{escaped:<width$}", width = PREVIEW_WIDTH)
}

fn short(result: &Value) -> String {
    let s = result.to_string();
    if s.chars().count() > PREVIEW_WIDTH {
        s.chars().take(PREVIEW_WIDTH).collect::<String>() + "…"
    } else {
        s
    }
}
