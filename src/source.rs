//! The `Source` abstraction: an input stream with a cursor type, range
//! slicing, and the expiration operation that bounds memory use.

use std::collections::VecDeque;
use std::io::BufRead;

use crate::cursor::{ColSpec, Iter, LineSpec, Range};
use crate::error::{ConfigError, ExpiredContent};

/// The contract every concrete input representation satisfies. Both an
/// in-memory string input and a line-oriented stream input can present
/// this same interface.
pub trait Source {
    /// The cursor at the very start of the input: always `(1, 1)`.
    fn start(&self) -> Iter {
        Iter::new(1, 1)
    }

    /// The floating end-of-input sentinel, sorting after every concrete
    /// cursor this source will ever produce. Useful for callers comparing a
    /// live cursor against "have we reached the end" without needing to
    /// know how many lines remain.
    fn end(&self) -> Iter {
        Iter::floating_end()
    }

    /// Read one character at `iter`, returning it and the cursor immediately
    /// after it (wrapping to the next line's column 1 when `iter` was the
    /// last character of its line). Reading through an expired cursor raises
    /// [`ExpiredContent`]; reading beyond the buffered input lazily fetches
    /// more from the underlying stream.
    fn next(&mut self, iter: Iter) -> Result<(char, Iter), ExpiredContent>;

    /// True iff `iter`'s line has no more characters *and* the underlying
    /// stream has nothing further to fetch.
    fn done(&mut self, iter: Iter) -> bool;

    /// Slice the substring named by `range`. The `FLOAT_LINE`/`END_COL`
    /// unification placeholders in `range`'s endpoints are resolved relative
    /// to `range.start`'s line. Ranges spanning more than one resolved line
    /// are a [`ConfigError`].
    fn slice(&mut self, range: Range) -> Result<String, ConfigError>;

    /// Permanently discard the prefix up to `iter`. A no-op while any `Try`
    /// scope is active (`frozen() > 0`).
    fn expire(&mut self, iter: Iter);

    /// Current nesting depth of active `Try` scopes.
    fn frozen(&self) -> u32;

    /// Enter a `Try` scope: suspend expiration.
    fn freeze(&mut self);

    /// Exit a `Try` scope: resume expiration once the count returns to zero.
    fn unfreeze(&mut self);
}

/// A line-buffered `Source` generic over any [`BufRead`], so it equally
/// backs an in-memory string (`LineSource::from_str`) or a genuine streaming
/// reader (`LineSource::from_reader`).
///
/// Lines are fetched lazily, one `read_line` at a time, and retained as
/// `Vec<char>` (rather than `String`) so that column indexing is O(1)
/// instead of re-walking UTF-8 on every `next`.
pub struct LineSource<R> {
    reader: R,
    reader_at_eof: bool,
    lines: VecDeque<Vec<char>>,
    /// Number of lines discarded so far. Logical line `L` lives at physical
    /// index `L - zero - 1`.
    zero: usize,
    /// Rightmost column expired on the current first retained line.
    right: usize,
    frozen: u32,
}

impl<R: BufRead> LineSource<R> {
    /// Build a source reading lines lazily from `reader`.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            reader_at_eof: false,
            lines: VecDeque::new(),
            zero: 0,
            right: 0,
            frozen: 0,
        }
    }

    fn physical_idx(&self, line: usize) -> Option<usize> {
        line.checked_sub(self.zero + 1)
    }

    /// Ensure physical line `idx` is buffered (fetching more lines from the
    /// reader as needed). Returns whether the line exists.
    fn ensure_line(&mut self, idx: usize) -> bool {
        while self.lines.len() <= idx && !self.reader_at_eof {
            let mut buf = String::new();
            match self.reader.read_line(&mut buf) {
                Ok(0) => self.reader_at_eof = true,
                Ok(_) => self.lines.push_back(buf.chars().collect()),
                Err(_) => self.reader_at_eof = true,
            }
        }
        idx < self.lines.len()
    }

    fn is_expired(&self, iter: Iter) -> bool {
        iter.line <= self.zero || (iter.line == self.zero + 1 && iter.col < self.right)
    }
}

impl LineSource<std::io::Cursor<String>> {
    /// Build a source over an in-memory string.
    pub fn from_str(input: impl Into<String>) -> Self {
        Self::from_reader(std::io::Cursor::new(input.into()))
    }
}

impl<R: BufRead> Source for LineSource<R> {
    fn next(&mut self, iter: Iter) -> Result<(char, Iter), ExpiredContent> {
        if self.is_expired(iter) {
            return Err(ExpiredContent { at: iter });
        }
        let idx = self
            .physical_idx(iter.line)
            .expect("non-expired cursor resolves to a retained line");
        if !self.ensure_line(idx) {
            return Err(ExpiredContent { at: iter });
        }
        let line = &self.lines[idx];
        let ch = *line
            .get(iter.col - 1)
            .expect("done() must be checked before next()");
        // Only the line terminator itself wraps to the next line. A final
        // line with no trailing newline has no such character, so matching
        // its last byte must land on `(line, len + 1)`, not `(line + 1, 1)`.
        let next = if ch == '\n' {
            Iter::new(iter.line + 1, 1)
        } else {
            Iter::new(iter.line, iter.col + 1)
        };
        Ok((ch, next))
    }

    fn done(&mut self, iter: Iter) -> bool {
        let idx = match self.physical_idx(iter.line) {
            Some(idx) => idx,
            None => return false,
        };
        if !self.ensure_line(idx) {
            return true;
        }
        iter.col > self.lines[idx].len()
    }

    fn slice(&mut self, range: Range) -> Result<String, ConfigError> {
        let start_line = match range.start.line {
            LineSpec::Fixed(l) => l,
            LineSpec::SameAsContext => {
                return Err(ConfigError::new("range start line cannot float"))
            }
        };
        let stop_line = match range.stop.line {
            LineSpec::Fixed(l) => l,
            LineSpec::SameAsContext => start_line,
        };
        if start_line != stop_line {
            return Err(ConfigError::new(
                "ranges spanning lines are not supported",
            ));
        }
        let idx = self
            .physical_idx(start_line)
            .ok_or_else(|| ConfigError::new("range references an expired line"))?;
        if !self.ensure_line(idx) {
            return Err(ConfigError::new("range references a line beyond the input"));
        }
        let line = &self.lines[idx];
        let end_col = line.len() + 1;
        let start_col = match range.start.col {
            ColSpec::Fixed(c) => c,
            ColSpec::EndOfLine => end_col,
        };
        let stop_col = match range.stop.col {
            ColSpec::Fixed(c) => c,
            ColSpec::EndOfLine => end_col,
        };
        if start_col > stop_col || stop_col > end_col {
            return Err(ConfigError::new("range out of bounds for its line"));
        }
        Ok(line[start_col - 1..stop_col - 1].iter().collect())
    }

    fn expire(&mut self, iter: Iter) {
        if self.frozen > 0 {
            return;
        }
        let n = iter.line.saturating_sub(self.zero + 1);
        for _ in 0..n {
            self.lines.pop_front();
        }
        self.zero += n;
        // `right` only advances when more than one line was newly
        // discarded, or the new column exceeds the current `right`
        // (a single-line advance alone doesn't widen the reported window).
        if n > 1 || iter.col > self.right {
            self.right = iter.col;
        }
    }

    fn frozen(&self) -> u32 {
        self.frozen
    }

    fn freeze(&mut self) {
        self.frozen += 1;
    }

    fn unfreeze(&mut self) {
        self.frozen = self
            .frozen
            .checked_sub(1)
            .expect("unfreeze without matching freeze");
    }
}
