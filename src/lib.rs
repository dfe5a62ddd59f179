//! A trampolining parser-combinator execution engine.
//!
//! A [`Grammar`] is a tree of matchers built with the combinators in
//! [`primitive`] (plus [`recursive`] for cyclic references). [`parse`] runs
//! it against a [`Source`] and returns the assembled [`Value`], driving the
//! matcher protocol ([`matcher::execute`]/`on_success`/`on_failure`) from an
//! explicit heap stack in [`trampoline`] rather than the Rust call stack, so
//! grammar depth is bounded only by available memory.
//!
//! Backtracking across a committed prefix (Parsec-style `try`) goes through
//! [`try_scope`] and requires [`ParseOptions::try_mode`]; outside a `Try`
//! scope, consumed input is expired (permanently discarded) as soon as it's
//! committed, which is what lets this engine parse unbounded streaming
//! input in bounded memory.

pub mod cache;
pub mod config;
pub mod cursor;
pub mod debug;
pub mod error;
pub mod matcher;
pub mod message;
pub mod options;
pub mod primitive;
pub mod recursive;
pub mod source;
pub mod trampoline;
pub mod try_scope;
pub mod value;

use config::Config;
use error::ParseError;
use matcher::Grammar;
use options::ParseOptions;
use source::Source;
use trampoline::RunError;
use value::Value;

/// Run `grammar` against `source` under `options`, returning the assembled
/// [`Value`] on success.
///
/// `Err(ParseError::Failed(_))` means the grammar simply did not match;
/// `Err(ParseError::Parser(_))`/`Err(ParseError::Config(_))` are aborts that
/// bypass backtracking entirely (an `Error` matcher fired, or a `Try` site
/// was reached without `try_mode`).
pub fn parse<S: Source>(grammar: &Grammar, source: &mut S, options: ParseOptions) -> Result<Value, ParseError> {
    let mut cfg = Config::new(source, options);
    let root = grammar.root();
    match trampoline::run(grammar, &mut cfg, root) {
        Ok(value) => Ok(value),
        Err(RunError::Failed) => Err(ParseError::Failed(cfg.failures.into_failure())),
        Err(RunError::Engine(error::EngineError::Parser(e))) => Err(ParseError::Parser(e)),
        Err(RunError::Engine(error::EngineError::Config(e))) => Err(ParseError::Config(e)),
        Err(RunError::Engine(error::EngineError::Expired(_))) => {
            unreachable!("ExpiredContent never escapes the trampoline")
        }
    }
}

/// Convenience wrapper over [`parse`] for in-memory string input, using
/// default (uncached, non-backtracking) options.
pub fn parse_one(grammar: &Grammar, input: impl Into<String>) -> Result<Value, ParseError> {
    let mut src = source::LineSource::from_str(input);
    parse(grammar, &mut src, ParseOptions::new())
}

/// Re-exports of the common public surface, for `use tramparse::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Failure, ParseError};
    pub use crate::matcher::Grammar;
    pub use crate::options::ParseOptions;
    pub use crate::recursive::recursive;
    pub use crate::source::{LineSource, Source};
    pub use crate::value::{Item, Value};
    pub use crate::{parse, parse_one};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Item;
    use pretty_assertions::assert_eq;

    #[test]
    fn literal_matches_exact_text() {
        let mut g = Grammar::new();
        let lit = g.literal("hello");
        g.set_root(lit);

        let value = parse_one(&g, "hello").expect("should match");
        assert_eq!(value.to_string(), "hello");
    }

    #[test]
    fn literal_fails_on_mismatch() {
        let mut g = Grammar::new();
        let lit = g.literal("hello");
        g.set_root(lit);

        let err = parse_one(&g, "goodbye").unwrap_err();
        assert!(matches!(err, ParseError::Failed(_)));
    }

    #[test]
    fn sequence_with_dot_concatenates_in_order() {
        let mut g = Grammar::new();
        let a = g.literal("a");
        let dot = g.any();
        let c = g.literal("c");
        let seq = g.seq([a, dot, c]);
        g.set_root(seq);

        let value = parse_one(&g, "abc").expect("should match");
        assert_eq!(value.into_items(), vec![
            Item::Text(std::rc::Rc::from("a")),
            Item::Char('b'),
            Item::Text(std::rc::Rc::from("c")),
        ]);
    }

    #[test]
    fn alternative_backtracks_to_the_next_child() {
        let mut g = Grammar::new();
        let foo = g.literal("foo");
        let bar = g.literal("bar");
        let alt = g.alt([foo, bar]);
        g.set_root(alt);

        let value = parse_one(&g, "bar").expect("should match second alternative");
        assert_eq!(value.to_string(), "bar");
    }

    #[test]
    fn repeat_respects_minimum() {
        let mut g = Grammar::new();
        let a = g.literal("a");
        let at_least_two = g.repeat(a, 2, None);
        g.set_root(at_least_two);

        assert!(parse_one(&g, "a").is_err());
        let value = parse_one(&g, "aaa").expect("three a's satisfy the minimum");
        assert_eq!(value.to_string(), "aaa");
    }

    #[test]
    fn try_without_try_mode_is_a_config_error() {
        let mut g = Grammar::new();
        let lit = g.literal("x");
        let wrapped = g.try_(lit);
        g.set_root(wrapped);

        let err = parse_one(&g, "x").unwrap_err();
        assert!(matches!(err, ParseError::Config(_)));
    }

    #[test]
    fn try_scope_backtracks_a_committed_prefix() {
        let mut g = Grammar::new();
        let ab = g.literal("ab");
        let cd = g.literal("cd");
        let first = g.seq([ab, cd]);
        let tried = g.try_(first);
        let ac = g.literal("ac");
        let alt = g.alt([tried, ac]);
        g.set_root(alt);

        let mut src = source::LineSource::from_str("ac");
        let value = parse(&g, &mut src, ParseOptions::backtracking())
            .expect("backtracking retries from before the tried prefix");
        assert_eq!(value.to_string(), "ac");
    }

    #[test]
    fn error_matcher_aborts_instead_of_failing() {
        let mut g = Grammar::new();
        let boom = g.error("unrecoverable");
        g.set_root(boom);

        let err = parse_one(&g, "anything").unwrap_err();
        assert!(matches!(err, ParseError::Parser(_)));
    }

    #[test]
    fn cache_hit_is_observably_identical_to_a_fresh_dispatch() {
        let mut g = Grammar::new();
        let a = g.literal("a");
        let b = g.literal("b");
        let alt1 = g.alt([a, b]);
        let alt2 = g.alt([a, b]);
        let seq = g.seq([alt1, alt2]);
        g.set_root(seq);

        let mut src_cached = source::LineSource::from_str("aa");
        let mut src_uncached = source::LineSource::from_str("aa");
        let cached = parse(&g, &mut src_cached, ParseOptions::cached()).expect("should match");
        let uncached = parse(&g, &mut src_uncached, ParseOptions::new()).expect("should match");
        assert_eq!(cached, uncached);
    }

    #[test]
    fn recursive_grammar_matches_balanced_parens() {
        let mut g = Grammar::new();
        let expr = recursive::recursive(&mut g, |g, expr_ref| {
            let open = g.literal("(");
            let close = g.literal(")");
            let nested = g.seq([open, expr_ref, close]);
            let empty = g.literal("");
            g.alt([nested, empty])
        });
        g.set_root(expr);

        assert!(parse_one(&g, "((()))").is_ok());
        assert!(parse_one(&g, "(()").is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // A small grammar family: alternation of up to four short ASCII literals,
    // repeated one or more times. Big enough to exercise Alt/Repeat/Seq
    // backtracking without the input space being so wide that proptest
    // spends most of its budget on inputs that fail trivially.
    fn alt_literal_grammar(words: &[&str]) -> Grammar {
        let mut g = Grammar::new();
        let children: Vec<_> = words.iter().map(|w| g.literal(*w)).collect();
        let alt = g.alt(children);
        let rep = g.repeated_at_least_one(alt);
        g.set_root(rep);
        g
    }

    fn words_and_input() -> impl Strategy<Value = (Vec<&'static str>, String)> {
        let words = vec!["ab", "ac", "a", "b"];
        "[ab]{0,8}".prop_map(move |input| (words.clone(), input))
    }

    // Same shape as `alt_literal_grammar`, but its first alternative is
    // wrapped in `Try` so a backtracking run actually drives `freeze`/
    // `unfreeze`, rather than leaving `frozen` at zero for the trivial
    // reason that no `Try` matcher ever ran.
    fn alt_literal_grammar_with_try(words: &[&str]) -> Grammar {
        let mut g = Grammar::new();
        let mut children: Vec<_> = words.iter().map(|w| g.literal(*w)).collect();
        if let Some(&first) = children.first() {
            children[0] = g.try_(first);
        }
        let alt = g.alt(children);
        let rep = g.repeated_at_least_one(alt);
        g.set_root(rep);
        g
    }

    proptest! {
        #[test]
        fn determinism((words, input) in words_and_input()) {
            let g = alt_literal_grammar(&words);
            let first = parse_one(&g, input.clone());
            let second = parse_one(&g, input);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn cache_transparency((words, input) in words_and_input()) {
            let g = alt_literal_grammar(&words);
            let mut cached_src = source::LineSource::from_str(input.clone());
            let mut uncached_src = source::LineSource::from_str(input);
            let cached = parse(&g, &mut cached_src, ParseOptions::cached());
            let uncached = parse(&g, &mut uncached_src, ParseOptions::new());
            prop_assert_eq!(cached, uncached);
        }

        #[test]
        fn try_balance((words, input) in words_and_input()) {
            let g = alt_literal_grammar_with_try(&words);
            let mut src = source::LineSource::from_str(input);
            let _ = parse(&g, &mut src, ParseOptions::backtracking());
            prop_assert_eq!(src.frozen(), 0);
        }

        #[test]
        fn idempotence((words, input) in words_and_input()) {
            let g = alt_literal_grammar(&words);
            let mut src_a = source::LineSource::from_str(input.clone());
            let mut src_b = source::LineSource::from_str(input);
            let a = parse(&g, &mut src_a, ParseOptions::new());
            let b = parse(&g, &mut src_b, ParseOptions::new());
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn cache_key_soundness_replays_identical_child_outcome() {
        // `shared` is the same matcher id in both Alt branches. The first
        // branch consumes it then fails on its own tail, so Alt backtracks
        // and re-enters the second branch at the alternation's entry cursor,
        // re-executing `shared` at the exact same (matcher, state, iter)
        // triple. A counting transform proves whether that second visit
        // actually replayed the cached outcome instead of re-running it.
        use std::cell::Cell;
        use std::rc::Rc;

        fn build(calls: Rc<Cell<u32>>) -> Grammar {
            let mut g = Grammar::new();
            let a = g.literal("a");
            let shared = g.transform(a, move |v| {
                calls.set(calls.get() + 1);
                v
            });
            let x = g.literal("x");
            let y = g.literal("y");
            let left = g.seq([shared, x]);
            let right = g.seq([shared, y]);
            let alt = g.alt([left, right]);
            g.set_root(alt);
            g
        }

        let cached_calls = Rc::new(Cell::new(0));
        let g = build(cached_calls.clone());
        let mut src = source::LineSource::from_str("ay");
        let value = parse(&g, &mut src, ParseOptions::cached()).expect("should match");
        assert_eq!(value.to_string(), "ay");
        assert_eq!(
            cached_calls.get(),
            1,
            "a cache hit must replay the first visit's outcome, not re-run `shared`"
        );

        let uncached_calls = Rc::new(Cell::new(0));
        let g = build(uncached_calls.clone());
        let mut src = source::LineSource::from_str("ay");
        let value = parse(&g, &mut src, ParseOptions::new()).expect("should match");
        assert_eq!(value.to_string(), "ay");
        assert_eq!(
            uncached_calls.get(),
            2,
            "without a cache, Alt's backtracking re-runs `shared` from scratch"
        );
    }
}
