//! Support for grammars that are cyclic through named references, e.g. a
//! recursive-descent grammar for a nested expression language.
//!
//! Per the Design Notes ("Grammar tree cycles"), cycles are represented as
//! arena indices ([`MatcherId`]) rather than `Rc`/`Weak` pointers: a
//! [`Grammar::placeholder`] is reserved up front, the grammar is built
//! (possibly referencing the placeholder from inside its own definition),
//! and [`Grammar::resolve`] patches the placeholder to point at the
//! completed subtree. No reference counting, no `Weak` upgrade failures.

use crate::matcher::{Grammar, MatcherId};

/// Build a recursive grammar: `define` receives the id of a not-yet-defined
/// placeholder matcher (usable as a child anywhere inside the grammar it
/// builds) and returns the id of the matcher that placeholder should
/// resolve to once construction completes.
///
/// ```
/// use tramparse::prelude::*;
///
/// let mut g = Grammar::new();
/// // balanced-parens: "(" expr ")" | <empty>
/// let expr = recursive(&mut g, |g, expr_ref| {
///     let open = g.literal("(");
///     let close = g.literal(")");
///     let nested = g.seq([open, expr_ref, close]);
///     let empty = g.literal("");
///     g.alt([nested, empty])
/// });
/// g.set_root(expr);
/// ```
pub fn recursive<F>(grammar: &mut Grammar, define: F) -> MatcherId
where
    F: FnOnce(&mut Grammar, MatcherId) -> MatcherId,
{
    let placeholder = grammar.placeholder();
    let target = define(grammar, placeholder);
    grammar.resolve(placeholder, target);
    placeholder
}
