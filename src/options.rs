//! The enumerated dispatch modes `parse`/`parse_one` select between.

/// Selects one of the engine's dispatch modes. `ParseOptions` is the
/// engine's entire configuration surface: there is no external config
/// file or environment layer, it's an in-process value passed directly
/// to [`crate::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Memoize sub-parses keyed by `(matcher, state, cursor)`. Pure
    /// deduplication: identical under `cache: off`, just slower.
    pub cache: bool,
    /// Respect `Try` matchers and run the expiring/backtracking `Source`
    /// variant. `Try` sites reached with this off are a `ConfigError`.
    pub try_mode: bool,
    /// Emit the structured trace overlay while still producing the normal
    /// result.
    pub debug: bool,
}

impl ParseOptions {
    /// `{ cache: off, try: off }`.
    pub const fn new() -> Self {
        ParseOptions {
            cache: false,
            try_mode: false,
            debug: false,
        }
    }

    /// `{ cache: on, try: off }`.
    pub const fn cached() -> Self {
        Self::new().with_cache(true)
    }

    /// `{ cache: off, try: on }`.
    pub const fn backtracking() -> Self {
        Self::new().with_try_mode(true)
    }

    /// `{ cache: on, try: on }`.
    pub const fn cached_backtracking() -> Self {
        Self::new().with_cache(true).with_try_mode(true)
    }

    /// Builder-style setter for `cache`.
    pub const fn with_cache(mut self, on: bool) -> Self {
        self.cache = on;
        self
    }

    /// Builder-style setter for `try_mode`.
    pub const fn with_try_mode(mut self, on: bool) -> Self {
        self.try_mode = on;
        self
    }

    /// Builder-style setter for the `debug: on` overlay.
    pub const fn with_debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }
}
