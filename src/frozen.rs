//! Frozen: construct-then-freeze wrapper.

use core::ops::Deref;

/// A value that is mutable only while its construction closure runs.
///
/// `Frozen::build` hands out `&mut T` to the closure, then freezes the
/// result: afterwards only shared access exists (`Deref`, no `DerefMut`),
/// so a post-construction write is a compile error rather than a runtime
/// one. Thawing is explicit and consuming via `into_inner`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Frozen<T>(T);

impl<T> Frozen<T> {
    /// Freeze `value` as-is.
    pub fn new(value: T) -> Self {
        Frozen(value)
    }

    /// Run `init` with mutable access to `seed`, then freeze the result.
    pub fn build<F>(seed: T, init: F) -> Self
    where
        F: FnOnce(&mut T),
    {
        let mut value = seed;
        init(&mut value);
        Frozen(value)
    }

    pub fn get(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper, yielding the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Frozen<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.0
    }
}
