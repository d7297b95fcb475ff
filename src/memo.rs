//! Memo: single-argument memoization wrapper.

use core::hash::Hash;
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

/// Caches the result of a single-argument function per distinct argument.
///
/// The function runs once on the first call for each argument; later calls
/// with an equal argument return the cached result. The cache grows
/// unboundedly (no eviction) and the wrapper is single-threaded.
pub struct Memo<A, R, F> {
    func: F,
    cache: HashMap<A, R>,
}

impl<A, R, F> Memo<A, R, F>
where
    A: Eq + Hash,
    F: FnMut(&A) -> R,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            cache: HashMap::new(),
        }
    }

    /// The function's result for `arg`, computed on first use.
    pub fn value(&mut self, arg: A) -> &R {
        match self.cache.entry(arg) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let result = (self.func)(e.key());
                e.insert(result)
            }
        }
    }

    /// Number of distinct arguments cached so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
