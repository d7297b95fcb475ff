//! UniqueValuesMap: public map layer enforcing cross-instance value
//! uniqueness through a shared ValueRegistry.

use crate::registry::{acquire_one, release_one, InstanceId, ValueRegistry};
use core::borrow::Borrow;
use core::hash::Hash;
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The value is already held by another live instance of the registry.
    #[error("the same value cannot be used across multiple live instances")]
    DuplicateValue,
    /// Copying is permanently unsupported: a copy would duplicate every
    /// value into a second live instance.
    #[error("copy is not supported for UniqueValuesMap instances")]
    CopyUnsupported,
}

/// Bulk-entry source for construction and `update`.
///
/// A closed set of accepted shapes instead of runtime type inspection: a
/// source that is neither a mapping nor a pair sequence does not type-check.
#[derive(Clone, Debug)]
pub enum EntrySource<K, V> {
    Mapping(HashMap<K, V>),
    Pairs(Vec<(K, V)>),
}

impl<K, V> From<HashMap<K, V>> for EntrySource<K, V> {
    fn from(m: HashMap<K, V>) -> Self {
        EntrySource::Mapping(m)
    }
}

impl<K, V> From<std::collections::HashMap<K, V>> for EntrySource<K, V>
where
    K: Eq + Hash,
{
    fn from(m: std::collections::HashMap<K, V>) -> Self {
        EntrySource::Mapping(m.into_iter().collect())
    }
}

impl<K, V> From<Vec<(K, V)>> for EntrySource<K, V> {
    fn from(pairs: Vec<(K, V)>) -> Self {
        EntrySource::Pairs(pairs)
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for EntrySource<K, V> {
    fn from(pairs: [(K, V); N]) -> Self {
        EntrySource::Pairs(pairs.into())
    }
}

/// Iterator over the entries of an `EntrySource`.
pub enum EntryIter<K, V> {
    Mapping(hashbrown::hash_map::IntoIter<K, V>),
    Pairs(std::vec::IntoIter<(K, V)>),
}

impl<K, V> Iterator for EntryIter<K, V> {
    type Item = (K, V);
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            EntryIter::Mapping(it) => it.next(),
            EntryIter::Pairs(it) => it.next(),
        }
    }
}

impl<K, V> IntoIterator for EntrySource<K, V> {
    type Item = (K, V);
    type IntoIter = EntryIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        match self {
            EntrySource::Mapping(m) => EntryIter::Mapping(m.into_iter()),
            EntrySource::Pairs(p) => EntryIter::Pairs(p.into_iter()),
        }
    }
}

/// A key→value map whose values must be unique across every live instance
/// bound to the same [`ValueRegistry`]. Duplicate values among different
/// keys of a single instance are allowed; the invariant is cross-instance
/// only.
///
/// Dropping an instance deregisters it, releasing its values for reuse. A
/// leaked instance (`mem::forget`) keeps its values reserved forever.
///
/// `Clone` is deliberately not implemented: see [`UniqueValuesMap::copy`].
pub struct UniqueValuesMap<K, V> {
    storage: HashMap<K, V>,
    registry: ValueRegistry<V>,
    id: InstanceId,
}

impl<K, V> UniqueValuesMap<K, V>
where
    K: Eq + Hash,
    V: Eq + Hash + Clone,
{
    /// Empty map, registered with `registry`.
    pub fn new(registry: &ValueRegistry<V>) -> Self {
        Self {
            storage: HashMap::new(),
            registry: registry.clone(),
            id: registry.register(),
        }
    }

    /// `new` followed by [`update`](Self::update). On failure the instance
    /// is dropped before the error is returned, so a rejected construction
    /// leaves no registry entry behind.
    pub fn with_entries<S>(registry: &ValueRegistry<V>, source: S) -> Result<Self, Error>
    where
        S: Into<EntrySource<K, V>>,
    {
        let mut map = Self::new(registry);
        map.update(source)?;
        Ok(map)
    }

    /// Bulk update, atomic per call: either every entry is applied or the
    /// stored content and the registry holdings are left exactly as they
    /// were before the call.
    ///
    /// Entries are staged in order against a snapshot of this instance's
    /// holdings. For each pair, the value the key currently maps to (in
    /// storage, or earlier in the same batch) is released before the new
    /// value is checked against all other instances, so overwriting a key
    /// with its own current value never self-conflicts. A later pair for
    /// the same key wins.
    pub fn update<S>(&mut self, source: S) -> Result<(), Error>
    where
        S: Into<EntrySource<K, V>>,
    {
        let mut staged_holdings = self.registry.holdings_snapshot(self.id);
        let mut staged: HashMap<K, V> = HashMap::new();

        for (key, value) in source.into() {
            let displaced = match staged.get(&key) {
                Some(v) => Some(v.clone()),
                None => self.storage.get(&key).cloned(),
            };
            if let Some(old) = displaced {
                release_one(&mut staged_holdings, &old);
            }
            if self.registry.conflicts(self.id, &value) {
                return Err(Error::DuplicateValue);
            }
            acquire_one(&mut staged_holdings, value.clone());
            staged.insert(key, value);
        }

        self.registry.commit_holdings(self.id, staged_holdings);
        for (key, value) in staged {
            self.storage.insert(key, value);
        }
        Ok(())
    }

    /// Set a single key, returning the displaced value. Same duplicate
    /// contract as a one-pair [`update`](Self::update).
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, Error> {
        if self.registry.conflicts(self.id, &value) {
            return Err(Error::DuplicateValue);
        }
        self.registry.acquire(self.id, value.clone());
        let displaced = self.storage.insert(key, value);
        if let Some(ref old) = displaced {
            self.registry.release(self.id, old);
        }
        Ok(displaced)
    }

    /// Remove `key`, releasing its value for reuse by other instances.
    /// `None` if the key is absent.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let value = self.storage.remove(key)?;
        self.registry.release(self.id, &value);
        Some(value)
    }

    /// Remove `key` and return its value, or return `default` when the key
    /// is absent. A returned default was never stored, so the registry is
    /// untouched in that case.
    pub fn pop_or<Q>(&mut self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove(key).unwrap_or(default)
    }

    /// Remove and return an arbitrary entry (hash-order arbitrary),
    /// releasing its value. `None` when the map is empty.
    pub fn pop_arbitrary(&mut self) -> Option<(K, V)>
    where
        K: Clone,
    {
        let key = self.storage.keys().next()?.clone();
        let value = self.storage.remove(&key)?;
        self.registry.release(self.id, &value);
        Some((key, value))
    }

    /// If `key` is present, return its current value untouched. Otherwise
    /// duplicate-check `default` and insert it under `key`.
    ///
    /// There is no implicit-empty-value form; callers wanting one pass
    /// `V::default()` explicitly, and it is uniqueness-checked like any
    /// other value.
    pub fn get_or_insert(&mut self, key: K, default: V) -> Result<&V, Error> {
        match self.storage.entry(key) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                if self.registry.conflicts(self.id, &default) {
                    return Err(Error::DuplicateValue);
                }
                self.registry.acquire(self.id, default.clone());
                Ok(e.insert(default))
            }
        }
    }

    /// Always fails with [`Error::CopyUnsupported`]: a copy would make both
    /// instances live holders of every value, violating the uniqueness
    /// invariant the moment it returned.
    pub fn copy(&self) -> Result<Self, Error> {
        Err(Error::CopyUnsupported)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.storage.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.storage.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn iter(&self) -> hashbrown::hash_map::Iter<'_, K, V> {
        self.storage.iter()
    }

    pub fn keys(&self) -> hashbrown::hash_map::Keys<'_, K, V> {
        self.storage.keys()
    }

    pub fn values(&self) -> hashbrown::hash_map::Values<'_, K, V> {
        self.storage.values()
    }

    /// This instance's identity within its registry. Identity, not content:
    /// two instances with equal entries have distinct ids.
    pub fn instance_id(&self) -> InstanceId {
        self.id
    }

    /// The registry this instance is bound to.
    pub fn registry(&self) -> &ValueRegistry<V> {
        &self.registry
    }
}

impl<K, V> Drop for UniqueValuesMap<K, V> {
    fn drop(&mut self) {
        self.registry.deregister(self.id);
    }
}
