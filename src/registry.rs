//! ValueRegistry: the shared side table tracking which values each live
//! UniqueValuesMap instance currently holds.

use core::cell::RefCell;
use core::hash::Hash;
use hashbrown::HashMap;
use slotmap::{DefaultKey, SlotMap};
use std::rc::Rc;

/// Identity of a live map instance within its registry.
///
/// Generational: once an instance is deregistered its id never resolves
/// again, even if the physical slot is reused. Identity is the opaque key,
/// never the instance's contents.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct InstanceId(DefaultKey);

impl InstanceId {
    pub(crate) fn new(k: DefaultKey) -> Self {
        InstanceId(k)
    }
    pub(crate) fn raw(&self) -> DefaultKey {
        self.0
    }
}

/// Per-instance holdings: value → number of keys currently mapped to it.
///
/// A count rather than a set, so deleting one of two keys that share a value
/// does not release the value while the instance still holds it.
pub(crate) type Holdings<V> = HashMap<V, usize>;

pub(crate) fn acquire_one<V>(holdings: &mut Holdings<V>, value: V)
where
    V: Eq + Hash,
{
    *holdings.entry(value).or_insert(0) += 1;
}

pub(crate) fn release_one<V>(holdings: &mut Holdings<V>, value: &V)
where
    V: Eq + Hash,
{
    match holdings.get_mut(value) {
        Some(c) if *c > 1 => *c -= 1,
        Some(_) => {
            holdings.remove(value);
        }
        None => debug_assert!(false, "released a value the instance does not hold"),
    }
}

/// Tracks the value holdings of every live map instance bound to it.
///
/// Explicit and injectable: uniqueness is scoped to one registry value, so
/// independent registries never see each other's values. `Clone` clones the
/// shared handle, not the state. Single-threaded (`Rc` interior); callers
/// serialize access.
pub struct ValueRegistry<V> {
    inner: Rc<RefCell<SlotMap<DefaultKey, Holdings<V>>>>,
}

impl<V> Clone for ValueRegistry<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V> ValueRegistry<V> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SlotMap::with_key())),
        }
    }

    /// Number of currently registered instances.
    pub fn live_instances(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_registered(&self, id: InstanceId) -> bool {
        self.inner.borrow().contains_key(id.raw())
    }

    /// Register a new instance with empty holdings.
    pub(crate) fn register(&self) -> InstanceId {
        InstanceId::new(self.inner.borrow_mut().insert(Holdings::new()))
    }

    /// Drop an instance's entry, releasing every value it held. Called from
    /// `UniqueValuesMap::drop`; a stale id is ignored.
    pub(crate) fn deregister(&self, id: InstanceId) {
        self.inner.borrow_mut().remove(id.raw());
    }
}

impl<V> ValueRegistry<V>
where
    V: Eq + Hash,
{
    /// True if any live instance holds `value`.
    pub fn contains_value(&self, value: &V) -> bool {
        self.inner
            .borrow()
            .iter()
            .any(|(_, holdings)| holdings.contains_key(value))
    }

    /// True if some instance other than `id` holds `value`. O(live
    /// instances): iterate every slot, skip self, test membership.
    pub(crate) fn conflicts(&self, id: InstanceId, value: &V) -> bool {
        self.inner
            .borrow()
            .iter()
            .any(|(k, holdings)| k != id.raw() && holdings.contains_key(value))
    }

    pub(crate) fn acquire(&self, id: InstanceId, value: V) {
        let mut slots = self.inner.borrow_mut();
        let holdings = slots.get_mut(id.raw()).expect("instance not registered");
        acquire_one(holdings, value);
    }

    pub(crate) fn release(&self, id: InstanceId, value: &V) {
        let mut slots = self.inner.borrow_mut();
        let holdings = slots.get_mut(id.raw()).expect("instance not registered");
        release_one(holdings, value);
    }

    /// Copy of an instance's holdings, for staging an atomic bulk update.
    pub(crate) fn holdings_snapshot(&self, id: InstanceId) -> Holdings<V>
    where
        V: Clone,
    {
        self.inner
            .borrow()
            .get(id.raw())
            .expect("instance not registered")
            .clone()
    }

    /// Replace an instance's holdings wholesale after a staged update.
    pub(crate) fn commit_holdings(&self, id: InstanceId, holdings: Holdings<V>) {
        let mut slots = self.inner.borrow_mut();
        *slots.get_mut(id.raw()).expect("instance not registered") = holdings;
    }
}

impl<V> Default for ValueRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}
