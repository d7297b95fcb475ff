//! unique-values-map: a single-threaded map whose values must be unique
//! across all live instances sharing a registry, plus two small standalone
//! helpers (memoization, construct-then-freeze).
//!
//! Internal Design:
//!
//! Summary
//! - Goal: enforce one invariant — no value is held by two distinct live
//!   map instances of the same registry at the same time — while behaving
//!   like an ordinary associative container within each instance.
//! - Layers:
//!   - ValueRegistry<V>: shared side table holding, for every live
//!     instance, its value holdings as value → occurrence count. Instances
//!     are keyed by an opaque generational InstanceId (slotmap), so
//!     identity is never the container's contents and a dropped instance's
//!     id never aliases a later one.
//!   - UniqueValuesMap<K, V>: public API; hashbrown storage plus a registry
//!     handle. Every mutation keeps storage and holdings in lockstep;
//!     Drop deregisters the instance, releasing its values for reuse.
//!
//! Constraints
//! - Single-threaded: the registry is `Rc<RefCell<...>>`-shared, so maps
//!   and registries are `!Send`/`!Sync`; callers serialize access.
//! - Uniqueness is scoped to a registry value, not process-global:
//!   independent registries never see each other's values. Registries are
//!   explicit and injectable so tests can isolate them.
//! - Duplicate values are allowed *within* one instance; the invariant is
//!   cross-instance only. Holdings are counted (not a set) so deleting one
//!   of two keys sharing a value does not free that value.
//! - Conflict checking is O(live instances) per value: iterate every
//!   registered instance, skip self, test membership. Correctness over
//!   throughput; instance counts are expected to be small.
//!
//! Atomicity
//! - `update` is atomic per call: entries are staged against a snapshot of
//!   the instance's holdings and committed only if every pair passes the
//!   duplicate check. A failed call leaves storage and registry exactly as
//!   they were.
//!
//! Lifecycle
//! - Registered at construction, deregistered in `Drop`. There is no
//!   explicit close. Leaking an instance (`mem::forget`) leaks its registry
//!   entry and keeps its values reserved forever; this is the documented
//!   trade-off of deterministic-drop cleanup.
//!
//! Notes and non-goals
//! - No persistence, no I/O, no internal locking; concurrent mutation of
//!   two maps of one registry from different threads is out of contract
//!   (and unrepresentable without `unsafe`, since nothing here is `Send`).
//! - `Clone` is not implemented for UniqueValuesMap and `copy()` always
//!   fails: a copy would make both instances live holders of every value.
//! - `Memo` and `Frozen` are independent helpers with no shared state; they
//!   do not participate in the registry.

mod frozen;
mod map;
mod memo;
mod registry;

// Public surface
pub use frozen::Frozen;
pub use map::{EntryIter, EntrySource, Error, UniqueValuesMap};
pub use memo::Memo;
pub use registry::{InstanceId, ValueRegistry};
