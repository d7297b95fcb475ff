// UniqueValuesMap property tests (consolidated).
//
// Model-based: a handful of instance slots share one registry, each live
// slot mirrored by a plain std HashMap. After every operation:
//  - Content equality: each live real map equals its model map.
//  - Disjointness: no value appears in two distinct live instances.
//  - Error agreement: a real DuplicateValue occurs exactly when the model
//    predicts a conflict (some value of the batch held by another live
//    instance), and a failed call leaves the model state intact.
//
// Keys and values are drawn from small pools so cross-instance collisions
// and intra-instance duplicates are frequent. Drop/recreate ops exercise
// the deregistration path (dropped values become reusable).
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use unique_values_map::{Error, UniqueValuesMap, ValueRegistry};

const SLOTS: usize = 3;

#[derive(Clone, Debug)]
enum Op {
    Insert(usize, usize, i32),
    Update(usize, Vec<(usize, i32)>),
    Remove(usize, usize),
    PopOr(usize, usize, i32),
    PopArbitrary(usize),
    GetOrInsert(usize, usize, i32),
    Recreate(usize),
    Drop(usize),
}

fn key(i: usize) -> String {
    format!("k{}", i)
}

fn arb_op() -> impl Strategy<Value = Op> {
    let slot = 0..SLOTS;
    let key_idx = 0usize..6;
    let val = 0i32..8;
    prop_oneof![
        (slot.clone(), key_idx.clone(), val.clone()).prop_map(|(s, k, v)| Op::Insert(s, k, v)),
        (
            slot.clone(),
            proptest::collection::vec((key_idx.clone(), val.clone()), 0..5)
        )
            .prop_map(|(s, pairs)| Op::Update(s, pairs)),
        (slot.clone(), key_idx.clone()).prop_map(|(s, k)| Op::Remove(s, k)),
        (slot.clone(), key_idx.clone(), val.clone()).prop_map(|(s, k, v)| Op::PopOr(s, k, v)),
        slot.clone().prop_map(Op::PopArbitrary),
        (slot.clone(), key_idx, val).prop_map(|(s, k, v)| Op::GetOrInsert(s, k, v)),
        slot.clone().prop_map(Op::Recreate),
        slot.prop_map(Op::Drop),
    ]
}

// True if some live model instance other than `slot` holds `value`.
fn model_conflict(models: &[Option<HashMap<String, i32>>], slot: usize, value: i32) -> bool {
    models
        .iter()
        .enumerate()
        .any(|(i, m)| i != slot && m.as_ref().is_some_and(|m| m.values().any(|v| *v == value)))
}

fn check_state(
    maps: &[Option<UniqueValuesMap<String, i32>>],
    models: &[Option<HashMap<String, i32>>],
) -> Result<(), TestCaseError> {
    // Content equality per live slot.
    for (real, model) in maps.iter().zip(models) {
        prop_assert_eq!(real.is_some(), model.is_some());
        if let (Some(real), Some(model)) = (real, model) {
            prop_assert_eq!(real.len(), model.len());
            for (k, v) in real.iter() {
                prop_assert_eq!(model.get(k), Some(v));
            }
        }
    }
    // Pairwise disjointness of live value sets.
    for i in 0..maps.len() {
        for j in (i + 1)..maps.len() {
            if let (Some(a), Some(b)) = (&maps[i], &maps[j]) {
                let va: HashSet<i32> = a.values().copied().collect();
                let vb: HashSet<i32> = b.values().copied().collect();
                prop_assert!(
                    va.is_disjoint(&vb),
                    "slots {} and {} share values: {:?}",
                    i,
                    j,
                    va.intersection(&vb).collect::<Vec<_>>()
                );
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_disjointness_and_model_equality(ops in proptest::collection::vec(arb_op(), 1..150)) {
        let reg = ValueRegistry::new();
        let mut maps: Vec<Option<UniqueValuesMap<String, i32>>> =
            (0..SLOTS).map(|_| Some(UniqueValuesMap::new(&reg))).collect();
        let mut models: Vec<Option<HashMap<String, i32>>> =
            (0..SLOTS).map(|_| Some(HashMap::new())).collect();

        for op in ops {
            match op {
                Op::Insert(s, k, v) => {
                    if maps[s].is_none() { continue; }
                    let conflict = model_conflict(&models, s, v);
                    let res = maps[s].as_mut().unwrap().insert(key(k), v);
                    if conflict {
                        prop_assert_eq!(res, Err(Error::DuplicateValue));
                    } else {
                        let expected = models[s].as_mut().unwrap().insert(key(k), v);
                        prop_assert_eq!(res, Ok(expected));
                    }
                }
                Op::Update(s, pairs) => {
                    if maps[s].is_none() { continue; }
                    let pairs: Vec<(String, i32)> =
                        pairs.into_iter().map(|(k, v)| (key(k), v)).collect();
                    // Other instances are untouched by the batch, so the
                    // whole call fails iff any batch value is held elsewhere.
                    let conflict = pairs.iter().any(|(_, v)| model_conflict(&models, s, *v));
                    let res = maps[s].as_mut().unwrap().update(pairs.clone());
                    if conflict {
                        prop_assert_eq!(res, Err(Error::DuplicateValue));
                    } else {
                        prop_assert_eq!(res, Ok(()));
                        let model = models[s].as_mut().unwrap();
                        for (k, v) in pairs {
                            model.insert(k, v);
                        }
                    }
                }
                Op::Remove(s, k) => {
                    if maps[s].is_none() { continue; }
                    let res = maps[s].as_mut().unwrap().remove(key(k).as_str());
                    let expected = models[s].as_mut().unwrap().remove(&key(k));
                    prop_assert_eq!(res, expected);
                }
                Op::PopOr(s, k, d) => {
                    if maps[s].is_none() { continue; }
                    let res = maps[s].as_mut().unwrap().pop_or(key(k).as_str(), d);
                    let expected = models[s].as_mut().unwrap().remove(&key(k)).unwrap_or(d);
                    prop_assert_eq!(res, expected);
                }
                Op::PopArbitrary(s) => {
                    if maps[s].is_none() { continue; }
                    let res = maps[s].as_mut().unwrap().pop_arbitrary();
                    let model = models[s].as_mut().unwrap();
                    match res {
                        Some((k, v)) => {
                            prop_assert_eq!(model.remove(&k), Some(v));
                        }
                        None => prop_assert!(model.is_empty()),
                    }
                }
                Op::GetOrInsert(s, k, v) => {
                    if maps[s].is_none() { continue; }
                    let present = models[s].as_ref().unwrap().get(&key(k)).copied();
                    let res = maps[s].as_mut().unwrap().get_or_insert(key(k), v).map(|r| *r);
                    match present {
                        // Present key: default is never checked.
                        Some(current) => prop_assert_eq!(res, Ok(current)),
                        None if model_conflict(&models, s, v) => {
                            prop_assert_eq!(res, Err(Error::DuplicateValue));
                        }
                        None => {
                            prop_assert_eq!(res, Ok(v));
                            models[s].as_mut().unwrap().insert(key(k), v);
                        }
                    }
                }
                Op::Recreate(s) => {
                    maps[s] = Some(UniqueValuesMap::new(&reg));
                    models[s] = Some(HashMap::new());
                }
                Op::Drop(s) => {
                    maps[s] = None;
                    models[s] = None;
                }
            }
            check_state(&maps, &models)?;
        }

        // Every value ever reserved belongs to a live slot; dropping the
        // rest must leave the registry empty.
        drop(maps);
        prop_assert_eq!(reg.live_instances(), 0);
    }
}
