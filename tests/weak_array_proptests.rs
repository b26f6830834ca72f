// WeakArray property tests (consolidated).
//
// Property 1: live view matches a strong-reference model.
//  - Model: HashMap<Key, value> of entries whose values we still hold
//    strongly; a parallel HashMap holds the Rcs themselves.
//  - Operations: set, drop-value (reclaims), unset, get-check,
//    contains-check; the GC period itself is randomized so both the
//    amortized and the forced compaction paths are exercised.
//  - Invariant at every checkpoint: get/contains agree with the model;
//    at the end: len(), keys() and iteration contents agree exactly.
//
// Property 2: auto-increment keys are strictly increasing regardless of
// interleaved reclamations and removals.
use proptest::prelude::*;
use std::collections::HashMap;
use std::rc::Rc;
use weak_array::{Key, Tracked, WeakArray};

proptest! {
    #[test]
    fn prop_live_view_matches_model(
        period in 1u32..=8,
        ops in proptest::collection::vec((0u8..=4u8, 0usize..6usize), 1..200),
    ) {
        let array: WeakArray<usize> = WeakArray::with_options(false, period).unwrap();
        let mut held: HashMap<Key, Rc<Tracked<usize>>> = HashMap::new();
        let mut model: HashMap<Key, usize> = HashMap::new();

        for (op, raw) in ops {
            let key = Key::from(format!("k{}", raw));
            match op {
                // Bind (or rebind) the key to a fresh value.
                0 => {
                    let value = Tracked::new(raw);
                    array.set(key.clone(), &value);
                    held.insert(key.clone(), value);
                    model.insert(key, raw);
                }
                // Drop our strong reference; the entry must read as absent.
                1 => {
                    held.remove(&key);
                    model.remove(&key);
                }
                // Explicit removal.
                2 => {
                    array.unset(key.clone());
                    held.remove(&key);
                    model.remove(&key);
                }
                // Read checks against the model.
                3 => {
                    prop_assert_eq!(
                        array.get(key.clone()).map(|v| *v.get()),
                        model.get(&key).copied()
                    );
                }
                4 => {
                    prop_assert_eq!(array.contains(key.clone()), model.contains_key(&key));
                }
                _ => unreachable!(),
            }
        }

        prop_assert_eq!(array.len(), model.len());

        let mut keys = array.keys();
        keys.sort();
        let mut expected: Vec<Key> = model.keys().cloned().collect();
        expected.sort();
        prop_assert_eq!(keys, expected);

        let collected: HashMap<Key, usize> =
            array.iter().map(|(k, v)| (k, *v.get())).collect();
        prop_assert_eq!(collected, model);
    }

    #[test]
    fn prop_auto_keys_strictly_increase(
        ops in proptest::collection::vec(0u8..=2u8, 1..100),
    ) {
        let array: WeakArray<u32> = WeakArray::new();
        let mut held: Vec<Rc<Tracked<u32>>> = Vec::new();
        let mut last: Option<i64> = None;

        for op in ops {
            match op {
                // Append; the issued key must exceed every earlier one.
                0 => {
                    let value = Tracked::new(0);
                    let key = array.push(&value);
                    held.push(value);
                    let issued = match key {
                        Key::Int(i) => i,
                        Key::Str(_) => panic!("push issues integer keys"),
                    };
                    if let Some(previous) = last {
                        prop_assert!(issued > previous);
                    }
                    last = Some(issued);
                }
                // Reclaim the oldest held value.
                1 => {
                    if !held.is_empty() {
                        held.remove(0);
                    }
                }
                // Explicitly remove the most recent auto key.
                2 => {
                    if let Some(previous) = last {
                        array.unset(previous);
                    }
                }
                _ => unreachable!(),
            }
        }
    }
}
