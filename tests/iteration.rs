// Iteration semantics (consolidated).
//
// Iteration walks entries in insertion order and never yields a key whose
// value died, whether before the walk started or between steps. The
// iterator holds no borrow between steps, so the loop body may mutate the
// array arbitrarily; each step reflects the live view at that moment.
// Invariants exercised:
// - dead-before and dead-during entries are skipped (and pruned in place);
// - removing the just-visited key does not disturb subsequent yields;
// - removing a not-yet-visited key causes it to be skipped;
// - a key unset-then-re-set mid-walk is visited again as an appended entry;
// - a key overwritten in place keeps its position;
// - a fresh iter() restarts from the beginning;
// - long runs of dead entries complete without recursion.
use weak_array::{Key, Tracked, WeakArray};

fn collect_pairs<T: Clone>(array: &WeakArray<T>) -> Vec<(Key, T)> {
    array.iter().map(|(k, v)| (k, v.get().clone())).collect()
}

#[test]
fn yields_live_entries_in_insertion_order() {
    let array = WeakArray::new();
    let values: Vec<_> = [10, 20, 30].into_iter().map(Tracked::new).collect();
    array.set("a", &values[0]);
    array.set("b", &values[1]);
    array.set("c", &values[2]);

    assert_eq!(
        collect_pairs(&array),
        [
            (Key::from("a"), 10),
            (Key::from("b"), 20),
            (Key::from("c"), 30)
        ]
    );
}

#[test]
fn skips_entries_dead_before_the_walk() {
    let array = WeakArray::new();
    let a = Tracked::new(1);
    let b = Tracked::new(2);
    let c = Tracked::new(3);
    array.set("a", &a);
    array.set("b", &b);
    array.set("c", &c);

    drop(b);
    assert_eq!(
        collect_pairs(&array),
        [(Key::from("a"), 1), (Key::from("c"), 3)]
    );
}

#[test]
fn skips_entries_dying_during_the_walk() {
    let array = WeakArray::new();
    let a = Tracked::new(1);
    let b = Tracked::new(2);
    let c = Tracked::new(3);
    array.set("a", &a);
    array.set("b", &b);
    array.set("c", &c);

    let mut dropper = Some(c);
    let mut seen = Vec::new();
    for (key, value) in array.iter() {
        if key == Key::from("a") {
            // Reclaim a not-yet-visited value from the loop body.
            dropper.take();
        }
        seen.push((key, *value.get()));
    }
    assert_eq!(seen, [(Key::from("a"), 1), (Key::from("b"), 2)]);
}

#[test]
fn unsetting_a_not_yet_visited_key_skips_it() {
    let array = WeakArray::new();
    let values: Vec<_> = (1..=3).map(Tracked::new).collect();
    array.set("a", &values[0]);
    array.set("b", &values[1]);
    array.set("c", &values[2]);

    let mut seen = Vec::new();
    for (key, value) in array.iter() {
        if key == Key::from("a") {
            array.unset("b");
        }
        seen.push((key, *value.get()));
    }
    assert_eq!(seen, [(Key::from("a"), 1), (Key::from("c"), 3)]);
}

#[test]
fn unsetting_the_current_key_does_not_disturb_the_walk() {
    let array = WeakArray::new();
    let values: Vec<_> = (1..=3).map(Tracked::new).collect();
    array.set("a", &values[0]);
    array.set("b", &values[1]);
    array.set("c", &values[2]);

    let mut seen = Vec::new();
    for (key, value) in array.iter() {
        seen.push((key.clone(), *value.get()));
        array.unset(key);
    }
    assert_eq!(
        seen,
        [(Key::from("a"), 1), (Key::from("b"), 2), (Key::from("c"), 3)]
    );
    assert!(array.is_empty());
}

// Policy under test: a key removed and re-inserted mid-walk gets a fresh
// insertion sequence, so the walk visits it again at the end, with the new
// value.
#[test]
fn reinserted_key_is_visited_as_appended() {
    let array = WeakArray::new();
    let values: Vec<_> = (1..=3).map(Tracked::new).collect();
    let replacement = Tracked::new(99);
    array.set("a", &values[0]);
    array.set("b", &values[1]);
    array.set("c", &values[2]);

    let mut seen = Vec::new();
    for (key, value) in array.iter() {
        if key == Key::from("a") {
            array.unset("b");
            array.set("b", &replacement);
        }
        seen.push((key, *value.get()));
    }
    assert_eq!(
        seen,
        [
            (Key::from("a"), 1),
            (Key::from("c"), 3),
            (Key::from("b"), 99)
        ]
    );
}

// Policy under test: overwriting in place (no unset) keeps the key's
// position, so a not-yet-visited key yields the new value at its original
// spot and an already-visited key is not revisited.
#[test]
fn overwritten_key_keeps_its_position() {
    let array = WeakArray::new();
    let values: Vec<_> = (1..=3).map(Tracked::new).collect();
    let replacement = Tracked::new(99);
    array.set("a", &values[0]);
    array.set("b", &values[1]);
    array.set("c", &values[2]);

    let mut seen = Vec::new();
    for (key, value) in array.iter() {
        if key == Key::from("a") {
            array.set("b", &replacement);
        }
        seen.push((key, *value.get()));
    }
    assert_eq!(
        seen,
        [
            (Key::from("a"), 1),
            (Key::from("b"), 99),
            (Key::from("c"), 3)
        ]
    );
}

#[test]
fn fresh_iter_restarts_from_the_beginning() {
    let array = WeakArray::new();
    let a = Tracked::new(1);
    let b = Tracked::new(2);
    array.set("a", &a);
    array.set("b", &b);

    let first: Vec<Key> = array.iter().map(|(k, _)| k).collect();
    let second: Vec<Key> = (&array).into_iter().map(|(k, _)| k).collect();
    assert_eq!(first, second);
    assert_eq!(first, [Key::from("a"), Key::from("b")]);
}

// A long run of dead entries is skipped iteratively; this would overflow
// the stack if skipping recursed per dead entry.
#[test]
fn long_run_of_dead_entries_completes() {
    let array = WeakArray::new();
    let survivor = Tracked::new(-1);
    for i in 0..20_000 {
        let v = Tracked::new(i);
        array.push(&v);
        // v dies here; the slot goes stale immediately.
    }
    let last = array.push(&survivor);

    let seen: Vec<(Key, i32)> = array.iter().map(|(k, v)| (k, *v.get())).collect();
    assert_eq!(seen, [(last, -1)]);
}

#[test]
fn iterating_an_empty_array_yields_nothing() {
    let array: WeakArray<i32> = WeakArray::new();
    assert_eq!(array.iter().count(), 0);
}
