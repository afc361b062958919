use std::collections::HashSet;

use spork_runtime::{GcConfig, State, Value, ValueRef, ValueType};

fn state_with_chunks(chunk_capacity: usize) -> State {
    State::with_config(GcConfig::with_chunk_capacity(chunk_capacity))
}

#[test]
fn end_to_end_nested_pairs() {
    let mut state = State::new();

    state.make_number(2);
    state.make_number(2);
    let left = state.make_pair();
    assert_eq!(state.render(left), "(2,2)");

    state.make_number(8);
    state.make_number(19);
    let right = state.make_pair();
    assert_eq!(state.roots(), &[left, right]);

    state.make_pair();
    let result = state.pop();
    assert_eq!(state.root_count(), 0);
    assert_eq!(state.render(result), "((2,2),(8,19))");
}

#[test]
fn slots_are_recycled_after_collection() {
    let mut state = state_with_chunks(8);

    let first: Vec<ValueRef> = (0..20).map(|n| state.make_number(n)).collect();
    let chunks = state.arena().chunk_count();
    assert_eq!(chunks, 3);

    let distinct: HashSet<_> = first.iter().copied().collect();
    assert_eq!(distinct.len(), 20);
    assert!(distinct.len() <= chunks * state.arena().chunk_capacity());

    state.truncate_roots(0);
    let report = state.collect();
    assert_eq!(report.reclaimed, 20);
    assert_eq!(report.survivors, 0);
    assert_eq!(state.arena().free_slots(), 24);

    let second: Vec<ValueRef> = (0..20).map(|n| state.make_number(n)).collect();
    assert_eq!(state.arena().chunk_count(), chunks);
    let reused = second.iter().filter(|at| distinct.contains(at)).count();
    assert!(reused >= 16, "only {reused} slots reused");
}

#[test]
fn rooted_values_survive_unchanged() {
    let mut state = state_with_chunks(4);

    // (a, ("bee", nil)) plus a directly rooted number
    let kept = state.make_number(99);
    state.make_string("a");
    state.make_string("bee");
    state.make_nil();
    state.make_pair();
    let tree = state.make_pair();

    let reachable = [
        kept,
        tree,
        state.head(tree).unwrap(),
        state.tail(tree).unwrap(),
    ];
    let before: Vec<Value> = reachable.iter().map(|&at| state.get(at).clone()).collect();

    // garbage interleaved with the live set
    for n in 0..10 {
        state.make_number(n);
        state.pop();
    }
    state.collect();

    let after: Vec<Value> = reachable.iter().map(|&at| state.get(at).clone()).collect();
    assert_eq!(before, after);
    assert_eq!(state.render(tree), "(a,(bee,nil))");
    assert_eq!(state.number(kept), 99);
}

#[test]
fn unreferenced_value_is_reclaimed_and_reused() {
    let mut state = state_with_chunks(16);
    let keep = state.make_number(1);
    let garbage = state.make_number(2);
    assert_eq!(state.pop(), garbage);

    let report = state.collect();
    assert_eq!(report.reclaimed, 1);
    assert!(!state.arena().is_live(garbage));
    assert!(state.arena().is_live(keep));

    let reused = state.make_number(3);
    assert_eq!(reused, garbage);
    assert_eq!(state.number(reused), 3);
}

#[test]
fn string_buffers_released_once() {
    let mut state = state_with_chunks(16);
    let text = state.make_string("abc");
    assert_eq!(state.type_of(text), ValueType::String);
    state.pop();

    let first = state.collect();
    assert_eq!(first.strings_released, 1);
    assert_eq!(first.bytes_released, 3);

    let second = state.collect();
    assert_eq!(second.strings_released, 0);
    assert_eq!(second.reclaimed, 0);
    assert_eq!(state.stats().total_strings_released, 1);
}

#[test]
fn cyclic_structures_are_marked_and_reclaimed() {
    let mut state = state_with_chunks(16);

    state.make_number(1);
    state.make_number(2);
    let inner = state.make_pair();
    state.make_number(3);
    let outer = state.make_pair();
    // inner's tail points back at its ancestor
    state.set_tail(inner, Some(outer));

    // the number 2 lost its only reference in the rewiring
    let report = state.collect();
    assert_eq!(report.survivors, 4);
    assert_eq!(report.reclaimed, 1);
    assert_eq!(state.render(outer), format!("((1,<cycle@{outer}>),3)"));

    state.pop();
    let report = state.collect();
    assert_eq!(report.reclaimed, 4);
    assert_eq!(state.arena().live_slots(), 0);
}

#[test]
fn self_referencing_pair_survives() {
    let mut state = state_with_chunks(4);
    state.make_nil();
    state.make_nil();
    let pair = state.make_pair();
    state.set_head(pair, Some(pair));
    state.set_tail(pair, Some(pair));

    let report = state.collect();
    assert_eq!(report.survivors, 1);
    assert_eq!(report.reclaimed, 2);
}

#[test]
fn countdown_follows_survivor_count() {
    let mut state = state_with_chunks(1024);
    for n in 0..5 {
        state.make_number(n);
    }

    let report = state.collect();
    assert_eq!(report.survivors, 5);
    assert_eq!(report.threshold, 5);
    let collections = state.stats().collections;

    for n in 0..5 {
        state.make_number(n);
        assert_eq!(state.stats().collections, collections);
    }
    assert_eq!(state.countdown(), 0);
    state.make_number(5);
    assert_eq!(state.stats().collections, collections + 1);
    assert_eq!(state.last_report().unwrap().survivors, 10);
}

#[test]
fn long_lists_do_not_exhaust_the_stack() {
    let mut state = state_with_chunks(4096);
    state.make_nil();
    for n in 0..100_000 {
        state.make_number(n);
        // (n . list): swap so the list becomes the tail
        let number = state.pop();
        let list = state.pop();
        state.push(number);
        state.push(list);
        state.make_pair();
    }

    let report = state.collect();
    assert_eq!(report.survivors, 200_001);
}

#[test]
fn independent_states_do_not_interact() {
    let mut a = state_with_chunks(4);
    let mut b = state_with_chunks(4);

    let in_a = a.make_number(1);
    b.make_number(2);
    b.pop();
    b.collect();

    assert_eq!(a.number(in_a), 1);
    assert_eq!(a.stats().collections, 1);
    assert_eq!(b.stats().collections, 2);
}
