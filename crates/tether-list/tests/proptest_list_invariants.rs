//! Property-based invariant tests for the observable list and observer.
//!
//! These verify the replay-correctness laws that every consumer of the
//! mutation stream relies on:
//!
//! 1. For any sequence of list operations, replaying the emitted mutations
//!    as splices against a mirror of the pre-operation state reproduces the
//!    post-operation state exactly.
//! 2. Each mutating call emits at most one mutation.
//! 3. For any observer source swap from vector A to vector B, replaying the
//!    emitted mutations against a mirror of A reproduces B — both for the
//!    single-contiguous-range diff and for the full-replacement fallback.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use tether_list::{DeleteCount, List, ListObserver, ListSource, Mutation, Slot};

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum Op {
    Push(i32),
    Extend(Vec<i32>),
    Pop,
    Shift,
    Unshift(i32),
    Set(usize, i32),
    Remove(usize),
    Splice(f64, DeleteCount, Vec<i32>),
    SetLength(f64),
}

fn count_strategy() -> impl Strategy<Value = DeleteCount> {
    prop_oneof![
        Just(DeleteCount::Omitted),
        Just(DeleteCount::Null),
        Just(DeleteCount::Count(f64::INFINITY)),
        Just(DeleteCount::Count(f64::NAN)),
        (-3.0f64..8.0).prop_map(DeleteCount::Count),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<i32>().prop_map(Op::Push),
        proptest::collection::vec(any::<i32>(), 0..4).prop_map(Op::Extend),
        Just(Op::Pop),
        Just(Op::Shift),
        any::<i32>().prop_map(Op::Unshift),
        (0usize..12, any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
        (0usize..12).prop_map(Op::Remove),
        (-8.0f64..12.0, count_strategy(), proptest::collection::vec(any::<i32>(), 0..4))
            .prop_map(|(s, c, items)| Op::Splice(s, c, items)),
        prop_oneof![(0.0f64..12.0), Just(-1.0), Just(2.5), Just(f64::NAN)]
            .prop_map(Op::SetLength),
    ]
}

fn run_op(list: &List<i32>, op: &Op) {
    match op {
        Op::Push(v) => list.push(*v),
        Op::Extend(vs) => list.extend(vs.clone()),
        Op::Pop => {
            list.pop();
        }
        Op::Shift => {
            list.shift();
        }
        Op::Unshift(v) => list.unshift(*v),
        Op::Set(i, v) => list.set(*i, *v),
        Op::Remove(i) => list.remove(*i),
        Op::Splice(start, count, items) => {
            list.splice(*start, *count, items.clone());
        }
        Op::SetLength(n) => {
            // Invalid lengths fail without mutating; that is part of the law.
            let _ = list.set_length(*n);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1+2. Mutation replay law and one-event-per-call
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn replaying_mutations_reproduces_list_state(
        initial in proptest::collection::vec(any::<i32>(), 0..8),
        ops in proptest::collection::vec(op_strategy(), 0..24),
    ) {
        let list = List::from(initial);
        let mirror = Rc::new(RefCell::new(list.snapshot()));
        let events_per_call = Rc::new(RefCell::new(0usize));

        let m = Rc::clone(&mirror);
        let n = Rc::clone(&events_per_call);
        let _sub = list.subscribe(move |mutation: &Mutation<i32>| {
            *n.borrow_mut() += 1;
            mutation.apply_to(&mut m.borrow_mut());
        });

        for op in &ops {
            *events_per_call.borrow_mut() = 0;
            run_op(&list, op);
            prop_assert!(
                *events_per_call.borrow() <= 1,
                "{op:?} emitted {} mutations", *events_per_call.borrow()
            );
            prop_assert_eq!(
                &*mirror.borrow(),
                &list.snapshot(),
                "mirror diverged after {:?}", op
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Observer diff replay law
// ═════════════════════════════════════════════════════════════════════════

fn as_slots(values: &[i32]) -> Vec<Slot<i32>> {
    values.iter().copied().map(Slot::Value).collect()
}

proptest! {
    #[test]
    fn observer_reconciliation_reproduces_new_source(
        a in proptest::collection::vec(0i32..6, 0..10),
        b in proptest::collection::vec(0i32..6, 0..10),
    ) {
        let mirror = Rc::new(RefCell::new(Vec::new()));
        let m = Rc::clone(&mirror);
        let mut observer = ListObserver::new(move |mutation: &Mutation<i32>| {
            mutation.apply_to(&mut m.borrow_mut());
        });

        observer.set_source(Some(ListSource::Plain(Rc::new(a.clone()))));
        prop_assert_eq!(&*mirror.borrow(), &as_slots(&a));

        observer.set_source(Some(ListSource::Plain(Rc::new(b.clone()))));
        prop_assert_eq!(&*mirror.borrow(), &as_slots(&b));

        observer.set_source(None);
        prop_assert!(mirror.borrow().is_empty());
    }

    #[test]
    fn observer_tracks_observable_source_through_mutations(
        initial in proptest::collection::vec(any::<i32>(), 0..8),
        ops in proptest::collection::vec(op_strategy(), 0..16),
    ) {
        let mirror = Rc::new(RefCell::new(Vec::new()));
        let m = Rc::clone(&mirror);
        let mut observer = ListObserver::new(move |mutation: &Mutation<i32>| {
            mutation.apply_to(&mut m.borrow_mut());
        });

        let list = List::from(initial);
        observer.set_source(Some(ListSource::Observed(list.clone())));
        prop_assert_eq!(&*mirror.borrow(), &list.snapshot());

        for op in &ops {
            run_op(&list, op);
            prop_assert_eq!(
                &*mirror.borrow(),
                &list.snapshot(),
                "observer mirror diverged after {:?}", op
            );
        }
    }
}
