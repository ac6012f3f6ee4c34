//! Uniform mutation stream over plain vectors and observable lists.
//!
//! A [`ListObserver`] holds exactly one current source and one callback.
//! Swapping the source delivers synthetic mutations that bring an external
//! mirror of the old source in line with the new one, before any native
//! mutations from an observable source are forwarded.
//!
//! The plain-to-plain reconciliation is a heuristic, not minimal edit
//! distance: it detects a single contiguous changed range (two-pointer
//! prefix/suffix match) and otherwise degrades to replacing everything.
//! The binding contract is replay correctness, not diff minimality.
//!
//! # Invariants
//!
//! 1. Reassigning the identical source (pointer equality) is a no-op.
//! 2. Replaying the delivered mutations against a mirror of the old source
//!    reproduces the new source exactly.
//! 3. Native mutations are only forwarded while an observable source is
//!    current; the old source is unsubscribed before reconciliation fires.

use std::rc::Rc;

use crate::list::{List, ListSubscription, Mutation, Slot};

/// A list-like source: a shared plain vector or an observable [`List`].
pub enum ListSource<T: Clone + 'static> {
    Plain(Rc<Vec<T>>),
    Observed(List<T>),
}

impl<T: Clone + 'static> Clone for ListSource<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Plain(v) => Self::Plain(Rc::clone(v)),
            Self::Observed(l) => Self::Observed(l.clone()),
        }
    }
}

impl<T: Clone + 'static> ListSource<T> {
    fn snapshot(&self) -> Vec<Slot<T>> {
        match self {
            Self::Plain(v) => v.iter().cloned().map(Slot::Value).collect(),
            Self::Observed(l) => l.snapshot(),
        }
    }
}

impl<T: Clone + std::fmt::Debug + 'static> std::fmt::Debug for ListSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(v) => f.debug_tuple("Plain").field(v).finish(),
            Self::Observed(l) => f.debug_tuple("Observed").field(l).finish(),
        }
    }
}

/// Adapts plain vectors and observable lists into one mutation stream.
pub struct ListObserver<T: Clone + PartialEq + 'static> {
    callback: Rc<dyn Fn(&Mutation<T>)>,
    source: Option<ListSource<T>>,
    subscription: Option<ListSubscription>,
}

impl<T: Clone + PartialEq + 'static> ListObserver<T> {
    /// Create an observer with no source. The callback receives both
    /// synthetic reconciliation mutations and forwarded native mutations.
    pub fn new(callback: impl Fn(&Mutation<T>) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
            source: None,
            subscription: None,
        }
    }

    #[must_use]
    pub fn source(&self) -> Option<&ListSource<T>> {
        self.source.as_ref()
    }

    /// Swap the observed source, reconciling the mirror state.
    pub fn set_source(&mut self, source: Option<ListSource<T>>) {
        if same_source(self.source.as_ref(), source.as_ref()) {
            return;
        }

        // Stop forwarding from the old source before anything is delivered.
        self.subscription = None;

        let old = self.source.take();
        let old_snapshot = old.as_ref().map(ListSource::snapshot).unwrap_or_default();
        let new_snapshot = source.as_ref().map(ListSource::snapshot).unwrap_or_default();

        let plain_to_plain = matches!(
            (old.as_ref(), source.as_ref()),
            (Some(ListSource::Plain(_)), Some(ListSource::Plain(_)))
        );

        if plain_to_plain {
            for mutation in reconcile_plain(&old_snapshot, &new_snapshot) {
                (self.callback)(&mutation);
            }
        } else if !old_snapshot.is_empty() || !new_snapshot.is_empty() {
            (self.callback)(&Mutation {
                start: 0,
                delete_count: old_snapshot.len(),
                items: new_snapshot,
            });
        }

        if let Some(ListSource::Observed(list)) = source.as_ref() {
            let forward = Rc::clone(&self.callback);
            self.subscription = Some(list.subscribe(move |m| forward(m)));
        }
        self.source = source;
    }
}

impl<T: Clone + PartialEq + std::fmt::Debug + 'static> std::fmt::Debug for ListObserver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListObserver")
            .field("source", &self.source)
            .finish()
    }
}

fn same_source<T: Clone + 'static>(
    a: Option<&ListSource<T>>,
    b: Option<&ListSource<T>>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(ListSource::Plain(x)), Some(ListSource::Plain(y))) => Rc::ptr_eq(x, y),
        (Some(ListSource::Observed(x)), Some(ListSource::Observed(y))) => x.ptr_eq(y),
        _ => false,
    }
}

/// Plain-to-plain reconciliation. Equal lengths report one single-item
/// replacement per differing index; length changes attempt a single
/// contiguous changed range and otherwise replace everything.
fn reconcile_plain<T: Clone + PartialEq>(
    old: &[Slot<T>],
    new: &[Slot<T>],
) -> Vec<Mutation<T>> {
    if old.len() == new.len() {
        return old
            .iter()
            .zip(new.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, (_, b))| Mutation {
                start: i,
                delete_count: 1,
                items: vec![b.clone()],
            })
            .collect();
    }

    match contiguous_range(old, new) {
        Some(mutation) => vec![mutation],
        None => vec![Mutation {
            start: 0,
            delete_count: old.len(),
            items: new.to_vec(),
        }],
    }
}

/// Two-pointer prefix/suffix match. Returns the single replace-range
/// mutation if everything outside one contiguous range matches, else `None`.
fn contiguous_range<T: Clone + PartialEq>(old: &[Slot<T>], new: &[Slot<T>]) -> Option<Mutation<T>> {
    let shorter = old.len().min(new.len());

    let mut prefix = 0;
    while prefix < shorter && old[prefix] == new[prefix] {
        prefix += 1;
    }

    let mut suffix = 0;
    while suffix < shorter - prefix
        && old[old.len() - 1 - suffix] == new[new.len() - 1 - suffix]
    {
        suffix += 1;
    }

    if prefix + suffix < shorter {
        return None;
    }
    let suffix = shorter - prefix;
    Some(Mutation {
        start: prefix,
        delete_count: old.len() - prefix - suffix,
        items: new[prefix..new.len() - suffix].to_vec(),
    })
}
