//! Observable list with hole-aware storage and splice-based mutation events.
//!
//! Every mutating operation emits exactly one [`Mutation`] (or zero for a
//! no-op such as extending by an empty iterator). Events are delivered
//! synchronously, after the list's own state is consistent and with no
//! internal borrow held, so a listener may re-enter the list.
//!
//! The splice argument handling deliberately preserves the host's
//! array-compatibility quirk table rather than a single clean rule (see
//! [`DeleteCount`]); the two zero-deletion cases are distinct inputs and are
//! tested separately.
//!
//! # Invariants
//!
//! 1. One mutation per mutating call; applying it as a splice against a
//!    mirror of the previous state reproduces the new state exactly.
//! 2. A hole ([`Slot::Hole`]) is distinct from any explicit value; element
//!    reads collapse both holes and out-of-range indices to `None`.
//! 3. Listeners are owned by the returned [`ListSubscription`] guards; the
//!    list stores only weak references, pruned during emission.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Invalid length | NaN / negative / fractional / infinite | `ListError::InvalidLength` |
//! | Out-of-range splice start | resolved start > length | no-op, no event |
//! | Re-entrant mutation | listener mutates the list it observes | state stays consistent; event ordering unspecified |

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Errors from list operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ListError {
    /// A length assignment was not a non-negative integer.
    InvalidLength(f64),
}

impl std::fmt::Display for ListError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLength(n) => write!(f, "invalid list length: {n}"),
        }
    }
}

impl std::error::Error for ListError {}

/// A storage slot: either an explicit value or a hole left by element
/// deletion or sparse extension.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot<T> {
    Hole,
    Value(T),
}

impl<T> Slot<T> {
    #[must_use]
    pub fn is_hole(&self) -> bool {
        matches!(self, Self::Hole)
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Hole => None,
            Self::Value(v) => Some(v),
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Hole => None,
            Self::Value(v) => Some(v),
        }
    }
}

/// A single contiguous replace-range: `delete_count` slots removed at
/// `start`, replaced by `items` (which may be longer, shorter, or equal in
/// length — insert, delete, and replace share this one shape).
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation<T> {
    pub start: usize,
    pub delete_count: usize,
    pub items: Vec<Slot<T>>,
}

impl<T: Clone> Mutation<T> {
    /// Replay this mutation against a mirror. Replaying every emitted
    /// mutation in order against a mirror of the pre-operation state
    /// reproduces the post-operation state.
    pub fn apply_to(&self, mirror: &mut Vec<Slot<T>>) {
        let end = (self.start + self.delete_count).min(mirror.len());
        let start = self.start.min(mirror.len());
        mirror.splice(start..end, self.items.iter().cloned());
    }
}

/// The `deleteCount` argument of [`List::splice`], preserving the host
/// array-compatibility quirk table per input type:
///
/// | Input | Deletions |
/// |-------|-----------|
/// | `Omitted` | through the end of the list |
/// | `Null` (explicit null/undefined) | 0 |
/// | `Count(+inf)` | through the end of the list |
/// | `Count(NaN)` or negative | 0 |
/// | `Count(fractional)` | rounded |
#[derive(Clone, Copy, Debug)]
pub enum DeleteCount {
    /// No count supplied: trim to the end.
    Omitted,
    /// An explicitly supplied absent count: deletes nothing.
    Null,
    /// A numeric count, coerced per the table above.
    Count(f64),
}

impl DeleteCount {
    /// Number of slots to delete for a splice at `start` on a list of
    /// length `len` (`start <= len`).
    fn resolve(self, start: usize, len: usize) -> usize {
        let available = len - start;
        match self {
            Self::Omitted => available,
            Self::Null => 0,
            Self::Count(n) => {
                if n.is_nan() {
                    0
                } else if n == f64::INFINITY {
                    available
                } else {
                    let rounded = n.round();
                    if rounded <= 0.0 {
                        0
                    } else {
                        (rounded as usize).min(available)
                    }
                }
            }
        }
    }
}

type Listener<T> = Rc<Box<dyn Fn(&Mutation<T>)>>;

/// RAII guard holding a list listener alive. Drop it to unsubscribe.
pub struct ListSubscription {
    _cb: Rc<dyn std::any::Any>,
}

impl std::fmt::Debug for ListSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ListSubscription")
    }
}

struct ListInner<T> {
    slots: Vec<Slot<T>>,
    subscribers: Vec<Weak<Box<dyn Fn(&Mutation<T>)>>>,
}

/// An observable, ordered, hole-aware sequence. Cloning produces another
/// handle to the same list.
pub struct List<T: Clone + 'static> {
    inner: Rc<RefCell<ListInner<T>>>,
}

impl<T: Clone + 'static> Clone for List<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> List<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListInner {
                slots: Vec::new(),
                subscribers: Vec::new(),
            })),
        }
    }

    /// Copy an existing sequence into a fresh list.
    #[must_use]
    pub fn from(source: impl IntoIterator<Item = T>) -> Self {
        let list = Self::new();
        list.inner.borrow_mut().slots = source.into_iter().map(Slot::Value).collect();
        list
    }

    /// Whether two handles refer to the same list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().slots.is_empty()
    }

    /// Element read: holes and out-of-range indices are both `None`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner
            .borrow()
            .slots
            .get(index)
            .and_then(|slot| slot.value().cloned())
    }

    /// Slot read: distinguishes a hole (`Some(Slot::Hole)`) from an
    /// out-of-range index (`None`).
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<Slot<T>> {
        self.inner.borrow().slots.get(index).cloned()
    }

    /// Copy of the full slot storage.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Slot<T>> {
        self.inner.borrow().slots.clone()
    }

    /// Register a mutation listener, active for the guard's lifetime.
    pub fn subscribe(&self, callback: impl Fn(&Mutation<T>) + 'static) -> ListSubscription {
        let cb: Listener<T> = Rc::new(Box::new(callback));
        self.inner.borrow_mut().subscribers.push(Rc::downgrade(&cb));
        ListSubscription { _cb: cb }
    }

    /// Indexed assignment. Within bounds this replaces one slot; past the
    /// end it extends the list with holes and reports a single mutation
    /// spanning the gap plus the new value.
    pub fn set(&self, index: usize, value: T) {
        let len = self.len();
        if index < len {
            self.apply(index, 1, vec![Slot::Value(value)]);
        } else {
            let mut items: Vec<Slot<T>> = Vec::with_capacity(index - len + 1);
            items.resize_with(index - len, || Slot::Hole);
            items.push(Slot::Value(value));
            self.apply(len, 0, items);
        }
    }

    /// Element deletion: punches a hole, leaving the length unchanged.
    /// Out-of-range is a no-op.
    pub fn remove(&self, index: usize) {
        if index < self.len() {
            self.apply(index, 1, vec![Slot::Hole]);
        }
    }

    /// Append one element.
    pub fn push(&self, value: T) {
        let len = self.len();
        self.apply(len, 0, vec![Slot::Value(value)]);
    }

    /// Append several elements in one mutation. Empty input emits nothing.
    pub fn extend(&self, values: impl IntoIterator<Item = T>) {
        let items: Vec<Slot<T>> = values.into_iter().map(Slot::Value).collect();
        let len = self.len();
        self.apply(len, 0, items);
    }

    /// Remove and return the last element (`None` for a hole). Empty list
    /// emits nothing.
    pub fn pop(&self) -> Option<T> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.apply(len - 1, 1, Vec::new())
            .into_iter()
            .next()
            .and_then(Slot::into_value)
    }

    /// Remove and return the first element (`None` for a hole). Empty list
    /// emits nothing.
    pub fn shift(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.apply(0, 1, Vec::new())
            .into_iter()
            .next()
            .and_then(Slot::into_value)
    }

    /// Prepend one element.
    pub fn unshift(&self, value: T) {
        self.apply(0, 0, vec![Slot::Value(value)]);
    }

    /// Prepend several elements in one mutation. Empty input emits nothing.
    pub fn unshift_all(&self, values: impl IntoIterator<Item = T>) {
        let items: Vec<Slot<T>> = values.into_iter().map(Slot::Value).collect();
        self.apply(0, 0, items);
    }

    /// Replace a range, host-array style. A negative `start` offsets from
    /// the end (clamped at zero); a resolved `start` beyond the length is a
    /// no-op. Non-integer starts round. Returns the removed slots.
    pub fn splice(&self, start: f64, delete_count: DeleteCount, items: Vec<T>) -> Vec<Slot<T>> {
        let len = self.len();
        let resolved = resolve_start(start, len);
        let Some(start) = resolved else {
            return Vec::new();
        };
        let delete = delete_count.resolve(start, len);
        self.apply(start, delete, items.into_iter().map(Slot::Value).collect())
    }

    /// Length assignment. Shrinking trims the tail in one mutation; growing
    /// inserts holes in one mutation. Anything but a non-negative integral
    /// finite number fails.
    pub fn set_length(&self, length: f64) -> Result<(), ListError> {
        if length.is_nan() || length.is_infinite() || length < 0.0 || length.fract() != 0.0 {
            return Err(ListError::InvalidLength(length));
        }
        let target = length as usize;
        let len = self.len();
        if target < len {
            self.apply(target, len - target, Vec::new());
        } else if target > len {
            let mut holes = Vec::with_capacity(target - len);
            holes.resize_with(target - len, || Slot::Hole);
            self.apply(len, 0, holes);
        }
        Ok(())
    }

    /// Index of the first slot equal to `value`, skipping holes.
    #[must_use]
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.inner
            .borrow()
            .slots
            .iter()
            .position(|slot| slot.value() == Some(value))
    }

    /// First element satisfying the predicate, skipping holes.
    #[must_use]
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter_map(Slot::value)
            .find(|v| predicate(v))
            .cloned()
    }

    /// Visit every non-hole element with its index.
    pub fn for_each(&self, mut visit: impl FnMut(usize, &T)) {
        // Snapshot first: the visitor may re-enter the list.
        let slots = self.snapshot();
        for (index, slot) in slots.iter().enumerate() {
            if let Some(value) = slot.value() {
                visit(index, value);
            }
        }
    }

    /// Core splice: mutate, then notify with no borrow held. Emits exactly
    /// one mutation unless the operation is a no-op.
    fn apply(&self, start: usize, delete_count: usize, items: Vec<Slot<T>>) -> Vec<Slot<T>> {
        if delete_count == 0 && items.is_empty() {
            return Vec::new();
        }
        let (removed, listeners) = {
            let mut inner = self.inner.borrow_mut();
            let end = (start + delete_count).min(inner.slots.len());
            let removed: Vec<Slot<T>> = inner.slots.splice(start..end, items.iter().cloned()).collect();
            inner.subscribers.retain(|weak| weak.strong_count() > 0);
            let listeners: Vec<Listener<T>> =
                inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (removed, listeners)
        };
        let mutation = Mutation {
            start,
            delete_count,
            items,
        };
        for listener in listeners {
            listener(&mutation);
        }
        removed
    }
}

impl<T: Clone + std::fmt::Debug + 'static> std::fmt::Debug for List<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.snapshot()).finish()
    }
}

/// Resolve a host-style splice start: rounds, offsets negatives from the
/// end (clamped at zero), and rejects starts beyond the length.
fn resolve_start(start: f64, len: usize) -> Option<usize> {
    let rounded = if start.is_nan() { 0.0 } else { start.round() };
    let resolved = if rounded < 0.0 {
        (len as f64 + rounded).max(0.0) as usize
    } else if rounded > len as f64 {
        return None;
    } else {
        rounded as usize
    };
    Some(resolved)
}
