//! Composite widget tree with schema-declared properties and change events.
//!
//! [`Widget`] is a clone-shared handle (`Rc<RefCell<..>>`, single-threaded
//! host model). Properties are declared up front with their
//! [`PropertyType`] — the explicit schema that replaces decoration-time type
//! reflection — and every successful write fires the `<property>Changed`
//! event with the new value.
//!
//! # Invariants
//!
//! 1. Writing a value equal to the current one is a no-op (no event).
//! 2. The `attach` event fires exactly once, on the widget's first append.
//! 3. `dispose` detaches from the parent silently; `remove_child` is the
//!    host-driven removal and fires `childRemoved` with the removed index.
//! 4. Operations on a disposed widget fail with [`CoreError::Disposed`].
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown property | Name not in the schema | `CoreError::UnknownProperty` |
//! | Disposed access | get/set/append after dispose | `CoreError::Disposed` |
//! | Append to self | `w.append(&w)` | `CoreError::InvalidAppend` |

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

use crate::error::CoreError;
use crate::events::{Listeners, Subscription, changed_event};
use crate::selector::Selector;
use crate::types::PropertyType;
use crate::value::Value;

/// Event fired once when a widget is first appended into a tree.
pub const EVENT_ATTACH: &str = "attach";
/// Event fired on a parent when a child is removed via [`Widget::remove_child`].
/// Payload: the removed child's former index as `Value::Int`.
pub const EVENT_CHILD_REMOVED: &str = "childRemoved";

struct PropertySlot {
    ty: PropertyType,
    value: Value,
}

struct WidgetInner {
    type_name: &'static str,
    id: Option<String>,
    props: AHashMap<String, PropertySlot>,
    children: Vec<Widget>,
    parent: Option<Weak<RefCell<WidgetInner>>>,
    events: Listeners,
    attached: bool,
    disposed: bool,
}

/// A widget-tree node. Cloning produces another handle to the same node.
#[derive(Clone)]
pub struct Widget {
    inner: Rc<RefCell<WidgetInner>>,
}

impl Widget {
    /// Create a detached widget of the given type.
    #[must_use]
    pub fn new(type_name: &'static str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(WidgetInner {
                type_name,
                id: None,
                props: AHashMap::new(),
                children: Vec::new(),
                parent: None,
                events: Listeners::new(),
                attached: false,
                disposed: false,
            })),
        }
    }

    /// Assign the widget's id (builder style).
    #[must_use]
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.inner.borrow_mut().id = Some(id.into());
        self
    }

    /// Declare a property in the widget's schema with a `Null` initial value.
    #[must_use]
    pub fn with_property(self, name: impl Into<String>, ty: PropertyType) -> Self {
        self.inner
            .borrow_mut()
            .props
            .insert(name.into(), PropertySlot {
                ty,
                value: Value::Null,
            });
        self
    }

    /// Declare a property with an initial value. No change event fires.
    #[must_use]
    pub fn with_property_value(
        self,
        name: impl Into<String>,
        ty: PropertyType,
        value: impl Into<Value>,
    ) -> Self {
        self.inner.borrow_mut().props.insert(name.into(), PropertySlot {
            ty,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.inner.borrow().type_name
    }

    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.inner.borrow().id.clone()
    }

    /// Whether two handles refer to the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The declared type of a property, if it exists in the schema.
    #[must_use]
    pub fn property_type(&self, name: &str) -> Option<PropertyType> {
        self.inner.borrow().props.get(name).map(|slot| slot.ty)
    }

    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.inner.borrow().props.contains_key(name)
    }

    /// Read a property value.
    pub fn get(&self, name: &str) -> Result<Value, CoreError> {
        let inner = self.inner.borrow();
        if inner.disposed {
            return Err(CoreError::Disposed(inner.type_name));
        }
        inner
            .props
            .get(name)
            .map(|slot| slot.value.clone())
            .ok_or_else(|| CoreError::UnknownProperty {
                widget: inner.type_name,
                property: name.to_owned(),
            })
    }

    /// Write a property value and fire `<name>Changed` with the new value.
    /// Writing the current value is a no-op.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), CoreError> {
        let value = value.into();
        let events = {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return Err(CoreError::Disposed(inner.type_name));
            }
            let type_name = inner.type_name;
            let slot = inner
                .props
                .get_mut(name)
                .ok_or_else(|| CoreError::UnknownProperty {
                    widget: type_name,
                    property: name.to_owned(),
                })?;
            if slot.value == value {
                return Ok(());
            }
            slot.value = value.clone();
            inner.events.clone()
        };
        // Borrow released: listeners may re-enter this widget.
        events.trigger(&changed_event(name), &value);
        Ok(())
    }

    /// Register an event listener on this widget.
    pub fn on(&self, event: impl Into<String>, callback: impl Fn(&Value) + 'static) -> Subscription {
        self.inner.borrow().events.on(event, callback)
    }

    /// Fire a named event on this widget. Used by the host and by two-way
    /// bindings to raise synthetic `<property>Changed` notifications.
    pub fn trigger(&self, event: &str, value: &Value) {
        let events = self.inner.borrow().events.clone();
        events.trigger(event, value);
    }

    /// Append `child` to this widget. The child's first append fires its
    /// `attach` event after the tree link is in place.
    pub fn append(&self, child: &Widget) -> Result<(), CoreError> {
        if self.ptr_eq(child) {
            return Err(CoreError::InvalidAppend(self.type_name()));
        }
        {
            let inner = self.inner.borrow();
            if inner.disposed {
                return Err(CoreError::Disposed(inner.type_name));
            }
        }
        let first_attach = {
            let mut c = child.inner.borrow_mut();
            if c.disposed {
                return Err(CoreError::Disposed(c.type_name));
            }
            c.parent = Some(Rc::downgrade(&self.inner));
            !std::mem::replace(&mut c.attached, true)
        };
        self.inner.borrow_mut().children.push(child.clone());
        if first_attach {
            child.trigger(EVENT_ATTACH, &Value::Null);
        }
        Ok(())
    }

    /// Whether the widget has ever been appended into a tree.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.borrow().attached
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }

    #[must_use]
    pub fn parent(&self) -> Option<Widget> {
        self.inner
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Widget { inner })
    }

    #[must_use]
    pub fn children(&self) -> Vec<Widget> {
        self.inner.borrow().children.clone()
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    /// Depth-first search of the descendant subtree (excluding `self`).
    #[must_use]
    pub fn find(&self, selector: &Selector) -> Vec<Widget> {
        let mut found = Vec::new();
        collect_matches(self, selector, &mut found);
        found
    }

    /// Host-driven removal of a direct child. Fires [`EVENT_CHILD_REMOVED`]
    /// with the removed index. Returns false if `child` is not a child.
    pub fn remove_child(&self, child: &Widget) -> bool {
        let index = {
            let mut inner = self.inner.borrow_mut();
            let Some(index) = inner.children.iter().position(|c| c.ptr_eq(child)) else {
                return false;
            };
            inner.children.remove(index);
            index
        };
        child.inner.borrow_mut().parent = None;
        self.trigger(EVENT_CHILD_REMOVED, &Value::Int(index as i64));
        true
    }

    /// Dispose the widget and its subtree: listeners are cleared, children
    /// disposed, and the node silently detached from its parent.
    pub fn dispose(&self) {
        let (children, events, parent) = {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return;
            }
            inner.disposed = true;
            (
                std::mem::take(&mut inner.children),
                inner.events.clone(),
                inner.parent.take(),
            )
        };
        for child in &children {
            child.dispose();
        }
        if let Some(parent) = parent.and_then(|weak| weak.upgrade()) {
            let parent = Widget { inner: parent };
            let mut inner = parent.inner.borrow_mut();
            inner.children.retain(|c| !c.ptr_eq(self));
        }
        events.clear();
    }
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Widget")
            .field("type", &inner.type_name)
            .field("id", &inner.id)
            .field("children", &inner.children.len())
            .field("disposed", &inner.disposed)
            .finish()
    }
}

fn collect_matches(widget: &Widget, selector: &Selector, found: &mut Vec<Widget>) {
    for child in widget.children() {
        if selector.matches(&child) {
            found.push(child.clone());
        }
        collect_matches(&child, selector, found);
    }
}
