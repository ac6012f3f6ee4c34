//! Component wrapper: owns a base widget and services its binding table.
//!
//! Bindings stay pending until the base widget's first attach, then resolve
//! synchronously during the attach dispatch: one-way entries first (so a
//! chained binding observing a base property is already live), then two-way
//! entries with their immediate initial sync.
//!
//! Two-way declarations turn the named base property into an accessor pair:
//! [`Component::get`] and [`Component::set`] proxy through to the resolved
//! target widget's property. Both directions type-check every read, write,
//! and propagated change; a violation detected inside an event callback is
//! recorded as a failed state, logged, and surfaced on the next accessor
//! use.
//!
//! # Invariants
//!
//! 1. A binding resolves at most once; `Resolved` persists until the base
//!    widget is disposed (subscription lifetime handles teardown).
//! 2. Two-way accessors fail with `NotAccessible` before the first attach.
//! 3. No failed type check ever mutates the property it was checked for.
//! 4. Initial one-way assignment and two-way sync happen at resolution, not
//!    on the first change.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing source property | path's first segment undeclared on base | `PropertyResolution`, binding `Failed` |
//! | Selector cardinality | zero or multiple descendants match | `PropertyResolution`, binding `Failed` |
//! | Type violation in an event callback | change delivers an off-type value | `Failed` recorded, `tracing::error!`, surfaced on next access |
//! | Converter rejection | converter returned `Err` | `Converter`, binding `Failed` |

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tether_core::{
    CoreError, EVENT_ATTACH, PropertyType, Subscription, TypeGuards, Value, Widget, changed_event,
};

use crate::config::BindingConfig;
use crate::converter::ConverterContext;
use crate::error::BindingError;
use crate::table::{BindingTable, OneWayDecl, TargetRef, TwoWayDecl};

/// Lifecycle of one binding entry.
#[derive(Clone, Debug, PartialEq)]
pub enum BindingState {
    /// Declared, waiting for the component's first attach.
    Pending,
    /// Resolution in progress during the attach dispatch.
    Resolving,
    /// Live; subscriptions are in place.
    Resolved,
    /// Resolution or a later propagation failed; the error is sticky.
    Failed(BindingError),
}

struct OneWayRuntime {
    decl: OneWayDecl,
    state: RefCell<BindingState>,
    subscription: RefCell<Option<Subscription>>,
}

struct TwoWayRuntime {
    decl: TwoWayDecl,
    state: RefCell<BindingState>,
    target: RefCell<Option<Widget>>,
    subscription: RefCell<Option<Subscription>>,
}

struct ComponentInner {
    base: Widget,
    guards: Rc<TypeGuards>,
    config: BindingConfig,
    one_way: Vec<Rc<OneWayRuntime>>,
    two_way: Vec<Rc<TwoWayRuntime>>,
    ever_attached: Cell<bool>,
    attach_sub: RefCell<Option<Subscription>>,
}

/// A base widget plus its serviced binding table.
///
/// Cloning produces another handle to the same component.
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

impl Component {
    /// Wrap `base` and arm its bindings. If `base` is already attached the
    /// table resolves immediately; otherwise resolution waits for the first
    /// attach.
    #[must_use]
    pub fn new(
        base: Widget,
        table: BindingTable,
        guards: Rc<TypeGuards>,
        config: BindingConfig,
    ) -> Self {
        let inner = Rc::new(ComponentInner {
            base: base.clone(),
            guards,
            config,
            one_way: table
                .one_way
                .into_iter()
                .map(|decl| {
                    Rc::new(OneWayRuntime {
                        decl,
                        state: RefCell::new(BindingState::Pending),
                        subscription: RefCell::new(None),
                    })
                })
                .collect(),
            two_way: table
                .two_way
                .into_iter()
                .map(|decl| {
                    Rc::new(TwoWayRuntime {
                        decl,
                        state: RefCell::new(BindingState::Pending),
                        target: RefCell::new(None),
                        subscription: RefCell::new(None),
                    })
                })
                .collect(),
            ever_attached: Cell::new(false),
            attach_sub: RefCell::new(None),
        });

        if base.is_attached() {
            inner.ever_attached.set(true);
            ComponentInner::resolve_all(&inner);
        } else {
            let weak = Rc::downgrade(&inner);
            let sub = base.on(EVENT_ATTACH, move |_| {
                if let Some(inner) = weak.upgrade()
                    && !inner.ever_attached.replace(true)
                {
                    ComponentInner::resolve_all(&inner);
                }
            });
            *inner.attach_sub.borrow_mut() = Some(sub);
        }
        Self { inner }
    }

    /// The wrapped base widget.
    #[must_use]
    pub fn base(&self) -> &Widget {
        &self.inner.base
    }

    /// Append the base widget into `parent`, triggering resolution on the
    /// first append.
    pub fn append_to(&self, parent: &Widget) -> Result<(), CoreError> {
        parent.append(&self.inner.base)
    }

    /// Read a property. Two-way bound properties proxy through to their
    /// resolved target; everything else reads the base widget.
    pub fn get(&self, property: &str) -> Result<Value, BindingError> {
        if let Some(rt) = self.two_way_runtime(property) {
            return self.get_two_way(&rt);
        }
        self.inner
            .base
            .get(property)
            .map_err(|e| BindingError::PropertyResolution {
                property: property.to_owned(),
                path: property.to_owned(),
                cause: e.to_string(),
            })
    }

    /// Write a property. Two-way bound properties proxy through to their
    /// resolved target; everything else pre-validates against the base
    /// property's declared type and then writes the base widget. A failed
    /// check mutates nothing.
    pub fn set(&self, property: &str, value: impl Into<Value>) -> Result<(), BindingError> {
        let value = value.into();
        if let Some(rt) = self.two_way_runtime(property) {
            return self.set_two_way(&rt, value);
        }
        let inner = &self.inner;
        let ty = inner
            .base
            .property_type(property)
            .ok_or_else(|| BindingError::PropertyResolution {
                property: property.to_owned(),
                path: property.to_owned(),
                cause: "no such property on the base widget".to_owned(),
            })?;
        check_value(&inner.guards, inner.config, &value, ty).map_err(|cause| {
            BindingError::TypeMismatch {
                property: property.to_owned(),
                path: property.to_owned(),
                cause,
            }
        })?;
        inner
            .base
            .set(property, value)
            .map_err(|e| BindingError::PropertyResolution {
                property: property.to_owned(),
                path: property.to_owned(),
                cause: e.to_string(),
            })
    }

    /// State of the two-way binding declared on `base_property`, if any.
    #[must_use]
    pub fn binding_state(&self, base_property: &str) -> Option<BindingState> {
        self.two_way_runtime(base_property)
            .map(|rt| rt.state.borrow().clone())
    }

    /// First sticky failure across the table, if any.
    #[must_use]
    pub fn first_failure(&self) -> Option<BindingError> {
        let one_way = self.inner.one_way.iter().find_map(|rt| {
            match &*rt.state.borrow() {
                BindingState::Failed(e) => Some(e.clone()),
                _ => None,
            }
        });
        one_way.or_else(|| {
            self.inner.two_way.iter().find_map(|rt| {
                match &*rt.state.borrow() {
                    BindingState::Failed(e) => Some(e.clone()),
                    _ => None,
                }
            })
        })
    }

    fn two_way_runtime(&self, property: &str) -> Option<Rc<TwoWayRuntime>> {
        self.inner
            .two_way
            .iter()
            .find(|rt| rt.decl.base_property == property)
            .cloned()
    }

    fn get_two_way(&self, rt: &TwoWayRuntime) -> Result<Value, BindingError> {
        let target = self.accessible_target(rt)?;
        let value =
            target
                .get(&rt.decl.target_property)
                .map_err(|e| BindingError::PropertyResolution {
                    property: rt.decl.base_property.clone(),
                    path: rt.decl.path.clone(),
                    cause: e.to_string(),
                })?;
        let ty = base_property_type(&self.inner.base, rt)?;
        check_value(&self.inner.guards, self.inner.config, &value, ty).map_err(|cause| {
            BindingError::TypeMismatch {
                property: rt.decl.base_property.clone(),
                path: rt.decl.path.clone(),
                cause,
            }
        })?;
        Ok(value)
    }

    fn set_two_way(&self, rt: &TwoWayRuntime, value: Value) -> Result<(), BindingError> {
        let target = self.accessible_target(rt)?;
        let inner = &self.inner;
        // Both ends must accept the value before anything mutates.
        let base_ty = base_property_type(&inner.base, rt)?;
        let target_ty = target.property_type(&rt.decl.target_property).ok_or_else(|| {
            BindingError::PropertyResolution {
                property: rt.decl.base_property.clone(),
                path: rt.decl.path.clone(),
                cause: "target lost its bound property".to_owned(),
            }
        })?;
        for ty in [base_ty, target_ty] {
            check_value(&inner.guards, inner.config, &value, ty).map_err(|cause| {
                BindingError::TypeMismatch {
                    property: rt.decl.base_property.clone(),
                    path: rt.decl.path.clone(),
                    cause: format!("base→target write: {cause}"),
                }
            })?;
        }
        target
            .set(&rt.decl.target_property, value)
            .map_err(|e| BindingError::PropertyResolution {
                property: rt.decl.base_property.clone(),
                path: rt.decl.path.clone(),
                cause: e.to_string(),
            })
    }

    /// The resolved target, once the binding is accessible. Surfaces a
    /// sticky failure instead, if one was recorded.
    fn accessible_target(&self, rt: &TwoWayRuntime) -> Result<Widget, BindingError> {
        match &*rt.state.borrow() {
            BindingState::Failed(e) => return Err(e.clone()),
            BindingState::Resolved => {}
            BindingState::Pending | BindingState::Resolving => {
                return Err(BindingError::NotAccessible {
                    property: rt.decl.base_property.clone(),
                });
            }
        }
        rt.target
            .borrow()
            .clone()
            .ok_or_else(|| BindingError::NotAccessible {
                property: rt.decl.base_property.clone(),
            })
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("base", &self.inner.base.type_name())
            .field("one_way", &self.inner.one_way.len())
            .field("two_way", &self.inner.two_way.len())
            .finish()
    }
}

impl ComponentInner {
    fn resolve_all(inner: &Rc<Self>) {
        for rt in &inner.one_way {
            *rt.state.borrow_mut() = BindingState::Resolving;
            match resolve_one_way(inner, rt) {
                Ok(()) => *rt.state.borrow_mut() = BindingState::Resolved,
                Err(err) => {
                    tracing::error!(path = %rt.decl.path, error = %err, "one-way binding failed to resolve");
                    *rt.state.borrow_mut() = BindingState::Failed(err);
                }
            }
        }
        for rt in &inner.two_way {
            *rt.state.borrow_mut() = BindingState::Resolving;
            match resolve_two_way(inner, rt) {
                Ok(()) => *rt.state.borrow_mut() = BindingState::Resolved,
                Err(err) => {
                    tracing::error!(path = %rt.decl.path, error = %err, "two-way binding failed to resolve");
                    *rt.state.borrow_mut() = BindingState::Failed(err);
                }
            }
        }
    }
}

fn resolve_one_way(inner: &Rc<ComponentInner>, rt: &Rc<OneWayRuntime>) -> Result<(), BindingError> {
    let decl = &rt.decl;
    let target = match &decl.target {
        TargetRef::Widget(widget) => widget.clone(),
        TargetRef::Selector(selector) => {
            let matches = inner.base.find(selector);
            match matches.len() {
                1 => matches.into_iter().next().ok_or_else(|| {
                    BindingError::PropertyResolution {
                        property: decl.target_property.clone(),
                        path: decl.path.clone(),
                        cause: format!("no descendant matches {selector}"),
                    }
                })?,
                0 => {
                    return Err(BindingError::PropertyResolution {
                        property: decl.target_property.clone(),
                        path: decl.path.clone(),
                        cause: format!("no descendant matches {selector}"),
                    });
                }
                n => {
                    return Err(BindingError::PropertyResolution {
                        property: decl.target_property.clone(),
                        path: decl.path.clone(),
                        cause: format!("{n} descendants match {selector}"),
                    });
                }
            }
        }
    };

    // Initial assignment happens now, not on the first change.
    let value = read_path(&inner.base, decl)?;
    assign_one_way(decl, &target, &inner.guards, inner.config, value)?;

    let cb = {
        let base = inner.base.clone();
        let target = target.clone();
        let guards = Rc::clone(&inner.guards);
        let config = inner.config;
        let weak: Weak<OneWayRuntime> = Rc::downgrade(rt);
        move |_: &Value| {
            let Some(rt) = weak.upgrade() else { return };
            let outcome = read_path(&base, &rt.decl)
                .and_then(|value| assign_one_way(&rt.decl, &target, &guards, config, value));
            if let Err(err) = outcome {
                tracing::error!(path = %rt.decl.path, error = %err, "one-way binding update failed");
                *rt.state.borrow_mut() = BindingState::Failed(err);
            }
        }
    };
    let sub = inner.base.on(changed_event(&decl.segments[0]), cb);
    *rt.subscription.borrow_mut() = Some(sub);
    Ok(())
}

fn resolve_two_way(inner: &Rc<ComponentInner>, rt: &Rc<TwoWayRuntime>) -> Result<(), BindingError> {
    let decl = &rt.decl;
    let matches = inner.base.find(&decl.selector);
    if matches.len() != 1 {
        return Err(BindingError::PropertyResolution {
            property: decl.base_property.clone(),
            path: decl.path.clone(),
            cause: format!("{} descendants match {}", matches.len(), decl.selector),
        });
    }
    let target = matches
        .into_iter()
        .next()
        .ok_or_else(|| BindingError::PropertyResolution {
            property: decl.base_property.clone(),
            path: decl.path.clone(),
            cause: format!("no descendant matches {}", decl.selector),
        })?;

    let base_ty =
        inner
            .base
            .property_type(&decl.base_property)
            .ok_or_else(|| BindingError::PropertyResolution {
                property: decl.base_property.clone(),
                path: decl.path.clone(),
                cause: "base widget does not declare the bound property".to_owned(),
            })?;
    if !target.has_property(&decl.target_property) {
        return Err(BindingError::PropertyResolution {
            property: decl.base_property.clone(),
            path: decl.path.clone(),
            cause: format!("target has no property {:?}", decl.target_property),
        });
    }

    // Target-to-base propagation: re-fire as the base's synthetic change.
    let cb = {
        let base = inner.base.clone();
        let guards = Rc::clone(&inner.guards);
        let config = inner.config;
        let weak: Weak<TwoWayRuntime> = Rc::downgrade(rt);
        move |value: &Value| {
            let Some(rt) = weak.upgrade() else { return };
            match check_value(&guards, config, value, base_ty) {
                Ok(()) => base.trigger(&changed_event(&rt.decl.base_property), value),
                Err(cause) => {
                    let err = BindingError::TypeMismatch {
                        property: rt.decl.base_property.clone(),
                        path: rt.decl.path.clone(),
                        cause: format!("target→base propagation: {cause}"),
                    };
                    tracing::error!(path = %rt.decl.path, error = %err, "two-way propagation failed");
                    *rt.state.borrow_mut() = BindingState::Failed(err);
                }
            }
        }
    };
    let sub = target.on(changed_event(&decl.target_property), cb);
    *rt.subscription.borrow_mut() = Some(sub);
    *rt.target.borrow_mut() = Some(target.clone());

    // Immediate sync: current target value flows into the base's change
    // event once, at resolution.
    let value = target
        .get(&decl.target_property)
        .map_err(|e| BindingError::PropertyResolution {
            property: decl.base_property.clone(),
            path: decl.path.clone(),
            cause: e.to_string(),
        })?;
    check_value(&inner.guards, inner.config, &value, base_ty).map_err(|cause| {
        BindingError::TypeMismatch {
            property: decl.base_property.clone(),
            path: decl.path.clone(),
            cause,
        }
    })?;
    inner
        .base
        .trigger(&changed_event(&decl.base_property), &value);
    Ok(())
}

/// Read the one-way source: the first segment on the base, later segments
/// descending through widget-valued properties.
fn read_path(base: &Widget, decl: &OneWayDecl) -> Result<Value, BindingError> {
    let resolution = |cause: String| BindingError::PropertyResolution {
        property: decl.target_property.clone(),
        path: decl.path.clone(),
        cause,
    };
    let mut value = base
        .get(&decl.segments[0])
        .map_err(|e| resolution(e.to_string()))?;
    for segment in &decl.segments[1..] {
        let widget = value
            .as_object()
            .and_then(|o| o.downcast::<Widget>())
            .ok_or_else(|| {
                resolution(format!("segment {segment:?} is not reachable: not a widget value"))
            })?;
        value = widget
            .get(segment)
            .map_err(|e| resolution(e.to_string()))?;
    }
    Ok(value)
}

/// Convert, type-check, and assign a source value to the one-way target.
fn assign_one_way(
    decl: &OneWayDecl,
    target: &Widget,
    guards: &TypeGuards,
    config: BindingConfig,
    value: Value,
) -> Result<(), BindingError> {
    let ty = target
        .property_type(&decl.target_property)
        .ok_or_else(|| BindingError::PropertyResolution {
            property: decl.target_property.clone(),
            path: decl.path.clone(),
            cause: format!(
                "target {} has no property {:?}",
                target.type_name(),
                decl.target_property
            ),
        })?;
    let value = match &decl.converter {
        Some(converter) => {
            let context = ConverterContext {
                target_type: target.type_name(),
                target_property: decl.target_property.clone(),
            };
            converter(&value, &context).map_err(|cause| BindingError::Converter {
                property: decl.target_property.clone(),
                path: decl.path.clone(),
                cause,
            })?
        }
        None => value,
    };
    check_value(guards, config, &value, ty).map_err(|cause| BindingError::TypeMismatch {
        property: decl.target_property.clone(),
        path: decl.path.clone(),
        cause,
    })?;
    target
        .set(&decl.target_property, value)
        .map_err(|e| BindingError::PropertyResolution {
            property: decl.target_property.clone(),
            path: decl.path.clone(),
            cause: e.to_string(),
        })
}

fn base_property_type(base: &Widget, rt: &TwoWayRuntime) -> Result<PropertyType, BindingError> {
    base.property_type(&rt.decl.base_property)
        .ok_or_else(|| BindingError::PropertyResolution {
            property: rt.decl.base_property.clone(),
            path: rt.decl.path.clone(),
            cause: "base widget does not declare the bound property".to_owned(),
        })
}

fn check_value(
    guards: &TypeGuards,
    config: BindingConfig,
    value: &Value,
    ty: PropertyType,
) -> Result<(), String> {
    let result = if config.strict_mode {
        guards.check_strict(value, ty)
    } else {
        guards.check(value, ty)
    };
    result.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guards() -> Rc<TypeGuards> {
        Rc::new(TypeGuards::with_defaults())
    }

    fn label() -> Widget {
        Widget::new("TextView")
            .with_id("label")
            .with_property("text", PropertyType::STRING)
    }

    fn base_with_label() -> Widget {
        let base = Widget::new("Custom")
            .with_property_value("myText", PropertyType::STRING, "hello")
            .with_property("my_number", PropertyType::INT);
        base.append(&label()).unwrap();
        base
    }

    // ── One-way ─────────────────────────────────────────────────────

    #[test]
    fn one_way_assigns_initially_and_on_change() {
        let base = base_with_label();
        let mut table = BindingTable::new();
        table.one_way("#label", "text", "myText").unwrap();
        let component = Component::new(base.clone(), table, guards(), BindingConfig::new());

        let parent = Widget::new("Stack");
        component.append_to(&parent).unwrap();
        let target = base.find(&tether_core::Selector::parse("#label"));
        assert_eq!(target[0].get("text").unwrap(), Value::from("hello"));

        base.set("myText", "changed").unwrap();
        assert_eq!(target[0].get("text").unwrap(), Value::from("changed"));
    }

    #[test]
    fn one_way_stays_pending_until_attach() {
        let base = base_with_label();
        let mut table = BindingTable::new();
        table.one_way("#label", "text", "myText").unwrap();
        let component = Component::new(base.clone(), table, guards(), BindingConfig::new());

        let target = base.find(&tether_core::Selector::parse("#label"));
        assert_eq!(target[0].get("text").unwrap(), Value::Null);
        assert!(component.first_failure().is_none());
    }

    #[test]
    fn one_way_missing_source_property_fails_with_context() {
        let base = base_with_label();
        let mut table = BindingTable::new();
        table.one_way("#label", "text", "nonexistent").unwrap();
        let component = Component::new(base, table, guards(), BindingConfig::new());
        component.append_to(&Widget::new("Stack")).unwrap();

        let err = component.first_failure().unwrap();
        match err {
            BindingError::PropertyResolution { property, path, .. } => {
                assert_eq!(property, "text");
                assert_eq!(path, "nonexistent");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn one_way_type_violation_on_change_is_sticky_and_non_mutating() {
        let base = Widget::new("Custom").with_property_value(
            "myText",
            PropertyType::ANY,
            "ok",
        );
        base.append(&label()).unwrap();
        let mut table = BindingTable::new();
        table.one_way("#label", "text", "myText").unwrap();
        let component = Component::new(base.clone(), table, guards(), BindingConfig::new());
        component.append_to(&Widget::new("Stack")).unwrap();

        // The source is ANY-typed, so an int passes the base but must be
        // rejected at the string-typed target without mutating it.
        base.set("myText", 7i64).unwrap();
        let target = base.find(&tether_core::Selector::parse("#label"));
        assert_eq!(target[0].get("text").unwrap(), Value::from("ok"));
        assert!(matches!(
            component.first_failure(),
            Some(BindingError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn one_way_converter_transforms_and_failures_wrap() {
        let base = Widget::new("Custom").with_property_value("count", PropertyType::INT, 3i64);
        base.append(&label()).unwrap();

        let mut table = BindingTable::new();
        table
            .one_way_converted(
                "#label",
                "text",
                "count",
                Rc::new(|value: &Value, ctx: &ConverterContext| {
                    let n = value.as_int().ok_or("not an int")?;
                    Ok(Value::from(format!("{}: {n}", ctx.target_type)))
                }),
            )
            .unwrap();
        let component = Component::new(base.clone(), table, guards(), BindingConfig::new());
        component.append_to(&Widget::new("Stack")).unwrap();

        let target = base.find(&tether_core::Selector::parse("#label"));
        assert_eq!(target[0].get("text").unwrap(), Value::from("TextView: 3"));

        // Null flows to the converter, which rejects it.
        base.set("count", Value::Null).unwrap();
        assert!(matches!(
            component.first_failure(),
            Some(BindingError::Converter { .. })
        ));
    }

    // ── Two-way ─────────────────────────────────────────────────────

    fn spinner() -> Widget {
        Widget::new("Spinner")
            .with_id("source")
            .with_property_value("selection", PropertyType::INT, 23i64)
    }

    fn two_way_component() -> (Component, Widget, Widget) {
        let base = Widget::new("Custom").with_property("my_number", PropertyType::INT);
        let target = spinner();
        base.append(&target).unwrap();
        let mut table = BindingTable::new();
        table.two_way("my_number", "#source.selection").unwrap();
        let component = Component::new(base.clone(), table, guards(), BindingConfig::new());
        (component, base, target)
    }

    #[test]
    fn two_way_accessor_is_gated_on_attach() {
        let (component, _base, target) = two_way_component();

        let err = component.get("my_number").unwrap_err();
        assert!(matches!(err, BindingError::NotAccessible { .. }));
        let err = component.set("my_number", 1i64).unwrap_err();
        assert!(matches!(err, BindingError::NotAccessible { .. }));

        component.append_to(&Widget::new("Stack")).unwrap();
        assert_eq!(component.get("my_number").unwrap(), Value::from(23i64));

        component.set("my_number", 42i64).unwrap();
        assert_eq!(target.get("selection").unwrap(), Value::from(42i64));
        assert_eq!(component.get("my_number").unwrap(), Value::from(42i64));
    }

    #[test]
    fn two_way_initial_sync_fires_base_change() {
        let (component, base, _target) = two_way_component();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = base.on("my_numberChanged", move |v| sink.borrow_mut().push(v.clone()));

        component.append_to(&Widget::new("Stack")).unwrap();
        assert_eq!(*seen.borrow(), vec![Value::from(23i64)]);
    }

    #[test]
    fn two_way_target_changes_propagate_to_base_event() {
        let (component, base, target) = two_way_component();
        component.append_to(&Widget::new("Stack")).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = base.on("my_numberChanged", move |v| sink.borrow_mut().push(v.clone()));

        target.set("selection", 99i64).unwrap();
        assert_eq!(*seen.borrow(), vec![Value::from(99i64)]);
        assert_eq!(component.get("my_number").unwrap(), Value::from(99i64));
    }

    #[test]
    fn two_way_selector_cardinality_must_be_one() {
        for extra in [0usize, 2] {
            let base = Widget::new("Custom").with_property("my_number", PropertyType::INT);
            for _ in 0..extra {
                base.append(&spinner()).unwrap();
            }
            let mut table = BindingTable::new();
            table.two_way("my_number", "#source.selection").unwrap();
            let component = Component::new(base, table, guards(), BindingConfig::new());
            component.append_to(&Widget::new("Stack")).unwrap();

            assert!(matches!(
                component.binding_state("my_number"),
                Some(BindingState::Failed(BindingError::PropertyResolution { .. }))
            ));
            // The sticky failure surfaces on access.
            assert!(matches!(
                component.get("my_number").unwrap_err(),
                BindingError::PropertyResolution { .. }
            ));
        }
    }

    #[test]
    fn two_way_write_type_check_mutates_nothing() {
        let (component, _base, target) = two_way_component();
        component.append_to(&Widget::new("Stack")).unwrap();

        let err = component.set("my_number", "not a number").unwrap_err();
        assert!(matches!(err, BindingError::TypeMismatch { .. }));
        assert_eq!(target.get("selection").unwrap(), Value::from(23i64));
        // A rejected write is not sticky; the binding stays resolved.
        assert_eq!(component.binding_state("my_number"), Some(BindingState::Resolved));
    }

    #[test]
    fn strict_mode_rejects_null_reads() {
        let base = Widget::new("Custom").with_property("my_number", PropertyType::INT);
        let target = Widget::new("Spinner")
            .with_id("source")
            .with_property("selection", PropertyType::INT);
        base.append(&target).unwrap();
        let mut table = BindingTable::new();
        table.two_way("my_number", "#source.selection").unwrap();
        let component = Component::new(
            base,
            table,
            guards(),
            BindingConfig::new().strict(),
        );
        component.append_to(&Widget::new("Stack")).unwrap();

        // The unset target property is Null; strict mode refuses it. The
        // initial sync already failed for the same reason.
        assert!(component.first_failure().is_some());
    }

    // ── Plain properties through the component ──────────────────────

    #[test]
    fn unbound_set_pre_validates_without_mutation() {
        let base = Widget::new("Custom").with_property_value("myText", PropertyType::STRING, "a");
        let component = Component::new(
            base.clone(),
            BindingTable::new(),
            guards(),
            BindingConfig::new(),
        );

        let err = component.set("myText", 5i64).unwrap_err();
        assert!(matches!(err, BindingError::TypeMismatch { .. }));
        assert_eq!(base.get("myText").unwrap(), Value::from("a"));

        component.set("myText", "b").unwrap();
        assert_eq!(component.get("myText").unwrap(), Value::from("b"));
    }
}
