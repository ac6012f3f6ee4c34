//! Nominal property types and the runtime type-guard registry.
//!
//! Every binding path checks candidate values against the target property's
//! declared [`PropertyType`] before assignment. Guards are registered once
//! per type by the composition root; lookups for unregistered types fall back
//! to a permissive structural check (variant match for primitives, nominal
//! name equality for objects).
//!
//! # Invariants
//!
//! 1. At most one guard per type; re-registration fails.
//! 2. `Null` passes `check` (bindings let absent values flow through) and is
//!    rejected only by `check_strict`.
//! 3. The registry is immutable after setup; it is an explicit object owned
//!    by the composition root, not hidden module state.

use std::rc::Rc;

use ahash::AHashMap;

use crate::error::CoreError;
use crate::value::Value;

/// Nominal type identity for a widget property.
///
/// Built-in primitives are provided as constants; host object types are
/// constructed from their nominal name, e.g. `PropertyType::object("Image")`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropertyType(&'static str);

impl PropertyType {
    pub const ANY: Self = Self("any");
    pub const BOOL: Self = Self("bool");
    pub const INT: Self = Self("int");
    pub const FLOAT: Self = Self("float");
    pub const STRING: Self = Self("string");

    /// A host object type identified by its nominal name.
    #[must_use]
    pub const fn object(name: &'static str) -> Self {
        Self(name)
    }

    /// The type's nominal name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

type Guard = Rc<dyn Fn(&Value) -> bool>;

/// Registry mapping a [`PropertyType`] to a runtime predicate.
pub struct TypeGuards {
    guards: AHashMap<PropertyType, Guard>,
}

impl TypeGuards {
    /// An empty registry; everything falls back to the structural check.
    #[must_use]
    pub fn new() -> Self {
        Self {
            guards: AHashMap::new(),
        }
    }

    /// A registry pre-populated with guards for the built-in primitives.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut guards = Self::new();
        // The built-ins coincide with the structural check but are registered
        // explicitly so ownership of these well-known types is claimed.
        for ty in [
            PropertyType::BOOL,
            PropertyType::INT,
            PropertyType::FLOAT,
            PropertyType::STRING,
        ] {
            let registered = guards.register(ty, move |v| structural_check(v, ty));
            debug_assert!(registered.is_ok());
        }
        guards
    }

    /// Register a guard for `ty`. Fails if one is already registered.
    pub fn register(
        &mut self,
        ty: PropertyType,
        guard: impl Fn(&Value) -> bool + 'static,
    ) -> Result<(), CoreError> {
        if self.guards.contains_key(&ty) {
            return Err(CoreError::DuplicateGuard(ty.name()));
        }
        self.guards.insert(ty, Rc::new(guard));
        Ok(())
    }

    /// Whether `value` is assignable to `ty`. `Null` always passes.
    #[must_use]
    pub fn passes(&self, value: &Value, ty: PropertyType) -> bool {
        if value.is_null() {
            return true;
        }
        match self.guards.get(&ty) {
            Some(guard) => guard(value),
            None => structural_check(value, ty),
        }
    }

    /// Check `value` against `ty`, letting `Null` flow through.
    pub fn check(&self, value: &Value, ty: PropertyType) -> Result<(), CoreError> {
        if self.passes(value, ty) {
            Ok(())
        } else {
            Err(CoreError::TypeMismatch {
                expected: ty.name(),
                actual: value.type_label().to_owned(),
            })
        }
    }

    /// Like [`check`](Self::check) but rejects `Null` as well.
    pub fn check_strict(&self, value: &Value, ty: PropertyType) -> Result<(), CoreError> {
        if value.is_null() {
            return Err(CoreError::TypeMismatch {
                expected: ty.name(),
                actual: "null".to_owned(),
            });
        }
        self.check(value, ty)
    }
}

impl Default for TypeGuards {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for TypeGuards {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeGuards")
            .field("registered", &self.guards.len())
            .finish()
    }
}

/// Permissive fallback for unregistered types: primitives match by variant
/// (ints widen to float), objects by nominal name, `ANY` matches everything.
fn structural_check(value: &Value, ty: PropertyType) -> bool {
    match ty {
        PropertyType::ANY => true,
        PropertyType::BOOL => matches!(value, Value::Bool(_)),
        PropertyType::INT => matches!(value, Value::Int(_)),
        PropertyType::FLOAT => matches!(value, Value::Float(_) | Value::Int(_)),
        PropertyType::STRING => matches!(value, Value::Str(_)),
        other => value
            .as_object()
            .is_some_and(|o| o.type_name() == other.name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ObjectValue;

    #[test]
    fn builtin_guards_accept_matching_variants() {
        let guards = TypeGuards::with_defaults();
        assert!(guards.check(&Value::from(true), PropertyType::BOOL).is_ok());
        assert!(guards.check(&Value::from(1i64), PropertyType::INT).is_ok());
        assert!(guards.check(&Value::from("x"), PropertyType::STRING).is_ok());
    }

    #[test]
    fn mismatch_reports_expected_and_actual() {
        let guards = TypeGuards::with_defaults();
        let err = guards
            .check(&Value::from("x"), PropertyType::INT)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("expected int"), "{msg}");
        assert!(msg.contains("got string"), "{msg}");
    }

    #[test]
    fn int_passes_float_guard() {
        let guards = TypeGuards::with_defaults();
        assert!(guards.check(&Value::from(3i64), PropertyType::FLOAT).is_ok());
    }

    #[test]
    fn null_passes_unless_strict() {
        let guards = TypeGuards::with_defaults();
        assert!(guards.check(&Value::Null, PropertyType::INT).is_ok());
        assert!(guards.check_strict(&Value::Null, PropertyType::INT).is_err());
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut guards = TypeGuards::with_defaults();
        let err = guards.register(PropertyType::INT, |_| true).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateGuard("int")));
    }

    #[test]
    fn custom_guard_overrides_structural_fallback() {
        let even = PropertyType::object("Even");
        let mut guards = TypeGuards::new();
        guards
            .register(even, |v| v.as_int().is_some_and(|i| i % 2 == 0))
            .unwrap();
        assert!(guards.check(&Value::from(4i64), even).is_ok());
        assert!(guards.check(&Value::from(3i64), even).is_err());
    }

    #[test]
    fn unregistered_object_type_matches_by_name() {
        let guards = TypeGuards::new();
        let image = Value::from(ObjectValue::new("Image", ()));
        assert!(guards.check(&image, PropertyType::object("Image")).is_ok());
        assert!(guards.check(&image, PropertyType::object("Font")).is_err());
    }

    #[test]
    fn any_accepts_everything() {
        let guards = TypeGuards::with_defaults();
        for v in [Value::Null, Value::from(1i64), Value::from("s")] {
            assert!(guards.check(&v, PropertyType::ANY).is_ok());
        }
    }
}
