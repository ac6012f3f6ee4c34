//! Dynamically typed property values.
//!
//! Widget properties and binding payloads are carried as [`Value`]s: a small
//! closed set of primitives plus [`ObjectValue`] for host object types
//! (images, colors, fonts). Objects compare by pointer identity, matching
//! reference semantics in the host.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A host object value: a shared opaque payload tagged with its nominal type
/// name so type guards and error messages can identify it.
#[derive(Clone)]
pub struct ObjectValue {
    type_name: &'static str,
    inner: Rc<dyn Any>,
}

impl ObjectValue {
    /// Wrap a host object under a nominal type name.
    pub fn new<T: Any>(type_name: &'static str, value: T) -> Self {
        Self {
            type_name,
            inner: Rc::new(value),
        }
    }

    /// The nominal type name this object was registered under.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Attempt to view the payload as a concrete type.
    #[must_use]
    pub fn downcast<T: Any>(&self) -> Option<Rc<T>> {
        Rc::clone(&self.inner).downcast::<T>().ok()
    }
}

impl PartialEq for ObjectValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectValue({})", self.type_name)
    }
}

/// A dynamically typed property value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent value. Passes type checks unless strict mode forbids it.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A host object (image, color, font, ...).
    Object(ObjectValue),
}

impl Value {
    /// Short label used in diagnostics, e.g. `"int"` or the object's
    /// nominal type name.
    #[must_use]
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Object(o) => o.type_name(),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view: ints widen to floats.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<ObjectValue> for Value {
    fn from(v: ObjectValue) -> Self {
        Self::Object(v)
    }
}
