//! Error type for host-model operations.

/// Errors from host-model operations.
#[derive(Debug, Clone)]
pub enum CoreError {
    /// A value failed a type guard.
    TypeMismatch {
        /// Name of the expected type.
        expected: &'static str,
        /// Description of the value that was rejected.
        actual: String,
    },
    /// A guard was already registered for the type.
    DuplicateGuard(&'static str),
    /// A property name is not declared on the widget's schema.
    UnknownProperty {
        /// The widget type the lookup ran against.
        widget: &'static str,
        /// The property that was requested.
        property: String,
    },
    /// The widget was already disposed.
    Disposed(&'static str),
    /// An append would create a degenerate tree (widget appended to itself).
    InvalidAppend(&'static str),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch { expected, actual } => {
                write!(f, "type mismatch: expected {expected}, got {actual}")
            }
            Self::DuplicateGuard(ty) => {
                write!(f, "a type guard is already registered for '{ty}'")
            }
            Self::UnknownProperty { widget, property } => {
                write!(f, "widget '{widget}' has no property '{property}'")
            }
            Self::Disposed(widget) => write!(f, "widget '{widget}' is disposed"),
            Self::InvalidAppend(widget) => {
                write!(f, "widget '{widget}' cannot be appended to itself")
            }
        }
    }
}

impl std::error::Error for CoreError {}
