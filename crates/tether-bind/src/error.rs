//! Binding failures, always carrying the owning property and path.

/// Errors raised while declaring, resolving, or servicing a binding.
///
/// Every variant that can occur after declaration names both the bound
/// property and the path so a failure can be placed without a debugger.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingError {
    /// The path text violates the binding grammar.
    PathSyntax { path: String, reason: String },
    /// The path did not lead to a usable property at resolution time.
    PropertyResolution {
        property: String,
        path: String,
        cause: String,
    },
    /// A value failed the type check for the property it was headed to.
    TypeMismatch {
        property: String,
        path: String,
        cause: String,
    },
    /// A two-way accessor was used before the owning component's first
    /// attach.
    NotAccessible { property: String },
    /// A converter rejected the source value.
    Converter {
        property: String,
        path: String,
        cause: String,
    },
    /// A `bind-` attribute named a property the widget does not declare.
    UnsafeBinding { attribute: String },
}

impl std::fmt::Display for BindingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PathSyntax { path, reason } => {
                write!(f, "invalid binding path {path:?}: {reason}")
            }
            Self::PropertyResolution {
                property,
                path,
                cause,
            } => write!(
                f,
                "binding of property {property:?} via {path:?} failed to resolve: {cause}"
            ),
            Self::TypeMismatch {
                property,
                path,
                cause,
            } => write!(
                f,
                "binding of property {property:?} via {path:?} rejected a value: {cause}"
            ),
            Self::NotAccessible { property } => write!(
                f,
                "property {property:?} is two-way bound and not accessible before the component is attached"
            ),
            Self::Converter {
                property,
                path,
                cause,
            } => write!(
                f,
                "converter for property {property:?} via {path:?} failed: {cause}"
            ),
            Self::UnsafeBinding { attribute } => {
                write!(f, "attribute {attribute:?} binds a property the widget does not declare")
            }
        }
    }
}

impl std::error::Error for BindingError {}
