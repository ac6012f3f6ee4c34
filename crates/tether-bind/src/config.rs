//! Engine-wide binding policy, owned by the composition root.

/// What to do with a `bind-` attribute naming an undeclared property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnsafeBindingPolicy {
    /// Reject the attribute with [`BindingError::UnsafeBinding`].
    ///
    /// [`BindingError::UnsafeBinding`]: crate::BindingError::UnsafeBinding
    #[default]
    Error,
    /// Log a warning and skip the attribute.
    Warn,
    /// Skip the attribute silently.
    Ignore,
}

/// Binding engine configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BindingConfig {
    pub unsafe_bindings: UnsafeBindingPolicy,
    /// Strict mode makes every binding type check reject `Null` instead of
    /// letting it flow through.
    pub strict_mode: bool,
}

impl BindingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn unsafe_bindings(mut self, policy: UnsafeBindingPolicy) -> Self {
        self.unsafe_bindings = policy;
        self
    }

    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict_mode = true;
        self
    }
}
