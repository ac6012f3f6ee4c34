//! Widget selectors: `#id`, type name, or `*`.

use crate::widget::Widget;

/// Identifies widgets within a descendant subtree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// Matches the widget whose id equals the string (`#someId`).
    Id(String),
    /// Matches widgets of the given type name (`TextView`).
    Type(String),
    /// Matches every widget (`*`).
    Any,
}

impl Selector {
    /// Parse the host selector syntax.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        if source == "*" {
            Self::Any
        } else if let Some(id) = source.strip_prefix('#') {
            Self::Id(id.to_owned())
        } else {
            Self::Type(source.to_owned())
        }
    }

    /// Whether `widget` matches this selector.
    #[must_use]
    pub fn matches(&self, widget: &Widget) -> bool {
        match self {
            Self::Id(id) => widget.id().as_deref() == Some(id.as_str()),
            Self::Type(ty) => widget.type_name() == ty,
            Self::Any => true,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Type(ty) => f.write_str(ty),
            Self::Any => f.write_str("*"),
        }
    }
}
