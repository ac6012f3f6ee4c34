//! Binding path grammar, validated eagerly at declaration time.
//!
//! A path is dot-separated segments. One-way paths start at a base property
//! and may descend through widget-valued properties; paths declared from
//! markup attributes are restricted to a single segment. Two-way paths are
//! exactly `selector.property`, anchored at a `#id`, type, or `*` selector.
//!
//! # Invariants
//!
//! 1. No segment contains whitespace or any of `( ) [ ] { } < >`.
//! 2. `this` is reserved and rejected as a segment.
//! 3. Validation happens at declaration; a path that parses never fails on
//!    syntax later.

use tether_core::Selector;

use crate::error::BindingError;

/// Where a one-way path was declared. Markup-declared paths have a tighter
/// grammar than table-declared ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathOrigin {
    Table,
    Markup,
}

const FORBIDDEN: [char; 8] = ['(', ')', '[', ']', '{', '}', '<', '>'];

fn syntax(path: &str, reason: impl Into<String>) -> BindingError {
    BindingError::PathSyntax {
        path: path.to_owned(),
        reason: reason.into(),
    }
}

fn segments(path: &str) -> Result<Vec<String>, BindingError> {
    if path.is_empty() {
        return Err(syntax(path, "path is empty"));
    }
    if let Some(c) = path.chars().find(|c| c.is_whitespace() || FORBIDDEN.contains(c)) {
        return Err(syntax(path, format!("forbidden character {c:?}")));
    }
    let mut out = Vec::new();
    for segment in path.split('.') {
        if segment.is_empty() {
            return Err(syntax(path, "empty path segment"));
        }
        if segment == "this" {
            return Err(syntax(path, "\"this\" is reserved"));
        }
        out.push(segment.to_owned());
    }
    Ok(out)
}

/// Whether a segment reads as a selector rather than a property name.
fn is_selector_anchor(segment: &str) -> bool {
    segment == "*"
        || segment.starts_with('#')
        || segment.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Parse a one-way path into its property segments.
pub fn parse_one_way(path: &str, origin: PathOrigin) -> Result<Vec<String>, BindingError> {
    let segments = segments(path)?;
    if is_selector_anchor(&segments[0]) {
        return Err(syntax(
            path,
            "one-way paths start at a base property, not a selector",
        ));
    }
    if origin == PathOrigin::Markup && segments.len() != 1 {
        return Err(syntax(
            path,
            "markup-declared paths must be a single property name",
        ));
    }
    Ok(segments)
}

/// Parse a two-way path into its selector anchor and target property.
pub fn parse_two_way(path: &str) -> Result<(Selector, String), BindingError> {
    let mut segments = segments(path)?;
    if segments.len() != 2 {
        return Err(syntax(
            path,
            "two-way paths are exactly selector.property",
        ));
    }
    if !is_selector_anchor(&segments[0]) {
        return Err(syntax(
            path,
            "two-way paths must be anchored at a #id, type, or * selector",
        ));
    }
    let property = segments.pop().unwrap_or_default();
    Ok((Selector::parse(&segments[0]), property))
}
