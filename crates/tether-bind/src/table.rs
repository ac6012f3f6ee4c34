//! Per-component binding declarations.
//!
//! A [`BindingTable`] is built once at composition time and handed to a
//! [`Component`]. Declaring an entry validates its path immediately; a table
//! that built without error can still fail at resolution (missing
//! properties, selector cardinality), but never on syntax.
//!
//! [`Component`]: crate::Component

use tether_core::{Selector, Widget};

use crate::converter::Converter;
use crate::error::BindingError;
use crate::path::{self, PathOrigin};

/// How a one-way entry names its target widget: by selector, resolved
/// within the component subtree at attach, or by direct handle for entries
/// extracted from markup.
#[derive(Clone)]
pub(crate) enum TargetRef {
    Selector(Selector),
    Widget(Widget),
}

pub(crate) struct OneWayDecl {
    pub(crate) target: TargetRef,
    pub(crate) target_property: String,
    pub(crate) path: String,
    pub(crate) segments: Vec<String>,
    pub(crate) converter: Option<Converter>,
}

pub(crate) struct TwoWayDecl {
    pub(crate) base_property: String,
    pub(crate) path: String,
    pub(crate) selector: Selector,
    pub(crate) target_property: String,
}

/// Binding declarations for one component.
#[derive(Default)]
pub struct BindingTable {
    pub(crate) one_way: Vec<OneWayDecl>,
    pub(crate) two_way: Vec<TwoWayDecl>,
}

impl BindingTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `base path → target_selector.target_property`.
    pub fn one_way(
        &mut self,
        target_selector: &str,
        target_property: impl Into<String>,
        path: &str,
    ) -> Result<(), BindingError> {
        self.one_way_entry(target_selector, target_property, path, None)
    }

    /// Like [`BindingTable::one_way`] with a converter between source value
    /// and target assignment.
    pub fn one_way_converted(
        &mut self,
        target_selector: &str,
        target_property: impl Into<String>,
        path: &str,
        converter: Converter,
    ) -> Result<(), BindingError> {
        self.one_way_entry(target_selector, target_property, path, Some(converter))
    }

    fn one_way_entry(
        &mut self,
        target_selector: &str,
        target_property: impl Into<String>,
        path: &str,
        converter: Option<Converter>,
    ) -> Result<(), BindingError> {
        let segments = path::parse_one_way(path, PathOrigin::Table)?;
        self.one_way.push(OneWayDecl {
            target: TargetRef::Selector(Selector::parse(target_selector)),
            target_property: target_property.into(),
            path: path.to_owned(),
            segments,
            converter,
        });
        Ok(())
    }

    /// One-way entry targeting a widget handle directly; the markup path
    /// grammar applies.
    pub(crate) fn one_way_to_widget(
        &mut self,
        widget: Widget,
        target_property: impl Into<String>,
        path: &str,
    ) -> Result<(), BindingError> {
        let segments = path::parse_one_way(path, PathOrigin::Markup)?;
        self.one_way.push(OneWayDecl {
            target: TargetRef::Widget(widget),
            target_property: target_property.into(),
            path: path.to_owned(),
            segments,
            converter: None,
        });
        Ok(())
    }

    /// Declare `base_property ↔ selector.property`.
    pub fn two_way(
        &mut self,
        base_property: impl Into<String>,
        path: &str,
    ) -> Result<(), BindingError> {
        let (selector, target_property) = path::parse_two_way(path)?;
        self.two_way.push(TwoWayDecl {
            base_property: base_property.into(),
            path: path.to_owned(),
            selector,
            target_property,
        });
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.one_way.is_empty() && self.two_way.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.one_way.len() + self.two_way.len()
    }
}
