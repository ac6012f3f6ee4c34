//! `bind-` attribute extraction from markup-composed widgets.

use tether_core::Widget;

use crate::config::{BindingConfig, UnsafeBindingPolicy};
use crate::error::BindingError;
use crate::table::BindingTable;

/// Register one-way entries for every `bind-<property>` attribute on
/// `widget`, targeting the widget directly.
///
/// An attribute naming a property the widget does not declare follows
/// `config.unsafe_bindings`: fail, warn and skip, or skip silently.
/// Attributes without the `bind-` prefix are ignored.
pub fn apply_bind_attributes(
    table: &mut BindingTable,
    widget: &Widget,
    attributes: &[(String, String)],
    config: BindingConfig,
) -> Result<(), BindingError> {
    for (name, path) in attributes {
        let Some(property) = name.strip_prefix("bind-") else {
            continue;
        };
        if !widget.has_property(property) {
            match config.unsafe_bindings {
                UnsafeBindingPolicy::Error => {
                    return Err(BindingError::UnsafeBinding {
                        attribute: name.clone(),
                    });
                }
                UnsafeBindingPolicy::Warn => {
                    tracing::warn!(
                        attribute = %name,
                        widget = widget.type_name(),
                        "skipping binding attribute for an undeclared property"
                    );
                    continue;
                }
                UnsafeBindingPolicy::Ignore => continue,
            }
        }
        table.one_way_to_widget(widget.clone(), property, path)?;
    }
    Ok(())
}
