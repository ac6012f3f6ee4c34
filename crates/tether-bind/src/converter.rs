//! Value converters interposed between a one-way source and its target.

use std::rc::Rc;

use tether_core::Value;

/// What a converter knows about the assignment it is transforming, so one
/// converter can select a variant per target widget type.
#[derive(Clone, Debug)]
pub struct ConverterContext {
    /// Type name of the widget the value is headed to.
    pub target_type: &'static str,
    /// Property the value is headed to.
    pub target_property: String,
}

/// A source-to-target transform. The output must already match the target
/// property's type; it is re-checked after conversion. A returned error
/// becomes a binding failure, never a silent drop.
pub type Converter = Rc<dyn Fn(&Value, &ConverterContext) -> Result<Value, String>>;
