use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::spec::{FieldDescriptor, FormSchema};
use crate::value::ValueBag;

pub type VisibilityMap = BTreeMap<String, bool>;

/// Which fields a validation pass covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityPolicy {
    /// Every field, hidden or not. Hidden required fields block submission.
    #[default]
    All,
    /// Only fields whose dependency currently holds.
    VisibleOnly,
}

impl VisibilityPolicy {
    pub fn covers(self, field: &FieldDescriptor, values: &ValueBag) -> bool {
        match self {
            VisibilityPolicy::All => true,
            VisibilityPolicy::VisibleOnly => is_field_visible(field, values),
        }
    }
}

/// A field without a dependency is always visible; otherwise the dependency
/// target must be present and strictly equal (shape and value) to the
/// declared value.
pub fn is_field_visible(field: &FieldDescriptor, values: &ValueBag) -> bool {
    match &field.depends_on {
        None => true,
        Some(dependency) => values
            .get(&dependency.field)
            .is_some_and(|current| *current == dependency.value),
    }
}

pub fn resolve_visibility(schema: &FormSchema, values: &ValueBag) -> VisibilityMap {
    schema
        .fields()
        .iter()
        .map(|field| (field.id.clone(), is_field_visible(field, values)))
        .collect()
}
