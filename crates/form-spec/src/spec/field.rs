use serde::{Deserialize, Serialize};

use crate::spec::rule::ValidationRule;
use crate::value::FieldValue;

/// Option offered by a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Field type, carried through the `type` key of a descriptor.
///
/// Unknown type names load as `Unsupported`; such fields have no rule
/// applicability and always validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Select {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    Checkbox,
    Date,
    #[serde(other)]
    Unsupported,
}

impl FieldKind {
    pub fn select(options: impl IntoIterator<Item = SelectOption>) -> Self {
        FieldKind::Select {
            options: options.into_iter().collect(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Select { .. } => "select",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Date => "date",
            FieldKind::Unsupported => "unsupported",
        }
    }

    pub fn options(&self) -> &[SelectOption] {
        match self {
            FieldKind::Select { options } => options,
            _ => &[],
        }
    }

    /// Whether a value of this runtime shape is legal for the field type.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (FieldKind::Text | FieldKind::Date, FieldValue::Text(_)) => true,
            (FieldKind::Select { .. }, FieldValue::Text(_) | FieldValue::List(_)) => true,
            (FieldKind::Number, FieldValue::Number(_)) => true,
            (FieldKind::Checkbox, FieldValue::Boolean(_)) => true,
            (FieldKind::Unsupported, _) => true,
            _ => false,
        }
    }
}

/// Visibility dependency: the field is live only while `field` holds `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub field: String,
    pub value: FieldValue,
}

/// One entry of a schema describing a single input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Dependency>,
}

impl FieldDescriptor {
    pub fn new(id: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            placeholder: None,
            validation: None,
            depends_on: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_validation(mut self, validation: ValidationRule) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn depends_on(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.depends_on = Some(Dependency {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn is_required(&self) -> bool {
        self.validation
            .as_ref()
            .is_some_and(ValidationRule::is_required)
    }
}
