use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::spec::{CustomOutcome, CustomRule, FieldDescriptor, FieldKind, FormSchema, ValidationRule};
use crate::value::{FieldValue, ValueBag};
use crate::visibility::VisibilityPolicy;

/// Aggregate result of one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    pub is_valid: bool,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

impl Default for ValidationVerdict {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: BTreeMap::new(),
        }
    }
}

impl ValidationVerdict {
    pub fn from_errors(errors: BTreeMap<String, String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn error(&self, field_id: &str) -> Option<&str> {
        self.errors.get(field_id).map(String::as_str)
    }

    /// Merges extra errors, overwriting existing keys.
    pub fn merge_errors(&mut self, extra: BTreeMap<String, String>) {
        if extra.is_empty() {
            return;
        }
        self.errors.extend(extra);
        self.is_valid = false;
    }
}

/// Absent, or text that trims to empty. `0` and `false` are present.
pub fn is_missing(value: Option<&FieldValue>) -> bool {
    match value {
        None => true,
        Some(value) => value.is_blank_text(),
    }
}

/// Validates one value against its field's rule; the first failing check
/// wins.
pub fn validate_field(value: Option<&FieldValue>, field: &FieldDescriptor) -> Option<String> {
    if field.kind == FieldKind::Unsupported {
        return None;
    }
    let rule = field.validation.as_ref()?;
    let label = field.label.as_str();

    if rule.is_required() && is_missing(value) {
        return Some(format!("{label} is required"));
    }

    let builtin = match value {
        Some(FieldValue::Text(text)) => check_text(label, text, rule),
        Some(FieldValue::Number(number)) => check_number(label, *number, rule),
        _ => None,
    };
    if builtin.is_some() {
        return builtin;
    }

    rule.custom
        .as_ref()
        .and_then(|custom| run_custom(field, custom, value))
}

fn check_text(label: &str, text: &str, rule: &ValidationRule) -> Option<String> {
    let length = text.chars().count();
    if let Some(min_length) = rule.min_length
        && length < min_length
    {
        return Some(format!("{label} must be at least {min_length} characters"));
    }
    // A zero maximum counts as unset.
    if let Some(max_length) = rule.max_length.filter(|max| *max > 0)
        && length > max_length
    {
        return Some(format!("{label} must be no more than {max_length} characters"));
    }
    if let Some(pattern) = &rule.pattern
        && !pattern.is_full_match(text)
    {
        return Some(format!("{label} is invalid"));
    }
    None
}

fn check_number(label: &str, number: f64, rule: &ValidationRule) -> Option<String> {
    if let Some(min) = rule.min
        && number < min
    {
        return Some(format!("{label} must be at least {min}"));
    }
    if let Some(max) = rule.max
        && number > max
    {
        return Some(format!("{label} must be no more than {max}"));
    }
    None
}

fn run_custom(
    field: &FieldDescriptor,
    custom: &CustomRule,
    value: Option<&FieldValue>,
) -> Option<String> {
    match custom.evaluate(value) {
        Ok(CustomOutcome::Pass) => None,
        Ok(CustomOutcome::Fail) => Some(format!("{} is invalid", field.label)),
        Ok(CustomOutcome::Message(message)) => Some(message),
        Err(err) => {
            warn!(field_id = %field.id, error = %err, "custom rule failed");
            Some(format!("{} is invalid", field.label))
        }
    }
}

/// Validates every field of the schema, regardless of visibility.
pub fn validate_form(values: &ValueBag, schema: &FormSchema) -> ValidationVerdict {
    validate_form_with(values, schema, VisibilityPolicy::All)
}

pub fn validate_form_with(
    values: &ValueBag,
    schema: &FormSchema,
    policy: VisibilityPolicy,
) -> ValidationVerdict {
    let errors = schema
        .fields()
        .iter()
        .filter(|field| policy.covers(field, values))
        .filter_map(|field| {
            validate_field(values.get(&field.id), field).map(|message| (field.id.clone(), message))
        })
        .collect();
    ValidationVerdict::from_errors(errors)
}
