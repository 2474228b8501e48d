use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::spec::FormSchema;
use crate::validate::{ValidationVerdict, is_missing, validate_form_with};
use crate::value::{FieldValue, ValueBag};
use crate::visibility::{VisibilityMap, VisibilityPolicy, is_field_visible, resolve_visibility};

/// Validation seam used by [`FormStore::submit`].
pub trait FormValidator {
    fn validate(
        &self,
        values: &ValueBag,
        schema: &FormSchema,
        policy: VisibilityPolicy,
    ) -> ValidationVerdict;
}

/// Default validator backed by the schema's per-field rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaValidator;

impl FormValidator for SchemaValidator {
    fn validate(
        &self,
        values: &ValueBag,
        schema: &FormSchema,
        policy: VisibilityPolicy,
    ) -> ValidationVerdict {
        validate_form_with(values, schema, policy)
    }
}

/// Session options for a [`FormStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormOptions {
    #[serde(default)]
    pub policy: VisibilityPolicy,
}

/// Result of a submit attempt. Presentation is up to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Both passes succeeded; carries the bag handed to the submit handler.
    Submitted(ValueBag),
    Rejected(ValidationVerdict),
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

/// Owns the value bag and the last verdict of one form session.
pub struct FormStore {
    schema: FormSchema,
    values: ValueBag,
    verdict: ValidationVerdict,
    options: FormOptions,
    validator: Box<dyn FormValidator>,
}

impl FormStore {
    pub fn new(schema: FormSchema) -> Self {
        Self::with_initial(schema, ValueBag::new())
    }

    pub fn with_initial(schema: FormSchema, values: ValueBag) -> Self {
        Self {
            schema,
            values,
            verdict: ValidationVerdict::default(),
            options: FormOptions::default(),
            validator: Box::new(SchemaValidator),
        }
    }

    pub fn with_options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_validator(mut self, validator: impl FormValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn values(&self) -> &ValueBag {
        &self.values
    }

    pub fn value(&self, id: &str) -> Option<&FieldValue> {
        self.values.get(id)
    }

    pub fn verdict(&self) -> &ValidationVerdict {
        &self.verdict
    }

    /// Replaces the mapping for one field. Does not validate.
    pub fn set_field_value(
        &mut self,
        id: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        let id = id.into();
        let value = value.into();
        match self.schema.field(&id) {
            None => warn!(field_id = %id, "value set for a field the schema does not declare"),
            Some(field) if !field.kind.accepts(&value) => warn!(
                field_id = %id,
                expected = field.kind.type_name(),
                actual = value.shape_name(),
                "value shape does not match field type"
            ),
            Some(_) => debug!(field_id = %id, "field value updated"),
        }
        self.values.insert(id, value)
    }

    pub fn clear_field_value(&mut self, id: &str) -> Option<FieldValue> {
        debug!(field_id = %id, "field value cleared");
        self.values.remove(id)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.schema
            .field(id)
            .is_some_and(|field| is_field_visible(field, &self.values))
    }

    pub fn visibility(&self) -> VisibilityMap {
        resolve_visibility(&self.schema, &self.values)
    }

    pub fn reset(&mut self) {
        self.values.clear();
        self.verdict = ValidationVerdict::default();
    }

    /// Validates, then sweeps required fields again before handing the bag
    /// to the schema's submit handler.
    ///
    /// The sweep holds required fields to the blank/absent rule whatever
    /// validator is plugged in. It honours the session's visibility policy.
    pub fn submit(&mut self) -> SubmitOutcome {
        let mut verdict = self
            .validator
            .validate(&self.values, &self.schema, self.options.policy);

        if verdict.is_valid {
            let missing = self.required_sweep();
            if !missing.is_empty() {
                debug!(fields = missing.len(), "required sweep rejected submission");
            }
            verdict.merge_errors(missing);
        }

        self.verdict = verdict.clone();
        if !verdict.is_valid {
            debug!(errors = verdict.errors.len(), "form submission rejected");
            return SubmitOutcome::Rejected(verdict);
        }

        if let Some(handler) = self.schema.submit_handler() {
            handler(&self.values);
        }
        debug!(fields = self.values.len(), "form submitted");
        SubmitOutcome::Submitted(self.values.clone())
    }

    fn required_sweep(&self) -> BTreeMap<String, String> {
        self.schema
            .fields()
            .iter()
            .filter(|field| field.is_required())
            .filter(|field| self.options.policy.covers(field, &self.values))
            .filter(|field| is_missing(self.values.get(&field.id)))
            .map(|field| (field.id.clone(), format!("{} is required", field.label)))
            .collect()
    }
}

impl fmt::Debug for FormStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormStore")
            .field("schema", &self.schema)
            .field("values", &self.values)
            .field("verdict", &self.verdict)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
