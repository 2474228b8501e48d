#![allow(missing_docs)]

pub mod fallback;
pub mod spec;
pub mod store;
pub mod validate;
pub mod value;
pub mod visibility;

pub use fallback::fallback_schema;
pub use spec::{
    CustomOutcome, CustomRule, Dependency, FieldDescriptor, FieldKind, FormSchema, Pattern,
    PatternError, SchemaError, SelectOption, ValidationRule,
};
pub use store::{FormOptions, FormStore, FormValidator, SchemaValidator, SubmitOutcome};
pub use validate::{ValidationVerdict, is_missing, validate_field, validate_form, validate_form_with};
pub use value::{FieldValue, ValueBag};
pub use visibility::{VisibilityMap, VisibilityPolicy, is_field_visible, resolve_visibility};
