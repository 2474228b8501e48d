pub mod field;
pub mod rule;
pub mod schema;

pub use field::{Dependency, FieldDescriptor, FieldKind, SelectOption};
pub use rule::{CustomOutcome, CustomRule, CustomRuleError, Pattern, PatternError, ValidationRule};
pub use schema::{FormSchema, SchemaError, SubmitHandler};
