use crate::spec::FormSchema;

const FALLBACK_SCHEMA: &str = include_str!("../assets/fallback_schema.json");

/// Built-in contact schema (required name and email) used when a host cannot
/// acquire its own schema.
pub fn fallback_schema() -> FormSchema {
    FormSchema::from_json(FALLBACK_SCHEMA).expect("parse embedded fallback schema")
}
