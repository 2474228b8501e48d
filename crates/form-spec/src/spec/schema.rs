use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::field::FieldDescriptor;
use crate::value::ValueBag;

/// Callback receiving the final value bag once a submission is accepted.
pub type SubmitHandler = Arc<dyn Fn(&ValueBag) + Send + Sync>;

/// Problems detected once, when a schema is accepted.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("duplicate field id '{field_id}'")]
    DuplicateFieldId { field_id: String },
    #[error("field '{field_id}' depends on itself")]
    SelfDependency { field_id: String },
    #[error("field '{field_id}' depends on unknown field '{target}'")]
    UnknownDependency { field_id: String, target: String },
    #[error("dependency cycle detected: {chain:?}")]
    DependencyCycle { chain: Vec<String> },
    #[error("invalid schema json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct RawSchema {
    fields: Vec<FieldDescriptor>,
}

impl TryFrom<RawSchema> for FormSchema {
    type Error = SchemaError;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        FormSchema::new(raw.fields)
    }
}

/// Ordered field descriptors plus an optional submit handler. Field order is
/// rendering and evaluation order.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct FormSchema {
    fields: Vec<FieldDescriptor>,
    #[serde(skip)]
    on_submit: Option<SubmitHandler>,
}

impl FormSchema {
    /// Accepts a list of descriptors after checking id uniqueness and the
    /// dependency graph.
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self, SchemaError> {
        check_fields(&fields)?;
        Ok(Self {
            fields,
            on_submit: None,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, SchemaError> {
        let raw: RawSchema = serde_json::from_str(raw)?;
        Self::new(raw.fields)
    }

    pub fn with_submit_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ValueBag) + Send + Sync + 'static,
    {
        self.on_submit = Some(Arc::new(handler));
        self
    }

    pub fn submit_handler(&self) -> Option<&SubmitHandler> {
        self.on_submit.as_ref()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.id == id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Debug for FormSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSchema")
            .field("fields", &self.fields)
            .field("on_submit", &self.on_submit.as_ref().map(|_| ".."))
            .finish()
    }
}

fn check_fields(fields: &[FieldDescriptor]) -> Result<(), SchemaError> {
    let mut seen = BTreeSet::new();
    for field in fields {
        if !seen.insert(field.id.as_str()) {
            return Err(SchemaError::DuplicateFieldId {
                field_id: field.id.clone(),
            });
        }
    }

    let mut edges = BTreeMap::new();
    for field in fields {
        let Some(dependency) = &field.depends_on else {
            continue;
        };
        if dependency.field == field.id {
            return Err(SchemaError::SelfDependency {
                field_id: field.id.clone(),
            });
        }
        if !seen.contains(dependency.field.as_str()) {
            return Err(SchemaError::UnknownDependency {
                field_id: field.id.clone(),
                target: dependency.field.clone(),
            });
        }
        edges.insert(field.id.as_str(), dependency.field.as_str());
    }

    // Each field has at most one dependency, so walking the edges from any
    // start either terminates or revisits a field of the current chain.
    let mut settled = BTreeSet::new();
    for start in edges.keys().copied() {
        let mut chain: Vec<&str> = Vec::new();
        let mut current = Some(start);
        while let Some(id) = current {
            if settled.contains(id) {
                break;
            }
            if let Some(position) = chain.iter().position(|seen| *seen == id) {
                let mut cycle: Vec<String> =
                    chain[position..].iter().map(|id| id.to_string()).collect();
                cycle.push(id.to_string());
                return Err(SchemaError::DependencyCycle { chain: cycle });
            }
            chain.push(id);
            current = edges.get(id).copied();
        }
        settled.extend(chain);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::field::FieldKind;

    fn text(id: &str) -> FieldDescriptor {
        FieldDescriptor::new(id, FieldKind::Text, id.to_uppercase())
    }

    #[test]
    fn accepts_chained_dependencies() {
        let schema = FormSchema::new(vec![
            text("a"),
            text("b").depends_on("a", "x"),
            text("c").depends_on("b", "y"),
        ])
        .expect("schema is valid");
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.field("c").map(|f| f.label.as_str()), Some("C"));
    }

    #[test]
    fn reports_cycle_with_chain() {
        let err = FormSchema::new(vec![
            text("a").depends_on("c", "x"),
            text("b").depends_on("a", "x"),
            text("c").depends_on("b", "x"),
        ])
        .expect_err("cycle");
        match err {
            SchemaError::DependencyCycle { chain } => {
                assert_eq!(chain.first(), chain.last());
                assert_eq!(chain.len(), 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
