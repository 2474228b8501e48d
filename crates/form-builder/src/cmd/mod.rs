pub mod check;
pub mod fallback;
pub mod visibility;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use form_spec::{FormSchema, ValueBag, VisibilityPolicy, fallback_schema};
use tracing::{debug, warn};

/// Command-line spelling of [`VisibilityPolicy`].
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyArg {
    All,
    #[value(alias = "visible_only")]
    VisibleOnly,
}

impl From<PolicyArg> for VisibilityPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::All => VisibilityPolicy::All,
            PolicyArg::VisibleOnly => VisibilityPolicy::VisibleOnly,
        }
    }
}

/// Reads a schema file. With `fallback`, an unreadable or invalid schema is
/// replaced by the built-in contact schema.
pub fn load_schema(path: &Path, fallback: bool) -> Result<FormSchema> {
    match read_schema(path) {
        Ok(schema) => {
            debug!(path = %path.display(), fields = schema.len(), "schema loaded");
            Ok(schema)
        }
        Err(err) if fallback => {
            warn!(path = %path.display(), error = %format!("{err:#}"), "schema unavailable, using fallback schema");
            Ok(fallback_schema())
        }
        Err(err) => Err(err),
    }
}

fn read_schema(path: &Path) -> Result<FormSchema> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    FormSchema::from_json(&raw).with_context(|| format!("invalid schema {}", path.display()))
}

pub fn load_values(path: Option<&Path>) -> Result<ValueBag> {
    let Some(path) = path else {
        return Ok(ValueBag::new());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read values {}", path.display()))?;
    ValueBag::from_json(&raw).with_context(|| format!("invalid values {}", path.display()))
}
