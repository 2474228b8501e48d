use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use form_spec::{FormOptions, FormStore, SubmitOutcome, ValidationVerdict, ValueBag};
use serde::Serialize;

use crate::cmd::{PolicyArg, load_schema, load_values};
use crate::config::AppConfig;

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Schema file (JSON)
    #[arg(long, value_name = "schema.json")]
    pub schema: PathBuf,
    /// Entered values (JSON object of field id to value)
    #[arg(long, value_name = "values.json")]
    pub data: Option<PathBuf>,
    /// Which fields the validation pass covers
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
    /// Use the built-in contact schema when the schema cannot be loaded
    #[arg(long, default_value_t = false)]
    pub fallback: bool,
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub submitted: bool,
    pub verdict: ValidationVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<ValueBag>,
}

/// Replays the values as edits on a fresh session and submits it.
pub fn evaluate(args: &CheckArgs, config: &AppConfig) -> Result<CheckReport> {
    let schema = load_schema(&args.schema, args.fallback)?;
    let values = load_values(args.data.as_deref())?;

    let options = FormOptions {
        policy: args
            .policy
            .map(Into::into)
            .unwrap_or(config.form.policy),
    };
    let mut store = FormStore::new(schema).with_options(options);
    for (id, value) in values {
        store.set_field_value(id, value);
    }

    let report = match store.submit() {
        SubmitOutcome::Submitted(values) => CheckReport {
            submitted: true,
            verdict: store.verdict().clone(),
            values: Some(values),
        },
        SubmitOutcome::Rejected(verdict) => CheckReport {
            submitted: false,
            verdict,
            values: None,
        },
    };
    Ok(report)
}

pub fn run(args: &CheckArgs, config: &AppConfig) -> Result<CheckReport> {
    let report = evaluate(args, config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_human(&report));
    }
    Ok(report)
}

fn render_human(report: &CheckReport) -> String {
    if report.submitted {
        let count = report.values.as_ref().map_or(0, ValueBag::len);
        return format!("form accepted ({count} value(s))\n");
    }
    let mut out = String::from("form rejected\n");
    for (field_id, message) in &report.verdict.errors {
        out.push_str(&format!("  {field_id}: {message}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn args(schema: PathBuf, data: Option<PathBuf>) -> CheckArgs {
        CheckArgs {
            schema,
            data,
            policy: None,
            fallback: false,
            json: false,
        }
    }

    const CONTACT_SCHEMA: &str = r#"{
        "fields": [
            { "id": "contact", "type": "select", "label": "Contact",
              "options": [{ "label": "Phone", "value": "phone" }] },
            { "id": "phone", "type": "text", "label": "Phone",
              "validation": { "required": true },
              "dependsOn": { "field": "contact", "value": "phone" } }
        ]
    }"#;

    #[test]
    fn config_policy_applies_unless_flag_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let schema = write(&dir, "schema.json", CONTACT_SCHEMA);
        let mut config = AppConfig::default();

        let report = evaluate(&args(schema.clone(), None), &config).unwrap();
        assert!(!report.submitted);
        assert_eq!(report.verdict.error("phone"), Some("Phone is required"));

        config.form.policy = form_spec::VisibilityPolicy::VisibleOnly;
        let report = evaluate(&args(schema.clone(), None), &config).unwrap();
        assert!(report.submitted);

        let mut all = args(schema, None);
        all.policy = Some(PolicyArg::All);
        assert!(!evaluate(&all, &config).unwrap().submitted);
    }

    #[test]
    fn fallback_replaces_unreadable_schema() {
        let dir = tempfile::TempDir::new().unwrap();
        let data = write(&dir, "values.json", r#"{"name": "Ada", "email": "ada@example.org"}"#);
        let mut check = args(dir.path().join("missing.json"), Some(data));

        let err = evaluate(&check, &AppConfig::default()).expect_err("schema is missing");
        assert!(format!("{err:#}").contains("failed to read schema"));

        check.fallback = true;
        let report = evaluate(&check, &AppConfig::default()).unwrap();
        assert!(report.submitted);
    }

    #[test]
    fn human_output_lists_errors() {
        let mut verdict = ValidationVerdict::default();
        verdict.merge_errors([("name".to_string(), "Name is required".to_string())].into());
        let report = CheckReport {
            submitted: false,
            verdict,
            values: None,
        };
        assert_eq!(render_human(&report), "form rejected\n  name: Name is required\n");
    }
}
