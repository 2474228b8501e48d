use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use form_spec::{VisibilityMap, resolve_visibility};

use crate::cmd::{load_schema, load_values};

#[derive(Args, Debug, Clone)]
pub struct VisibilityArgs {
    /// Schema file (JSON)
    #[arg(long, value_name = "schema.json")]
    pub schema: PathBuf,
    /// Entered values (JSON object of field id to value)
    #[arg(long, value_name = "values.json")]
    pub data: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: &VisibilityArgs) -> Result<VisibilityMap> {
    let schema = load_schema(&args.schema, false)?;
    let values = load_values(args.data.as_deref())?;
    let map = resolve_visibility(&schema, &values);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        // Schema order, not map order.
        for field in schema.fields() {
            let state = if map.get(&field.id).copied().unwrap_or(true) {
                "visible"
            } else {
                "hidden"
            };
            println!("{}: {state}", field.id);
        }
    }
    Ok(map)
}
