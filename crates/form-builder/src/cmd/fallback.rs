use anyhow::Result;
use form_spec::fallback_schema;

pub fn run() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&fallback_schema())?);
    Ok(())
}
