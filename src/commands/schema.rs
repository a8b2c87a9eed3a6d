use crate::commands::Out;
use crate::render::ReportView;
use crate::Result;
use anyhow::Context;

/// Returns the JSON schema of the report printed by `compare --format json`.
pub fn schema() -> Result<Out<serde_json::Value>> {
    let schema = schemars::schema_for!(ReportView);
    let value = serde_json::to_value(&schema).context("Unable to serialize the report schema")?;
    Ok(Out::new("JSON schema of the report", value))
}
