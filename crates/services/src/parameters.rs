//! Loading the per-level parameter document.

use std::sync::Arc;

use drill_core::params::{
    FallbackParameters, PARAMETER_TABLE_VERSION, ParameterSource, ParameterTable, TestConfig,
};

use crate::error::ParameterLoadError;

/// Parse and validate a `{ "integerLevels": [...], "fractionLevels": [...] }`
/// document.
///
/// Levels the document leaves out are not an error; the engine serves them
/// from the compiled-in tables.
///
/// # Errors
///
/// Returns `ParameterLoadError::Json` for malformed JSON and
/// `ParameterLoadError::Params` for records that fail validation.
pub fn load_parameter_table(json: &str) -> Result<ParameterTable, ParameterLoadError> {
    let config: TestConfig = serde_json::from_str(json)?;
    let table = ParameterTable::from_config(config)?;

    let missing = table.missing_levels();
    if !missing.is_empty() {
        tracing::warn!(
            missing = missing.len(),
            "parameter document is incomplete, compiled-in records fill the gaps"
        );
    }
    Ok(table)
}

/// Render a table as the JSON document `load_parameter_table` accepts.
///
/// # Errors
///
/// Returns `serde_json::Error` if serialization fails.
pub fn parameter_table_to_json(table: &ParameterTable) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&table.to_config())
}

/// Parameter source for an optional document.
///
/// A missing or unreadable document degrades to the compiled-in tables; the
/// failure is logged rather than returned.
#[must_use]
pub fn parameter_source(document: Option<&str>) -> Arc<dyn ParameterSource> {
    let Some(json) = document else {
        tracing::info!(
            version = PARAMETER_TABLE_VERSION,
            "no parameter document, using compiled-in tables"
        );
        return Arc::new(FallbackParameters);
    };

    match load_parameter_table(json) {
        Ok(table) => Arc::new(table),
        Err(err) => {
            tracing::error!(
                error = %err,
                version = PARAMETER_TABLE_VERSION,
                "failed to load parameter document, using compiled-in tables"
            );
            Arc::new(FallbackParameters)
        }
    }
}
