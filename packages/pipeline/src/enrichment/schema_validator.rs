use jsonschema::Validator;
use serde_json::Value;

use crate::error::{PipelineError, Result};

const SCHEMA_JSON: &str = include_str!("../../../../schema/v0.3.0/schema.json");

/// Validates machine_readable sections against the regelrecht JSON schema v0.3.0.
pub struct SchemaValidator {
    validator: Validator,
}

impl SchemaValidator {
    /// Create a new schema validator.
    ///
    /// Extracts the `machineReadableSection` definition from the full schema
    /// and uses it as the validation root.
    pub fn new() -> Result<Self> {
        let full_schema: Value =
            serde_json::from_str(SCHEMA_JSON).map_err(|e| PipelineError::SchemaLoad(e.to_string()))?;

        // Build a sub-schema that references machineReadableSection as the root.
        // We inline the definitions from the parent schema so $ref resolution works.
        let sub_schema = serde_json::json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "$ref": "#/definitions/machineReadableSection",
            "definitions": full_schema["definitions"]
        });

        let validator = Validator::new(&sub_schema)
            .map_err(|e| PipelineError::SchemaLoad(format!("failed to compile schema: {e}")))?;

        Ok(Self { validator })
    }

    /// Validate a machine_readable JSON value against the schema.
    ///
    /// Returns `Ok(())` if valid, or `Err(SchemaValidation)` with a list of errors.
    pub fn validate(&self, value: &Value) -> Result<()> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(value)
            .map(|e| {
                let path = e.instance_path().to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{path}: {e}")
                }
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::SchemaValidation { errors })
        }
    }
}
