//! JSON schemas for API payloads.

use jsonschema::{Draft, Validator};
use serde_json::{json, Value};
use thiserror::Error;

/// Calendar date, optionally followed by a time and offset.
const ISO_DATE_PATTERN: &str =
    r"^\d{4}-\d{2}-\d{2}([T ]\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?)?$";

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Invalid schema: {0}")]
    Compile(String),
    #[error("Schema validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

pub fn transaction_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "amount", "description", "category", "date", "envelope_id", "account_id"],
        "properties": {
            "id": { "type": "string" },
            "amount": { "type": "number" },
            "description": { "type": "string" },
            "category": { "type": "string" },
            "date": { "type": "string", "pattern": ISO_DATE_PATTERN },
            "envelope_id": { "type": "string" },
            "account_id": { "type": "string" },
            "created_at": { "type": "string", "pattern": ISO_DATE_PATTERN },
            "updated_at": { "type": "string", "pattern": ISO_DATE_PATTERN }
        },
        "additionalProperties": false
    })
}

pub fn api_response_schema() -> Value {
    json!({
        "type": "object",
        "required": ["success", "data"],
        "properties": {
            "success": { "type": "boolean" },
            "data": {},
            "message": { "type": "string" },
            "errors": { "type": "array", "items": { "type": "string" } }
        },
        "additionalProperties": false
    })
}

/// A compiled schema
pub struct SchemaValidator {
    validator: Validator,
}

impl SchemaValidator {
    pub fn new(schema: &Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(schema)
            .map_err(|err| SchemaError::Compile(err.to_string()))?;
        Ok(Self { validator })
    }

    pub fn transaction() -> Result<Self, SchemaError> {
        Self::new(&transaction_schema())
    }

    pub fn api_response() -> Result<Self, SchemaError> {
        Self::new(&api_response_schema())
    }

    /// Check `instance`, collecting every violation.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaError> {
        let messages: Vec<String> = self
            .validator
            .iter_errors(instance)
            .map(|err| err.to_string())
            .collect();
        if messages.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Invalid(messages))
        }
    }
}

pub fn validate_transaction(instance: &Value) -> Result<(), SchemaError> {
    SchemaValidator::transaction()?.validate(instance)
}

pub fn validate_api_response(instance: &Value) -> Result<(), SchemaError> {
    SchemaValidator::api_response()?.validate(instance)
}
