//! Turns completion text into the HTTP body each route promises.

use actix_web::HttpResponse;
use serde_json::Value;

use crate::error::RelayError;

/// Expected top-level fields of the `/process` result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSchema {
    required_fields: Vec<String>,
}

impl ProcessSchema {
    pub fn new<I, S>(required_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_fields: required_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Comma separated field list, blanks ignored.
    pub fn from_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty()),
        )
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    /// With no required fields any JSON value passes.
    pub fn validate(&self, value: &Value) -> Result<(), RelayError> {
        if self.required_fields.is_empty() {
            return Ok(());
        }
        let object = value.as_object().ok_or_else(|| {
            RelayError::UnexpectedShape(format!(
                "expected a JSON object, got {}",
                json_type_name(value)
            ))
        })?;
        let missing: Vec<&str> = self
            .required_fields
            .iter()
            .filter(|field| !object.contains_key(field.as_str()))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RelayError::UnexpectedShape(format!(
                "missing field(s): {}",
                missing.join(", ")
            )))
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse variant: the completion text, untouched.
pub fn parsed_conversation_response(text: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(text)
}

/// Process variant: the completion text must be JSON matching `schema`.
pub fn shape_processed(text: &str, schema: &ProcessSchema) -> Result<Value, RelayError> {
    let value: Value = serde_json::from_str(text)?;
    schema.validate(&value)?;
    Ok(value)
}

pub fn processed_conversation_response(value: &Value) -> HttpResponse {
    HttpResponse::Ok().json(value)
}
