//! Envelope check for `homework_statuses` payloads.

use serde_json::Value;

use crate::{
    domain::{HomeworkRecord, ValidatedResponse},
    errors::Error,
    Result,
};

/// Validate the response shape before any field is read.
///
/// Both `homeworks` (an array) and `current_date` (an integer) are required.
/// Individual records are not inspected; see [`crate::status::StatusVocabulary::render`].
pub fn validate(response: &Value) -> Result<ValidatedResponse> {
    match check(response) {
        Ok(v) => {
            tracing::info!("response format matches the expected shape");
            Ok(v)
        }
        Err(e) => {
            tracing::error!("response format does not match: {e}");
            Err(e)
        }
    }
}

fn check(response: &Value) -> Result<ValidatedResponse> {
    let Some(obj) = response.as_object() else {
        return Err(malformed(format!(
            "expected a JSON object, got {}",
            kind(response)
        )));
    };

    let homeworks = match obj.get("homeworks") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(malformed(format!(
                "\"homeworks\" must be an array, got {}",
                kind(other)
            )))
        }
        None => return Err(malformed("missing \"homeworks\" key".to_string())),
    };

    let current_date = match obj.get("current_date") {
        Some(v) => v.as_i64().ok_or_else(|| {
            malformed(format!(
                "\"current_date\" must be an integer, got {}",
                kind(v)
            ))
        })?,
        None => return Err(malformed("missing \"current_date\" key".to_string())),
    };

    Ok(ValidatedResponse {
        homeworks: homeworks.iter().map(HomeworkRecord::from_json).collect(),
        current_date,
    })
}

fn malformed(detail: String) -> Error {
    Error::MalformedResponse(detail)
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
