//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area. Request bodies
//! are taken as raw JSON so a missing field can be reported by name before
//! the body is deserialized.

pub mod analysis;
pub mod health;
pub mod model;
pub mod predictions;

// Re-export all handlers for use in router
pub use analysis::*;
pub use health::*;
pub use model::*;
pub use predictions::*;

use axum::{extract::rejection::JsonRejection, Json};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::AppError;

/// A JSON body whose rejection is turned into a JSON error
pub type JsonBody = Result<Json<Value>, JsonRejection>;

pub(crate) fn json_body(payload: JsonBody) -> Result<Value, AppError> {
    match payload {
        Ok(Json(body)) if body.is_object() => Ok(body),
        Ok(_) => Err(AppError::bad_request("Request body must be a JSON object")),
        Err(rejection) => Err(AppError::bad_request(&rejection.body_text())),
    }
}

fn is_present(body: &Value, name: &str) -> bool {
    body.get(name).is_some_and(|v| !v.is_null())
}

/// Fail with `Missing required field: <name>` for the first absent field
pub(crate) fn require_fields(body: &Value, fields: &[&str]) -> Result<(), AppError> {
    match fields.iter().find(|f| !is_present(body, f)) {
        Some(missing) => Err(AppError::bad_request(&format!(
            "Missing required field: {}",
            missing
        ))),
        None => Ok(()),
    }
}

/// Deserialize `value` or fail with a 400 naming what was being parsed
pub(crate) fn parse<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::bad_request(&format!("Invalid {}: {}", what, e)))
}

/// Deserialize a field, `None` when absent or null
pub(crate) fn optional_field<T: DeserializeOwned>(
    body: &mut Value,
    name: &str,
) -> Result<Option<T>, AppError> {
    match body.get_mut(name).map(Value::take) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse(v, name).map(Some),
    }
}

/// Deserialize a field already checked by `require_fields`
pub(crate) fn field<T: DeserializeOwned>(body: &mut Value, name: &str) -> Result<T, AppError> {
    optional_field(body, name)?
        .ok_or_else(|| AppError::bad_request(&format!("Missing required field: {}", name)))
}

/// The `expenses` list shared by the analysis endpoints
pub(crate) fn expenses_field<T: DeserializeOwned>(body: &mut Value) -> Result<T, AppError> {
    optional_field(body, "expenses")?.ok_or_else(|| AppError::bad_request("Missing expenses data"))
}
