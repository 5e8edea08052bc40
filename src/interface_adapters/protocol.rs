use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::{ApiError, FieldErrors};
use crate::domain::request::RawResponse;

// Error code the API sends alongside a 401 when the access credential expired.
pub const TOKEN_NOT_VALID: &str = "token_not_valid";

pub const TOKEN_PATH: &str = "token/";
pub const TOKEN_REFRESH_PATH: &str = "token/refresh/";

// Credential pair issued by the token endpoints. The refresh endpoint omits
// `refresh` when rotation is disabled server-side.
#[derive(Debug, Deserialize)]
pub struct TokenPairResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

// Error envelope shared by the API's non-validation failures.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub detail: String,
}

// Fields a profile update may change. Unset fields are left untouched.
#[derive(Debug, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

// New listing payload. Images are uploaded separately.
#[derive(Debug, Serialize)]
pub struct NewGig {
    pub title: String,
    pub description: String,
    pub price: String,
    pub delivery_time: u32,
}

// Map a response onto the client error taxonomy. 2xx bodies pass through untouched.
pub fn classify_response(response: RawResponse) -> Result<Value, ApiError> {
    if response.is_success() {
        return Ok(response.body);
    }

    let status = response.status;
    match status {
        400 => Err(ApiError::Validation(field_errors(response.body))),
        401 => {
            let error = error_envelope(&response.body);
            if error.code.as_deref() == Some(TOKEN_NOT_VALID) {
                return Err(ApiError::AuthExpired);
            }
            Err(ApiError::Unauthorized {
                status,
                message: error.detail,
            })
        }
        403 => Err(ApiError::Unauthorized {
            status,
            message: error_envelope(&response.body).detail,
        }),
        404 => Err(ApiError::NotFound),
        _ => Err(ApiError::Upstream {
            status,
            message: error_envelope(&response.body).detail,
        }),
    }
}

fn error_envelope(body: &Value) -> ErrorResponse {
    serde_json::from_value(body.clone()).unwrap_or_default()
}

// Validation bodies map field names to a message list (or a single message).
fn field_errors(body: Value) -> FieldErrors {
    let mut fields = FieldErrors::new();
    match body {
        Value::Object(map) => {
            for (field, messages) in map {
                fields.insert(field, messages_of(messages));
            }
        }
        Value::Null => {}
        other => {
            fields.insert("non_field_errors".to_string(), messages_of(other));
        }
    }
    fields
}

fn messages_of(value: Value) -> Vec<String> {
    match value {
        Value::String(message) => vec![message],
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(message) => message,
                other => other.to_string(),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}
