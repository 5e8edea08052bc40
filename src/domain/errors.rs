use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::entities::BookingStatus;
use crate::domain::lifecycle::BookingAction;

// Per-field validation messages as reported by the API.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

// No response reached the client.
#[derive(Clone, Debug, Error)]
pub enum TransportError {
    #[error("request could not be built: {0}")]
    InvalidRequest(String),
    #[error("no response received: {0}")]
    Unreachable(String),
    #[error("response body could not be read: {0}")]
    Body(String),
}

// Failure of the refresh exchange. Cloned to every caller waiting on the same refresh.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RefreshError {
    #[error("no refresh credential is stored")]
    MissingCredential,
    #[error("refresh rejected with status {status}")]
    Rejected { status: u16 },
    #[error("refresh transport error: {0}")]
    Transport(String),
    #[error("refresh response could not be decoded: {0}")]
    Decode(String),
    #[error("session storage error: {0}")]
    Storage(String),
}

// Why an authenticated session was torn down.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TerminationReason {
    #[error(transparent)]
    RefreshFailed(#[from] RefreshError),
    #[error("credential still rejected after refresh")]
    ExpiredAfterRefresh,
}

// Errors surfaced by the request pipeline and the use cases built on it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    // Only observed inside the pipeline; callers see a refresh or a termination instead.
    #[error("access credential expired")]
    AuthExpired,
    #[error("unauthorized ({status}){}", describe_message(.message))]
    Unauthorized { status: u16, message: Option<String> },
    #[error("validation failed: {}", describe_fields(.0))]
    Validation(FieldErrors),
    #[error("resource not found")]
    NotFound,
    #[error("session terminated: {0}")]
    SessionTerminated(TerminationReason),
    #[error("upstream error {status}{}", describe_message(.message))]
    Upstream { status: u16, message: Option<String> },
    #[error("response could not be decoded: {0}")]
    Decode(String),
    #[error("session storage error: {0}")]
    Storage(String),
    #[error("booking {booking_id} is {status}, which does not offer {action}")]
    ActionNotAllowed {
        booking_id: u64,
        status: BookingStatus,
        action: BookingAction,
    },
}

impl ApiError {
    // Client-side validation failure on a single field.
    pub fn invalid_field(field: &str, message: &str) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.to_string()]);
        ApiError::Validation(fields)
    }
}

fn describe_message(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}

fn describe_fields(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
        .collect::<Vec<_>>()
        .join("; ")
}
