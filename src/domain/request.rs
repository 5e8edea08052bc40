use serde_json::Value;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        };
        f.write_str(name)
    }
}

// Call described by a use case. Paths are relative to the API base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Patch,
            path: path.into(),
            body: Some(body),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Attempt {
    First,
    Retried,
}

// One in-flight call and how far it got through the retry protocol.
// A request can move from its first attempt to a retry exactly once.
#[derive(Debug)]
pub struct PendingRequest {
    request: ApiRequest,
    attempt: Attempt,
}

impl PendingRequest {
    pub fn new(request: ApiRequest) -> Self {
        Self {
            request,
            attempt: Attempt::First,
        }
    }

    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    pub fn is_retried(&self) -> bool {
        self.attempt == Attempt::Retried
    }

    // Consumes the request; `None` once the single retry has been used.
    pub fn into_retry(self) -> Option<Self> {
        match self.attempt {
            Attempt::First => Some(Self {
                request: self.request,
                attempt: Attempt::Retried,
            }),
            Attempt::Retried => None,
        }
    }
}

// What actually goes over the wire for one attempt.
#[derive(Clone, Copy, Debug)]
pub struct OutboundRequest<'a> {
    pub request: &'a ApiRequest,
    pub bearer: Option<&'a str>,
}

// Status and decoded body of a response. Empty bodies decode to `Value::Null`.
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

impl RawResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
