use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::domain::errors::TransportError;
use crate::domain::ports::Transport;
use crate::domain::request::{Method, OutboundRequest, RawResponse};

// Thin reqwest client for the marketplace API.
#[derive(Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn dispatch(&self, request: &OutboundRequest<'_>) -> Result<RawResponse, TransportError> {
        // Paths are relative, so the base URL's own path prefix is kept.
        let url = self
            .base_url
            .join(&request.request.path)
            .map_err(|err| TransportError::InvalidRequest(err.to_string()))?;

        let method = match request.request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
        };
        let mut builder = self.http.request(method, url);
        if let Some(token) = request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::Unreachable(err.to_string()))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| TransportError::Body(err.to_string()))?;

        Ok(RawResponse::new(status, decode_body(&bytes)))
    }
}

// Error pages are not always JSON; keep them as text rather than failing.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
