use async_trait::async_trait;

use crate::domain::entities::Session;
use crate::domain::errors::TransportError;
use crate::domain::request::{OutboundRequest, RawResponse};

// Port for the durable credential pair. Writes always replace both credentials.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<Session>, String>;
    async fn save(&self, session: Session) -> Result<(), String>;
    async fn clear(&self) -> Result<(), String>;
}

// Port for sending a single attempt to the API and reading back the response.
// Any HTTP status is a response; only a missing response is an error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn dispatch(&self, request: &OutboundRequest<'_>) -> Result<RawResponse, TransportError>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}
