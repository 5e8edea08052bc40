use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::entities::Session;
use crate::domain::errors::{ApiError, TerminationReason};
use crate::domain::ports::{SessionStore, Transport};
use crate::domain::request::{ApiRequest, OutboundRequest, PendingRequest, RawResponse};
use crate::interface_adapters::protocol::classify_response;
use crate::use_cases::credential_refresher::CredentialRefresher;

// Every API call goes through here: attach the access credential, and on
// expiry refresh once and replay once.
pub struct RequestPipeline {
    store: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
    refresher: Arc<CredentialRefresher>,
}

impl RequestPipeline {
    pub fn new(
        store: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
        refresher: Arc<CredentialRefresher>,
    ) -> Self {
        Self {
            store,
            transport,
            refresher,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    #[tracing::instrument(
        name = "api_call",
        skip_all,
        fields(method = %request.method, path = %request.path)
    )]
    pub async fn call(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let mut pending = PendingRequest::new(request);
        let mut session = self.store.load().await.map_err(ApiError::Storage)?;

        loop {
            let response = self.dispatch(&pending, session.as_ref()).await?;
            match classify_response(response) {
                Err(ApiError::AuthExpired) => {}
                other => return other,
            }

            pending = match pending.into_retry() {
                Some(retry) => retry,
                None => {
                    warn!("credential rejected again after refresh; terminating session");
                    self.terminate().await;
                    return Err(ApiError::SessionTerminated(
                        TerminationReason::ExpiredAfterRefresh,
                    ));
                }
            };

            debug!("access credential expired; refreshing before retry");
            // The refresher clears the store itself when the exchange fails.
            let refreshed = self
                .refresher
                .refresh(session.as_ref().map(Session::access))
                .await
                .map_err(|err| ApiError::SessionTerminated(TerminationReason::RefreshFailed(err)))?;
            session = Some(refreshed);
        }
    }

    // Calls that must not carry a credential or trigger a refresh (login, signup).
    #[tracing::instrument(
        name = "api_call_public",
        skip_all,
        fields(method = %request.method, path = %request.path)
    )]
    pub async fn call_public(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let pending = PendingRequest::new(request);
        let response = self.dispatch(&pending, None).await?;
        classify_response(response)
    }

    pub async fn call_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        decode(self.call(request).await?)
    }

    pub async fn call_public_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        decode(self.call_public(request).await?)
    }

    async fn dispatch(
        &self,
        pending: &PendingRequest,
        session: Option<&Session>,
    ) -> Result<RawResponse, ApiError> {
        let outbound = OutboundRequest {
            request: pending.request(),
            bearer: session.map(Session::access),
        };
        let response = self.transport.dispatch(&outbound).await?;
        debug!(
            status = response.status,
            retried = pending.is_retried(),
            "response received"
        );
        Ok(response)
    }

    async fn terminate(&self) {
        if let Err(err) = self.store.clear().await {
            warn!(error = %err, "failed to clear session");
        }
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|err| ApiError::Decode(err.to_string()))
}
