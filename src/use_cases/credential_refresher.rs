use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::entities::Session;
use crate::domain::errors::RefreshError;
use crate::domain::ports::{Clock, SessionStore, Transport};
use crate::domain::request::{ApiRequest, OutboundRequest};
use crate::interface_adapters::protocol::{TOKEN_REFRESH_PATH, TokenPairResponse};

type RefreshOutcome = Shared<BoxFuture<'static, Result<Session, RefreshError>>>;

enum RefreshState {
    Idle,
    // Every caller arriving while a refresh is running awaits this same outcome.
    InFlight {
        generation: u64,
        outcome: RefreshOutcome,
    },
}

struct Coordinator {
    state: RefreshState,
    // Incremented per exchange so a settled flight only resets its own state.
    generation: u64,
}

// Exchanges the stored refresh credential for a new pair, one exchange at a time.
pub struct CredentialRefresher {
    store: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    coordinator: Arc<Mutex<Coordinator>>,
}

impl CredentialRefresher {
    pub fn new(
        store: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            transport,
            clock,
            coordinator: Arc::new(Mutex::new(Coordinator {
                state: RefreshState::Idle,
                generation: 0,
            })),
        }
    }

    // `stale_access` is the access credential the expired request carried.
    #[tracing::instrument(name = "credential_refresh", skip_all)]
    pub async fn refresh(&self, stale_access: Option<&str>) -> Result<Session, RefreshError> {
        // The lock only guards the state swap; it is released before awaiting.
        let outcome = {
            let mut guard = self.coordinator.lock().await;
            let coordinator = &mut *guard;
            match &coordinator.state {
                RefreshState::InFlight {
                    generation,
                    outcome,
                } => {
                    debug!(generation, "joining in-flight refresh");
                    outcome.clone()
                }
                RefreshState::Idle => {
                    // The expired request may have raced an exchange that has
                    // already settled; hand back the rotated pair instead of
                    // spending its refresh credential again.
                    if let Some(current) = self.rotated_since(stale_access).await {
                        debug!(
                            generation = coordinator.generation,
                            "credentials already rotated; reusing stored pair"
                        );
                        return Ok(current);
                    }
                    coordinator.generation += 1;
                    let generation = coordinator.generation;
                    debug!(generation, "starting refresh exchange");
                    let outcome = self.start_exchange(generation);
                    coordinator.state = RefreshState::InFlight {
                        generation,
                        outcome: outcome.clone(),
                    };
                    outcome
                }
            }
        };

        outcome.await
    }

    async fn rotated_since(&self, stale_access: Option<&str>) -> Option<Session> {
        let current = self.store.load().await.ok().flatten()?;
        (Some(current.access()) != stale_access).then_some(current)
    }

    pub async fn is_in_flight(&self) -> bool {
        matches!(
            self.coordinator.lock().await.state,
            RefreshState::InFlight { .. }
        )
    }

    fn start_exchange(&self, generation: u64) -> RefreshOutcome {
        let store = Arc::clone(&self.store);
        let transport = Arc::clone(&self.transport);
        let clock = Arc::clone(&self.clock);
        let coordinator = Arc::clone(&self.coordinator);

        async move {
            let result = exchange(store.as_ref(), transport.as_ref(), clock.as_ref()).await;

            // Back to Idle before any waiter sees the outcome, so the next
            // expiry starts a fresh exchange instead of reusing this one.
            let mut guard = coordinator.lock().await;
            if matches!(
                guard.state,
                RefreshState::InFlight { generation: current, .. } if current == generation
            ) {
                guard.state = RefreshState::Idle;
            }

            result
        }
        .boxed()
        .shared()
    }
}

// Run one exchange and persist its outcome: the new pair on success, nothing on failure.
async fn exchange(
    store: &dyn SessionStore,
    transport: &dyn Transport,
    clock: &dyn Clock,
) -> Result<Session, RefreshError> {
    let outcome = match request_new_pair(store, transport, clock).await {
        Ok(session) => store
            .save(session.clone())
            .await
            .map(|()| session)
            .map_err(RefreshError::Storage),
        Err(err) => Err(err),
    };

    match &outcome {
        Ok(_) => info!("credentials refreshed"),
        Err(err) => {
            warn!(error = %err, "credential refresh failed; clearing session");
            if let Err(clear_err) = store.clear().await {
                warn!(error = %clear_err, "failed to clear session after refresh failure");
            }
        }
    }

    outcome
}

async fn request_new_pair(
    store: &dyn SessionStore,
    transport: &dyn Transport,
    clock: &dyn Clock,
) -> Result<Session, RefreshError> {
    let current = store
        .load()
        .await
        .map_err(RefreshError::Storage)?
        .ok_or(RefreshError::MissingCredential)?;

    // The refresh exchange carries no bearer header and never goes through the pipeline.
    let request = ApiRequest::post(TOKEN_REFRESH_PATH, json!({ "refresh": current.refresh() }));
    let response = transport
        .dispatch(&OutboundRequest {
            request: &request,
            bearer: None,
        })
        .await
        .map_err(|err| RefreshError::Transport(err.to_string()))?;

    if !response.is_success() {
        return Err(RefreshError::Rejected {
            status: response.status,
        });
    }

    let pair: TokenPairResponse = serde_json::from_value(response.body)
        .map_err(|err| RefreshError::Decode(err.to_string()))?;
    let refresh = pair
        .refresh
        .unwrap_or_else(|| current.refresh().to_string());

    Ok(Session::new(pair.access, refresh, clock.now_epoch_seconds()))
}
