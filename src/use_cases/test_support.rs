use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::domain::entities::Session;
use crate::domain::errors::TransportError;
use crate::domain::ports::{Clock, SessionStore, Transport};
use crate::domain::request::{Method, OutboundRequest, RawResponse};
use crate::interface_adapters::protocol::{TOKEN_NOT_VALID, TOKEN_PATH, TOKEN_REFRESH_PATH};
use crate::use_cases::credential_refresher::CredentialRefresher;
use crate::use_cases::request_pipeline::RequestPipeline;

pub(crate) const TEST_USERNAME: &str = "buyer";
pub(crate) const TEST_PASSWORD: &str = "secret";

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub load: bool,
    pub save: bool,
    pub clear: bool,
}

// In-memory session store that lets tests inject failures and inspect writes.
pub(crate) struct RecordingStore {
    session: Mutex<Option<Session>>,
    failures: FailureFlags,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            session: Mutex::new(None),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn snapshot(&self) -> Option<Session> {
        self.session.lock().expect("session mutex poisoned").clone()
    }
}

#[async_trait]
impl SessionStore for RecordingStore {
    async fn load(&self) -> Result<Option<Session>, String> {
        if self.failures.load {
            return Err("load failed".to_string());
        }
        Ok(self.snapshot())
    }

    async fn save(&self, session: Session) -> Result<(), String> {
        if self.failures.save {
            return Err("save failed".to_string());
        }
        *self.session.lock().expect("session mutex poisoned") = Some(session);
        Ok(())
    }

    async fn clear(&self) -> Result<(), String> {
        if self.failures.clear {
            return Err("clear failed".to_string());
        }
        *self.session.lock().expect("session mutex poisoned") = None;
        Ok(())
    }
}

// One request as seen by the fake API.
#[derive(Clone, Debug)]
pub(crate) struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

struct FakeApiState {
    issued: u32,
    access: String,
    refresh: String,
    access_expired: bool,
    always_expire: bool,
    rotate: bool,
    reject_refresh: bool,
    offline: bool,
    refresh_calls: usize,
    calls: Vec<RecordedCall>,
    fixtures: HashMap<(Method, String), RawResponse>,
}

impl FakeApiState {
    fn issue_pair(&mut self) -> Value {
        self.issued += 1;
        self.access = format!("access-{}", self.issued);
        self.access_expired = false;
        if self.rotate {
            self.refresh = format!("refresh-{}", self.issued);
            json!({ "access": self.access, "refresh": self.refresh })
        } else {
            json!({ "access": self.access })
        }
    }
}

// Transport double modelling the marketplace token endpoints and a set of
// canned authenticated responses.
pub(crate) struct FakeApi {
    state: Mutex<FakeApiState>,
    refresh_delay: Duration,
    // Per-path latency applied after the server has decided its answer.
    response_delays: HashMap<String, Duration>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(FakeApiState {
                issued: 1,
                access: "access-1".to_string(),
                refresh: "refresh-1".to_string(),
                access_expired: false,
                always_expire: false,
                rotate: true,
                reject_refresh: false,
                offline: false,
                refresh_calls: 0,
                calls: Vec::new(),
                fixtures: HashMap::new(),
            }),
            refresh_delay: Duration::ZERO,
            response_delays: HashMap::new(),
        }
    }

    // Hold refresh responses back so concurrent callers pile up behind one exchange.
    pub(crate) fn with_refresh_delay_ms(mut self, millis: u64) -> Self {
        self.refresh_delay = Duration::from_millis(millis);
        self
    }

    pub(crate) fn with_response_delay_ms(mut self, path: &str, millis: u64) -> Self {
        self.response_delays
            .insert(path.to_string(), Duration::from_millis(millis));
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeApiState> {
        self.state.lock().expect("fake api mutex poisoned")
    }

    // The pair the server currently considers valid.
    pub(crate) fn issued_session(&self) -> Session {
        let state = self.state();
        Session::new(state.access.clone(), state.refresh.clone(), 1_700_000_000)
    }

    pub(crate) fn expire_access(&self) {
        self.state().access_expired = true;
    }

    pub(crate) fn always_expire(&self) {
        self.state().always_expire = true;
    }

    pub(crate) fn reject_refresh(&self) {
        self.state().reject_refresh = true;
    }

    pub(crate) fn disable_rotation(&self) {
        self.state().rotate = false;
    }

    pub(crate) fn go_offline(&self) {
        self.state().offline = true;
    }

    pub(crate) fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.state()
            .fixtures
            .insert((method, path.to_string()), RawResponse::new(status, body));
    }

    pub(crate) fn refresh_calls(&self) -> usize {
        self.state().refresh_calls
    }

    pub(crate) fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.state()
            .calls
            .iter()
            .filter(|call| call.path == path)
            .cloned()
            .collect()
    }
}

fn expired_token_body() -> Value {
    json!({
        "detail": "Given token not valid for any token type",
        "code": TOKEN_NOT_VALID,
        "messages": [{"token_class": "AccessToken", "message": "Token is invalid or expired"}]
    })
}

#[async_trait]
impl Transport for FakeApi {
    async fn dispatch(&self, request: &OutboundRequest<'_>) -> Result<RawResponse, TransportError> {
        let path = request.request.path.as_str();
        if path == TOKEN_REFRESH_PATH && !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }

        let response = self.answer(request);
        if let Some(delay) = self.response_delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
        response
    }
}

impl FakeApi {
    fn answer(&self, request: &OutboundRequest<'_>) -> Result<RawResponse, TransportError> {
        let path = request.request.path.as_str();
        let mut state = self.state();
        state.calls.push(RecordedCall {
            method: request.request.method,
            path: path.to_string(),
            bearer: request.bearer.map(str::to_string),
            body: request.request.body.clone(),
        });
        if state.offline {
            return Err(TransportError::Unreachable("connection refused".to_string()));
        }

        let body = request.request.body.clone().unwrap_or(Value::Null);
        let response = match path {
            TOKEN_PATH => {
                if body["username"] == TEST_USERNAME && body["password"] == TEST_PASSWORD {
                    RawResponse::new(200, state.issue_pair())
                } else {
                    RawResponse::new(
                        401,
                        json!({"detail": "No active account found with the given credentials"}),
                    )
                }
            }
            TOKEN_REFRESH_PATH => {
                state.refresh_calls += 1;
                if state.reject_refresh || body["refresh"] != state.refresh.as_str() {
                    RawResponse::new(
                        401,
                        json!({"detail": "Token is invalid or expired", "code": TOKEN_NOT_VALID}),
                    )
                } else {
                    RawResponse::new(200, state.issue_pair())
                }
            }
            _ => match request.bearer {
                // Public endpoints answer without credentials.
                None if path == "register/" || path == "gigs/" => state
                    .fixtures
                    .get(&(request.request.method, path.to_string()))
                    .cloned()
                    .unwrap_or_else(|| RawResponse::new(404, json!({"detail": "Not found."}))),
                None => RawResponse::new(
                    401,
                    json!({"detail": "Authentication credentials were not provided."}),
                ),
                Some(bearer)
                    if state.always_expire || state.access_expired || bearer != state.access =>
                {
                    RawResponse::new(401, expired_token_body())
                }
                Some(_) => state
                    .fixtures
                    .get(&(request.request.method, path.to_string()))
                    .cloned()
                    .unwrap_or_else(|| RawResponse::new(404, json!({"detail": "Not found."}))),
            },
        };
        Ok(response)
    }
}

// Booking payload in the shape the API serializes it.
pub(crate) fn booking_body(id: u64, status: &str) -> Value {
    json!({
        "id": id,
        "status": status,
        "gig_detail": {
            "id": 3,
            "title": "Logo design",
            "description": "Clean vector logo",
            "price": "49.00",
            "delivery_time": 3
        },
        "booked_at": "2024-05-01T10:00:00Z",
        "freelancer_contact": {"email": "ana@example.com", "phone": ""}
    })
}

// Pipeline wired to the fakes, the way the binary wires the real adapters.
pub(crate) fn pipeline_with(api: &Arc<FakeApi>, store: &Arc<RecordingStore>) -> RequestPipeline {
    let refresher = CredentialRefresher::new(
        store.clone(),
        api.clone(),
        Arc::new(FixedClock(1_700_000_500)),
    );
    RequestPipeline::new(store.clone(), api.clone(), Arc::new(refresher))
}
