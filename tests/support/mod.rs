// Fake marketplace API served over real HTTP for end-to-end client tests.
#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

use gig_client::domain::entities::Session;
use gig_client::domain::ports::SessionStore;
use gig_client::interface_adapters::storage::FileSessionStore;
use gig_client::use_cases::request_pipeline::RequestPipeline;
use gig_client::{ClientConfig, build_pipeline};

pub const USERNAME: &str = "buyer";
pub const PASSWORD: &str = "secret";

struct MarketState {
    issued: u32,
    access: String,
    refresh: String,
    access_expired: bool,
    reject_refresh: bool,
    refresh_calls: usize,
    refresh_delay: Duration,
    bookings: HashMap<u64, &'static str>,
    order_calls: usize,
    dispute_calls: usize,
}

type Shared = Arc<Mutex<MarketState>>;

// Handle to a fake API bound to an ephemeral port on the test's runtime.
pub struct FakeMarketplace {
    pub base_url: Url,
    state: Shared,
}

impl FakeMarketplace {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(MarketState {
            issued: 1,
            access: "access-1".to_string(),
            refresh: "refresh-1".to_string(),
            access_expired: false,
            reject_refresh: false,
            refresh_calls: 0,
            refresh_delay: Duration::ZERO,
            bookings: HashMap::new(),
            order_calls: 0,
            dispute_calls: 0,
        }));

        let app = Router::new()
            .route("/api/token/", post(obtain_pair))
            .route("/api/token/refresh/", post(refresh_pair))
            .route("/api/bookings/", get(list_bookings))
            .route("/api/bookings/{id}/", get(get_booking))
            .route("/api/create-order/", post(create_order))
            .route("/api/disputes/", post(open_dispute))
            .with_state(state.clone());

        // Bind to an ephemeral port to avoid collisions with local services.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral test port");
        let addr = listener.local_addr().expect("get local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake api failed");
        });

        let base_url = Url::parse(&format!("http://{addr}/api/")).expect("base url");
        Self { base_url, state }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MarketState> {
        self.state.lock().expect("market state poisoned")
    }

    // The pair the server currently accepts.
    pub fn current_session(&self) -> Session {
        let state = self.state();
        Session::new(state.access.clone(), state.refresh.clone(), 0)
    }

    pub fn expire_access(&self) {
        self.state().access_expired = true;
    }

    pub fn reject_refresh(&self) {
        self.state().reject_refresh = true;
    }

    pub fn delay_refresh(&self, delay: Duration) {
        self.state().refresh_delay = delay;
    }

    pub fn add_booking(&self, id: u64, status: &'static str) {
        self.state().bookings.insert(id, status);
    }

    pub fn refresh_calls(&self) -> usize {
        self.state().refresh_calls
    }

    pub fn order_calls(&self) -> usize {
        self.state().order_calls
    }

    pub fn dispute_calls(&self) -> usize {
        self.state().dispute_calls
    }
}

// Client wired exactly as the binary wires it, with its session file in a temp dir.
pub struct TestClient {
    pub pipeline: RequestPipeline,
    pub session_file: PathBuf,
    _dir: tempfile::TempDir,
}

impl TestClient {
    pub fn new(market: &FakeMarketplace) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let session_file = dir.path().join("session.json");
        let config = ClientConfig {
            api_base_url: market.base_url.clone(),
            session_file: session_file.clone(),
            request_timeout: Duration::from_secs(5),
        };
        let pipeline = build_pipeline(&config).expect("build pipeline");
        Self {
            pipeline,
            session_file,
            _dir: dir,
        }
    }

    // Start already signed in with the pair the server currently accepts.
    pub async fn signed_in(market: &FakeMarketplace) -> Self {
        let client = Self::new(market);
        client
            .store()
            .save(market.current_session())
            .await
            .expect("seed session");
        client
    }

    pub fn store(&self) -> FileSessionStore {
        FileSessionStore::new(self.session_file.clone())
    }

    pub async fn stored_session(&self) -> Option<Session> {
        self.store().load().await.expect("read session file")
    }
}

fn issue_pair(state: &mut MarketState) -> Value {
    state.issued += 1;
    state.access = format!("access-{}", state.issued);
    state.refresh = format!("refresh-{}", state.issued);
    state.access_expired = false;
    json!({ "access": state.access, "refresh": state.refresh })
}

fn token_not_valid() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "detail": "Given token not valid for any token type",
            "code": "token_not_valid"
        })),
    )
        .into_response()
}

fn authorize(state: &MarketState, headers: &HeaderMap) -> Result<(), Response> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match bearer {
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Authentication credentials were not provided."})),
        )
            .into_response()),
        Some(token) if state.access_expired || token != state.access => Err(token_not_valid()),
        Some(_) => Ok(()),
    }
}

fn booking_json(id: u64, status: &str) -> Value {
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

async fn obtain_pair(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().expect("market state poisoned");
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        (StatusCode::OK, Json(issue_pair(&mut state))).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

async fn refresh_pair(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let delay = state.lock().expect("market state poisoned").refresh_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let mut state = state.lock().expect("market state poisoned");
    state.refresh_calls += 1;
    if state.reject_refresh || body["refresh"] != state.refresh.as_str() {
        return token_not_valid();
    }
    (StatusCode::OK, Json(issue_pair(&mut state))).into_response()
}

async fn list_bookings(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().expect("market state poisoned");
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let mut ids: Vec<_> = state.bookings.keys().copied().collect();
    ids.sort_unstable();
    let bookings: Vec<Value> = ids
        .into_iter()
        .map(|id| booking_json(id, state.bookings[&id]))
        .collect();
    (StatusCode::OK, Json(Value::Array(bookings))).into_response()
}

async fn get_booking(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let state = state.lock().expect("market state poisoned");
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    match state.bookings.get(&id) {
        Some(status) => (StatusCode::OK, Json(booking_json(id, status))).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("market state poisoned");
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    state.order_calls += 1;
    let booking = body["booking"].as_u64().unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "order_id": format!("order_{booking}"),
            "amount": 4900,
            "currency": "INR",
            "key": "rzp_test_key",
            "transaction_id": state.order_calls
        })),
    )
        .into_response()
}

async fn open_dispute(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("market state poisoned");
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    state.dispute_calls += 1;
    (
        StatusCode::CREATED,
        Json(json!({
            "id": state.dispute_calls,
            "booking": body["booking"],
            "description": body["description"],
            "resolution_status": "OPEN",
            "opened_at": "2024-05-03T08:00:00Z",
            "resolved_at": null
        })),
    )
        .into_response()
}
