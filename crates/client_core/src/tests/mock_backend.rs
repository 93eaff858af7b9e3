use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{config::ClientConfig, ApiClient};

#[derive(Debug, Clone)]
pub(crate) struct RecordedFcmToken {
    pub authorization: Option<String>,
    pub body: Value,
}

pub(crate) struct MockInner {
    pub event_pages: HashMap<u32, Value>,
    pub failing_pages: HashSet<u32>,
    pub slow_queries: HashMap<String, Duration>,
    pub event_requests: Vec<HashMap<String, String>>,
    pub token_status: StatusCode,
    pub token_body: Value,
    pub token_delay: Duration,
    pub login_requests: Vec<Value>,
    pub profile_status: StatusCode,
    pub profile: Value,
    pub profile_authorizations: Vec<Option<String>>,
    pub fcm_status: StatusCode,
    pub fcm_tokens: Vec<RecordedFcmToken>,
}

impl Default for MockInner {
    fn default() -> Self {
        Self {
            event_pages: HashMap::new(),
            failing_pages: HashSet::new(),
            slow_queries: HashMap::new(),
            event_requests: Vec::new(),
            token_status: StatusCode::OK,
            token_body: json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "token_type": "Bearer",
                "expires_in": 36000
            }),
            token_delay: Duration::ZERO,
            login_requests: Vec::new(),
            profile_status: StatusCode::OK,
            profile: json!({"id": 7, "username": "an", "role": "attendee", "is_staff": false}),
            profile_authorizations: Vec::new(),
            fcm_status: StatusCode::OK,
            fcm_tokens: Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockBackend {
    pub inner: Arc<Mutex<MockInner>>,
}

impl MockBackend {
    pub async fn event_requests(&self) -> Vec<HashMap<String, String>> {
        self.inner.lock().await.event_requests.clone()
    }
}

pub(crate) fn event(id: i64, title: &str) -> Value {
    json!({"id": id, "title": title, "start_time": null, "location": "Da Nang", "poster": null})
}

async fn handle_events(
    State(backend): State<MockBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let page: u32 = params
        .get("page")
        .and_then(|page| page.parse().ok())
        .unwrap_or(1);
    let q = params.get("q").cloned().unwrap_or_default();

    let (delay, response) = {
        let mut inner = backend.inner.lock().await;
        inner.event_requests.push(params.clone());
        let delay = inner.slow_queries.get(&q).copied().unwrap_or_default();
        let response = if inner.failing_pages.contains(&page) {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"detail": "database unavailable"}),
            )
        } else if let Some(body) = inner.event_pages.get(&page) {
            (StatusCode::OK, body.clone())
        } else {
            let title = format!("{q}-{page}");
            (
                StatusCode::OK,
                json!({"results": [event(i64::from(page), &title)], "next": null}),
            )
        };
        (delay, response)
    };

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    (response.0, Json(response.1))
}

async fn handle_login(
    State(backend): State<MockBackend>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let (delay, status, response) = {
        let mut inner = backend.inner.lock().await;
        inner.login_requests.push(body);
        (inner.token_delay, inner.token_status, inner.token_body.clone())
    };
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    (status, Json(response))
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn handle_current_user(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let mut inner = backend.inner.lock().await;
    inner.profile_authorizations.push(authorization(&headers));
    (inner.profile_status, Json(inner.profile.clone()))
}

async fn handle_save_fcm_token(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let mut inner = backend.inner.lock().await;
    inner.fcm_tokens.push(RecordedFcmToken {
        authorization: authorization(&headers),
        body,
    });
    inner.fcm_status
}

pub(crate) async fn spawn_backend(backend: MockBackend) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/events", get(handle_events))
        .route("/login", post(handle_login))
        .route("/currentUser", get(handle_current_user))
        .route("/saveFcmToken", post(handle_save_fcm_token))
        .with_state(backend);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// Address nothing listens on.
pub(crate) async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

pub(crate) fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        client_id: "mobile-app".into(),
        client_secret: "mobile-secret".into(),
        search_debounce: Duration::from_millis(60),
        navigation_delay: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
        ..ClientConfig::with_base_url(base_url)
    }
}

pub(crate) fn test_api(base_url: &str) -> ApiClient {
    ApiClient::new(&test_config(base_url)).expect("api client")
}
