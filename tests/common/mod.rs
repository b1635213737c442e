#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use roble_service::config::{AuthMode, ConnectionProfile, ServiceConfig};
use roble_service::dispatch::Dispatcher;
use roble_service::platform::PlatformClient;
use roble_service::{app, logic, AppState};

pub const EMAIL: &str = "ops@example.com";
pub const PASSWORD: &str = "secret";
pub const CONTRACT: &str = "contract_test";

/// One data call as the platform saw it
#[derive(Debug, Clone)]
pub struct DataCall {
    pub method: Method,
    pub operation: String,
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Value,
}

/// Scripted stand-in for the Roble auth and database routes
#[derive(Default)]
pub struct MockPlatform {
    logins: AtomicUsize,
    calls: Mutex<Vec<DataCall>>,
    records: Mutex<Vec<Value>>,
    valid_tokens: Mutex<Vec<String>>,
    login_failure: Mutex<Option<(StatusCode, String)>>,
    login_body: Mutex<Option<Value>>,
    data_failure: Mutex<Option<StatusCode>>,
    always_unauthorized: Mutex<bool>,
    read_delay: Mutex<Option<Duration>>,
}

impl MockPlatform {
    pub fn with_records(records: Vec<Value>) -> Arc<Self> {
        let mock = Self::default();
        *mock.records.lock().unwrap() = records;
        Arc::new(mock)
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<DataCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<Value> {
        self.records.lock().unwrap().clone()
    }

    /// Every token issued so far stops working
    pub fn expire_tokens(&self) {
        self.valid_tokens.lock().unwrap().clear();
    }

    pub fn accept_token(&self, token: &str) {
        self.valid_tokens.lock().unwrap().push(token.to_string());
    }

    pub fn fail_login(&self, status: StatusCode, body: &str) {
        *self.login_failure.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn login_responds_with(&self, body: Value) {
        *self.login_body.lock().unwrap() = Some(body);
    }

    pub fn fail_data_calls(&self, status: StatusCode) {
        *self.data_failure.lock().unwrap() = Some(status);
    }

    pub fn reject_all_tokens(&self) {
        *self.always_unauthorized.lock().unwrap() = true;
    }

    pub fn delay_reads(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }

    fn authorized(&self, headers: &HeaderMap) -> (Option<String>, bool) {
        let header = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if *self.always_unauthorized.lock().unwrap() {
            return (header, false);
        }
        let ok = header
            .as_deref()
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|t| self.valid_tokens.lock().unwrap().iter().any(|v| v == t))
            .unwrap_or(false);
        (header, ok)
    }

    fn record(&self, method: Method, operation: &str, headers: &HeaderMap, query: HashMap<String, String>, body: Value) -> Option<Response> {
        let (authorization, ok) = self.authorized(headers);
        self.calls.lock().unwrap().push(DataCall {
            method,
            operation: operation.to_string(),
            authorization,
            query,
            body,
        });

        if !ok {
            return Some((StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))).into_response());
        }
        if let Some(status) = *self.data_failure.lock().unwrap() {
            return Some((status, Json(json!({ "message": "platform error" }))).into_response());
        }
        None
    }
}

async fn login(
    State(mock): State<Arc<MockPlatform>>,
    Path(contract): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    mock.logins.fetch_add(1, Ordering::SeqCst);

    if let Some((status, text)) = mock.login_failure.lock().unwrap().clone() {
        return (status, text).into_response();
    }
    if contract != CONTRACT || body["email"] != EMAIL || body["password"] != PASSWORD {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
    }
    if let Some(custom) = mock.login_body.lock().unwrap().clone() {
        return Json(custom).into_response();
    }

    let token = format!("token-{}", mock.logins());
    mock.accept_token(&token);
    Json(json!({ "accessToken": token, "refreshToken": "refresh" })).into_response()
}

async fn read(
    State(mock): State<Arc<MockPlatform>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let delay = *mock.read_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(rejection) = mock.record(Method::GET, "read", &headers, query.clone(), Value::Null) {
        return rejection;
    }

    let rows: Vec<Value> = mock
        .records()
        .into_iter()
        .filter(|row| {
            query
                .iter()
                .filter(|(k, _)| k.as_str() != "tableName")
                .all(|(k, v)| match &row[k] {
                    Value::String(s) => s == v,
                    other => other.to_string() == *v,
                })
        })
        .collect();
    Json(rows).into_response()
}

async fn insert(State(mock): State<Arc<MockPlatform>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(rejection) = mock.record(Method::POST, "insert", &headers, HashMap::new(), body.clone()) {
        return rejection;
    }
    let records = body["records"].as_array().cloned().unwrap_or_default();
    let inserted = records.len();
    mock.records.lock().unwrap().extend(records);
    Json(json!({ "inserted": inserted, "skipped": [] })).into_response()
}

async fn update(State(mock): State<Arc<MockPlatform>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(rejection) = mock.record(Method::PUT, "update", &headers, HashMap::new(), body.clone()) {
        return rejection;
    }
    Json(json!({ "updated": body["idValue"] })).into_response()
}

async fn remove(State(mock): State<Arc<MockPlatform>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(rejection) = mock.record(Method::DELETE, "delete", &headers, HashMap::new(), body.clone()) {
        return rejection;
    }
    Json(json!({ "deleted": body["idValue"] })).into_response()
}

async fn serve(router: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{}", addr))
}

/// Start the mock platform; returns its base URL
pub async fn spawn_platform(mock: Arc<MockPlatform>) -> Result<String> {
    let router = Router::new()
        .route("/auth/:contract/login", post(login))
        .route("/database/:contract/read", get(read))
        .route("/database/:contract/insert", post(insert))
        .route("/database/:contract/update", put(update))
        .route("/database/:contract/delete", delete(remove))
        .with_state(mock);
    serve(router).await
}

/// Base URL on which nothing listens
pub async fn closed_port() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

pub fn current_profile(base_host: &str) -> ConnectionProfile {
    ConnectionProfile {
        base_host: base_host.to_string(),
        contract: CONTRACT.to_string(),
        table_name: "orders".to_string(),
        mode: AuthMode::Current,
        email: Some(EMAIL.to_string()),
        password: Some(PASSWORD.to_string()),
        static_token: None,
    }
}

pub fn token_profile(base_host: &str, token: &str) -> ConnectionProfile {
    ConnectionProfile {
        mode: AuthMode::Different,
        email: None,
        password: None,
        static_token: Some(token.to_string()),
        ..current_profile(base_host)
    }
}

pub fn client(profile: ConnectionProfile) -> PlatformClient {
    PlatformClient::new(profile, Duration::from_secs(5)).expect("client builds")
}

/// Start the service against `profile` running the named logic; returns its base URL
pub async fn spawn_service(profile: ConnectionProfile, logic_name: &str) -> Result<String> {
    let service = ServiceConfig {
        port: 0,
        service_id: "svc-test".to_string(),
        public_url: "http://localhost:3000".to_string(),
        logic: logic_name.to_string(),
        platform_timeout_ms: 5_000,
    };
    let logic = logic::from_name(logic_name)?;
    let table_name = profile.table_name.clone();
    let platform = PlatformClient::new(profile, service.platform_timeout())?;
    let dispatcher = Dispatcher::new(Arc::new(platform), table_name, logic);
    serve(app(AppState::new(service, dispatcher))).await
}
