//! In-process mock of the ClickUp and Gemini APIs.
//!
//! Every request is recorded with its route key (the path without the
//! `/api/v2` prefix, e.g. `task/s1/comment`) so tests can assert on call
//! counts and ordering.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};

use timesheet_digest::clickup::ClickUpClient;

pub const API_KEY: &str = "pk_test_token";

/// Canned upstream data.
#[derive(Default)]
pub struct Fixture {
    pub workspaces: Vec<Value>,
    pub time_entries: Vec<Value>,
    pub tasks: HashMap<String, Value>,
    pub comments: HashMap<String, Vec<Value>>,
    /// Route keys that answer with the given status instead of data.
    pub failures: HashMap<String, u16>,
    /// Text the generator answers with; `None` means no candidates.
    pub report: Option<String>,
    pub report_status: Option<u16>,
}

impl Fixture {
    pub fn with_workspaces(mut self, workspaces: &[(&str, &str)]) -> Self {
        self.workspaces = workspaces.iter().map(|(id, name)| workspace(id, name)).collect();
        self
    }

    pub fn with_entries(mut self, entries: Vec<Value>) -> Self {
        self.time_entries = entries;
        self
    }

    pub fn with_task(mut self, task: Value) -> Self {
        let id = task["id"].as_str().expect("task fixture needs an id").to_string();
        self.tasks.insert(id, task);
        self
    }

    pub fn with_comments(mut self, task_id: &str, comments: Vec<Value>) -> Self {
        self.comments.insert(task_id.to_string(), comments);
        self
    }

    pub fn failing(mut self, route: &str, status: u16) -> Self {
        self.failures.insert(route.to_string(), status);
        self
    }

    pub fn with_report(mut self, text: &str) -> Self {
        self.report = Some(text.to_string());
        self
    }
}

pub fn workspace(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "color": "#7b68ee", "members": [] })
}

pub fn time_entry(id: &str, task_id: &str, duration_ms: u64) -> Value {
    json!({
        "id": id,
        "task": { "id": task_id, "name": format!("Task {}", task_id) },
        "duration": duration_ms.to_string(),
        "start": "1714899600000",
        "user": { "id": 42, "username": "dana" },
        "billable": false
    })
}

pub fn task(id: &str, name: &str, subtasks: &[(&str, &str)]) -> Value {
    let subtasks: Vec<Value> = subtasks
        .iter()
        .map(|(sid, sname)| json!({ "id": sid, "name": sname, "parent": id, "status": { "status": "open" } }))
        .collect();
    json!({ "id": id, "name": name, "status": { "status": "in progress" }, "subtasks": subtasks })
}

pub fn comment(id: &str, text: &str) -> Value {
    json!({ "id": id, "comment_text": text, "date": "1714900000000", "user": { "id": 42 } })
}

/// One request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub route: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub api_key: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone)]
struct MockState {
    fixture: Arc<Fixture>,
    log: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockServer {
    addr: SocketAddr,
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    pub async fn start(fixture: Fixture) -> Self {
        let log = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            fixture: Arc::new(fixture),
            log: log.clone(),
        };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Failed to read mock address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock server failed");
        });

        Self { addr, log }
    }

    pub fn clickup_url(&self) -> String {
        format!("http://{}/api/v2", self.addr)
    }

    pub fn gemini_url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    pub fn client(&self) -> ClickUpClient {
        ClickUpClient::new(self.clickup_url(), API_KEY)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().expect("log lock poisoned").clone()
    }

    pub fn routes(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.route).collect()
    }

    pub fn count(&self, route: &str) -> usize {
        self.requests().iter().filter(|r| r.route == route).count()
    }
}

fn route_key(path: &str) -> String {
    let path = path.trim_matches('/');
    path.strip_prefix("api/v2/").unwrap_or(path).to_string()
}

fn parse_query(uri: &Uri) -> HashMap<String, String> {
    uri.query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let route = route_key(uri.path());
    state
        .log
        .lock()
        .expect("log lock poisoned")
        .push(Recorded {
            method: method.clone(),
            route: route.clone(),
            query: parse_query(&uri),
            authorization: headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            api_key: headers
                .get("x-goog-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: serde_json::from_str(&body).ok(),
        });

    let fixture = &state.fixture;
    if let Some(&status) = fixture.failures.get(&route) {
        let status = StatusCode::from_u16(status).expect("invalid fixture status");
        return (status, Json(json!({ "err": "mock failure", "ECODE": "MOCK_001" }))).into_response();
    }

    let segments: Vec<&str> = route.split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("GET", ["team"]) => Json(json!({ "teams": fixture.workspaces })).into_response(),
        ("GET", ["team", _, "time_entries"]) => {
            Json(json!({ "data": fixture.time_entries })).into_response()
        }
        ("GET", ["task", id]) => match fixture.tasks.get(*id) {
            Some(task) => Json(task.clone()).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
        ("GET", ["task", id, "comment"]) => {
            let comments = fixture.comments.get(*id).cloned().unwrap_or_default();
            Json(json!({ "comments": comments })).into_response()
        }
        ("POST", ["v1beta", "models", _]) => {
            if let Some(status) = fixture.report_status {
                let status = StatusCode::from_u16(status).expect("invalid fixture status");
                return (status, "generator unavailable").into_response();
            }
            let candidates = match &fixture.report {
                Some(text) => json!([{ "content": { "parts": [{ "text": text }], "role": "model" } }]),
                None => json!([]),
            };
            Json(json!({ "candidates": candidates })).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
