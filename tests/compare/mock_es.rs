//! Minimal in-process Elasticsearch stand-in.
//!
//! Serves the version probe, sorted searches with `search_after`, and the
//! scroll API for one or more indices held in memory. Every request is
//! recorded so tests can assert on the dialect that was spoken.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: Value,
}

struct ScrollContext {
    hits: VecDeque<Value>,
    size: usize,
}

#[derive(Default)]
struct ClusterState {
    version: String,
    root_status: Option<StatusCode>,
    required_auth: Option<String>,
    indices: HashMap<String, Vec<(String, Value)>>,
    fail_on_search: Option<usize>,
    searches: usize,
    next_scroll: usize,
    scrolls: HashMap<String, ScrollContext>,
    cleared_scrolls: Vec<String>,
    requests: Vec<RecordedRequest>,
}

pub struct MockClusterBuilder {
    state: ClusterState,
}

impl MockClusterBuilder {
    /// Add an index holding `(id, source)` pairs.
    pub fn index(mut self, name: &str, docs: Vec<(&str, Value)>) -> Self {
        let docs = docs
            .into_iter()
            .map(|(id, source)| (id.to_string(), source))
            .collect();
        self.state.indices.insert(name.to_string(), docs);
        self
    }

    /// Answer the `n`th search or scroll request (1-based) with a 500.
    pub fn fail_on_search(mut self, n: usize) -> Self {
        self.state.fail_on_search = Some(n);
        self
    }

    /// Answer the version probe with `status` and no body.
    pub fn root_status(mut self, status: StatusCode) -> Self {
        self.state.root_status = Some(status);
        self
    }

    /// Require this exact `Authorization` header on every request.
    pub fn require_auth(mut self, header: &str) -> Self {
        self.state.required_auth = Some(header.to_string());
        self
    }

    pub async fn start(self) -> MockCluster {
        let state = Arc::new(Mutex::new(self.state));
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockCluster {
            addr,
            state,
            server,
        }
    }
}

pub struct MockCluster {
    addr: SocketAddr,
    state: Arc<Mutex<ClusterState>>,
    server: JoinHandle<()>,
}

impl MockCluster {
    pub fn builder(version: &str) -> MockClusterBuilder {
        MockClusterBuilder {
            state: ClusterState {
                version: version.to_string(),
                ..Default::default()
            },
        }
    }

    /// Endpoint URL for `path`, e.g. `users` or `users/user`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{path}", self.addr)
    }

    pub fn url_with_credentials(&self, credentials: &str, path: &str) -> String {
        format!("http://{credentials}@{}/{path}", self.addr)
    }

    /// Every search and scroll request received so far, in order.
    pub fn search_requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn cleared_scrolls(&self) -> Vec<String> {
        self.state.lock().unwrap().cleared_scrolls.clone()
    }

    pub fn open_scrolls(&self) -> usize {
        self.state.lock().unwrap().scrolls.len()
    }
}

impl Drop for MockCluster {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<Arc<Mutex<ClusterState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut state = state.lock().unwrap();

    if let Some(expected) = &state.required_auth {
        let given = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if given != expected {
            return error(StatusCode::UNAUTHORIZED, "security_exception");
        }
    }

    let path = uri.path().to_string();
    if method == Method::GET && path == "/" {
        return state.root();
    }

    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(body) => body,
            Err(_) => return error(StatusCode::BAD_REQUEST, "parse_exception"),
        }
    };
    state.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        body: body.clone(),
    });

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("POST", ["_search", "scroll"]) => state.continue_scroll(&body),
        ("DELETE", ["_search", "scroll"]) => state.clear_scroll(&body),
        ("POST", [index, "_search"]) | ("POST", [index, _, "_search"]) => {
            let scroll = uri.query().is_some_and(|q| q.contains("scroll="));
            state.search(index, &body, scroll)
        }
        _ => error(StatusCode::NOT_FOUND, "no handler found"),
    }
}

fn error(status: StatusCode, kind: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "type": kind }, "status": status.as_u16() })),
    )
        .into_response()
}

/// Look up a dotted field; a `.keyword` suffix addresses the parent field.
fn lookup<'a>(source: &'a Value, field: &str) -> Option<&'a Value> {
    let field = field.strip_suffix(".keyword").unwrap_or(field);
    field
        .split('.')
        .try_fold(source, |value, part| value.get(part))
}

fn matches(query: &Value, source: &Value) -> bool {
    let Some(term) = query.get("term").and_then(Value::as_object) else {
        return true;
    };
    term.iter().all(|(field, expected)| {
        let expected = expected.get("value").unwrap_or(expected);
        lookup(source, field) == Some(expected)
    })
}

/// Ascending order as the index applies it: keywords and `_id` by raw bytes,
/// numbers numerically, missing values first or last as requested.
fn sort_order(a: &Value, b: &Value, missing_first: bool) -> Ordering {
    let missing = if missing_first {
        Ordering::Less
    } else {
        Ordering::Greater
    };
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => missing,
        (_, Value::Null) => missing.reverse(),
        (Value::String(a), Value::String(b)) => a.as_bytes().cmp(b.as_bytes()),
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.total_cmp(&b)
        }
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        // A field has a single mapping; mixed types never share a sort.
        _ => Ordering::Equal,
    }
}

impl ClusterState {
    fn root(&self) -> Response {
        if let Some(status) = self.root_status {
            return status.into_response();
        }
        Json(json!({
            "name": "mock",
            "cluster_name": "es-diff-test",
            "version": { "number": self.version },
            "tagline": "You Know, for Search"
        }))
        .into_response()
    }

    fn count_search(&mut self) -> bool {
        self.searches += 1;
        self.fail_on_search == Some(self.searches)
    }

    fn search(&mut self, index: &str, body: &Value, scroll: bool) -> Response {
        if self.count_search() {
            return error(StatusCode::INTERNAL_SERVER_ERROR, "search_phase_execution_exception");
        }
        let Some(docs) = self.indices.get(index) else {
            return error(StatusCode::NOT_FOUND, "index_not_found_exception");
        };

        let sort = body["sort"][0].as_object().and_then(|s| s.iter().next());
        let (field, missing_first) = match sort {
            Some((field, options)) => (field.clone(), options["missing"] == json!("_first")),
            None => ("_id".to_string(), false),
        };
        let by_id = field == "_id" || field == "_uid";

        let query = body.get("query").cloned().unwrap_or(Value::Null);
        let mut hits: Vec<(Value, Value)> = docs
            .iter()
            .filter(|(_, source)| matches(&query, source))
            .map(|(id, source)| {
                let sort_value = if by_id {
                    json!(id)
                } else {
                    lookup(source, &field).cloned().unwrap_or(Value::Null)
                };
                let hit = json!({
                    "_index": index,
                    "_id": id,
                    "_source": source,
                    "sort": [sort_value],
                });
                (sort_value, hit)
            })
            .collect();
        hits.sort_by(|a, b| sort_order(&a.0, &b.0, missing_first));

        if let Some(after) = body["search_after"].as_array() {
            hits.retain(|(value, _)| {
                sort_order(value, &after[0], missing_first) == Ordering::Greater
            });
        }

        let total = hits.len();
        let size = body["size"].as_u64().unwrap_or(10) as usize;
        let mut hits: VecDeque<Value> = hits.into_iter().map(|(_, hit)| hit).collect();
        let take = size.min(hits.len());
        let page: Vec<Value> = hits.drain(..take).collect();

        let mut response = json!({
            "took": 1,
            "timed_out": false,
            "hits": { "hits": page },
        });
        if body["track_total_hits"] != json!(false) {
            response["hits"]["total"] = json!(total);
        }
        if scroll {
            self.next_scroll += 1;
            let scroll_id = format!("scroll-{}", self.next_scroll);
            self.scrolls
                .insert(scroll_id.clone(), ScrollContext { hits, size });
            response["_scroll_id"] = json!(scroll_id);
        }
        Json(response).into_response()
    }

    fn continue_scroll(&mut self, body: &Value) -> Response {
        if self.count_search() {
            return error(StatusCode::INTERNAL_SERVER_ERROR, "search_phase_execution_exception");
        }
        let scroll_id = body["scroll_id"].as_str().unwrap_or_default().to_string();
        let Some(context) = self.scrolls.get_mut(&scroll_id) else {
            return error(StatusCode::NOT_FOUND, "search_context_missing_exception");
        };
        let take = context.size.min(context.hits.len());
        let page: Vec<Value> = context.hits.drain(..take).collect();
        Json(json!({
            "_scroll_id": scroll_id,
            "hits": { "hits": page },
        }))
        .into_response()
    }

    fn clear_scroll(&mut self, body: &Value) -> Response {
        let ids: Vec<String> = body["scroll_id"]
            .as_array()
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        let mut freed = 0;
        for id in ids {
            if self.scrolls.remove(&id).is_some() {
                freed += 1;
                self.cleared_scrolls.push(id);
            }
        }
        Json(json!({ "succeeded": true, "num_freed": freed })).into_response()
    }
}
