//! The streamable HTTP server: a single `/mcp` axum route accepting
//! POST (submit JSON-RPC, get a JSON or SSE response), GET (open a
//! long-lived SSE stream for server-initiated pushes), and DELETE (end
//! a session), fronted by origin validation and CORS.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::sync::mpsc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use mcp_core::{RequestContext, TransportType};
use mcp_protocol::{JsonRpcError, JsonRpcErrorCode, JsonRpcMessage, JsonRpcInboundItem, JsonRpcResponse};
use mcp_server::Server;

use crate::session::{Session, SessionId, SessionStore};
use crate::sse::SseEvent;

const SESSION_HEADER: &str = "mcp-session-id";
const KEEP_ALIVE_SECS: u64 = 30;

/// Origin-matching policy for CORS and the mandatory Origin check.
/// `*` allows any origin; everything else must match exactly or, if it
/// ends in `*`, as a prefix.
#[derive(Clone, Debug)]
pub struct OriginPolicy {
    patterns: Vec<String>,
}

impl OriginPolicy {
    pub fn allow_all() -> Self {
        Self { patterns: vec!["*".to_string()] }
    }

    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// An absent Origin header is not an error — only same-origin or
    /// non-browser clients omit it, and rejecting them would break
    /// every non-browser MCP client.
    pub fn allows(&self, origin: Option<&str>) -> bool {
        let Some(origin) = origin else { return true };
        self.patterns.iter().any(|pattern| matches_pattern(pattern, origin))
    }
}

/// A single `*` in `pattern` matches any run of characters; everything
/// else must match literally. `https://*.example.com` admits
/// `https://api.example.com` but not `https://example.com` (no
/// subdomain to match the wildcard) or `http://api.example.com` (wrong
/// scheme).
fn matches_pattern(pattern: &str, origin: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == origin,
        Some((prefix, suffix)) => {
            origin.len() >= prefix.len() + suffix.len()
                && origin.starts_with(prefix)
                && origin.ends_with(suffix)
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    server: Arc<Server>,
    sessions: Arc<SessionStore>,
    origins: OriginPolicy,
}

pub fn router(server: Arc<Server>, origins: OriginPolicy) -> Router {
    let state = AppState {
        server,
        sessions: Arc::new(SessionStore::new()),
        origins: origins.clone(),
    };

    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST, axum::http::Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, SESSION_HEADER.parse().unwrap()])
        .allow_origin(AllowOrigin::predicate(move |value, _| {
            value.to_str().map(|v| origins.allows(Some(v))).unwrap_or(false)
        }));

    Router::new()
        .route("/mcp", post(handle_post).get(handle_get).delete(handle_delete))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn check_origin(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    if state.origins.allows(origin) {
        Ok(())
    } else {
        Err((StatusCode::FORBIDDEN, "origin not allowed").into_response())
    }
}

fn resolve_session(state: &AppState, headers: &HeaderMap) -> Option<Arc<Session>> {
    let raw = headers.get(SESSION_HEADER)?.to_str().ok()?;
    let id: SessionId = raw.parse().ok()?;
    state.sessions.get(&id)
}

async fn handle_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(resp) = check_origin(&state, &headers) {
        return resp;
    }

    let message: JsonRpcMessage = match serde_json::from_slice(&body) {
        Ok(m) => m,
        Err(e) => {
            let resp = JsonRpcResponse::parse_error(e.to_string());
            return (StatusCode::BAD_REQUEST, Json(resp)).into_response();
        }
    };

    let is_initialize = matches!(
        &message,
        JsonRpcMessage::Single(JsonRpcInboundItem::Request(r)) if r.method == "initialize"
    );

    let session = if is_initialize {
        Some(state.sessions.create())
    } else {
        resolve_session(&state, &headers)
    };

    if session.is_none() && !is_initialize {
        let error = JsonRpcError {
            code: JsonRpcErrorCode::InvalidRequest.code(),
            message: "missing or unknown Mcp-Session-Id".into(),
            data: None,
        };
        return (StatusCode::BAD_REQUEST, Json(error)).into_response();
    }

    let mut cx = RequestContext::new(TransportType::StreamableHttp)
        .with_session_id(session.as_ref().map(|s| s.id.to_string()).unwrap_or_default());
    if let Some(session) = &session {
        cx = cx.with_notifier(session.clone() as Arc<dyn mcp_core::NotificationSink>);
    }

    let mut responses = Vec::new();
    match message {
        JsonRpcMessage::Single(item) => {
            if let Some(resp) = dispatch_one(&state.server, item, &cx).await {
                responses.push(resp);
            }
        }
        JsonRpcMessage::Batch(items) => {
            for item in items {
                if let Some(resp) = dispatch_one(&state.server, item, &cx).await {
                    responses.push(resp);
                }
            }
        }
    }

    let mut response = if responses.is_empty() {
        StatusCode::ACCEPTED.into_response()
    } else if responses.len() == 1 {
        Json(responses.into_iter().next().unwrap()).into_response()
    } else {
        Json(responses).into_response()
    };

    if let Some(session) = session {
        response
            .headers_mut()
            .insert(SESSION_HEADER, session.id.to_string().parse().unwrap());
    }
    response
}

async fn dispatch_one(
    server: &Arc<Server>,
    item: JsonRpcInboundItem,
    cx: &RequestContext,
) -> Option<JsonRpcResponse> {
    match item {
        JsonRpcInboundItem::Request(request) => {
            Some(server.handle_request(request, cx.clone()).await)
        }
        JsonRpcInboundItem::Notification(notification) => {
            server.handle_notification(notification, cx.clone()).await;
            None
        }
    }
}

async fn handle_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = check_origin(&state, &headers) {
        return resp;
    }

    let Some(session) = resolve_session(&state, &headers) else {
        return (StatusCode::BAD_REQUEST, "missing or unknown Mcp-Session-Id").into_response();
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<SseEvent>();
    session.bind_sse(tx);

    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            let mut builder = Event::default().data(event.data);
            if let Some(id) = event.id {
                builder = builder.id(id.to_string());
            }
            yield Ok::<Event, std::convert::Infallible>(builder);
        }
        session.unbind_sse();
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(KEEP_ALIVE_SECS)))
        .into_response()
}

async fn handle_delete(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(resp) = check_origin(&state, &headers) {
        return resp;
    }
    let Some(raw) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let Ok(id) = raw.parse::<SessionId>() else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if state.sessions.remove(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
