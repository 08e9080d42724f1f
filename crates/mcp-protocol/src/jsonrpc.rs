//! JSON-RPC 2.0 envelope types.
//!
//! Covers requests, responses, notifications, and batches, plus the
//! standard error-code table. MCP rides directly on top of this: method
//! names and `params`/`result` shapes are layered on elsewhere.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::types::RequestId;

/// The only JSON-RPC version this crate speaks.
pub const JSONRPC_VERSION: &str = "2.0";

/// Zero-sized marker that serializes as `"2.0"` and rejects anything else
/// on the way in, so a malformed `jsonrpc` field surfaces as a decode
/// error rather than being silently accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonRpcVersion;

impl Serialize for JsonRpcVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(JSONRPC_VERSION)
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let version = String::deserialize(deserializer)?;
        if version == JSONRPC_VERSION {
            Ok(JsonRpcVersion)
        } else {
            Err(serde::de::Error::custom(format!(
                "unsupported jsonrpc version: expected \"{JSONRPC_VERSION}\", got \"{version}\""
            )))
        }
    }
}

/// A request that expects a correlated response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: JsonRpcVersion,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    pub id: RequestId,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Option<Value>, id: RequestId) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            method: method.into(),
            params,
            id,
        }
    }

    pub fn with_params<P: Serialize>(
        method: impl Into<String>,
        params: P,
        id: RequestId,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(method, Some(serde_json::to_value(params)?), id))
    }
}

/// The `id` field of a response. Mirrors `RequestId`, but `null` is a
/// legal wire value when the server couldn't recover an id at all (a
/// parse error on a malformed request body).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseId(pub Option<RequestId>);

impl ResponseId {
    pub fn from_request(id: RequestId) -> Self {
        Self(Some(id))
    }

    pub fn null() -> Self {
        Self(None)
    }

    pub fn as_request_id(&self) -> Option<&RequestId> {
        self.0.as_ref()
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }
}

/// `result` xor `error`, flattened onto the response rather than
/// nested under a `payload` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcResponsePayload {
    Success { result: Value },
    Error { error: JsonRpcError },
}

/// A response to a previously-sent request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: JsonRpcVersion,
    #[serde(flatten)]
    pub payload: JsonRpcResponsePayload,
    pub id: ResponseId,
}

impl JsonRpcResponse {
    pub fn success(result: Value, id: RequestId) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            payload: JsonRpcResponsePayload::Success { result },
            id: ResponseId::from_request(id),
        }
    }

    pub fn error_response(error: JsonRpcError, id: RequestId) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            payload: JsonRpcResponsePayload::Error { error },
            id: ResponseId::from_request(id),
        }
    }

    /// A response to a request whose id could not be recovered at all.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            payload: JsonRpcResponsePayload::Error {
                error: JsonRpcError {
                    code: JsonRpcErrorCode::ParseError.code(),
                    message: message.into(),
                    data: None,
                },
            },
            id: ResponseId::null(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.payload, JsonRpcResponsePayload::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self.payload, JsonRpcResponsePayload::Error { .. })
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            JsonRpcResponsePayload::Success { result } => Some(result),
            JsonRpcResponsePayload::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&JsonRpcError> {
        match &self.payload {
            JsonRpcResponsePayload::Success { .. } => None,
            JsonRpcResponsePayload::Error { error } => Some(error),
        }
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.id.as_request_id()
    }
}

/// A one-way message: no `id`, no response expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: JsonRpcVersion,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            method: method.into(),
            params,
        }
    }

    pub fn with_params<P: Serialize>(
        method: impl Into<String>,
        params: P,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(method, Some(serde_json::to_value(params)?)))
    }
}

/// The `error` object carried by an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A batch of requests, responses, or mixed messages sent as a single
/// JSON array. Transports decide whether to accept these; dispatch
/// processes each item independently and reassembles the response array
/// in the same order, dropping entries for notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonRpcBatch<T> {
    pub items: Vec<T>,
}

impl<T> JsonRpcBatch<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> IntoIterator for JsonRpcBatch<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// The standard JSON-RPC 2.0 error codes, plus an escape hatch for
/// application-defined ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    Application(i32),
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::Application(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::Application(_) => "Application error",
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

impl From<i32> for JsonRpcErrorCode {
    fn from(code: i32) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            other => Self::Application(other),
        }
    }
}

/// Any top-level JSON-RPC value that can appear in a request body:
/// single request, notification, or a batch of either. Servers decode
/// into this and branch in dispatch; it deliberately excludes responses,
/// since this is the incoming-message side of the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    Batch(Vec<JsonRpcInboundItem>),
    Single(JsonRpcInboundItem),
}

/// A single inbound item: a request (has `id`) or a notification
/// (doesn't). `serde(untagged)` on `JsonRpcRequest`/`JsonRpcNotification`
/// directly would be ambiguous, so this enum tries the request shape
/// first since it's a strict superset of the notification's fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcInboundItem {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
}

impl JsonRpcInboundItem {
    pub fn method(&self) -> &str {
        match self {
            Self::Request(r) => &r.method,
            Self::Notification(n) => &n.method,
        }
    }

    pub fn params(&self) -> Option<&Value> {
        match self {
            Self::Request(r) => r.params.as_ref(),
            Self::Notification(n) => n.params.as_ref(),
        }
    }

    pub fn id(&self) -> Option<&RequestId> {
        match self {
            Self::Request(r) => Some(&r.id),
            Self::Notification(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestId;

    #[test]
    fn request_roundtrips() {
        let req = JsonRpcRequest::new("tools/list", None, RequestId::Number(1));
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        let back: JsonRpcRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.method, "tools/list");
    }

    #[test]
    fn response_payload_is_mutually_exclusive() {
        let ok = JsonRpcResponse::success(serde_json::json!({"x": 1}), RequestId::Number(1));
        let json = serde_json::to_value(&ok).unwrap();
        assert!(json.get("result").is_some());
        assert!(json.get("error").is_none());

        let err = JsonRpcResponse::error_response(
            JsonRpcError {
                code: JsonRpcErrorCode::MethodNotFound.code(),
                message: "nope".into(),
                data: None,
            },
            RequestId::Number(1),
        );
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("error").is_some());
        assert!(json.get("result").is_none());
    }

    #[test]
    fn parse_error_response_has_null_id() {
        let resp = JsonRpcResponse::parse_error("bad json");
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["id"].is_null());
    }

    #[test]
    fn inbound_item_distinguishes_request_from_notification() {
        let req_json = serde_json::json!({"jsonrpc": "2.0", "method": "ping", "id": 1});
        let item: JsonRpcInboundItem = serde_json::from_value(req_json).unwrap();
        assert!(matches!(item, JsonRpcInboundItem::Request(_)));
        assert_eq!(item.id(), Some(&RequestId::Number(1)));

        let notif_json = serde_json::json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        let item: JsonRpcInboundItem = serde_json::from_value(notif_json).unwrap();
        assert!(matches!(item, JsonRpcInboundItem::Notification(_)));
        assert_eq!(item.id(), None);
    }

    #[test]
    fn message_accepts_batch_or_single() {
        let single = serde_json::json!({"jsonrpc": "2.0", "method": "ping", "id": 1});
        let msg: JsonRpcMessage = serde_json::from_value(single).unwrap();
        assert!(matches!(msg, JsonRpcMessage::Single(_)));

        let batch = serde_json::json!([
            {"jsonrpc": "2.0", "method": "ping", "id": 1},
            {"jsonrpc": "2.0", "method": "notifications/initialized"}
        ]);
        let msg: JsonRpcMessage = serde_json::from_value(batch).unwrap();
        match msg {
            JsonRpcMessage::Batch(items) => assert_eq!(items.len(), 2),
            _ => panic!("expected batch"),
        }
    }

    #[test]
    fn error_code_roundtrips_through_i32() {
        assert_eq!(JsonRpcErrorCode::from(-32601).code(), -32601);
        assert!(matches!(
            JsonRpcErrorCode::from(-32000),
            JsonRpcErrorCode::Application(-32000)
        ));
    }
}
