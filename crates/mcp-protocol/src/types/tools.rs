//! Tool descriptor types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Optional behavior hints for a tool.
///
/// Each field is three-valued (absent / true / false): absence means the
/// tool author made no claim, which is semantically distinct from an
/// explicit `false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolHints {
    /// The tool does not modify its environment
    #[serde(rename = "readOnlyHint", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    /// The tool may perform destructive updates
    #[serde(rename = "destructiveHint", skip_serializing_if = "Option::is_none")]
    pub destructive: Option<bool>,
    /// Calling the tool repeatedly with the same arguments has no
    /// additional effect
    #[serde(rename = "idempotentHint", skip_serializing_if = "Option::is_none")]
    pub idempotent: Option<bool>,
    /// The tool interacts with an open world of external entities
    #[serde(rename = "openWorldHint", skip_serializing_if = "Option::is_none")]
    pub open_world: Option<bool>,
}

/// A tool descriptor as returned from `tools/list`. Carries no handler —
/// handlers live only in the registry that owns the tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name
    pub name: String,
    /// Display title, falling back to `name` in UIs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema the tool's arguments must satisfy
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    /// JSON Schema the tool's structured output, if any, satisfies
    #[serde(rename = "outputSchema", skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Behavior hints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolHints>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hints_omit_absent_fields() {
        let hints = ToolHints {
            read_only: Some(true),
            ..Default::default()
        };
        let json = serde_json::to_value(&hints).unwrap();
        assert_eq!(json, json!({"readOnlyHint": true}));
    }

    #[test]
    fn descriptor_serializes_input_schema() {
        let tool = ToolDescriptor {
            name: "add".into(),
            title: None,
            description: Some("adds two numbers".into()),
            input_schema: json!({"type": "object"}),
            output_schema: None,
            annotations: None,
        };
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["name"], "add");
        assert_eq!(json["inputSchema"]["type"], "object");
        assert!(json.get("outputSchema").is_none());
    }
}
