//! Content block types: the tagged union carried in tool results and
//! prompt messages.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single content block. Tagged by `"type"` on the wire; `resource`
/// is disambiguated from `resource_link` by the presence of an inner
/// `resource` object rather than a flat `uri`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Plain text
    #[serde(rename = "text")]
    Text(TextContent),
    /// Base64-encoded image
    #[serde(rename = "image")]
    Image(ImageContent),
    /// Base64-encoded audio
    #[serde(rename = "audio")]
    Audio(AudioContent),
    /// Reference to an external resource, not inlined
    #[serde(rename = "resource_link")]
    ResourceLink(ResourceLink),
    /// Resource content embedded directly in the message
    #[serde(rename = "resource")]
    Resource(EmbeddedResource),
}

/// Plain text content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    /// The text itself
    pub text: String,
    /// Extension metadata
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, serde_json::Value>>,
}

impl TextContent {
    /// Create a bare text content block.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            meta: None,
        }
    }
}

/// Base64-encoded image content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageContent {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type, e.g. `image/png`
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Extension metadata
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, serde_json::Value>>,
}

/// Base64-encoded audio content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioContent {
    /// Base64-encoded audio bytes
    pub data: String,
    /// MIME type, e.g. `audio/wav`
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Extension metadata
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, serde_json::Value>>,
}

/// A pointer to a resource the caller can read separately, rather than
/// having its bytes inlined into the message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLink {
    /// Resource name
    pub name: String,
    /// URI of the resource
    pub uri: String,
    /// MIME type, if known
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Description of the resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A resource's contents, embedded inline in a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedResource {
    /// The embedded resource payload
    pub resource: ResourceContent,
}

/// The two representations a resource read can take: text or base64 blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceContent {
    /// Text resource contents
    Text(TextResourceContents),
    /// Binary resource contents, base64-encoded
    Blob(BlobResourceContents),
}

/// Text resource contents, as returned from `resources/read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextResourceContents {
    /// Resource URI
    pub uri: String,
    /// MIME type, defaulting to `text/plain` if absent
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// The text itself
    pub text: String,
}

/// Binary resource contents, as returned from `resources/read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobResourceContents {
    /// Resource URI
    pub uri: String,
    /// MIME type, if known
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Base64-encoded bytes
    pub blob: String,
}

/// Convert a handler's raw return value into a tool-result content
/// array: a JSON string/number/bool becomes a single text block (via
/// default string/number/bool formatting); a value that already has the
/// shape of a content block, or an array of them, is passed through
/// unchanged; anything else (objects, arrays of non-content values,
/// `null`) is JSON-encoded into a text block.
///
/// This is the one place that performs this conversion — `ToolHandler`
/// implementations that already build `ContentBlock`s directly don't
/// need it, but anything returning a plain value (a string, a number, a
/// deserialized struct) can hand it to this function instead of
/// constructing `TextContent` by hand.
pub fn content_from_value(value: serde_json::Value) -> Vec<ContentBlock> {
    match value {
        serde_json::Value::String(s) => vec![ContentBlock::Text(TextContent::new(s))],
        serde_json::Value::Number(n) => vec![ContentBlock::Text(TextContent::new(n.to_string()))],
        serde_json::Value::Bool(b) => vec![ContentBlock::Text(TextContent::new(b.to_string()))],
        other => {
            if let Ok(block) = serde_json::from_value::<ContentBlock>(other.clone()) {
                vec![block]
            } else if let Ok(blocks) = serde_json::from_value::<Vec<ContentBlock>>(other.clone()) {
                blocks
            } else {
                vec![ContentBlock::Text(TextContent::new(other.to_string()))]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_content_block_tags_as_text() {
        let block = ContentBlock::Text(TextContent::new("hello"));
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "hello");
    }

    #[test]
    fn resource_block_distinguishes_from_resource_link() {
        let link = ContentBlock::ResourceLink(ResourceLink {
            name: "file".into(),
            uri: "file:///a.txt".into(),
            mime_type: None,
            description: None,
        });
        let embedded = ContentBlock::Resource(EmbeddedResource {
            resource: ResourceContent::Text(TextResourceContents {
                uri: "file:///a.txt".into(),
                mime_type: Some("text/plain".into()),
                text: "hi".into(),
            }),
        });

        let link_json = serde_json::to_value(&link).unwrap();
        let embedded_json = serde_json::to_value(&embedded).unwrap();
        assert_eq!(link_json["type"], "resource_link");
        assert_eq!(embedded_json["type"], "resource");
        assert!(embedded_json.get("resource").is_some());
    }

    #[test]
    fn string_becomes_one_text_block() {
        let blocks = content_from_value(serde_json::json!("hello"));
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            ContentBlock::Text(t) => assert_eq!(t.text, "hello"),
            _ => panic!("expected text content"),
        }
    }

    #[test]
    fn number_and_bool_format_as_text() {
        match &content_from_value(serde_json::json!(42))[0] {
            ContentBlock::Text(t) => assert_eq!(t.text, "42"),
            _ => panic!("expected text content"),
        }
        match &content_from_value(serde_json::json!(true))[0] {
            ContentBlock::Text(t) => assert_eq!(t.text, "true"),
            _ => panic!("expected text content"),
        }
    }

    #[test]
    fn explicit_content_block_passes_through() {
        let value = serde_json::json!({"type": "text", "text": "already a block"});
        let blocks = content_from_value(value);
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            ContentBlock::Text(t) => assert_eq!(t.text, "already a block"),
            _ => panic!("expected text content"),
        }
    }

    #[test]
    fn a_sequence_of_content_blocks_is_preserved_in_order() {
        let value = serde_json::json!([
            {"type": "text", "text": "first"},
            {"type": "text", "text": "second"}
        ]);
        let blocks = content_from_value(value);
        assert_eq!(blocks.len(), 2);
        match (&blocks[0], &blocks[1]) {
            (ContentBlock::Text(a), ContentBlock::Text(b)) => {
                assert_eq!(a.text, "first");
                assert_eq!(b.text, "second");
            }
            _ => panic!("expected text content"),
        }
    }

    #[test]
    fn arbitrary_object_is_json_encoded_into_text() {
        let value = serde_json::json!({"count": 3, "label": "widgets"});
        let blocks = content_from_value(value.clone());
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            ContentBlock::Text(t) => {
                let decoded: serde_json::Value = serde_json::from_str(&t.text).unwrap();
                assert_eq!(decoded, value);
            }
            _ => panic!("expected text content"),
        }
    }

    #[test]
    fn null_is_json_encoded_into_text() {
        let blocks = content_from_value(serde_json::Value::Null);
        match &blocks[0] {
            ContentBlock::Text(t) => assert_eq!(t.text, "null"),
            _ => panic!("expected text content"),
        }
    }
}
