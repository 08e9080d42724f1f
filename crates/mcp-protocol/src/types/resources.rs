//! Resource and resource-template descriptor types.

use serde::{Deserialize, Serialize};

/// A static resource descriptor as returned from `resources/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Unique resource URI
    pub uri: String,
    /// Resource name
    pub name: String,
    /// Display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type, if known
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// A resource template descriptor as returned from `resources/templates/list`.
///
/// `uri_template` contains `{name}` placeholders; matching concrete URIs
/// against it is the registry's job, not this type's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceTemplateDescriptor {
    /// URI template, e.g. `file:///{path}`
    #[serde(rename = "uriTemplate")]
    pub uri_template: String,
    /// Template name
    pub name: String,
    /// Display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type, if known
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_descriptor_roundtrips() {
        let tmpl = ResourceTemplateDescriptor {
            uri_template: "file:///{path}".into(),
            name: "file".into(),
            title: None,
            description: None,
            mime_type: None,
        };
        let json = serde_json::to_string(&tmpl).unwrap();
        let back: ResourceTemplateDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back.uri_template, "file:///{path}");
    }
}
