//! The resource registry: static URIs keyed exactly, templates matched
//! by compiled pattern. Unlike tools, re-registering a URI/template
//! replaces the previous entry — resources are expected to be
//! re-declared as a server's backing data changes.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use regex::Regex;

use mcp_protocol::{ReadResourceResult, ResourceDescriptor, ResourceTemplateDescriptor};

use crate::context::RequestContext;
use crate::error::RegistryError;
use crate::handler::ResourceHandler;

struct StaticEntry {
    descriptor: ResourceDescriptor,
    handler: Arc<dyn ResourceHandler>,
}

struct TemplateEntry {
    descriptor: ResourceTemplateDescriptor,
    pattern: Regex,
    /// Length of the template's literal prefix (before the first `{`),
    /// used to break ties deterministically when more than one template
    /// matches the same URI.
    literal_prefix_len: usize,
    handler: Arc<dyn ResourceHandler>,
}

/// Runtime registry of static resources and resource templates.
pub struct ResourceRegistry {
    static_resources: DashMap<String, StaticEntry>,
    templates: Arc<RwLock<Vec<TemplateEntry>>>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            static_resources: DashMap::new(),
            templates: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn register_static(
        &self,
        descriptor: ResourceDescriptor,
        handler: Arc<dyn ResourceHandler>,
    ) {
        let uri = descriptor.uri.clone();
        self.static_resources
            .insert(uri, StaticEntry { descriptor, handler });
    }

    /// Register a resource template. `uriTemplate` placeholders look
    /// like `{name}`; each becomes a named capture group in the compiled
    /// matcher.
    pub fn register_template(
        &self,
        descriptor: ResourceTemplateDescriptor,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<(), RegistryError> {
        let pattern = compile_template(&descriptor.uri_template).map_err(|reason| {
            RegistryError::InvalidTemplate(descriptor.uri_template.clone(), reason)
        })?;
        let literal_prefix_len = descriptor
            .uri_template
            .find('{')
            .unwrap_or(descriptor.uri_template.len());

        let mut templates = self.templates.write();
        templates.retain(|t| t.descriptor.uri_template != descriptor.uri_template);
        templates.push(TemplateEntry {
            descriptor,
            pattern,
            literal_prefix_len,
            handler,
        });
        Ok(())
    }

    pub fn list_static(&self) -> Vec<ResourceDescriptor> {
        let mut resources: Vec<_> = self
            .static_resources
            .iter()
            .map(|e| e.descriptor.clone())
            .collect();
        resources.sort_by(|a, b| a.uri.cmp(&b.uri));
        resources
    }

    pub fn is_empty(&self) -> bool {
        self.static_resources.is_empty() && self.templates.read().is_empty()
    }

    pub fn list_templates(&self) -> Vec<ResourceTemplateDescriptor> {
        self.templates
            .read()
            .iter()
            .map(|t| t.descriptor.clone())
            .collect()
    }

    /// Resolve a URI to a handler, preferring an exact static match,
    /// then the best-matching template. Among templates that match the
    /// same URI, the one with the longest literal prefix wins; ties
    /// break on the template string's lexicographic order, so resolution
    /// is deterministic regardless of registration order.
    pub async fn read(
        &self,
        uri: &str,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<ReadResourceResult> {
        if let Some(entry) = self.static_resources.get(uri) {
            let handler = entry.handler.clone();
            drop(entry);
            return handler.read(uri, &HashMap::new(), cx).await;
        }

        let matched = {
            let templates = self.templates.read();
            let mut candidates: Vec<(&TemplateEntry, HashMap<String, String>)> = templates
                .iter()
                .filter_map(|t| captures(&t.pattern, uri).map(|c| (t, c)))
                .collect();
            candidates.sort_by(|a, b| {
                b.0.literal_prefix_len
                    .cmp(&a.0.literal_prefix_len)
                    .then_with(|| a.0.descriptor.uri_template.cmp(&b.0.descriptor.uri_template))
            });
            candidates
                .into_iter()
                .next()
                .map(|(t, params)| (t.handler.clone(), params))
        };

        match matched {
            Some((handler, params)) => handler.read(uri, &params, cx).await,
            None => Err(mcp_protocol::Error::NotFound {
                kind: "resource",
                name: uri.to_string(),
            }),
        }
    }
}

fn compile_template(template: &str) -> Result<Regex, String> {
    let mut pattern = String::from("^");
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let mut name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    name.push(c);
                }
                if name.is_empty() {
                    return Err("empty placeholder name".to_string());
                }
                pattern.push_str(&format!("(?P<{name}>[^/]+)"));
            }
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');
    Regex::new(&pattern).map_err(|e| e.to_string())
}

fn captures(pattern: &Regex, uri: &str) -> Option<HashMap<String, String>> {
    let caps = pattern.captures(uri)?;
    Some(
        pattern
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_protocol::{TextResourceContents, ResourceContent};

    struct StaticFile(&'static str);

    #[async_trait::async_trait]
    impl ResourceHandler for StaticFile {
        async fn read(
            &self,
            uri: &str,
            _params: &HashMap<String, String>,
            _cx: &RequestContext,
        ) -> mcp_protocol::Result<ReadResourceResult> {
            Ok(ReadResourceResult {
                contents: vec![ResourceContent::Text(TextResourceContents {
                    uri: uri.to_string(),
                    mime_type: Some("text/plain".into()),
                    text: self.0.to_string(),
                })],
            })
        }
    }

    struct EchoParams;

    #[async_trait::async_trait]
    impl ResourceHandler for EchoParams {
        async fn read(
            &self,
            uri: &str,
            params: &HashMap<String, String>,
            _cx: &RequestContext,
        ) -> mcp_protocol::Result<ReadResourceResult> {
            Ok(ReadResourceResult {
                contents: vec![ResourceContent::Text(TextResourceContents {
                    uri: uri.to_string(),
                    mime_type: None,
                    text: format!("{:?}", params),
                })],
            })
        }
    }

    #[tokio::test]
    async fn static_resource_matches_exactly() {
        let registry = ResourceRegistry::new();
        registry.register_static(
            ResourceDescriptor {
                uri: "file:///readme.txt".into(),
                name: "readme".into(),
                title: None,
                description: None,
                mime_type: Some("text/plain".into()),
            },
            Arc::new(StaticFile("hello")),
        );

        let cx = RequestContext::default();
        let result = registry.read("file:///readme.txt", &cx).await.unwrap();
        assert_eq!(result.contents.len(), 1);
    }

    #[tokio::test]
    async fn template_extracts_named_captures() {
        let registry = ResourceRegistry::new();
        registry
            .register_template(
                ResourceTemplateDescriptor {
                    uri_template: "file:///{path}".into(),
                    name: "file".into(),
                    title: None,
                    description: None,
                    mime_type: None,
                },
                Arc::new(EchoParams),
            )
            .unwrap();

        let cx = RequestContext::default();
        let result = registry.read("file:///a.txt", &cx).await.unwrap();
        match &result.contents[0] {
            ResourceContent::Text(t) => assert!(t.text.contains("a.txt")),
            _ => panic!("expected text"),
        }
    }

    #[tokio::test]
    async fn longest_literal_prefix_wins_on_overlap() {
        let registry = ResourceRegistry::new();
        registry
            .register_template(
                ResourceTemplateDescriptor {
                    uri_template: "file:///{path}".into(),
                    name: "generic".into(),
                    title: None,
                    description: None,
                    mime_type: None,
                },
                Arc::new(StaticFile("generic")),
            )
            .unwrap();
        registry
            .register_template(
                ResourceTemplateDescriptor {
                    uri_template: "file:///logs/{name}".into(),
                    name: "logs".into(),
                    title: None,
                    description: None,
                    mime_type: None,
                },
                Arc::new(StaticFile("logs")),
            )
            .unwrap();

        let cx = RequestContext::default();
        let result = registry.read("file:///logs/today.log", &cx).await.unwrap();
        match &result.contents[0] {
            ResourceContent::Text(t) => assert_eq!(t.text, "logs"),
            _ => panic!("expected text"),
        }
    }

    #[tokio::test]
    async fn unmatched_uri_is_not_found() {
        let registry = ResourceRegistry::new();
        let cx = RequestContext::default();
        let err = registry.read("file:///nope.txt", &cx).await.unwrap_err();
        assert!(matches!(err, mcp_protocol::Error::NotFound { .. }));
    }
}
