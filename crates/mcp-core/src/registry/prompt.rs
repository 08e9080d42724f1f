//! The prompt registry: name-keyed, replace-on-duplicate.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use mcp_protocol::{Error as ProtocolError, GetPromptResult, PromptDescriptor};

use crate::context::RequestContext;
use crate::handler::PromptHandler;

struct PromptEntry {
    descriptor: PromptDescriptor,
    handler: Arc<dyn PromptHandler>,
}

/// Runtime registry of renderable prompts.
#[derive(Default)]
pub struct PromptRegistry {
    prompts: DashMap<String, PromptEntry>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, descriptor: PromptDescriptor, handler: Arc<dyn PromptHandler>) {
        let name = descriptor.name.clone();
        self.prompts.insert(name, PromptEntry { descriptor, handler });
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn list(&self) -> Vec<PromptDescriptor> {
        let mut prompts: Vec<_> = self
            .prompts
            .iter()
            .map(|entry| entry.descriptor.clone())
            .collect();
        prompts.sort_by(|a, b| a.name.cmp(&b.name));
        prompts
    }

    /// Render a prompt. Rejects the call if a required argument declared
    /// on the descriptor is missing from `arguments`, before ever
    /// reaching the handler.
    pub async fn get(
        &self,
        name: &str,
        arguments: &HashMap<String, String>,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<GetPromptResult> {
        let (descriptor, handler) = {
            let entry = self.prompts.get(name).ok_or_else(|| ProtocolError::NotFound {
                kind: "prompt",
                name: name.to_string(),
            })?;
            (entry.descriptor.clone(), entry.handler.clone())
        };

        for arg in &descriptor.arguments {
            if arg.required == Some(true) && !arguments.contains_key(&arg.name) {
                return Err(ProtocolError::InvalidParams(format!(
                    "missing required argument '{}'",
                    arg.name
                )));
            }
        }

        handler.render(arguments, cx).await
    }
}
