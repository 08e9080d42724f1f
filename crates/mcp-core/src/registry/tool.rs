//! The tool registry: name-keyed, fail-on-duplicate, schema-validated.

use std::sync::Arc;

use dashmap::DashMap;
use jsonschema::Validator;
use serde_json::Value;

use mcp_protocol::{CallToolResult, Error as ProtocolError, ToolDescriptor};

use crate::context::RequestContext;
use crate::error::RegistryError;
use crate::handler::ToolHandler;

struct ToolEntry {
    descriptor: ToolDescriptor,
    validator: Arc<Validator>,
    handler: Arc<dyn ToolHandler>,
}

/// Runtime registry of callable tools.
///
/// Registration is fail-closed: re-registering an existing name returns
/// [`RegistryError::ToolAlreadyExists`] rather than silently replacing the
/// handler, since a tool's identity (and its callers' expectations about
/// its schema) shouldn't change out from under them at runtime.
#[derive(Default)]
pub struct ToolRegistry {
    tools: DashMap<String, ToolEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Compiles `descriptor.input_schema` into a
    /// validator up front so a malformed schema fails at registration
    /// time, not on the first call.
    pub fn register(
        &self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), RegistryError> {
        if self.tools.contains_key(&descriptor.name) {
            return Err(RegistryError::ToolAlreadyExists(descriptor.name));
        }

        let validator = jsonschema::validator_for(&descriptor.input_schema)
            .map_err(|err| RegistryError::InvalidSchema(descriptor.name.clone(), err.to_string()))?;

        let name = descriptor.name.clone();
        self.tools.insert(
            name,
            ToolEntry {
                descriptor,
                validator: Arc::new(validator),
                handler,
            },
        );
        Ok(())
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.tools.remove(name).is_some()
    }

    /// List all registered tool descriptors, in registration order is
    /// not guaranteed (`DashMap` iteration order is unspecified); callers
    /// needing stable ordering should sort by name.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        let mut tools: Vec<_> = self
            .tools
            .iter()
            .map(|entry| entry.descriptor.clone())
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate `arguments` against the tool's declared schema, then
    /// invoke its handler.
    pub async fn call(
        &self,
        name: &str,
        arguments: Value,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<CallToolResult> {
        let (validator, handler) = {
            let entry = self.tools.get(name).ok_or_else(|| ProtocolError::NotFound {
                kind: "tool",
                name: name.to_string(),
            })?;
            (entry.validator.clone(), entry.handler.clone())
        };

        let errors: Vec<String> = validator.iter_errors(&arguments).map(|e| e.to_string()).collect();
        if !errors.is_empty() {
            return Err(ProtocolError::Validation(errors.join("; ")));
        }

        handler.call(arguments, cx).await
    }
}
