//! Composition: mount one or more child servers under name prefixes so a
//! single endpoint can present their combined capabilities.
//!
//! Prefixes are joined with `/`: a tool named `add` mounted under
//! `math` is addressed as `math/add`, and a resource URI `file:///a.txt`
//! mounted under `backend` is addressed as `backend/file:///a.txt`. This
//! is a plain string prefix, not a URI-scheme rewrite, so it applies
//! uniformly across tools, resources, and prompts.

use std::collections::HashMap;
use std::sync::Arc;

use mcp_core::RequestContext;
use mcp_protocol::{
    CallToolResult, Error as ProtocolError, GetPromptResult, PromptDescriptor, ReadResourceResult,
    ResourceDescriptor, ResourceTemplateDescriptor, ToolDescriptor,
};

use crate::error::ServerError;
use crate::server::Server;

struct MountedChild {
    prefix: String,
    server: Arc<Server>,
}

/// A server-of-servers: embeds a primary server plus any number of
/// mounted children. Unprefixed names route to the primary; a name
/// addressed as `<prefix>/<rest>` routes to the child mounted under
/// `<prefix>`. Listing combines the primary's own capabilities with
/// every child's, prefixed.
pub struct CompositeServer {
    primary: Arc<Server>,
    children: Vec<MountedChild>,
}

impl CompositeServer {
    pub fn new(primary: Arc<Server>) -> Self {
        Self {
            primary,
            children: Vec::new(),
        }
    }

    pub fn primary(&self) -> &Arc<Server> {
        &self.primary
    }

    /// Mount `server` under `prefix`. Fails if the prefix is already in
    /// use by another mounted server.
    pub fn mount(&mut self, prefix: impl Into<String>, server: Arc<Server>) -> Result<(), ServerError> {
        let prefix = prefix.into();
        if self.children.iter().any(|c| c.prefix == prefix) {
            return Err(ServerError::PrefixAlreadyMounted(prefix));
        }
        self.children.push(MountedChild { prefix, server });
        Ok(())
    }

    fn split<'a>(&self, addressed: &'a str) -> Option<(&MountedChild, &'a str)> {
        self.children.iter().find_map(|child| {
            addressed
                .strip_prefix(&child.prefix)
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|rest| (child, rest))
        })
    }

    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        let mut tools = self.primary.tools().list();
        for child in &self.children {
            for mut tool in child.server.tools().list() {
                tool.name = format!("{}/{}", child.prefix, tool.name);
                tools.push(tool);
            }
        }
        tools
    }

    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<CallToolResult> {
        match self.split(name) {
            Some((child, local_name)) => child.server.tools().call(local_name, arguments, cx).await,
            None => self.primary.tools().call(name, arguments, cx).await,
        }
    }

    pub fn list_resources(&self) -> Vec<ResourceDescriptor> {
        let mut resources = self.primary.resources().list_static();
        for child in &self.children {
            for mut resource in child.server.resources().list_static() {
                resource.uri = format!("{}/{}", child.prefix, resource.uri);
                resources.push(resource);
            }
        }
        resources
    }

    pub fn list_resource_templates(&self) -> Vec<ResourceTemplateDescriptor> {
        let mut templates = self.primary.resources().list_templates();
        for child in &self.children {
            for mut template in child.server.resources().list_templates() {
                template.uri_template = format!("{}/{}", child.prefix, template.uri_template);
                templates.push(template);
            }
        }
        templates
    }

    pub async fn read_resource(
        &self,
        uri: &str,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<ReadResourceResult> {
        match self.split(uri) {
            Some((child, local_uri)) => child.server.resources().read(local_uri, cx).await,
            None => self.primary.resources().read(uri, cx).await,
        }
    }

    pub fn list_prompts(&self) -> Vec<PromptDescriptor> {
        let mut prompts = self.primary.prompts().list();
        for child in &self.children {
            for mut prompt in child.server.prompts().list() {
                prompt.name = format!("{}/{}", child.prefix, prompt.name);
                prompts.push(prompt);
            }
        }
        prompts
    }

    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: &HashMap<String, String>,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<GetPromptResult> {
        match self.split(name) {
            Some((child, local_name)) => child.server.prompts().get(local_name, arguments, cx).await,
            None => self.primary.prompts().get(name, arguments, cx).await,
        }
    }
}
