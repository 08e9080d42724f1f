//! Completion side-channel: argument autocompletion providers for
//! prompts and resource templates, keyed the way `completion/complete`
//! addresses them on the wire.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

/// A provider of completion suggestions for one prompt argument or
/// resource template variable.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Return candidate completions for `partial`, most relevant first.
    async fn complete(&self, partial: &str) -> Vec<String>;
}

/// Registry of completion providers, keyed `"prompt:<name>:<argument>"`
/// or `"resource:<uri_template>:<argument>"`.
#[derive(Default)]
pub struct CompletionRegistry {
    providers: DashMap<String, Arc<dyn CompletionProvider>>,
}

impl CompletionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_prompt_argument(
        &self,
        prompt_name: &str,
        argument: &str,
        provider: Arc<dyn CompletionProvider>,
    ) {
        self.providers
            .insert(format!("prompt:{prompt_name}:{argument}"), provider);
    }

    pub fn register_resource_argument(
        &self,
        uri_template: &str,
        argument: &str,
        provider: Arc<dyn CompletionProvider>,
    ) {
        self.providers
            .insert(format!("resource:{uri_template}:{argument}"), provider);
    }

    pub async fn complete_prompt_argument(
        &self,
        prompt_name: &str,
        argument: &str,
        partial: &str,
    ) -> Vec<String> {
        let key = format!("prompt:{prompt_name}:{argument}");
        match self.providers.get(&key) {
            Some(provider) => provider.complete(partial).await,
            None => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub async fn complete_resource_argument(
        &self,
        uri_template: &str,
        argument: &str,
        partial: &str,
    ) -> Vec<String> {
        let key = format!("resource:{uri_template}:{argument}");
        match self.providers.get(&key) {
            Some(provider) => provider.complete(partial).await,
            None => Vec::new(),
        }
    }
}
