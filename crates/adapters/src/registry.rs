use std::collections::BTreeMap;

use async_trait::async_trait;

use adbridge_core::envelope::{AgentRequest, AgentResponse};

/// A handler behind the agent's function-calling mechanism. Implementations always
/// answer with a well-formed envelope.
#[async_trait]
pub trait Adapter: Send + Sync {
    fn name(&self) -> &'static str;
    async fn handle(&self, request: AgentRequest) -> AgentResponse;
}

#[derive(Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<String, Box<dyn Adapter>>,
}

impl AdapterRegistry {
    pub fn register<T>(&mut self, adapter: T)
    where
        T: Adapter + 'static,
    {
        self.adapters.insert(adapter.name().to_string(), Box::new(adapter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Adapter> {
        self.adapters.get(name).map(|adapter| adapter.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }

    /// Routes the request to the named adapter; `None` when no such adapter exists.
    pub async fn dispatch(&self, name: &str, request: AgentRequest) -> Option<AgentResponse> {
        match self.get(name) {
            Some(adapter) => Some(adapter.handle(request).await),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
