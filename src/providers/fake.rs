//! Scripted in-memory provider for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::gateway::{SendRequest, SendResult};
use crate::providers::{ProviderError, ProviderErrorKind, SmsProvider};

#[derive(Debug, Clone, Copy)]
pub enum Script {
    Succeed,
    Fail(ProviderErrorKind),
    /// Returns `Ok` with `success = false`.
    Unsuccessful,
    Hang,
}

pub struct ScriptedProvider {
    name: String,
    script: Script,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    /// Returns the provider and a handle counting its invocations.
    pub fn new(name: &str, script: Script) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name: name.to_string(),
                script,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl SmsProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, _request: &SendRequest) -> Result<SendResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Succeed => Ok(SendResult::delivered(&self.name, Some(format!("{}-id", self.name)))),
            Script::Fail(kind) => Err(ProviderError::new(&self.name, kind, "scripted failure")),
            Script::Unsuccessful => Ok(SendResult::failed(Some(self.name.clone()), "nope")),
            Script::Hang => std::future::pending().await,
        }
    }
}
