//! Mock provider implementation for testing.

use super::{ProviderError, VisionProvider};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Mock vision provider returning a canned reply.
///
/// Records every prompt it receives so tests can assert on prompt
/// construction without calling the real model.
pub struct MockVisionProvider {
    reply: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockVisionProvider {
    /// Provider that answers every call with `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Provider that fails every call with a network error.
    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log lock").clone()
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn generate(&self, prompt: &str, _image_png: &[u8]) -> Result<String, ProviderError> {
        self.prompts
            .lock()
            .expect("prompt log lock")
            .push(prompt.to_string());

        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(ProviderError::NetworkError(
                "Mock provider failure".to_string(),
            )),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.reply.is_some() {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock provider configured to fail".to_string(),
            ))
        }
    }
}
