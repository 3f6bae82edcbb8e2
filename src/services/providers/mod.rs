//! Vision model provider abstractions and implementations.
//!
//! This module provides a trait-based abstraction for vision-capable
//! language models, allowing the real backend (Gemini) to be swapped for a
//! mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Empty response from model")]
    EmptyResponse,
}

/// Trait for vision-capable text generation providers.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Submit a prompt plus a PNG image and return the model's raw text reply.
    async fn generate(&self, prompt: &str, image_png: &[u8]) -> Result<String, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
