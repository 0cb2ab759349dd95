//! Trait definitions for dependency injection
//!
//! The orchestrator only ever talks to the outside world through these seams,
//! so tests swap in mocks or scripted stubs without touching the network.

use async_trait::async_trait;

use shared::GenerationFailure;
use crate::error::CredentialError;
use crate::services::api_keys::ApiKey;
use crate::types::GenerationRequest;

/// A single attempt against an external text generation capability
#[mockall::automock]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for one prompt; no retries at this level
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, GenerationFailure>;
}

/// Source of the API key used for generation calls
///
/// Resolved on every call so a key configured after startup is picked up.
#[mockall::automock]
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn api_key(&self) -> Result<ApiKey, CredentialError>;
}
