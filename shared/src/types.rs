//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};

/// Unique identifier for a single story request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps interleaved log lines readable
        let full = self.0.to_string();
        write!(f, "{}", &full[..8])
    }
}

/// Capability metadata for a configured generation model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub display_name: String,
    pub max_output_tokens: u32,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            max_output_tokens,
        }
    }
}

/// The set of models a caller is allowed to request, keyed by model name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    models: BTreeMap<String, ModelInfo>,
    default_model: String,
}

impl ModelCatalog {
    pub const DEFAULT_MODEL: &'static str = "gemini-1.5-flash";

    /// Build a catalog from explicit entries; the first entry becomes the default
    pub fn new(models: Vec<ModelInfo>) -> SharedResult<Self> {
        let default_model = models
            .first()
            .map(|m| m.name.clone())
            .ok_or_else(|| SharedError::InvalidConfig {
                field: "models".to_string(),
                value: "<empty>".to_string(),
            })?;

        let models = models.into_iter().map(|m| (m.name.clone(), m)).collect();
        Ok(Self { models, default_model })
    }

    /// Parse a comma-separated list of model names (e.g. from `STORY_MODELS`)
    pub fn from_names(names: &str) -> SharedResult<Self> {
        let entries: Vec<ModelInfo> = names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                let known = Self::default().get(name).cloned();
                known.unwrap_or_else(|| ModelInfo::new(name, name, 2048))
            })
            .collect();

        Self::new(entries).map_err(|_| SharedError::InvalidConfig {
            field: "STORY_MODELS".to_string(),
            value: names.to_string(),
        })
    }

    pub fn contains(&self, model_name: &str) -> bool {
        self.models.contains_key(model_name)
    }

    pub fn get(&self, model_name: &str) -> Option<&ModelInfo> {
        self.models.get(model_name)
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        let models = vec![
            ModelInfo::new("gemini-1.5-flash", "Gemini 1.5 Flash", 8192),
            ModelInfo::new("gemini-1.5-pro", "Gemini 1.5 Pro", 8192),
            ModelInfo::new("gemini-2.0-flash", "Gemini 2.0 Flash", 8192),
            ModelInfo::new("gemini-1.0-pro", "Gemini 1.0 Pro", 2048),
        ];
        let default_model = Self::DEFAULT_MODEL.to_string();
        let models = models.into_iter().map(|m| (m.name.clone(), m)).collect();
        Self { models, default_model }
    }
}

/// Failure reasons for a single call to the text generation API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationFailure {
    /// Credentials rejected by the provider
    AuthenticationFailed,
    /// No usable credentials configured; the request was never sent
    CredentialsMissing(String),
    /// Rate limit exceeded, with the provider's retry hint when it sent one
    RateLimitExceeded { retry_after_ms: Option<u64> },
    /// Model not found or not served for these credentials
    ModelUnavailable(String),
    /// Request rejected as malformed by the provider
    InvalidRequest(String),
    /// Network/connection error
    NetworkError(String),
    /// Request timeout
    Timeout,
    /// Service temporarily unavailable
    ServiceUnavailable,
    /// Server error from provider
    ServerError(String),
    /// Provider returned no usable text
    EmptyResponse,
    /// Provider refused the content on safety grounds
    ContentBlocked(String),
    /// Response body did not have the expected shape
    MalformedResponse(String),
}

/// Broad class of a generation failure, used for retry and reporting decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureClass {
    Transient,
    Configuration,
    Integrity,
}

impl GenerationFailure {
    pub fn class(&self) -> FailureClass {
        match self {
            GenerationFailure::RateLimitExceeded { .. }
            | GenerationFailure::NetworkError(_)
            | GenerationFailure::Timeout
            | GenerationFailure::ServiceUnavailable
            | GenerationFailure::ServerError(_) => FailureClass::Transient,
            GenerationFailure::AuthenticationFailed
            | GenerationFailure::CredentialsMissing(_)
            | GenerationFailure::ModelUnavailable(_)
            | GenerationFailure::InvalidRequest(_) => FailureClass::Configuration,
            GenerationFailure::EmptyResponse
            | GenerationFailure::ContentBlocked(_)
            | GenerationFailure::MalformedResponse(_) => FailureClass::Integrity,
        }
    }

    /// Only transient faults are worth another attempt
    pub fn is_retryable(&self) -> bool {
        self.class() == FailureClass::Transient
    }

    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            GenerationFailure::RateLimitExceeded { retry_after_ms } => *retry_after_ms,
            _ => None,
        }
    }
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationFailure::AuthenticationFailed => write!(f, "API key rejected by the provider"),
            GenerationFailure::CredentialsMissing(reason) => write!(f, "API key not configured: {reason}"),
            GenerationFailure::RateLimitExceeded { .. } => write!(f, "rate limit exceeded"),
            GenerationFailure::ModelUnavailable(model) => write!(f, "model unavailable: {model}"),
            GenerationFailure::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            GenerationFailure::NetworkError(msg) => write!(f, "network error: {msg}"),
            GenerationFailure::Timeout => write!(f, "request timed out"),
            GenerationFailure::ServiceUnavailable => write!(f, "service unavailable"),
            GenerationFailure::ServerError(msg) => write!(f, "server error: {msg}"),
            GenerationFailure::EmptyResponse => write!(f, "empty response"),
            GenerationFailure::ContentBlocked(reason) => write!(f, "content blocked: {reason}"),
            GenerationFailure::MalformedResponse(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_contains_default_model() {
        let catalog = ModelCatalog::default();
        assert!(catalog.contains(catalog.default_model()));
        assert_eq!(catalog.default_model(), "gemini-1.5-flash");
        assert!(!catalog.contains("gpt-4"));
    }

    #[test]
    fn test_catalog_from_names() {
        let catalog = ModelCatalog::from_names("gemini-1.5-pro, custom-model ,").unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.default_model(), "gemini-1.5-pro");
        assert_eq!(catalog.get("gemini-1.5-pro").unwrap().max_output_tokens, 8192);
        assert_eq!(catalog.get("custom-model").unwrap().max_output_tokens, 2048);

        assert!(ModelCatalog::from_names(" , ").is_err());
    }

    #[test]
    fn test_failure_classes() {
        assert!(GenerationFailure::Timeout.is_retryable());
        assert!(GenerationFailure::RateLimitExceeded { retry_after_ms: None }.is_retryable());
        assert!(!GenerationFailure::AuthenticationFailed.is_retryable());
        assert_eq!(
            GenerationFailure::CredentialsMissing("no key".into()).class(),
            FailureClass::Configuration
        );
        assert!(!GenerationFailure::EmptyResponse.is_retryable());
        assert_eq!(
            GenerationFailure::ModelUnavailable("x".into()).class(),
            FailureClass::Configuration
        );
        assert_eq!(
            GenerationFailure::RateLimitExceeded { retry_after_ms: Some(1500) }.retry_after_ms(),
            Some(1500)
        );
    }

    #[test]
    fn test_request_id_display_is_short() {
        let id = RequestId::new();
        assert_eq!(id.to_string().len(), 8);
        assert_ne!(id, RequestId::new());
    }
}
