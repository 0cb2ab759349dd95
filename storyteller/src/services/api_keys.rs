//! API key sources for the Gemini backend
//!
//! ## Configuration Sources
//! `EnvCredentialSource` loads keys from:
//! 1. `.env` file in the current directory or parent directories (if present)
//! 2. System environment variables
//!
//! The first non-empty variable among `GEMINI_API_KEY`, `GOOGLE_API_KEY` and
//! `GOOGLE_AI_API_KEY` wins.
//!
//! `StaticCredentialSource` holds a key handed over at runtime, e.g. by a
//! front end that lets the user paste their key.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CredentialError;
use crate::traits::CredentialSource;

/// An API key. Debug output shows only a short prefix.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Result<Self, CredentialError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(CredentialError::Empty);
        }
        Ok(Self(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(5).collect();
        write!(f, "ApiKey({prefix}...)")
    }
}

/// Environment-backed credential source
pub struct EnvCredentialSource;

impl EnvCredentialSource {
    /// Variables checked, in order of preference
    pub const KEY_NAMES: &'static [&'static str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY", "GOOGLE_AI_API_KEY"];

    pub fn new() -> Self {
        Self
    }

    /// Pick the first usable key from a lookup function
    pub fn resolve_from<F>(lookup: F) -> Result<ApiKey, CredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::KEY_NAMES
            .iter()
            .filter_map(|name| lookup(name))
            .find_map(|value| ApiKey::new(value).ok())
            .ok_or_else(|| CredentialError::Missing {
                checked: Self::KEY_NAMES.join(", "),
            })
    }
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialSource for EnvCredentialSource {
    async fn api_key(&self) -> Result<ApiKey, CredentialError> {
        // Safe to call repeatedly; already-set variables are not overwritten
        let _ = dotenv::dotenv();
        Self::resolve_from(|name| std::env::var(name).ok())
    }
}

/// Credential source holding a key set at runtime
#[derive(Clone, Default)]
pub struct StaticCredentialSource {
    key: Arc<RwLock<Option<ApiKey>>>,
}

impl StaticCredentialSource {
    /// Source with no key yet; calls fail until `set_key` succeeds
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_key(value: impl Into<String>) -> Result<Self, CredentialError> {
        let key = ApiKey::new(value)?;
        Ok(Self {
            key: Arc::new(RwLock::new(Some(key))),
        })
    }

    /// Replace the stored key; empty keys are rejected and leave the old one in place
    pub async fn set_key(&self, value: impl Into<String>) -> Result<(), CredentialError> {
        let key = ApiKey::new(value)?;
        tracing::info!("API key updated: {:?}", key);
        *self.key.write().await = Some(key);
        Ok(())
    }

    pub async fn is_set(&self) -> bool {
        self.key.read().await.is_some()
    }
}

#[async_trait]
impl CredentialSource for StaticCredentialSource {
    async fn api_key(&self) -> Result<ApiKey, CredentialError> {
        self.key.read().await.clone().ok_or_else(|| CredentialError::Missing {
            checked: "runtime key".to_string(),
        })
    }
}
