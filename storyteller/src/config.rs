//! Runtime configuration for story generation
//!
//! Defaults are usable as-is. `StoryConfig::from_env` loads a `.env` file if
//! present and then applies any `STORY_*` / `GEMINI_*` overrides found in the
//! environment.

use std::time::Duration;

use shared::{ModelCatalog, SharedError, SharedResult};

/// Retry/backoff policy for transient generation failures
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Policy with no waiting between attempts (tests, local stubs)
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            multiplier: 1,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after `attempt` (1-based) failed, before the next one
    pub fn delay_after(&self, attempt: u32, retry_after_ms: Option<u64>) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let factor = self.multiplier.max(1).saturating_pow(exponent);
        let backoff = self.base_delay.saturating_mul(factor).min(self.max_delay);

        match retry_after_ms {
            Some(hint) => backoff.max(Duration::from_millis(hint)).min(self.max_delay),
            None => backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2,
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Bounds on the continuity summary fed into each prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuityLimits {
    /// Most recent segments quoted (tail only) in the summary
    pub window_segments: usize,
    /// Characters kept from the end of each quoted segment
    pub verbatim_chars: usize,
    /// Characters kept from the start of each older segment's synopsis line
    pub synopsis_chars: usize,
    /// Hard cap on the whole summary
    pub max_summary_chars: usize,
}

impl Default for ContinuityLimits {
    fn default() -> Self {
        Self {
            window_segments: 2,
            verbatim_chars: 600,
            synopsis_chars: 200,
            max_summary_chars: 3000,
        }
    }
}

/// How generated parts are stitched into the final text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyConfig {
    pub include_title: bool,
    /// Heading placed above each part; `{number}` and `{total}` are substituted
    pub part_label: String,
    pub separator: String,
}

impl AssemblyConfig {
    pub fn render_label(&self, number: usize, total: usize) -> String {
        self.part_label
            .replace("{number}", &number.to_string())
            .replace("{total}", &total.to_string())
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            include_title: true,
            part_label: "Part {number}".to_string(),
            separator: "\n\n".to_string(),
        }
    }
}

/// Sampling parameters sent with every request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub language: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            max_output_tokens: 2048,
            language: "English".to_string(),
        }
    }
}

/// Gemini endpoint settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiSettings {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Complete story generation configuration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoryConfig {
    pub retry: RetryPolicy,
    pub continuity: ContinuityLimits,
    pub assembly: AssemblyConfig,
    pub generation: GenerationSettings,
    pub gemini: GeminiSettings,
    pub catalog: ModelCatalog,
}

impl StoryConfig {
    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> SharedResult<Self> {
        // Missing .env is fine
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> SharedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StoryConfig::default();

        if let Some(value) = lookup("STORY_MAX_ATTEMPTS") {
            config.retry.max_attempts = parse_nonzero("STORY_MAX_ATTEMPTS", &value)?;
        }
        if let Some(value) = lookup("STORY_BASE_DELAY_MS") {
            config.retry.base_delay = Duration::from_millis(parse_field("STORY_BASE_DELAY_MS", &value)?);
        }
        if let Some(value) = lookup("STORY_MAX_DELAY_MS") {
            config.retry.max_delay = Duration::from_millis(parse_field("STORY_MAX_DELAY_MS", &value)?);
        }
        if let Some(value) = lookup("STORY_CONTEXT_WINDOW") {
            config.continuity.window_segments = parse_nonzero("STORY_CONTEXT_WINDOW", &value)?;
        }
        if let Some(value) = lookup("STORY_CONTEXT_MAX_CHARS") {
            config.continuity.max_summary_chars = parse_nonzero("STORY_CONTEXT_MAX_CHARS", &value)?;
        }
        if let Some(value) = lookup("STORY_TEMPERATURE") {
            let temperature: f32 = parse_field("STORY_TEMPERATURE", &value)?;
            if !(0.0..=2.0).contains(&temperature) {
                return Err(invalid("STORY_TEMPERATURE", &value));
            }
            config.generation.temperature = temperature;
        }
        if let Some(value) = lookup("STORY_MAX_OUTPUT_TOKENS") {
            config.generation.max_output_tokens = parse_nonzero("STORY_MAX_OUTPUT_TOKENS", &value)?;
        }
        if let Some(value) = lookup("STORY_LANGUAGE") {
            let language = value.trim();
            if language.is_empty() {
                return Err(invalid("STORY_LANGUAGE", &value));
            }
            config.generation.language = language.to_string();
        }
        if let Some(value) = lookup("STORY_MODELS") {
            config.catalog = ModelCatalog::from_names(&value)?;
        }
        if let Some(value) = lookup("GEMINI_BASE_URL") {
            config.gemini.base_url = value.trim_end_matches('/').to_string();
        }
        if let Some(value) = lookup("GEMINI_TIMEOUT_SECS") {
            config.gemini.timeout = Duration::from_secs(parse_nonzero("GEMINI_TIMEOUT_SECS", &value)?);
        }

        Ok(config)
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str) -> SharedResult<T> {
    value.trim().parse::<T>().map_err(|_| invalid(field, value))
}

/// Zero would silently disable the setting, so it is rejected
fn parse_nonzero<T>(field: &str, value: &str) -> SharedResult<T>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let parsed: T = parse_field(field, value)?;
    if parsed == T::default() {
        return Err(invalid(field, value));
    }
    Ok(parsed)
}

fn invalid(field: &str, value: &str) -> SharedError {
    SharedError::InvalidConfig {
        field: field.to_string(),
        value: value.to_string(),
    }
}
