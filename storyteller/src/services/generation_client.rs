//! Retrying wrapper around a single-attempt text generator

use shared::{GenerationFailure, RequestId, request_debug, request_info, request_warn};
use crate::config::RetryPolicy;
use crate::error::ClientError;
use crate::traits::TextGenerator;
use crate::types::{Generated, GenerationRequest};

/// Generation client owning retry/backoff for transient failures
pub struct GenerationClient<G: TextGenerator> {
    generator: G,
    policy: RetryPolicy,
}

impl<G: TextGenerator> GenerationClient<G> {
    pub fn new(generator: G, policy: RetryPolicy) -> Self {
        Self { generator, policy }
    }

    /// Generate one complete segment. Transient failures are retried up to
    /// `max_attempts`; configuration and integrity failures return at once.
    /// Blank text counts as `EmptyResponse`.
    pub async fn generate(&self, request_id: RequestId, request: &GenerationRequest) -> Result<Generated, ClientError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            request_debug!(
                request_id,
                model = %request.model,
                attempt,
                max_attempts,
                "Calling generation API"
            );

            let failure = match self.generator.generate_text(request).await {
                Ok(text) if !text.trim().is_empty() => {
                    request_info!(request_id, model = %request.model, attempts = attempt, "Segment generated");
                    return Ok(Generated {
                        text: text.trim().to_string(),
                        attempts: attempt,
                    });
                }
                Ok(_) => GenerationFailure::EmptyResponse,
                Err(failure) => failure,
            };

            if !failure.is_retryable() || attempt >= max_attempts {
                request_warn!(
                    request_id,
                    model = %request.model,
                    attempts = attempt,
                    "Generation failed: {}",
                    failure
                );
                return Err(ClientError { failure, attempts: attempt });
            }

            let delay = self.policy.delay_after(attempt, failure.retry_after_ms());
            request_warn!(
                request_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Transient failure ({}), retrying",
                failure
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}
