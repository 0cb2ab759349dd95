//! Gemini `generateContent` backend

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;

use shared::GenerationFailure;
use crate::config::GeminiSettings;
use crate::traits::{CredentialSource, TextGenerator};
use crate::types::GenerationRequest;

/// Real text generator calling the Gemini REST API
pub struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
}

impl GeminiBackend {
    pub fn new(settings: &GeminiSettings, credentials: Arc<dyn CredentialSource>) -> Result<Self, GenerationFailure> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GenerationFailure::NetworkError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    fn request_body(request: &GenerationRequest) -> Value {
        serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [
                        {
                            "text": request.prompt
                        }
                    ]
                }
            ],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_output_tokens
            }
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiBackend {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        let api_key = self.credentials.api_key().await.map_err(|e| {
            tracing::warn!("No usable API key: {}", e);
            GenerationFailure::CredentialsMissing(e.to_string())
        })?;

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", api_key.expose())
            .header("Content-Type", "application/json")
            .json(&Self::request_body(request))
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            let retry_after_ms = extract_retry_after_ms(&headers, &body);
            return Err(classify_status(status.as_u16(), &body, retry_after_ms, &request.model));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| GenerationFailure::MalformedResponse(format!("Failed to parse response: {e}")))?;

        extract_text(&response_json)
    }
}

fn classify_transport_error(error: reqwest::Error) -> GenerationFailure {
    if error.is_timeout() {
        GenerationFailure::Timeout
    } else {
        GenerationFailure::NetworkError(error.to_string())
    }
}

/// Map a non-success HTTP status to a failure
pub fn classify_status(status: u16, body: &str, retry_after_ms: Option<u64>, model: &str) -> GenerationFailure {
    let (message, api_status) = error_details(body);

    match status {
        401 | 403 => GenerationFailure::AuthenticationFailed,
        400 if message.contains("API key") || api_status == "UNAUTHENTICATED" => {
            GenerationFailure::AuthenticationFailed
        }
        404 => GenerationFailure::ModelUnavailable(model.to_string()),
        408 => GenerationFailure::Timeout,
        429 => GenerationFailure::RateLimitExceeded { retry_after_ms },
        503 => GenerationFailure::ServiceUnavailable,
        500..=599 => GenerationFailure::ServerError(format!("HTTP {status}: {message}")),
        _ => GenerationFailure::InvalidRequest(format!("HTTP {status}: {message}")),
    }
}

fn error_details(body: &str) -> (String, String) {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.chars().take(200).collect());
    let api_status = error
        .and_then(|e| e.get("status"))
        .and_then(|s| s.as_str())
        .unwrap_or_default()
        .to_string();

    (message, api_status)
}

/// Extract a retry hint from the `Retry-After` header or a `RetryInfo` detail
pub fn extract_retry_after_ms(headers: &HeaderMap, body: &str) -> Option<u64> {
    let from_header = headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|secs| (secs * 1000.0) as u64);

    if from_header.is_some() {
        return from_header;
    }

    // {"error": {"details": [{"@type": ".../google.rpc.RetryInfo", "retryDelay": "37s"}]}}
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")?
        .get("details")?
        .as_array()?
        .iter()
        .filter_map(|detail| detail.get("retryDelay").and_then(|d| d.as_str()))
        .find_map(|delay| delay.strip_suffix('s').and_then(|secs| secs.parse::<f64>().ok()))
        .map(|secs| (secs * 1000.0) as u64)
}

/// Pull the generated text out of a `generateContent` response
pub fn extract_text(response: &Value) -> Result<String, GenerationFailure> {
    if let Some(reason) = response
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|r| r.as_str())
    {
        return Err(GenerationFailure::ContentBlocked(reason.to_string()));
    }

    let candidates = response
        .get("candidates")
        .ok_or_else(|| GenerationFailure::MalformedResponse("No candidates in response".to_string()))?
        .as_array()
        .ok_or_else(|| GenerationFailure::MalformedResponse("Candidates is not a list".to_string()))?;

    let candidate = candidates.first().ok_or(GenerationFailure::EmptyResponse)?;

    let text: String = candidate
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        let finish_reason = candidate.get("finishReason").and_then(|r| r.as_str());
        return match finish_reason {
            Some("SAFETY") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => Err(
                GenerationFailure::ContentBlocked(finish_reason.unwrap_or_default().to_string()),
            ),
            _ => Err(GenerationFailure::EmptyResponse),
        };
    }

    Ok(text)
}
