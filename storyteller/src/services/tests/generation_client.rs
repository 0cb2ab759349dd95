//! Tests for GenerationClient retry behaviour

use mockall::Sequence;

use shared::{GenerationFailure, RequestId};
use crate::config::RetryPolicy;
use crate::services::generation_client::GenerationClient;
use crate::traits::MockTextGenerator;
use crate::types::GenerationRequest;

fn request() -> GenerationRequest {
    GenerationRequest {
        model: "gemini-1.5-flash".to_string(),
        prompt: "Write the opening".to_string(),
        temperature: 0.9,
        max_output_tokens: 512,
    }
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let mut generator = MockTextGenerator::new();
    generator
        .expect_generate_text()
        .times(1)
        .returning(|_| Ok("  The lights went out.\n".to_string()));

    let client = GenerationClient::new(generator, RetryPolicy::immediate(3));
    let generated = client.generate(RequestId::new(), &request()).await.unwrap();

    assert_eq!(generated.text, "The lights went out.");
    assert_eq!(generated.attempts, 1);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let mut generator = MockTextGenerator::new();
    let mut seq = Sequence::new();
    generator
        .expect_generate_text()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(GenerationFailure::ServiceUnavailable));
    generator
        .expect_generate_text()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(GenerationFailure::RateLimitExceeded { retry_after_ms: Some(10) }));
    generator
        .expect_generate_text()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok("Third time lucky".to_string()));

    let client = GenerationClient::new(generator, RetryPolicy::immediate(3));
    let generated = client.generate(RequestId::new(), &request()).await.unwrap();

    assert_eq!(generated.text, "Third time lucky");
    assert_eq!(generated.attempts, 3);
}

#[tokio::test]
async fn test_retries_stop_at_bound() {
    let mut generator = MockTextGenerator::new();
    generator
        .expect_generate_text()
        .times(3)
        .returning(|_| Err(GenerationFailure::Timeout));

    let client = GenerationClient::new(generator, RetryPolicy::immediate(3));
    let error = client.generate(RequestId::new(), &request()).await.unwrap_err();

    assert_eq!(error.failure, GenerationFailure::Timeout);
    assert_eq!(error.attempts, 3);
}

#[tokio::test]
async fn test_auth_failure_is_never_retried() {
    let mut generator = MockTextGenerator::new();
    generator
        .expect_generate_text()
        .times(1)
        .returning(|_| Err(GenerationFailure::AuthenticationFailed));

    let client = GenerationClient::new(generator, RetryPolicy::immediate(3));
    let error = client.generate(RequestId::new(), &request()).await.unwrap_err();

    assert_eq!(error.failure, GenerationFailure::AuthenticationFailed);
    assert_eq!(error.attempts, 1);
}

#[tokio::test]
async fn test_invalid_model_is_never_retried() {
    let mut generator = MockTextGenerator::new();
    generator
        .expect_generate_text()
        .times(1)
        .returning(|req| Err(GenerationFailure::ModelUnavailable(req.model.clone())));

    let client = GenerationClient::new(generator, RetryPolicy::immediate(5));
    let error = client.generate(RequestId::new(), &request()).await.unwrap_err();

    assert!(matches!(error.failure, GenerationFailure::ModelUnavailable(_)));
    assert_eq!(error.attempts, 1);
}

#[tokio::test]
async fn test_blank_text_is_an_empty_response() {
    let mut generator = MockTextGenerator::new();
    generator
        .expect_generate_text()
        .times(1)
        .returning(|_| Ok(" \n\t ".to_string()));

    let client = GenerationClient::new(generator, RetryPolicy::immediate(3));
    let error = client.generate(RequestId::new(), &request()).await.unwrap_err();

    assert_eq!(error.failure, GenerationFailure::EmptyResponse);
    assert_eq!(error.attempts, 1);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_waits_between_attempts() {
    let mut generator = MockTextGenerator::new();
    let mut seq = Sequence::new();
    generator
        .expect_generate_text()
        .times(2)
        .in_sequence(&mut seq)
        .returning(|_| Err(GenerationFailure::NetworkError("reset".to_string())));
    generator
        .expect_generate_text()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok("done".to_string()));

    let client = GenerationClient::new(generator, RetryPolicy::default());
    let started = tokio::time::Instant::now();
    let generated = client.generate(RequestId::new(), &request()).await.unwrap();

    // 1s after the first failure, 2s after the second
    assert_eq!(generated.attempts, 3);
    assert!(started.elapsed() >= std::time::Duration::from_secs(3));
}
