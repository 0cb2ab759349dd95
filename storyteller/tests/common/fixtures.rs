//! Test fixtures and a scripted text generator

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use shared::GenerationFailure;
use storyteller::{GenerationRequest, RetryPolicy, StoryConfig, TextGenerator};

/// Standard test data
pub struct TestFixtures;

impl TestFixtures {
    pub const TITLE: &'static str = "The Empty House";
    pub const MODEL: &'static str = "gemini-1.5-flash";

    /// Default configuration without backoff delays
    pub fn config() -> StoryConfig {
        StoryConfig {
            retry: RetryPolicy::immediate(3),
            ..StoryConfig::default()
        }
    }

    pub fn segments(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("seg{i}")).collect()
    }
}

/// Generator that replays a fixed script of responses and records every prompt
///
/// Once the script runs out, every further call returns `"segN"` where N is
/// the zero-based call number.
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    script: Arc<Mutex<VecDeque<Result<String, GenerationFailure>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(responses: Vec<Result<String, GenerationFailure>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(responses.into())),
            prompts: Arc::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(request.prompt.clone());
            prompts.len() - 1
        };
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(format!("seg{call}")))
    }
}
