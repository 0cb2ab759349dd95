//! Multi-part story orchestration
//!
//! A request moves through `Validating -> Planning -> Generating(i) -> Assembling -> Done`.
//! Parts are generated strictly one after another: each prompt embeds the
//! continuity summary of the parts before it. Any failure aborts the whole
//! request and no partial story is returned.

use std::sync::Arc;

use tokio::sync::mpsc;

use shared::{RequestId, logging, request_debug, request_error, request_info};
use crate::config::StoryConfig;
use crate::core::assembler::StoryAssembler;
use crate::core::continuity::ContinuityContext;
use crate::core::planner::PartPlanner;
use crate::core::prompt::PromptBuilder;
use crate::error::{StoryError, StoryResult};
use crate::services::generation_client::GenerationClient;
use crate::traits::TextGenerator;
use crate::types::{GenerationRequest, GenerationResult, Story, StoryRequest, StoryState};

/// Publishes state transitions for one request
struct Progress<'a> {
    request_id: RequestId,
    sender: Option<&'a mpsc::UnboundedSender<StoryState>>,
}

impl Progress<'_> {
    fn enter(&self, state: StoryState) {
        request_debug!(self.request_id, state = ?state, "State transition");
        if let Some(sender) = self.sender {
            // Receiver going away only means nobody is watching
            let _ = sender.send(state);
        }
    }

    fn fail(&self, error: StoryError) -> StoryError {
        self.enter(StoryState::Failed {
            at_part: error.part_index(),
            kind: error.kind(),
        });
        logging::log_error(&self.request_id, "Story generation", &error);
        error
    }
}

/// Public entry point for story generation
pub struct StoryOrchestrator<G: TextGenerator> {
    client: GenerationClient<G>,
    config: Arc<StoryConfig>,
    prompts: PromptBuilder,
}

impl<G: TextGenerator> StoryOrchestrator<G> {
    pub fn new(generator: G, config: StoryConfig) -> Self {
        let client = GenerationClient::new(generator, config.retry.clone());
        let prompts = PromptBuilder::new(&config.generation);
        Self {
            client,
            config: Arc::new(config),
            prompts,
        }
    }

    /// Inbound contract: validate raw caller input and return the story text
    pub async fn generate_story(&self, title: &str, total_parts: i64, model_name: &str) -> StoryResult<String> {
        let request = StoryRequest::new(title, total_parts, model_name, &self.config.catalog)?;
        self.generate(request).await.map(|story| story.full_text)
    }

    /// Generate a story for an already validated request
    pub async fn generate(&self, request: StoryRequest) -> StoryResult<Story> {
        self.run(request, None).await
    }

    /// Same as `generate`, publishing every state transition to `progress`
    pub async fn generate_with_progress(
        &self,
        request: StoryRequest,
        progress: mpsc::UnboundedSender<StoryState>,
    ) -> StoryResult<Story> {
        self.run(request, Some(&progress)).await
    }

    async fn run(
        &self,
        request: StoryRequest,
        sender: Option<&mpsc::UnboundedSender<StoryState>>,
    ) -> StoryResult<Story> {
        let request_id = request.id();
        let progress = Progress { request_id, sender };

        request_info!(
            request_id,
            title = %request.title(),
            total_parts = request.total_parts(),
            model = %request.model_name(),
            "📖 Starting story generation"
        );

        // Requests are built against a catalog; re-check against ours in case
        // the caller used a different one.
        progress.enter(StoryState::Validating);
        if !self.config.catalog.contains(request.model_name()) {
            return Err(progress.fail(StoryError::validation(
                "model_name",
                format!("model '{}' is not configured", request.model_name()),
            )));
        }

        progress.enter(StoryState::Planning);
        let plans = PartPlanner::plan(request.total_parts()).map_err(|e| progress.fail(e.into()))?;

        let total_parts = plans.len();
        let max_output_tokens = self
            .config
            .catalog
            .get(request.model_name())
            .map(|model| model.max_output_tokens.min(self.config.generation.max_output_tokens))
            .unwrap_or(self.config.generation.max_output_tokens);

        let mut continuity = ContinuityContext::with_limits(self.config.continuity.clone());
        let mut assembler = StoryAssembler::new(total_parts, self.config.assembly.clone());

        for plan in &plans {
            progress.enter(StoryState::Generating {
                part_index: plan.index,
                total_parts,
            });

            let generation_request = GenerationRequest {
                model: request.model_name().to_string(),
                prompt: self.prompts.build(&request, plan, &continuity.summary_for_prompt()),
                temperature: self.config.generation.temperature,
                max_output_tokens,
            };

            let generated = self
                .client
                .generate(request_id, &generation_request)
                .await
                .map_err(|e| progress.fail(StoryError::from_client(plan.index, total_parts, e)))?;

            request_info!(
                request_id,
                part = plan.number(),
                total_parts,
                role = %plan.role,
                attempts = generated.attempts,
                chars = generated.text.chars().count(),
                "Part complete"
            );

            continuity = continuity.augment(&generated.text);
            assembler
                .append(GenerationResult {
                    part_index: plan.index,
                    text: generated.text,
                    attempt_count: generated.attempts,
                })
                .map_err(|e| {
                    progress.fail(StoryError::Integrity {
                        part_index: e.part_index(),
                        total_parts,
                        attempts: 0,
                        message: e.to_string(),
                    })
                })?;
        }

        progress.enter(StoryState::Assembling);
        let story = assembler.finalize(request.title()).map_err(|e| {
            request_error!(request_id, "Assembly failed after all parts were generated: {}", e);
            progress.fail(StoryError::Integrity {
                part_index: e.part_index(),
                total_parts,
                attempts: 0,
                message: e.to_string(),
            })
        })?;

        progress.enter(StoryState::Done);
        logging::log_success(
            &request_id,
            &format!(
                "Story \"{}\" complete: {} part(s), {} call(s)",
                story.title,
                story.parts.len(),
                story.total_attempts()
            ),
        );

        Ok(story)
    }
}
