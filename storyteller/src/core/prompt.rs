//! Prompt construction for individual parts

use crate::config::GenerationSettings;
use crate::types::{PartPlan, StoryRequest};

/// Builds the prompt for one part from its plan and the continuity summary
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    language: String,
}

impl PromptBuilder {
    pub fn new(settings: &GenerationSettings) -> Self {
        Self {
            language: settings.language.clone(),
        }
    }

    pub fn build(&self, request: &StoryRequest, plan: &PartPlan, context_summary: &str) -> String {
        // Title goes in last so braces in user text are never expanded
        let instructions = plan
            .prompt_template
            .replace("{number}", &plan.number().to_string())
            .replace("{total}", &plan.total_parts.to_string())
            .replace("{title}", request.title());

        let context = if context_summary.trim().is_empty() {
            String::new()
        } else {
            format!("\n\nSTORY SO FAR:\n{context_summary}\n")
        };

        let ending = if plan.role.concludes() {
            "- This part ends the story"
        } else {
            "- Do not end the story in this part"
        };

        format!(
            r#"{instructions}{context}

WRITING REQUIREMENTS:
- Write in {language}, as narration suitable for reading aloud
- Plain prose only: no title, no part heading, no notes or commentary
- Continue seamlessly from the story so far without repeating it
{ending}"#,
            language = self.language
        )
    }
}
