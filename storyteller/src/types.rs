//! Story-specific data types

use serde::{Deserialize, Serialize};
use std::fmt;

use shared::{ModelCatalog, RequestId};
use crate::error::{ErrorKind, StoryError, StoryResult};

/// Smallest number of parts a story may be split into
pub const MIN_PARTS: usize = 1;

/// Largest number of parts a story may be split into
pub const MAX_PARTS: usize = 10;

/// A validated story request. Fields are private so an instance always
/// satisfies the title/part-count/model checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryRequest {
    id: RequestId,
    title: String,
    total_parts: usize,
    model_name: String,
}

impl StoryRequest {
    /// Validate caller input against the configured model set
    pub fn new(title: &str, total_parts: i64, model_name: &str, catalog: &ModelCatalog) -> StoryResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoryError::validation("title", "title must not be empty"));
        }

        if total_parts < MIN_PARTS as i64 || total_parts > MAX_PARTS as i64 {
            return Err(StoryError::validation(
                "total_parts",
                format!("number of parts must be between {MIN_PARTS} and {MAX_PARTS}, got {total_parts}"),
            ));
        }

        let model_name = model_name.trim();
        if !catalog.contains(model_name) {
            let known: Vec<&str> = catalog.names().collect();
            return Err(StoryError::validation(
                "model_name",
                format!("unknown model '{model_name}' (available: {})", known.join(", ")),
            ));
        }

        Ok(Self {
            id: RequestId::new(),
            title: title.to_string(),
            total_parts: total_parts as usize,
            model_name: model_name.to_string(),
        })
    }

    /// Validate a raw form value for the part count (e.g. a CLI or form field)
    pub fn parse(title: &str, raw_parts: &str, model_name: &str, catalog: &ModelCatalog) -> StoryResult<Self> {
        let total_parts = raw_parts.trim().parse::<i64>().map_err(|_| {
            StoryError::validation("total_parts", format!("number of parts must be a number, got '{raw_parts}'"))
        })?;
        Self::new(title, total_parts, model_name, catalog)
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn total_parts(&self) -> usize {
        self.total_parts
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Structural role of a part within the narrative arc
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartRole {
    /// The whole story told in a single part
    Complete,
    Opening,
    Rising,
    Climax,
    Resolution,
}

impl PartRole {
    /// Whether this part must bring the story to an end
    pub fn concludes(&self) -> bool {
        matches!(self, PartRole::Complete | PartRole::Resolution)
    }
}

impl fmt::Display for PartRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartRole::Complete => write!(f, "complete"),
            PartRole::Opening => write!(f, "opening"),
            PartRole::Rising => write!(f, "rising"),
            PartRole::Climax => write!(f, "climax"),
            PartRole::Resolution => write!(f, "resolution"),
        }
    }
}

/// Plan for one part of the story
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartPlan {
    pub index: usize,
    pub total_parts: usize,
    pub role: PartRole,
    pub prompt_template: &'static str,
}

impl PartPlan {
    /// 1-based part number used in prompts and headings
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// Parameters for a single call to the generation API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Text returned by the generation client together with how many attempts it took
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub attempts: u32,
}

/// One successfully generated part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub part_index: usize,
    pub text: String,
    pub attempt_count: u32,
}

/// A fully assembled story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub parts: Vec<GenerationResult>,
    pub full_text: String,
}

impl Story {
    /// Total external calls spent on this story, retries included
    pub fn total_attempts(&self) -> u32 {
        self.parts.iter().map(|p| p.attempt_count).sum()
    }
}

/// Orchestrator progress, published to callers that ask for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StoryState {
    Validating,
    Planning,
    Generating { part_index: usize, total_parts: usize },
    Assembling,
    Done,
    Failed { at_part: Option<usize>, kind: ErrorKind },
}

impl StoryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StoryState::Done | StoryState::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ModelCatalog {
        ModelCatalog::default()
    }

    #[test]
    fn test_valid_request_is_trimmed() {
        let request = StoryRequest::new("  The Empty House ", 3, "gemini-1.5-flash", &catalog()).unwrap();
        assert_eq!(request.title(), "The Empty House");
        assert_eq!(request.total_parts(), 3);
        assert_eq!(request.model_name(), "gemini-1.5-flash");
    }

    #[test]
    fn test_rejects_blank_title() {
        let error = StoryRequest::new("   ", 3, "gemini-1.5-flash", &catalog()).unwrap_err();
        assert!(matches!(error, StoryError::Validation { field: "title", .. }));
    }

    #[test]
    fn test_rejects_part_counts_out_of_range() {
        for parts in [-1, 0, 11, 100] {
            let error = StoryRequest::new("Title", parts, "gemini-1.5-flash", &catalog()).unwrap_err();
            assert!(matches!(error, StoryError::Validation { field: "total_parts", .. }), "{parts}");
        }
        assert!(StoryRequest::new("Title", 1, "gemini-1.5-flash", &catalog()).is_ok());
        assert!(StoryRequest::new("Title", 10, "gemini-1.5-flash", &catalog()).is_ok());
    }

    #[test]
    fn test_rejects_non_numeric_parts() {
        let error = StoryRequest::parse("Title", "three", "gemini-1.5-flash", &catalog()).unwrap_err();
        assert!(matches!(error, StoryError::Validation { field: "total_parts", .. }));
        assert!(StoryRequest::parse("Title", " 4 ", "gemini-1.5-flash", &catalog()).is_ok());
    }

    #[test]
    fn test_rejects_unknown_model() {
        let error = StoryRequest::new("Title", 2, "gpt-4o", &catalog()).unwrap_err();
        assert!(matches!(error, StoryError::Validation { field: "model_name", .. }));
        assert!(error.to_string().contains("gemini-1.5-flash"));
    }

    #[test]
    fn test_story_state_serialization() {
        let json = serde_json::to_value(StoryState::Generating { part_index: 1, total_parts: 3 }).unwrap();
        assert_eq!(json["state"], "generating");
        assert_eq!(json["part_index"], 1);
        assert!(StoryState::Done.is_terminal());
        assert!(!StoryState::Planning.is_terminal());
    }
}
