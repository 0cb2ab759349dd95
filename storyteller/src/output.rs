//! Rendering and persisting the result of a story request

use std::path::Path;

use serde_json::json;
use tokio::fs;

use crate::error::{StoryError, StoryResult};
use crate::types::Story;

/// Render a finished request as plain text or as the JSON envelope
/// (`{"story": ...}` / `{"error": {...}}`)
pub fn render(result: &StoryResult<Story>, as_json: bool) -> String {
    match (result, as_json) {
        (Ok(story), false) => story.full_text.clone(),
        (Ok(story), true) => json!({ "story": story.full_text }).to_string(),
        (Err(error), false) => format!("Error: {error}"),
        (Err(error), true) => json!({ "error": error.to_failure() }).to_string(),
    }
}

/// Write rendered output to `path`, creating parent directories as needed
pub async fn write_output(path: &Path, contents: &str) -> StoryResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| write_failed(path, e))?;
    }
    fs::write(path, contents).await.map_err(|e| write_failed(path, e))?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "Story written");
    Ok(())
}

fn write_failed(path: &Path, error: std::io::Error) -> StoryError {
    StoryError::Output {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GenerationResult;
    use tempfile::TempDir;

    fn story() -> Story {
        Story {
            title: "Hollow".to_string(),
            parts: vec![GenerationResult {
                part_index: 0,
                text: "It waited.".to_string(),
                attempt_count: 1,
            }],
            full_text: "Hollow\n\nPart 1\nIt waited.".to_string(),
        }
    }

    #[test]
    fn test_render_success() {
        let result = Ok(story());
        assert_eq!(render(&result, false), "Hollow\n\nPart 1\nIt waited.");

        let value: serde_json::Value = serde_json::from_str(&render(&result, true)).unwrap();
        assert_eq!(value["story"], "Hollow\n\nPart 1\nIt waited.");
    }

    #[test]
    fn test_render_failure() {
        let result: StoryResult<Story> = Err(StoryError::validation("title", "title must not be empty"));
        assert!(render(&result, false).starts_with("Error: Invalid title"));

        let value: serde_json::Value = serde_json::from_str(&render(&result, true)).unwrap();
        assert_eq!(value["error"]["kind"], "validation");
        assert!(value["error"].get("part_index").is_none());
    }

    #[tokio::test]
    async fn test_write_output_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stories").join("hollow.txt");

        write_output(&path, "Hollow\n\nPart 1\nIt waited.").await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Hollow\n\nPart 1\nIt waited.");
    }

    #[tokio::test]
    async fn test_write_output_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        // A directory cannot be overwritten with a file
        let error = write_output(temp_dir.path(), "text").await.unwrap_err();
        assert!(matches!(error, StoryError::Output { .. }));
        assert_eq!(error.kind(), crate::error::ErrorKind::Io);
    }
}
