//! Story generation error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared::{FailureClass, GenerationFailure, SharedError};

/// Result type for story operations
pub type StoryResult<T> = Result<T, StoryError>;

/// Top-level failure of a story request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoryError {
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Configuration error at part {} of {total_parts}: {reason}", .part_index + 1)]
    Configuration {
        part_index: usize,
        total_parts: usize,
        attempts: u32,
        reason: GenerationFailure,
    },

    #[error("Generation failed at part {} of {total_parts} after {attempts} attempt(s): {reason}", .part_index + 1)]
    Generation {
        part_index: usize,
        total_parts: usize,
        attempts: u32,
        reason: GenerationFailure,
    },

    #[error("Setup error in {component}: {message}")]
    Setup { component: &'static str, message: String },

    #[error("Failed to write {path}: {message}")]
    Output { path: String, message: String },

    #[error("Integrity error{}: {message}", part_label(.part_index, .total_parts))]
    Integrity {
        part_index: Option<usize>,
        total_parts: usize,
        attempts: u32,
        message: String,
    },
}

fn part_label(part_index: &Option<usize>, total_parts: &usize) -> String {
    match part_index {
        Some(index) => format!(" at part {} of {}", index + 1, total_parts),
        None => String::new(),
    }
}

/// Caller-facing category of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Configuration,
    TransientGeneration,
    Integrity,
    Io,
}

/// Serialisable failure record handed back to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryFailure {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
}

impl StoryError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        StoryError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Classify a client failure for the given part
    pub fn from_client(part_index: usize, total_parts: usize, error: ClientError) -> Self {
        let ClientError { failure, attempts } = error;
        match failure.class() {
            FailureClass::Transient => StoryError::Generation {
                part_index,
                total_parts,
                attempts,
                reason: failure,
            },
            FailureClass::Configuration => StoryError::Configuration {
                part_index,
                total_parts,
                attempts,
                reason: failure,
            },
            FailureClass::Integrity => StoryError::Integrity {
                part_index: Some(part_index),
                total_parts,
                attempts,
                message: failure.to_string(),
            },
        }
    }

    pub fn setup(component: &'static str, message: impl Into<String>) -> Self {
        StoryError::Setup {
            component,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoryError::Validation { .. } => ErrorKind::Validation,
            StoryError::Configuration { .. } | StoryError::Setup { .. } => ErrorKind::Configuration,
            StoryError::Output { .. } => ErrorKind::Io,
            StoryError::Generation { .. } => ErrorKind::TransientGeneration,
            StoryError::Integrity { .. } => ErrorKind::Integrity,
        }
    }

    /// 0-based index of the part that failed, when the failure is tied to one
    pub fn part_index(&self) -> Option<usize> {
        match self {
            StoryError::Validation { .. } | StoryError::Setup { .. } | StoryError::Output { .. } => None,
            StoryError::Configuration { part_index, .. } | StoryError::Generation { part_index, .. } => {
                Some(*part_index)
            }
            StoryError::Integrity { part_index, .. } => *part_index,
        }
    }

    pub fn attempts(&self) -> Option<u32> {
        match self {
            StoryError::Validation { .. } | StoryError::Setup { .. } | StoryError::Output { .. } => None,
            StoryError::Configuration { attempts, .. }
            | StoryError::Generation { attempts, .. }
            | StoryError::Integrity { attempts, .. } => Some(*attempts),
        }
    }

    pub fn to_failure(&self) -> StoryFailure {
        StoryFailure {
            kind: self.kind(),
            message: self.to_string(),
            part_index: self.part_index(),
            attempts: self.attempts().filter(|a| *a > 0),
        }
    }
}

/// Failure of the generation client after its retry policy ran out
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{failure} (after {attempts} attempt(s))")]
pub struct ClientError {
    pub failure: GenerationFailure,
    pub attempts: u32,
}

/// Part planning errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Invalid part count: {requested} (must be between {min} and {max})")]
    InvalidPartCount { requested: i64, min: usize, max: usize },
}

/// Story assembly errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Incomplete story: expected {expected} parts, got {actual}")]
    IncompleteStory { expected: usize, actual: usize },

    #[error("Part {} appended twice", .part_index + 1)]
    DuplicatePart { part_index: usize },

    #[error("Part index {part_index} out of range for a {expected}-part story")]
    PartOutOfRange { part_index: usize, expected: usize },

    #[error("Part {} has no content", .part_index + 1)]
    EmptySegment { part_index: usize },
}

impl AssemblyError {
    pub fn part_index(&self) -> Option<usize> {
        match self {
            AssemblyError::IncompleteStory { .. } => None,
            AssemblyError::DuplicatePart { part_index }
            | AssemblyError::PartOutOfRange { part_index, .. }
            | AssemblyError::EmptySegment { part_index } => Some(*part_index),
        }
    }
}

/// Credential lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("No API key configured (checked: {checked})")]
    Missing { checked: String },

    #[error("API key must not be empty")]
    Empty,
}

impl From<PlanError> for StoryError {
    fn from(error: PlanError) -> Self {
        StoryError::validation("total_parts", error.to_string())
    }
}

impl From<SharedError> for StoryError {
    fn from(error: SharedError) -> Self {
        StoryError::setup("configuration", error.to_string())
    }
}
