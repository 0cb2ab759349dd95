//! Multi-part horror story generation
//!
//! A story request names a title, a number of parts and a model. The
//! orchestrator plans the narrative arc, generates each part in order with a
//! bounded summary of what came before, retries transient API failures and
//! assembles the parts into one text. Either the whole story comes back or a
//! single classified error does.

pub mod config;
pub mod core;
pub mod error;
pub mod output;
pub mod services;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{AssemblyConfig, ContinuityLimits, GeminiSettings, GenerationSettings, RetryPolicy, StoryConfig};
pub use core::{ContinuityContext, PartPlanner, PromptBuilder, StoryAssembler, StoryOrchestrator};
pub use error::{AssemblyError, ClientError, ErrorKind, PlanError, StoryError, StoryFailure, StoryResult};
pub use services::{EnvCredentialSource, GeminiBackend, GenerationClient, StaticCredentialSource};
pub use traits::{CredentialSource, TextGenerator};
pub use types::{GenerationRequest, GenerationResult, PartPlan, PartRole, Story, StoryRequest, StoryState};
