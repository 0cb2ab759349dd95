//! Core story generation logic
//!
//! Planning, continuity, prompt building and assembly are pure and
//! deterministic. The orchestrator ties them to a `TextGenerator`.

pub mod assembler;
pub mod continuity;
pub mod orchestrator;
pub mod planner;
pub mod prompt;

pub use assembler::StoryAssembler;
pub use continuity::ContinuityContext;
pub use orchestrator::StoryOrchestrator;
pub use planner::PartPlanner;
pub use prompt::PromptBuilder;
