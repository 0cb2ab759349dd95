//! Shared types for the story generation system
//!
//! Holds the pieces both the library and the binary agree on: the configured
//! model catalog, the failure taxonomy of a single generation call, request
//! identifiers and the tracing bootstrap.

pub mod types;
pub mod errors;
pub mod logging;

pub use types::*;
pub use errors::*;
