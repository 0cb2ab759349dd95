//! Tests for story generation services
//!
//! External dependencies are replaced with mockall-generated mocks.

pub mod generation_client;

// Re-export test utilities
pub use crate::traits::*;
