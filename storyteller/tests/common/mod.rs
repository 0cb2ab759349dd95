//! Common test utilities shared by the storyteller integration suites

pub mod fixtures;

pub use fixtures::{ScriptedGenerator, TestFixtures};
