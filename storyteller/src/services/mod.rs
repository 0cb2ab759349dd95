//! Story generation service implementations

pub mod api_keys;
pub mod gemini;
pub mod generation_client;

#[cfg(test)]
pub mod tests;

pub use api_keys::*;
pub use gemini::GeminiBackend;
pub use generation_client::*;
