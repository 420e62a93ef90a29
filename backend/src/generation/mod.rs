//! Generation module
//!
//! Everything that talks to the external completion service:
//! - `client`: the `CompletionClient` seam and the HTTP implementation
//! - `prompts`: per-operation prompt templates
//! - `replies`: typed reply shapes
//! - `gateway`: rendering, the single call, and reply decoding
//! - `stub`: a scripted client for exercising the operations offline

pub mod client;
pub mod gateway;
pub mod prompts;
pub mod replies;
pub mod stub;

pub use client::{CompletionClient, OpenAiClient};
pub use gateway::GenerationGateway;
pub use prompts::PromptVars;
pub use replies::QaPair;
pub use stub::StubClient;
