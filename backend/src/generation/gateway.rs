//! Generation gateway
//!
//! The single path from every generation-backed operation to the
//! completion service: render the prompt (with the document cut to
//! budget), make exactly one call, and decode the reply into a typed
//! shape. Replies that do not decode are `GenerationFormat` errors.

use super::client::CompletionClient;
use super::prompts::{PromptTemplate, PromptVars};
use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Clone)]
pub struct GenerationGateway {
    client: Arc<dyn CompletionClient>,
}

impl GenerationGateway {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Render `template`, call the completion service once and decode
    /// the reply as `T`
    pub async fn complete<T: DeserializeOwned>(
        &self,
        template: &PromptTemplate,
        vars: &PromptVars<'_>,
    ) -> Result<T> {
        let (system, user) = template.render(vars);

        tracing::info!(
            "Requesting {} completion ({} prompt chars)",
            template.name,
            system.len() + user.len()
        );

        let reply = self.client.complete(&system, &user).await.map_err(|e| {
            tracing::error!("{} completion failed: {}", template.name, e);
            e
        })?;

        parse_reply(template.name, &reply)
    }
}

/// Decode a model reply, tolerating a surrounding markdown code fence
pub fn parse_reply<T: DeserializeOwned>(name: &str, raw: &str) -> Result<T> {
    let cleaned = strip_code_fence(raw);

    serde_json::from_str(cleaned).map_err(|e| {
        tracing::warn!(
            "Could not decode {} reply ({} chars): {}",
            name,
            raw.len(),
            e
        );
        AppError::GenerationFormat(format!("{} reply did not match the expected shape: {}", name, e))
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Skip an info string such as `json`
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
