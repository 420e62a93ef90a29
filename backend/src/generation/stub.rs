//! Scripted completion client
//!
//! Replays canned replies in order and records every prompt it
//! receives. Used to exercise the generation-dependent operations
//! without a network.

use super::client::CompletionClient;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A prompt seen by the stub
#[derive(Debug, Clone)]
pub struct RecordedPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Default)]
pub struct StubClient {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<RecordedPrompt>>,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stub that answers with each reply in turn
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stub = Self::new();
        for reply in replies {
            stub.push_reply(reply);
        }
        stub
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Ok(reply.into()));
        }
    }

    pub fn push_error(&self, error: AppError) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Err(error));
        }
    }

    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait]
impl CompletionClient for StubClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(RecordedPrompt {
                system: system.to_string(),
                user: user.to_string(),
            });
        }

        self.replies
            .lock()
            .map_err(|_| AppError::Generic("stub client lock poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Upstream("no scripted reply left".to_string())))
    }
}
