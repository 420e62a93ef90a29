//! Doubt service
//!
//! Answers a free-form question strictly from a document's text. Answers
//! are not stored.

use crate::database::Repository;
use crate::error::{AppError, Result};
use crate::generation::prompts::DOUBT;
use crate::generation::replies::DoubtReply;
use crate::generation::{GenerationGateway, PromptVars};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoubtAnswer {
    pub answer: String,
    /// Verbatim excerpt the answer relies on, empty when none applies
    pub reference: String,
}

#[derive(Clone)]
pub struct DoubtService {
    repo: Repository,
    gateway: GenerationGateway,
}

impl DoubtService {
    pub fn new(repo: Repository, gateway: GenerationGateway) -> Self {
        Self { repo, gateway }
    }

    pub async fn ask(&self, document_id: &str, question: &str) -> Result<DoubtAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("question must not be empty".to_string()));
        }

        let document = self.repo.get_document(document_id).await?;

        tracing::info!(
            "Answering question for document: {} ({} chars)",
            document_id,
            question.chars().count()
        );

        let vars = PromptVars::new()
            .document(&document.text_content)
            .set("question", question);
        let reply: DoubtReply = self.gateway.complete(&DOUBT, &vars).await?;

        if reply.answer.trim().is_empty() {
            return Err(AppError::GenerationFormat("doubt reply had an empty answer".to_string()));
        }

        Ok(DoubtAnswer {
            answer: reply.answer.trim().to_string(),
            reference: reply.reference.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_pool;
    use crate::generation::StubClient;
    use std::sync::Arc;

    async fn setup(stub: Arc<StubClient>) -> (DoubtService, String) {
        let repo = Repository::new(memory_pool().await);
        let document = repo
            .create_document("chem.eml", "Water boils at 100 degrees Celsius at sea level.")
            .await
            .unwrap();
        (
            DoubtService::new(repo, GenerationGateway::new(stub)),
            document.id,
        )
    }

    #[tokio::test]
    async fn test_ask_returns_answer_and_reference() {
        let stub = Arc::new(StubClient::with_replies([r#"{
            "answer": "At sea level water boils at 100 degrees Celsius.",
            "reference": "Water boils at 100 degrees Celsius at sea level."
        }"#]));
        let (service, doc_id) = setup(stub.clone()).await;

        let answer = service
            .ask(&doc_id, "When does water boil?")
            .await
            .unwrap();

        assert!(answer.answer.contains("100 degrees"));
        assert_eq!(
            answer.reference,
            "Water boils at 100 degrees Celsius at sea level."
        );

        let prompt = &stub.prompts()[0];
        assert!(prompt.user.contains("When does water boil?"));
        assert!(prompt.user.contains("sea level"));
    }

    #[tokio::test]
    async fn test_ask_validates_input() {
        let stub = Arc::new(StubClient::new());
        let (service, _doc_id) = setup(stub.clone()).await;

        let result = service.ask("missing", "Anything?").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = service.ask("missing", "   ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ask_rejects_malformed_reply() {
        let stub = Arc::new(StubClient::with_replies([r#"{"reference": "x"}"#]));
        let (service, doc_id) = setup(stub).await;

        let result = service.ask(&doc_id, "When does water boil?").await;
        assert!(matches!(result, Err(AppError::GenerationFormat(_))));
    }
}
