//! Flashcards service
//!
//! Generates question/answer cards from a document and tracks review
//! progress per card.

use crate::config::{FLASHCARD_METRIC_TOPIC, MASTERY_LEARNING_RATE};
use crate::database::{clamp_unit, Flashcard, MetricType, NewMetric, Repository};
use crate::error::{AppError, Result};
use crate::generation::prompts::FLASHCARDS;
use crate::generation::replies::FlashcardsReply;
use crate::generation::{GenerationGateway, PromptVars, QaPair};

#[derive(Clone)]
pub struct FlashcardsService {
    repo: Repository,
    gateway: GenerationGateway,
}

impl FlashcardsService {
    pub fn new(repo: Repository, gateway: GenerationGateway) -> Self {
        Self { repo, gateway }
    }

    /// Generate and persist flashcards for a document
    pub async fn generate(&self, document_id: &str) -> Result<Vec<QaPair>> {
        let document = self.repo.get_document(document_id).await?;

        tracing::info!("Generating flashcards for document: {}", document_id);

        let reply: FlashcardsReply = self
            .gateway
            .complete(&FLASHCARDS, &PromptVars::new().document(&document.text_content))
            .await?;

        let pairs = usable_pairs(reply.flashcards, "flashcards")?;

        let rows: Vec<(String, String)> = pairs
            .iter()
            .map(|pair| (pair.q.clone(), pair.a.clone()))
            .collect();
        self.repo.create_flashcards(document_id, &rows).await?;

        tracing::info!(
            "Stored {} flashcards for document: {}",
            pairs.len(),
            document_id
        );

        Ok(pairs)
    }

    /// All flashcards of a document, in creation order
    pub async fn list(&self, document_id: &str) -> Result<Vec<Flashcard>> {
        self.repo.ensure_document(document_id).await?;
        self.repo.list_flashcards(document_id).await
    }

    /// Record one review of a flashcard
    pub async fn review(&self, flashcard_id: &str, correct: bool) -> Result<Flashcard> {
        let flashcard = self.repo.get_flashcard(flashcard_id).await?;
        let mastery = next_mastery(flashcard.mastery_level, correct);

        tracing::info!(
            "Reviewing flashcard: {} (correct: {}, mastery: {:.2} -> {:.2})",
            flashcard_id,
            correct,
            flashcard.mastery_level,
            mastery
        );

        let metric = NewMetric {
            topic: FLASHCARD_METRIC_TOPIC.to_string(),
            score: if correct { 1.0 } else { 0.0 },
            metric_type: MetricType::Flashcard,
        };

        self.repo
            .record_flashcard_review(flashcard_id, mastery, &metric)
            .await
    }
}

/// Move mastery toward 1.0 on a correct review and toward 0.0 otherwise
pub fn next_mastery(current: f64, correct: bool) -> f64 {
    let current = clamp_unit(current);
    let target = if correct { 1.0 } else { 0.0 };
    clamp_unit(current + MASTERY_LEARNING_RATE * (target - current))
}

/// Trim generated pairs and drop blank ones. Nothing usable is a format error.
pub(crate) fn usable_pairs(pairs: Vec<QaPair>, what: &str) -> Result<Vec<QaPair>> {
    let total = pairs.len();
    let kept: Vec<QaPair> = pairs
        .into_iter()
        .filter(|pair| !pair.is_blank())
        .map(|pair| QaPair::new(pair.q.trim(), pair.a.trim()))
        .collect();

    if kept.is_empty() {
        return Err(AppError::GenerationFormat(format!(
            "reply contained no usable {}",
            what
        )));
    }

    if kept.len() < total {
        tracing::warn!("Dropped {} blank {} from reply", total - kept.len(), what);
    }

    Ok(kept)
}
