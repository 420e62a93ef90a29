//! Analytics service
//!
//! Read-only aggregation over a document's quiz results, flashcards and
//! performance metrics. No external calls.

use crate::config::MASTERY_THRESHOLD;
use crate::database::{clamp_unit, PerformanceMetric, QuizResult, Repository};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Count and mean score for one metric type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub count: usize,
    pub mean: f64,
}

/// Performance overview for a document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceStats {
    pub document_id: String,
    pub total_quizzes: usize,
    pub average_score: f64,
    pub total_flashcards: i64,
    pub mastered_flashcards: i64,
    pub topic_performance: BTreeMap<String, f64>,
    pub metric_types: BTreeMap<String, MetricSummary>,
}

#[derive(Clone)]
pub struct AnalyticsService {
    repo: Repository,
}

impl AnalyticsService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn stats(&self, document_id: &str) -> Result<PerformanceStats> {
        self.repo.ensure_document(document_id).await?;

        let quizzes = self.repo.list_quiz_results(document_id).await?;
        let (total_flashcards, mastered_flashcards) = self
            .repo
            .flashcard_counts(document_id, MASTERY_THRESHOLD)
            .await?;
        let metrics = self.repo.list_metrics(document_id).await?;

        tracing::debug!(
            "Aggregating {} quizzes and {} metrics for document: {}",
            quizzes.len(),
            metrics.len(),
            document_id
        );

        Ok(aggregate(
            document_id,
            &quizzes,
            total_flashcards,
            mastered_flashcards,
            &metrics,
        ))
    }
}

fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        clamp_unit(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

fn aggregate(
    document_id: &str,
    quizzes: &[QuizResult],
    total_flashcards: i64,
    mastered_flashcards: i64,
    metrics: &[PerformanceMetric],
) -> PerformanceStats {
    let quiz_scores: Vec<f64> = quizzes.iter().map(|q| q.score).collect();

    let mut by_topic: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut by_type: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for metric in metrics {
        by_topic
            .entry(metric.topic.clone())
            .or_default()
            .push(metric.score);
        by_type
            .entry(metric.metric_type.clone())
            .or_default()
            .push(metric.score);
    }

    PerformanceStats {
        document_id: document_id.to_string(),
        total_quizzes: quizzes.len(),
        average_score: mean(&quiz_scores),
        total_flashcards,
        mastered_flashcards,
        topic_performance: by_topic
            .into_iter()
            .map(|(topic, scores)| (topic, mean(&scores)))
            .collect(),
        metric_types: by_type
            .into_iter()
            .map(|(kind, scores)| {
                let summary = MetricSummary {
                    count: scores.len(),
                    mean: mean(&scores),
                };
                (kind, summary)
            })
            .collect(),
    }
}
