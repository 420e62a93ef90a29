//! Quiz service
//!
//! Generates quizzes at a chosen difficulty and grades submissions in a
//! single batched call. Scoring, per-topic metrics and the next
//! difficulty are computed locally from the grader's judgments.

use crate::config::{
    DEFAULT_TOPIC, DIFFICULTY_DOWN_THRESHOLD, DIFFICULTY_UP_THRESHOLD, MAX_QUIZ_QUESTIONS,
};
use crate::database::{clamp_unit, Difficulty, MetricType, NewMetric, Repository};
use crate::error::{AppError, Result};
use crate::generation::prompts::{GRADING, QUIZ};
use crate::generation::replies::{GradingReply, QuestionsReply};
use crate::generation::{GenerationGateway, PromptVars, QaPair};
use crate::services::flashcards::usable_pairs;
use serde::Serialize;
use std::collections::BTreeMap;

/// Judgment for one submitted answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemResult {
    pub is_correct: bool,
    pub feedback: String,
    pub topic: String,
}

/// Outcome of grading a quiz
#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    pub results: Vec<ItemResult>,
    pub score: f64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub next_difficulty: Difficulty,
}

#[derive(Serialize)]
struct GradingItem<'a> {
    question: &'a str,
    correct_answer: &'a str,
    user_answer: &'a str,
}

#[derive(Clone)]
pub struct QuizService {
    repo: Repository,
    gateway: GenerationGateway,
}

impl QuizService {
    pub fn new(repo: Repository, gateway: GenerationGateway) -> Self {
        Self { repo, gateway }
    }

    /// Generate a quiz. Nothing is stored until it is graded.
    pub async fn generate(
        &self,
        document_id: &str,
        difficulty: Difficulty,
        count: u32,
    ) -> Result<Vec<QaPair>> {
        if count == 0 || count > MAX_QUIZ_QUESTIONS {
            return Err(AppError::Validation(format!(
                "num_questions must be between 1 and {}",
                MAX_QUIZ_QUESTIONS
            )));
        }

        let document = self.repo.get_document(document_id).await?;

        tracing::info!(
            "Generating {} {} questions for document: {}",
            count,
            difficulty,
            document_id
        );

        let vars = PromptVars::new()
            .document(&document.text_content)
            .set("count", count)
            .set("difficulty", difficulty);
        let reply: QuestionsReply = self.gateway.complete(&QUIZ, &vars).await?;

        let mut questions = usable_pairs(reply.questions, "questions")?;
        if questions.len() != count as usize {
            tracing::warn!(
                "Asked for {} questions, generator returned {}",
                count,
                questions.len()
            );
            questions.truncate(count as usize);
        }

        Ok(questions)
    }

    /// Grade a submission and record the result
    pub async fn grade(
        &self,
        document_id: &str,
        difficulty: Difficulty,
        questions: &[QaPair],
        answers: &[String],
    ) -> Result<GradeReport> {
        if questions.is_empty() {
            return Err(AppError::Validation(
                "quiz_data must contain at least one question".to_string(),
            ));
        }
        if questions.len() != answers.len() {
            return Err(AppError::Validation(format!(
                "Got {} answers for {} questions",
                answers.len(),
                questions.len()
            )));
        }

        self.repo.ensure_document(document_id).await?;

        let items: Vec<GradingItem> = questions
            .iter()
            .zip(answers)
            .map(|(pair, answer)| GradingItem {
                question: &pair.q,
                correct_answer: &pair.a,
                user_answer: answer,
            })
            .collect();

        tracing::info!(
            "Grading {} answers for document: {}",
            items.len(),
            document_id
        );

        let vars = PromptVars::new().set("items", serde_json::to_string_pretty(&items)?);
        let reply: GradingReply = self.gateway.complete(&GRADING, &vars).await?;

        if reply.results.len() != questions.len() {
            return Err(AppError::GenerationFormat(format!(
                "grader returned {} results for {} questions",
                reply.results.len(),
                questions.len()
            )));
        }

        let results: Vec<ItemResult> = reply
            .results
            .into_iter()
            .map(|item| ItemResult {
                is_correct: item.is_correct,
                feedback: item.feedback.trim().to_string(),
                topic: normalize_topic(item.topic.as_deref()),
            })
            .collect();

        let correct_count = results.iter().filter(|r| r.is_correct).count();
        let total_questions = results.len();
        let score = clamp_unit(correct_count as f64 / total_questions as f64);
        let next_difficulty = next_difficulty(difficulty, score);
        let metrics = topic_metrics(&results);

        let stored = self
            .repo
            .record_quiz_result(
                document_id,
                difficulty,
                score,
                total_questions as i64,
                &metrics,
            )
            .await?;

        tracing::info!(
            "Quiz graded: {} (score: {:.2}, next difficulty: {})",
            stored.id,
            score,
            next_difficulty
        );

        Ok(GradeReport {
            results,
            score,
            correct_count,
            total_questions,
            next_difficulty,
        })
    }
}

/// Step up after a strong score, down after a weak one
pub fn next_difficulty(current: Difficulty, score: f64) -> Difficulty {
    if score > DIFFICULTY_UP_THRESHOLD {
        current.harder()
    } else if score < DIFFICULTY_DOWN_THRESHOLD {
        current.easier()
    } else {
        current
    }
}

fn normalize_topic(topic: Option<&str>) -> String {
    match topic.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_TOPIC.to_string(),
    }
}

/// One quiz metric per topic, scored as the fraction correct within it
fn topic_metrics(results: &[ItemResult]) -> Vec<NewMetric> {
    let mut tally: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for result in results {
        let entry = tally.entry(result.topic.as_str()).or_default();
        entry.1 += 1;
        if result.is_correct {
            entry.0 += 1;
        }
    }

    tally
        .into_iter()
        .map(|(topic, (correct, total))| NewMetric {
            topic: topic.to_string(),
            score: correct as f64 / total as f64,
            metric_type: MetricType::Quiz,
        })
        .collect()
}
