//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde for serialization to the API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Clamp a score into [0.0, 1.0]; NaN becomes 0.0
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// An uploaded document with its extracted text
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub text_content: String,
    pub uploaded_at: DateTime<Utc>,
    /// Character count of `text_content`, cached for display
    pub text_length: i64,
}

/// Document listing entry (no text body)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentSummary {
    pub id: String,
    pub filename: String,
    pub text_length: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Quiz difficulty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Difficulty {
    #[default]
    #[serde(alias = "easy", alias = "EASY")]
    Easy,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "hard", alias = "HARD")]
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn harder(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Hard => Difficulty::Hard,
        }
    }

    pub fn easier(self) -> Self {
        match self {
            Difficulty::Hard => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Easy => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

/// A question/answer flashcard tied to a document
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Flashcard {
    pub id: String,
    pub document_id: String,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub review_count: i64,
    /// Review progress in [0.0, 1.0]
    pub mastery_level: f64,
}

/// A graded quiz submission
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizResult {
    pub id: String,
    pub document_id: String,
    pub difficulty: Difficulty,
    /// Fraction of correct answers in [0.0, 1.0]
    pub score: f64,
    pub total_questions: i64,
    pub completed_at: DateTime<Utc>,
}

/// Kinds of performance metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Quiz,
    Flashcard,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Quiz => "quiz",
            MetricType::Flashcard => "flashcard",
        }
    }
}

/// Append-only per-topic score
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PerformanceMetric {
    pub id: String,
    pub document_id: String,
    pub topic: String,
    pub score: f64,
    pub metric_type: String,
    pub recorded_at: DateTime<Utc>,
}

/// New metric to record
#[derive(Debug, Clone)]
pub struct NewMetric {
    pub topic: String,
    pub score: f64,
    pub metric_type: MetricType,
}

/// Priority of a plan day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    High,
    Medium,
    Low,
}

/// One day of a revision plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
    pub day: u32,
    pub date: NaiveDate,
    pub focus: Focus,
    pub duration_minutes: u32,
    pub topics: Vec<String>,
}

/// Structured plan body, stored as JSON in `revision_plans.plan_data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanData {
    pub summary: String,
    pub exam_date: NaiveDate,
    pub days_until_exam: i64,
    pub plan: Vec<PlanDay>,
}

/// Raw revision plan row
#[derive(Debug, Clone, FromRow)]
pub struct RevisionPlanRow {
    pub id: String,
    pub document_id: String,
    pub plan_data: String,
    pub exam_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Revision plan with decoded plan data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionPlan {
    pub id: String,
    pub document_id: String,
    pub plan_data: PlanData,
    /// Exam date requested by the user, if any
    pub exam_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RevisionPlanRow> for RevisionPlan {
    type Error = serde_json::Error;

    fn try_from(row: RevisionPlanRow) -> Result<Self, Self::Error> {
        Ok(RevisionPlan {
            id: row.id,
            document_id: row.document_id,
            plan_data: serde_json::from_str(&row.plan_data)?,
            exam_date: row.exam_date,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(0.42), 0.42);
    }

    #[test]
    fn test_difficulty_steps() {
        assert_eq!(Difficulty::Easy.harder(), Difficulty::Medium);
        assert_eq!(Difficulty::Hard.harder(), Difficulty::Hard);
        assert_eq!(Difficulty::Hard.easier(), Difficulty::Medium);
        assert_eq!(Difficulty::Easy.easier(), Difficulty::Easy);
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!(" Hard ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());

        let d: Difficulty = serde_json::from_str("\"easy\"").unwrap();
        assert_eq!(d, Difficulty::Easy);
    }
}
