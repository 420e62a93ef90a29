//! Typed reply shapes expected from the completion service

use serde::{Deserialize, Serialize};

/// Question/answer pair, as exchanged with both the model and the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    #[serde(alias = "question")]
    pub q: String,
    #[serde(alias = "answer")]
    pub a: String,
}

impl QaPair {
    pub fn new(q: impl Into<String>, a: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            a: a.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.q.trim().is_empty() || self.a.trim().is_empty()
    }
}

#[derive(Debug, Deserialize)]
pub struct FlashcardsReply {
    pub flashcards: Vec<QaPair>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionsReply {
    pub questions: Vec<QaPair>,
}

/// Judgment for a single quiz answer
#[derive(Debug, Clone, Deserialize)]
pub struct GradedItem {
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GradingReply {
    pub results: Vec<GradedItem>,
}

#[derive(Debug, Deserialize)]
pub struct DoubtReply {
    pub answer: String,
    #[serde(default)]
    pub reference: String,
}

fn default_weight() -> f64 {
    5.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicReply {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct TopicsReply {
    pub topics: Vec<TopicReply>,
}
