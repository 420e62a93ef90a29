//! Planner service
//!
//! Topic analysis goes through the generation gateway. Scheduling is
//! local and deterministic: each topic's priority is its weight scaled
//! by how little of it has been mastered, study days are split in
//! proportion to priority, and sessions are interleaved so no topic is
//! crammed into a single stretch.

use crate::config::{
    DEFAULT_PLAN_HORIZON_DAYS, DEFAULT_TOPIC, DEFAULT_TOPIC_MASTERY, DEFAULT_TOPIC_WEIGHT,
    MAX_PLAN_HORIZON_DAYS, MAX_SESSION_MINUTES, MIN_SESSION_MINUTES,
};
use crate::database::{
    clamp_unit, Focus, PerformanceMetric, PlanData, PlanDay, Repository, RevisionPlan,
};
use crate::error::{AppError, Result};
use crate::generation::prompts::TOPICS;
use crate::generation::replies::TopicsReply;
use crate::generation::{GenerationGateway, PromptVars};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

/// A study topic with its exam importance (1-10)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicWeight {
    pub name: String,
    pub weight: u8,
    pub description: String,
}

/// Scheduling input for one topic
#[derive(Debug, Clone, PartialEq)]
pub struct PlanTopic {
    pub name: String,
    pub weight: f64,
    pub mastery: f64,
}

impl PlanTopic {
    pub fn new(name: impl Into<String>, weight: f64, mastery: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            mastery,
        }
    }

    /// Higher for important topics the student has not mastered
    pub fn priority(&self) -> f64 {
        self.weight.clamp(1.0, 10.0) * (1.5 - clamp_unit(self.mastery))
    }
}

#[derive(Clone)]
pub struct PlannerService {
    repo: Repository,
    gateway: GenerationGateway,
}

impl PlannerService {
    pub fn new(repo: Repository, gateway: GenerationGateway) -> Self {
        Self { repo, gateway }
    }

    /// Ask the generator for the document's major topics
    pub async fn analyze_topics(&self, document_id: &str) -> Result<Vec<TopicWeight>> {
        let document = self.repo.get_document(document_id).await?;

        tracing::info!("Analyzing topics for document: {}", document_id);

        let reply: TopicsReply = self
            .gateway
            .complete(&TOPICS, &PromptVars::new().document(&document.text_content))
            .await?;

        let mut topics: Vec<TopicWeight> = Vec::with_capacity(reply.topics.len());
        for topic in reply.topics {
            let name = topic.name.trim();
            if name.is_empty() || topics.iter().any(|t| t.name.eq_ignore_ascii_case(name)) {
                continue;
            }
            topics.push(TopicWeight {
                name: name.to_string(),
                weight: clamp_weight(topic.weight),
                description: topic.description.trim().to_string(),
            });
        }

        tracing::info!("Found {} topics for document: {}", topics.len(), document_id);

        Ok(topics)
    }

    /// Build and store a day-by-day revision plan
    pub async fn create_plan(
        &self,
        document_id: &str,
        exam_date: Option<&str>,
        topics: Option<Vec<String>>,
    ) -> Result<PlanData> {
        let requested = exam_date
            .map(str::trim)
            .filter(|date| !date.is_empty())
            .map(parse_exam_date)
            .transpose()?;

        let today = Utc::now().date_naive();
        let effective = requested.unwrap_or(today + Duration::days(DEFAULT_PLAN_HORIZON_DAYS));
        if (effective - today).num_days() > MAX_PLAN_HORIZON_DAYS {
            return Err(AppError::Validation(format!(
                "exam_date must be within {} days",
                MAX_PLAN_HORIZON_DAYS
            )));
        }

        self.repo.ensure_document(document_id).await?;

        let weighted: Vec<(String, f64)> = match supplied_topics(topics) {
            Some(names) => names
                .into_iter()
                .map(|name| (name, DEFAULT_TOPIC_WEIGHT as f64))
                .collect(),
            None => self
                .analyze_topics(document_id)
                .await?
                .into_iter()
                .map(|topic| (topic.name, topic.weight as f64))
                .collect(),
        };

        let metrics = self.repo.list_metrics(document_id).await?;
        let plan_topics = weighted
            .into_iter()
            .map(|(name, weight)| {
                let mastery = topic_mastery(&metrics, &name);
                PlanTopic::new(name, weight, mastery)
            })
            .collect();

        let plan = build_plan(today, effective, plan_topics);
        let stored = self
            .repo
            .create_revision_plan(document_id, &plan, requested)
            .await?;

        tracing::info!(
            "Revision plan created: {} ({} days until {})",
            stored.id,
            plan.days_until_exam,
            plan.exam_date
        );

        Ok(plan)
    }

    /// Stored plans for a document, newest first
    pub async fn list_plans(&self, document_id: &str) -> Result<Vec<RevisionPlan>> {
        self.repo.ensure_document(document_id).await?;
        self.repo.list_revision_plans(document_id).await
    }
}

/// Accept `YYYY-MM-DD` or an RFC 3339 timestamp
pub fn parse_exam_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| {
            AppError::Validation(format!(
                "exam_date must be YYYY-MM-DD or an RFC 3339 timestamp, got {:?}",
                value
            ))
        })
}

fn clamp_weight(weight: f64) -> u8 {
    if weight.is_nan() {
        DEFAULT_TOPIC_WEIGHT
    } else {
        weight.round().clamp(1.0, 10.0) as u8
    }
}

/// Non-blank, case-insensitively unique topic names, or None to analyze
fn supplied_topics(topics: Option<Vec<String>>) -> Option<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for topic in topics.unwrap_or_default() {
        let name = topic.trim();
        if !name.is_empty() && !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            names.push(name.to_string());
        }
    }

    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

/// Mean recorded score for a topic, or the default when there is none
fn topic_mastery(metrics: &[PerformanceMetric], topic: &str) -> f64 {
    let scores: Vec<f64> = metrics
        .iter()
        .filter(|m| m.topic.trim().eq_ignore_ascii_case(topic.trim()))
        .map(|m| m.score)
        .collect();

    if scores.is_empty() {
        DEFAULT_TOPIC_MASTERY
    } else {
        clamp_unit(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Lay out one entry per day from `today` until the day before the exam
pub fn build_plan(today: NaiveDate, exam_date: NaiveDate, mut topics: Vec<PlanTopic>) -> PlanData {
    if topics.is_empty() {
        topics.push(PlanTopic::new(
            DEFAULT_TOPIC,
            DEFAULT_TOPIC_WEIGHT as f64,
            DEFAULT_TOPIC_MASTERY,
        ));
    }

    // Stable, so equal priorities keep their given order
    topics.sort_by(|a, b| b.priority().total_cmp(&a.priority()));

    let days_until_exam = (exam_date - today).num_days().max(1);
    let total_days = days_until_exam as usize;
    let review_day = total_days >= 3 && topics.len() > 1;
    let study_days = if review_day { total_days - 1 } else { total_days };

    let priorities: Vec<f64> = topics.iter().map(PlanTopic::priority).collect();
    let top_priority = priorities[0];

    let sessions: Vec<Vec<usize>> = if study_days >= topics.len() {
        interleave(&apportion(study_days, &priorities))
            .into_iter()
            .map(|topic| vec![topic])
            .collect()
    } else {
        (0..study_days)
            .map(|day| (0..topics.len()).filter(|i| i % study_days == day).collect())
            .collect()
    };

    let mut plan: Vec<PlanDay> = sessions
        .iter()
        .enumerate()
        .map(|(offset, assigned)| {
            // Topic indices ascend, so the first is the highest priority
            let lead = assigned[0];
            PlanDay {
                day: offset as u32 + 1,
                date: today + Duration::days(offset as i64),
                focus: focus_for_rank(lead, topics.len()),
                duration_minutes: session_minutes(priorities[lead], top_priority),
                topics: assigned.iter().map(|&i| topics[i].name.clone()).collect(),
            }
        })
        .collect();

    if review_day {
        plan.push(PlanDay {
            day: total_days as u32,
            date: today + Duration::days(total_days as i64 - 1),
            focus: Focus::High,
            duration_minutes: MAX_SESSION_MINUTES,
            topics: topics.iter().map(|t| t.name.clone()).collect(),
        });
    }

    PlanData {
        summary: summarize(&topics, exam_date, days_until_exam, review_day),
        exam_date,
        days_until_exam,
        plan,
    }
}

/// Split `days` over topics by priority: one day each, the rest by
/// largest remainder. Requires `days >= priorities.len()`.
fn apportion(days: usize, priorities: &[f64]) -> Vec<usize> {
    let extra = days - priorities.len();
    let total: f64 = priorities.iter().sum();
    let quotas: Vec<f64> = priorities
        .iter()
        .map(|p| extra as f64 * p / total)
        .collect();

    let mut counts: Vec<usize> = quotas.iter().map(|q| 1 + q.floor() as usize).collect();
    let assigned: usize = counts.iter().sum();

    let mut by_remainder: Vec<usize> = (0..quotas.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = quotas[a] - quotas[a].floor();
        let rb = quotas[b] - quotas[b].floor();
        rb.total_cmp(&ra)
    });
    for &i in by_remainder.iter().take(days.saturating_sub(assigned)) {
        counts[i] += 1;
    }

    counts
}

/// Round-robin over topics in priority order until every count is used
fn interleave(counts: &[usize]) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    let mut remaining = counts.to_vec();
    let mut order = Vec::with_capacity(total);

    while order.len() < total {
        for (topic, left) in remaining.iter_mut().enumerate() {
            if *left > 0 {
                *left -= 1;
                order.push(topic);
            }
        }
    }

    order
}

fn focus_for_rank(rank: usize, topic_count: usize) -> Focus {
    match rank * 3 / topic_count {
        0 => Focus::High,
        1 => Focus::Medium,
        _ => Focus::Low,
    }
}

/// Scale between the shortest and longest session, in steps of 5 minutes
fn session_minutes(priority: f64, top_priority: f64) -> u32 {
    let ratio = if top_priority > 0.0 {
        (priority / top_priority).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let span = (MAX_SESSION_MINUTES - MIN_SESSION_MINUTES) as f64;
    let minutes = MIN_SESSION_MINUTES as f64 + span * ratio;
    ((minutes / 5.0).round() as u32 * 5).clamp(MIN_SESSION_MINUTES, MAX_SESSION_MINUTES)
}

fn summarize(topics: &[PlanTopic], exam_date: NaiveDate, days: i64, review_day: bool) -> String {
    let leading: Vec<&str> = topics.iter().take(3).map(|t| t.name.as_str()).collect();
    let mut summary = format!(
        "{}-day plan for the exam on {} covering {} topic{}. Most time goes to {}.",
        days,
        exam_date,
        topics.len(),
        if topics.len() == 1 { "" } else { "s" },
        leading.join(", ")
    );
    if review_day {
        summary.push_str(" The final day reviews every topic.");
    }
    summary
}
