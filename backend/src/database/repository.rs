//! Repository layer for database operations
//!
//! Document store plus the four artifact stores (flashcards, quiz
//! results, performance metrics, revision plans). Multi-row writes run
//! in a transaction. Scores are clamped into [0, 1] before they are
//! written.

use super::models::*;
use crate::error::{AppError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Documents =====

    /// Insert a document with its extracted text
    pub async fn create_document(&self, filename: &str, text_content: &str) -> Result<Document> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let text_length = text_content.chars().count() as i64;

        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (id, filename, text_content, uploaded_at, text_length)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(filename)
        .bind(text_content)
        .bind(now)
        .bind(text_length)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created document: {} ({} chars)", id, text_length);
        Ok(document)
    }

    /// Get a document by ID
    pub async fn get_document(&self, id: &str) -> Result<Document> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::document_not_found(id))
    }

    /// Get a document listing entry by ID
    pub async fn get_document_summary(&self, id: &str) -> Result<DocumentSummary> {
        sqlx::query_as::<_, DocumentSummary>(
            "SELECT id, filename, text_length, uploaded_at FROM documents WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::document_not_found(id))
    }

    /// Fail with `NotFound` unless the document exists
    pub async fn ensure_document(&self, id: &str) -> Result<()> {
        let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        exists
            .map(|_| ())
            .ok_or_else(|| AppError::document_not_found(id))
    }

    /// List documents, newest first, without their text
    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        let documents = sqlx::query_as::<_, DocumentSummary>(
            r#"
            SELECT id, filename, text_length, uploaded_at FROM documents
            ORDER BY uploaded_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    // ===== Flashcards =====

    /// Insert a batch of question/answer pairs as fresh flashcards
    pub async fn create_flashcards(
        &self,
        document_id: &str,
        pairs: &[(String, String)],
    ) -> Result<Vec<Flashcard>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut flashcards = Vec::with_capacity(pairs.len());

        for (question, answer) in pairs {
            let flashcard = sqlx::query_as::<_, Flashcard>(
                r#"
                INSERT INTO flashcards
                    (id, document_id, question, answer, created_at, last_reviewed, review_count, mastery_level)
                VALUES (?, ?, ?, ?, ?, NULL, 0, 0.0)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(document_id)
            .bind(question)
            .bind(answer)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

            flashcards.push(flashcard);
        }

        tx.commit().await?;

        tracing::debug!(
            "Created {} flashcards for document: {}",
            flashcards.len(),
            document_id
        );
        Ok(flashcards)
    }

    /// List flashcards for a document in creation order
    pub async fn list_flashcards(&self, document_id: &str) -> Result<Vec<Flashcard>> {
        let flashcards = sqlx::query_as::<_, Flashcard>(
            r#"
            SELECT * FROM flashcards WHERE document_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(flashcards)
    }

    /// Get a flashcard by ID
    pub async fn get_flashcard(&self, id: &str) -> Result<Flashcard> {
        sqlx::query_as::<_, Flashcard>("SELECT * FROM flashcards WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flashcard not found: {}", id)))
    }

    /// Apply a review: bump the count, stamp the time, store the new
    /// mastery and append the matching performance metric.
    pub async fn record_flashcard_review(
        &self,
        id: &str,
        mastery_level: f64,
        metric: &NewMetric,
    ) -> Result<Flashcard> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let flashcard = sqlx::query_as::<_, Flashcard>(
            r#"
            UPDATE flashcards
            SET review_count = review_count + 1, last_reviewed = ?, mastery_level = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(clamp_unit(mastery_level))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Flashcard not found: {}", id)))?;

        insert_metric(&mut tx, &flashcard.document_id, metric, now).await?;

        tx.commit().await?;

        tracing::debug!(
            "Reviewed flashcard: {} (count: {}, mastery: {:.2})",
            id,
            flashcard.review_count,
            flashcard.mastery_level
        );
        Ok(flashcard)
    }

    /// Total and mastered flashcard counts for a document
    pub async fn flashcard_counts(&self, document_id: &str, threshold: f64) -> Result<(i64, i64)> {
        let counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(CASE WHEN mastery_level >= ? THEN 1 ELSE 0 END), 0)
            FROM flashcards WHERE document_id = ?
            "#,
        )
        .bind(threshold)
        .bind(document_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    // ===== Quiz results =====

    /// Store a graded quiz together with its per-topic metrics
    pub async fn record_quiz_result(
        &self,
        document_id: &str,
        difficulty: Difficulty,
        score: f64,
        total_questions: i64,
        metrics: &[NewMetric],
    ) -> Result<QuizResult> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query_as::<_, QuizResult>(
            r#"
            INSERT INTO quiz_results (id, document_id, difficulty, score, total_questions, completed_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(document_id)
        .bind(difficulty)
        .bind(clamp_unit(score))
        .bind(total_questions)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for metric in metrics {
            insert_metric(&mut tx, document_id, metric, now).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            "Recorded quiz result: {} for document: {} ({} metrics)",
            result.id,
            document_id,
            metrics.len()
        );
        Ok(result)
    }

    /// List quiz results for a document, oldest first
    pub async fn list_quiz_results(&self, document_id: &str) -> Result<Vec<QuizResult>> {
        let results = sqlx::query_as::<_, QuizResult>(
            r#"
            SELECT * FROM quiz_results WHERE document_id = ?
            ORDER BY completed_at ASC, rowid ASC
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }

    // ===== Performance metrics =====

    /// Append a single performance metric
    pub async fn record_metric(
        &self,
        document_id: &str,
        metric: &NewMetric,
    ) -> Result<PerformanceMetric> {
        let mut tx = self.pool.begin().await?;
        let recorded = insert_metric(&mut tx, document_id, metric, Utc::now()).await?;
        tx.commit().await?;
        Ok(recorded)
    }

    /// List performance metrics for a document, oldest first
    pub async fn list_metrics(&self, document_id: &str) -> Result<Vec<PerformanceMetric>> {
        let metrics = sqlx::query_as::<_, PerformanceMetric>(
            r#"
            SELECT * FROM performance_metrics WHERE document_id = ?
            ORDER BY recorded_at ASC, rowid ASC
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(metrics)
    }

    // ===== Revision plans =====

    /// Store a revision plan
    pub async fn create_revision_plan(
        &self,
        document_id: &str,
        plan_data: &PlanData,
        exam_date: Option<NaiveDate>,
    ) -> Result<RevisionPlan> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let encoded = serde_json::to_string(plan_data)?;

        let row = sqlx::query_as::<_, RevisionPlanRow>(
            r#"
            INSERT INTO revision_plans (id, document_id, plan_data, exam_date, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(document_id)
        .bind(&encoded)
        .bind(exam_date)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created revision plan: {} for document: {}", id, document_id);
        Ok(RevisionPlan::try_from(row)?)
    }

    /// List revision plans for a document, newest first
    pub async fn list_revision_plans(&self, document_id: &str) -> Result<Vec<RevisionPlan>> {
        let rows = sqlx::query_as::<_, RevisionPlanRow>(
            r#"
            SELECT * FROM revision_plans WHERE document_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| RevisionPlan::try_from(row).map_err(AppError::from))
            .collect()
    }
}

async fn insert_metric(
    tx: &mut Transaction<'_, Sqlite>,
    document_id: &str,
    metric: &NewMetric,
    recorded_at: DateTime<Utc>,
) -> Result<PerformanceMetric> {
    let recorded = sqlx::query_as::<_, PerformanceMetric>(
        r#"
        INSERT INTO performance_metrics (id, document_id, topic, score, metric_type, recorded_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(document_id)
    .bind(&metric.topic)
    .bind(clamp_unit(metric.score))
    .bind(metric.metric_type.as_str())
    .bind(recorded_at)
    .fetch_one(&mut **tx)
    .await?;

    Ok(recorded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_pool;

    async fn create_test_repo() -> Repository {
        Repository::new(memory_pool().await)
    }

    fn pairs(n: usize) -> Vec<(String, String)> {
        (1..=n)
            .map(|i| (format!("Question {}", i), format!("Answer {}", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_create_and_get_document() {
        let repo = create_test_repo().await;

        let doc = repo
            .create_document("notes.pdf", "Photosynthesis converts light.")
            .await
            .unwrap();
        assert_eq!(doc.filename, "notes.pdf");
        assert_eq!(doc.text_length, 30);

        let fetched = repo.get_document(&doc.id).await.unwrap();
        assert_eq!(fetched.id, doc.id);
        assert_eq!(fetched.text_content, "Photosynthesis converts light.");
    }

    #[tokio::test]
    async fn test_text_length_counts_characters() {
        let repo = create_test_repo().await;

        let doc = repo.create_document("é.docx", "héllo wörld").await.unwrap();
        assert_eq!(doc.text_length, 11);
    }

    #[tokio::test]
    async fn test_get_missing_document() {
        let repo = create_test_repo().await;

        let result = repo.get_document("missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(repo.ensure_document("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_list_documents_newest_first() {
        let repo = create_test_repo().await;

        for i in 1..=3 {
            repo.create_document(&format!("doc{}.pdf", i), "text")
                .await
                .unwrap();
        }

        let docs = repo.list_documents().await.unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].filename, "doc3.pdf");
        assert_eq!(docs[2].filename, "doc1.pdf");
    }

    #[tokio::test]
    async fn test_flashcards_start_unreviewed() {
        let repo = create_test_repo().await;
        let doc = repo.create_document("a.pdf", "text").await.unwrap();

        let created = repo.create_flashcards(&doc.id, &pairs(5)).await.unwrap();
        assert_eq!(created.len(), 5);

        let listed = repo.list_flashcards(&doc.id).await.unwrap();
        assert_eq!(listed.len(), 5);
        assert_eq!(listed[0].question, "Question 1");
        assert_eq!(listed[4].question, "Question 5");
        assert!(listed
            .iter()
            .all(|f| f.mastery_level == 0.0 && f.review_count == 0 && f.last_reviewed.is_none()));
    }

    #[tokio::test]
    async fn test_flashcards_require_document() {
        let repo = create_test_repo().await;

        let result = repo.create_flashcards("no-such-doc", &pairs(1)).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_flashcard_review() {
        let repo = create_test_repo().await;
        let doc = repo.create_document("a.pdf", "text").await.unwrap();
        let card = repo.create_flashcards(&doc.id, &pairs(1)).await.unwrap()[0].clone();

        let metric = NewMetric {
            topic: "Flashcards".to_string(),
            score: 1.0,
            metric_type: MetricType::Flashcard,
        };
        let reviewed = repo
            .record_flashcard_review(&card.id, 1.4, &metric)
            .await
            .unwrap();

        assert_eq!(reviewed.review_count, 1);
        assert_eq!(reviewed.mastery_level, 1.0);
        assert!(reviewed.last_reviewed.is_some());

        let metrics = repo.list_metrics(&doc.id).await.unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].metric_type, "flashcard");

        let (total, mastered) = repo.flashcard_counts(&doc.id, 0.8).await.unwrap();
        assert_eq!((total, mastered), (1, 1));
    }

    #[tokio::test]
    async fn test_review_missing_flashcard() {
        let repo = create_test_repo().await;
        let metric = NewMetric {
            topic: "Flashcards".to_string(),
            score: 0.0,
            metric_type: MetricType::Flashcard,
        };

        let result = repo.record_flashcard_review("nope", 0.5, &metric).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_quiz_result_with_metrics() {
        let repo = create_test_repo().await;
        let doc = repo.create_document("a.pdf", "text").await.unwrap();

        let metrics = vec![
            NewMetric {
                topic: "Cells".to_string(),
                score: 0.5,
                metric_type: MetricType::Quiz,
            },
            NewMetric {
                topic: "Energy".to_string(),
                score: 1.0,
                metric_type: MetricType::Quiz,
            },
        ];

        let result = repo
            .record_quiz_result(&doc.id, Difficulty::Medium, 0.75, 4, &metrics)
            .await
            .unwrap();
        assert_eq!(result.difficulty, Difficulty::Medium);
        assert_eq!(result.total_questions, 4);

        let results = repo.list_quiz_results(&doc.id).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 0.75);

        let stored = repo.list_metrics(&doc.id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|m| m.metric_type == "quiz"));
    }

    #[tokio::test]
    async fn test_scores_are_clamped_on_write() {
        let repo = create_test_repo().await;
        let doc = repo.create_document("a.pdf", "text").await.unwrap();

        let result = repo
            .record_quiz_result(&doc.id, Difficulty::Easy, 3.0, 1, &[])
            .await
            .unwrap();
        assert_eq!(result.score, 1.0);

        let metric = repo
            .record_metric(
                &doc.id,
                &NewMetric {
                    topic: "T".to_string(),
                    score: -2.0,
                    metric_type: MetricType::Quiz,
                },
            )
            .await
            .unwrap();
        assert_eq!(metric.score, 0.0);
    }

    #[tokio::test]
    async fn test_revision_plan_round_trip() {
        let repo = create_test_repo().await;
        let doc = repo.create_document("a.pdf", "text").await.unwrap();

        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let plan_data = PlanData {
            summary: "Two day plan".to_string(),
            exam_date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
            days_until_exam: 2,
            plan: vec![
                PlanDay {
                    day: 1,
                    date: start,
                    focus: Focus::High,
                    duration_minutes: 90,
                    topics: vec!["Cells".to_string()],
                },
                PlanDay {
                    day: 2,
                    date: start.succ_opt().unwrap(),
                    focus: Focus::Low,
                    duration_minutes: 30,
                    topics: vec!["Cells".to_string(), "Energy".to_string()],
                },
            ],
        };

        let created = repo
            .create_revision_plan(&doc.id, &plan_data, Some(plan_data.exam_date))
            .await
            .unwrap();
        assert_eq!(created.plan_data, plan_data);

        let plans = repo.list_revision_plans(&doc.id).await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].plan_data, plan_data);
        assert_eq!(plans[0].exam_date, Some(plan_data.exam_date));
    }
}
