//! Integration tests for Study Agent
//!
//! These tests run the services against an on-disk database with a
//! scripted completion client:
//! - Upload, flashcards, grading and analytics end to end
//! - Revision plans spanning a fixed exam date
//! - Data surviving a pool reopen

use chrono::{Duration, Utc};
use std::io::Write;
use std::sync::Arc;
use study_agent::app::AppState;
use study_agent::database::{create_pool, Difficulty, Repository};
use study_agent::generation::{QaPair, StubClient};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Helper to create an app state over a fresh on-disk database
async fn create_test_app(stub: Arc<StubClient>) -> (AppState, Repository, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("study.db");

    let pool = create_pool(&db_path).await.unwrap();
    let state = AppState::new(pool.clone(), stub, 10 * 1024 * 1024);

    (state, Repository::new(pool), temp_dir)
}

/// Minimal DOCX with one paragraph per line
fn docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

fn five_flashcards() -> String {
    let cards: Vec<QaPair> = (1..=5)
        .map(|i| QaPair::new(format!("Question {}", i), format!("Answer {}", i)))
        .collect();
    serde_json::json!({ "flashcards": cards }).to_string()
}

#[tokio::test]
async fn test_study_session_end_to_end() {
    let stub = Arc::new(StubClient::new());
    let (state, repo, _temp) = create_test_app(stub.clone()).await;

    // Upload
    let bytes = docx(&[
        "Chapter 1: Thermodynamics",
        "Energy cannot be created or destroyed.",
        "Entropy of an isolated system never decreases.",
    ]);
    let document = state
        .documents_service
        .save("physics.docx", bytes)
        .await
        .unwrap();

    assert!(document.text_length > 0);
    assert_eq!(
        document.text_length,
        document.text_content.chars().count() as i64
    );
    let fetched = state.documents_service.get(&document.id).await.unwrap();
    assert_eq!(fetched.text_content, document.text_content);

    // Flashcards
    stub.push_reply(five_flashcards());
    let pairs = state
        .flashcards_service
        .generate(&document.id)
        .await
        .unwrap();
    assert_eq!(pairs.len(), 5);

    let stored = state.flashcards_service.list(&document.id).await.unwrap();
    assert_eq!(stored.len(), 5);
    assert!(stored.iter().all(|card| card.mastery_level == 0.0));
    let questions: Vec<&str> = stored.iter().map(|c| c.question.as_str()).collect();
    let expected: Vec<&str> = pairs.iter().map(|p| p.q.as_str()).collect();
    assert_eq!(questions, expected);

    // Quiz, all answers correct
    let quiz: Vec<QaPair> = (1..=5)
        .map(|i| QaPair::new(format!("Q{}", i), format!("A{}", i)))
        .collect();
    let answers: Vec<String> = quiz.iter().map(|p| p.a.clone()).collect();
    stub.push_reply(
        serde_json::json!({
            "results": (0..5)
                .map(|i| {
                    let topic = if i < 3 { "Energy" } else { "Entropy" };
                    serde_json::json!({"is_correct": true, "feedback": "Correct.", "topic": topic})
                })
                .collect::<Vec<_>>()
        })
        .to_string(),
    );

    let report = state
        .quiz_service
        .grade(&document.id, Difficulty::Easy, &quiz, &answers)
        .await
        .unwrap();
    assert_eq!(report.results.len(), 5);
    assert_eq!(report.score, 1.0);
    assert_eq!(report.next_difficulty, Difficulty::Medium);

    let results = repo.list_quiz_results(&document.id).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].total_questions, 5);

    // Review one card until mastered
    for _ in 0..5 {
        state
            .flashcards_service
            .review(&stored[0].id, true)
            .await
            .unwrap();
    }

    // Analytics
    let stats = state.analytics_service.stats(&document.id).await.unwrap();
    assert_eq!(stats.total_quizzes, 1);
    assert_eq!(stats.average_score, 1.0);
    assert_eq!(stats.total_flashcards, 5);
    assert_eq!(stats.mastered_flashcards, 1);
    assert_eq!(stats.topic_performance["Energy"], 1.0);
    assert_eq!(stats.topic_performance["Entropy"], 1.0);
    assert_eq!(stats.metric_types["flashcard"].count, 5);

    assert_eq!(stub.call_count(), 2);
}

#[tokio::test]
async fn test_average_score_over_several_quizzes() {
    let stub = Arc::new(StubClient::new());
    let (state, _repo, _temp) = create_test_app(stub.clone()).await;
    let document = state
        .documents_service
        .save("notes.docx", docx(&["Some study notes."]))
        .await
        .unwrap();

    let quiz = vec![QaPair::new("Q1", "A1"), QaPair::new("Q2", "A2")];
    let answers = vec!["A1".to_string(), "A2".to_string()];
    for correct in [[true, true], [true, false], [false, false]] {
        stub.push_reply(
            serde_json::json!({
                "results": correct
                    .iter()
                    .map(|c| serde_json::json!({"is_correct": c, "feedback": ""}))
                    .collect::<Vec<_>>()
            })
            .to_string(),
        );
        state
            .quiz_service
            .grade(&document.id, Difficulty::Medium, &quiz, &answers)
            .await
            .unwrap();
    }

    let stats = state.analytics_service.stats(&document.id).await.unwrap();
    assert_eq!(stats.total_quizzes, 3);
    assert!((stats.average_score - 0.5).abs() < 1e-9);
    assert_eq!(stats.topic_performance.len(), 1);
}

#[tokio::test]
async fn test_plan_spans_exam_window() {
    let stub = Arc::new(StubClient::new());
    let (state, _repo, _temp) = create_test_app(stub.clone()).await;
    let document = state
        .documents_service
        .save("history.docx", docx(&["The Treaty of Westphalia, 1648."]))
        .await
        .unwrap();

    stub.push_reply(
        r#"{"topics": [
            {"name": "Treaties", "weight": 9, "description": "Peace agreements"},
            {"name": "Dates", "weight": 4, "description": "Key years"}
        ]}"#,
    );

    let exam = Utc::now().date_naive() + Duration::days(7);
    let plan = state
        .planner_service
        .create_plan(&document.id, Some(&exam.to_string()), None)
        .await
        .unwrap();

    assert_eq!(plan.exam_date, exam);
    assert!(plan.plan.len() <= 7);
    assert!(plan.plan.iter().all(|day| day.duration_minutes > 0));
    assert!(plan.plan.iter().all(|day| day.date < exam));
    assert_eq!(plan.plan[0].topics, vec!["Treaties"]);

    let stored = state.planner_service.list_plans(&document.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].plan_data, plan);
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("study.db");

    let document_id = {
        let pool = create_pool(&db_path).await.unwrap();
        let repo = Repository::new(pool.clone());
        let document = repo
            .create_document("kept.eml", "Persisted text")
            .await
            .unwrap();
        pool.close().await;
        document.id
    };

    let pool = create_pool(&db_path).await.unwrap();
    let repo = Repository::new(pool);
    let document = repo.get_document(&document_id).await.unwrap();
    assert_eq!(document.text_content, "Persisted text");
    assert_eq!(repo.list_documents().await.unwrap().len(), 1);
}
