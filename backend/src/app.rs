//! Application state and initialization
//!
//! This module builds the central application state. The completion
//! client is constructed here and handed to every service that needs
//! it, so tests can swap in a scripted client.

use crate::config::Settings;
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::generation::{CompletionClient, GenerationGateway, OpenAiClient};
use crate::services::{
    AnalyticsService, DocumentsService, DoubtService, FlashcardsService, PlannerService,
    QuizService,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub documents_service: DocumentsService,
    pub flashcards_service: FlashcardsService,
    pub quiz_service: QuizService,
    pub planner_service: PlannerService,
    pub doubt_service: DoubtService,
    pub analytics_service: AnalyticsService,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        client: Arc<dyn CompletionClient>,
        max_upload_bytes: usize,
    ) -> Self {
        let repo = Repository::new(pool);
        let gateway = GenerationGateway::new(client);

        Self {
            documents_service: DocumentsService::new(repo.clone(), max_upload_bytes),
            flashcards_service: FlashcardsService::new(repo.clone(), gateway.clone()),
            quiz_service: QuizService::new(repo.clone(), gateway.clone()),
            planner_service: PlannerService::new(repo.clone(), gateway.clone()),
            doubt_service: DoubtService::new(repo.clone(), gateway),
            analytics_service: AnalyticsService::new(repo),
            max_upload_bytes,
        }
    }
}

/// Application setup - called once on startup
pub async fn setup(settings: &Settings) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("Database: {:?}", settings.database);

    let pool = create_pool(&settings.database).await?;
    let client = OpenAiClient::from_settings(settings)?;

    tracing::info!(
        "Completion service: {} (model: {}, timeout: {}s)",
        settings.base_url,
        settings.model,
        settings.request_timeout_secs
    );

    let state = AppState::new(pool, Arc::new(client), settings.max_upload_bytes);

    tracing::info!("Application initialized successfully");

    Ok(state)
}
