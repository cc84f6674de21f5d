//! prodsync-api library interface
//!
//! Exposes the application state, router, and pipeline services for
//! integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod services;
pub mod types;
pub mod utils;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use prodsync_common::ServiceConfig;

use crate::services::{
    ExtractorSettings, GeminiClient, JiraClient, ProductExtractor, RecordUpdater,
    ResolutionOrchestrator, VocabularyWriter,
};
use crate::types::{TextGenerator, TicketStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// End-to-end resolution pipeline
    pub orchestrator: Arc<ResolutionOrchestrator>,
    /// Ticket store, used directly by the issue intake handler
    pub store: Arc<dyn TicketStore>,
    /// Resolved service configuration
    pub config: ServiceConfig,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last resolution error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<ResolutionOrchestrator>,
        store: Arc<dyn TicketStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            orchestrator,
            store,
            config,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Build the production state: Jira client, optional Gemini client, and
    /// the pipeline wired per the resolved configuration.
    pub fn from_config(config: ServiceConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn TicketStore> = Arc::new(JiraClient::new(
            &config.jira_base_url,
            &config.jira_email,
            &config.jira_api_token,
            &config.jira_issue_type,
        )?);

        let generator: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
            Some(key) => Some(Arc::new(GeminiClient::new(
                key.clone(),
                config.gemini_model.clone(),
            )?)),
            None => {
                tracing::warn!(
                    "No Gemini API key configured; extraction will use structural seeds only"
                );
                None
            }
        };

        let extractor = ProductExtractor::new(
            generator,
            ExtractorSettings {
                strip_patterns: config.strip_patterns.clone(),
                require_validation: config.require_validation,
            },
        );
        let vocabulary = VocabularyWriter::new(store.clone(), config.product_field_id.clone());
        let updater = RecordUpdater::new(
            store.clone(),
            config.product_field_id.clone(),
            config.update_retry_attempts,
            Duration::from_millis(config.update_retry_delay_ms),
        );
        let orchestrator = ResolutionOrchestrator::new(
            store.clone(),
            extractor,
            vocabulary,
            updater,
            config.jira_project_key.clone(),
            config.product_field_id.clone(),
            Duration::from_millis(config.propagation_delay_ms),
        );

        Ok(Self::new(Arc::new(orchestrator), store, config))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::resolve_routes())
        .merge(api::issue_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
