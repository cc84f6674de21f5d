//! Shared test fixtures: in-memory fakes for the ticket store and the
//! generative service, plus pipeline/state builders.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use prodsync_api::models::{CanonicalOption, IssueSummary};
use prodsync_api::services::{
    ExtractorSettings, ProductExtractor, RecordUpdater, ResolutionOrchestrator, VocabularyWriter,
};
use prodsync_api::types::{GenerateError, StoreError, TextGenerator, TicketStore};
use prodsync_api::AppState;
use prodsync_common::ServiceConfig;

pub const FIELD_ID: &str = "customfield_10878";
pub const PROJECT_KEY: &str = "PROD";

pub fn default_strip_patterns() -> Vec<String> {
    ["annual", "monthly", "yearly", "anual", "mensal", "semestral"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

/// How the fake store reacts to option creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateBehavior {
    /// Create succeeds and the option is visible on the next read
    Append,
    /// Create reports a uniqueness conflict; the option is visible on the
    /// next read (another actor won the race)
    Conflict,
    /// Create succeeds but the option never becomes visible
    Invisible,
}

/// Per-operation call counters
#[derive(Debug, Default)]
pub struct StoreCalls {
    pub project_summaries: AtomicUsize,
    pub field_options: AtomicUsize,
    pub create_field_option: AtomicUsize,
    pub set_field_value: AtomicUsize,
    pub create_issue: AtomicUsize,
    pub add_comment: AtomicUsize,
}

/// In-memory `TicketStore` fake with scriptable failure modes
pub struct FakeStore {
    summaries: Vec<IssueSummary>,
    options: Mutex<Vec<CanonicalOption>>,
    create_behavior: CreateBehavior,
    fail_field_options: bool,
    remaining_update_failures: AtomicUsize,
    next_id: AtomicUsize,
    pub calls: StoreCalls,
    pub updates: Mutex<Vec<(String, String)>>,
    pub comments: Mutex<Vec<(String, String)>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            summaries: Vec::new(),
            options: Mutex::new(Vec::new()),
            create_behavior: CreateBehavior::Append,
            fail_field_options: false,
            remaining_update_failures: AtomicUsize::new(0),
            next_id: AtomicUsize::new(10000),
            calls: StoreCalls::default(),
            updates: Mutex::new(Vec::new()),
            comments: Mutex::new(Vec::new()),
        }
    }

    pub fn with_summaries(mut self, pairs: &[(&str, &str)]) -> Self {
        self.summaries = pairs
            .iter()
            .map(|(key, summary)| IssueSummary {
                key: key.to_string(),
                summary: summary.to_string(),
            })
            .collect();
        self
    }

    pub fn with_options(self, values: &[&str]) -> Self {
        {
            let mut options = self.options.lock().unwrap();
            for value in values {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                options.push(CanonicalOption {
                    id: id.to_string(),
                    value: value.to_string(),
                });
            }
        }
        self
    }

    pub fn with_create_behavior(mut self, behavior: CreateBehavior) -> Self {
        self.create_behavior = behavior;
        self
    }

    pub fn with_failing_field_options(mut self) -> Self {
        self.fail_field_options = true;
        self
    }

    pub fn with_update_failures(self, failures: usize) -> Self {
        self.remaining_update_failures
            .store(failures, Ordering::SeqCst);
        self
    }

    pub fn option_values(&self) -> Vec<String> {
        self.options
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.value.clone())
            .collect()
    }

    fn mint_option(&self, value: &str) -> CanonicalOption {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        CanonicalOption {
            id: id.to_string(),
            value: value.to_string(),
        }
    }
}

#[async_trait]
impl TicketStore for FakeStore {
    async fn project_summaries(&self, _project_key: &str) -> Result<Vec<IssueSummary>, StoreError> {
        self.calls.project_summaries.fetch_add(1, Ordering::SeqCst);
        Ok(self.summaries.clone())
    }

    async fn field_options(&self, _field_id: &str) -> Result<Vec<CanonicalOption>, StoreError> {
        self.calls.field_options.fetch_add(1, Ordering::SeqCst);
        if self.fail_field_options {
            return Err(StoreError::Api(500, "field context unavailable".to_string()));
        }
        Ok(self.options.lock().unwrap().clone())
    }

    async fn create_field_option(
        &self,
        _field_id: &str,
        value: &str,
    ) -> Result<CanonicalOption, StoreError> {
        self.calls.create_field_option.fetch_add(1, Ordering::SeqCst);
        let option = self.mint_option(value);

        match self.create_behavior {
            CreateBehavior::Append => {
                let mut options = self.options.lock().unwrap();
                // Emulate the store's case-insensitive uniqueness constraint.
                if options.iter().any(|o| o.value.eq_ignore_ascii_case(value)) {
                    return Err(StoreError::Conflict(format!(
                        "The option '{}' already exists",
                        value
                    )));
                }
                options.push(option.clone());
                Ok(option)
            }
            CreateBehavior::Conflict => {
                self.options.lock().unwrap().push(option);
                Err(StoreError::Conflict(format!(
                    "The option '{}' already exists",
                    value
                )))
            }
            CreateBehavior::Invisible => Ok(option),
        }
    }

    async fn set_field_value(
        &self,
        issue_key: &str,
        _field_id: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        self.calls.set_field_value.fetch_add(1, Ordering::SeqCst);

        let remaining = self.remaining_update_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_update_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Network("connection reset by peer".to_string()));
        }

        self.updates
            .lock()
            .unwrap()
            .push((issue_key.to_string(), value.to_string()));
        Ok(())
    }

    async fn create_issue(&self, _project_key: &str, _summary: &str) -> Result<String, StoreError> {
        let count = self.calls.create_issue.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}-{}", PROJECT_KEY, 100 + count))
    }

    async fn add_comment(&self, issue_key: &str, body: &str) -> Result<(), StoreError> {
        self.calls.add_comment.fetch_add(1, Ordering::SeqCst);
        self.comments
            .lock()
            .unwrap()
            .push((issue_key.to_string(), body.to_string()));
        Ok(())
    }
}

/// Scripted `TextGenerator` fake; an exhausted script fails the call
pub struct FakeGenerator {
    replies: Mutex<VecDeque<String>>,
    pub calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GenerateError::Network("script exhausted".to_string()))
    }
}

/// Wire a pipeline over fakes with test-friendly timings (no propagation
/// delay, no inter-retry delay, 3 update attempts).
pub fn orchestrator(
    store: Arc<FakeStore>,
    generator: Option<Arc<FakeGenerator>>,
    require_validation: bool,
) -> ResolutionOrchestrator {
    let store: Arc<dyn TicketStore> = store;
    let generator = generator.map(|g| g as Arc<dyn TextGenerator>);

    let extractor = ProductExtractor::new(
        generator,
        ExtractorSettings {
            strip_patterns: default_strip_patterns(),
            require_validation,
        },
    );
    let vocabulary = VocabularyWriter::new(store.clone(), FIELD_ID.to_string());
    let updater = RecordUpdater::new(store.clone(), FIELD_ID.to_string(), 3, Duration::ZERO);

    ResolutionOrchestrator::new(
        store,
        extractor,
        vocabulary,
        updater,
        PROJECT_KEY.to_string(),
        FIELD_ID.to_string(),
        Duration::ZERO,
    )
}

pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        jira_base_url: "https://example.atlassian.net".to_string(),
        jira_email: "bot@example.com".to_string(),
        jira_api_token: "token".to_string(),
        jira_project_key: PROJECT_KEY.to_string(),
        jira_issue_type: "Task".to_string(),
        product_field_id: FIELD_ID.to_string(),
        gemini_api_key: None,
        gemini_model: "gemini-1.5-flash".to_string(),
        require_validation: false,
        strip_patterns: default_strip_patterns(),
        propagation_delay_ms: 0,
        update_retry_attempts: 3,
        update_retry_delay_ms: 0,
        port: 0,
    }
}

/// App state over a fake store (no generative service)
pub fn app_state(store: Arc<FakeStore>) -> AppState {
    let pipeline = orchestrator(store.clone(), None, false);
    AppState::new(Arc::new(pipeline), store, test_config())
}
