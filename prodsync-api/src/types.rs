//! Capability traits for external collaborators
//!
//! The ticket store and the generative text service are reached only through
//! these traits, so the pipeline can be exercised against deterministic
//! in-memory fakes without network access.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CanonicalOption, IssueSummary};

/// Ticket store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation on option creation; the value already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Generative text service errors
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Empty response")]
    Empty,

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Narrow operation set used against the external ticketing system.
///
/// All durable state lives behind this trait; the pipeline holds no state
/// between invocations.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// All issue summaries of a project (paginated scan, accumulated)
    async fn project_summaries(&self, project_key: &str) -> Result<Vec<IssueSummary>, StoreError>;

    /// Current option set of a single-select field
    async fn field_options(&self, field_id: &str) -> Result<Vec<CanonicalOption>, StoreError>;

    /// Create a new field option. A uniqueness violation surfaces as
    /// `StoreError::Conflict`.
    async fn create_field_option(
        &self,
        field_id: &str,
        value: &str,
    ) -> Result<CanonicalOption, StoreError>;

    /// Set an absolute field value on an issue
    async fn set_field_value(
        &self,
        issue_key: &str,
        field_id: &str,
        value: &str,
    ) -> Result<(), StoreError>;

    /// Create an issue, returning its key
    async fn create_issue(&self, project_key: &str, summary: &str) -> Result<String, StoreError>;

    /// Add a plain-text comment to an issue
    async fn add_comment(&self, issue_key: &str, body: &str) -> Result<(), StoreError>;
}

/// Best-effort generative text capability. Advisory only; every caller has
/// a deterministic fallback.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}
