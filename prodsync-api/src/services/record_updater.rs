//! Issue field update with bounded retry
//!
//! Each attempt is a full independent write of an absolute value, so the
//! operation is naturally idempotent across retries.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::types::{StoreError, TicketStore};
use crate::utils::retry::retry_fixed;

/// Field update errors
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Retry budget exhausted
    #[error("Field update for {issue_key} failed after {attempts} attempts: {last_error}")]
    Exhausted {
        issue_key: String,
        attempts: u32,
        last_error: StoreError,
    },
}

/// Writes the resolved canonical value onto the originating issue
pub struct RecordUpdater {
    store: Arc<dyn TicketStore>,
    field_id: String,
    attempts: u32,
    delay: Duration,
}

impl RecordUpdater {
    pub fn new(store: Arc<dyn TicketStore>, field_id: String, attempts: u32, delay: Duration) -> Self {
        Self {
            store,
            field_id,
            attempts,
            delay,
        }
    }

    /// Set the field to `value`, retrying transient failures up to the
    /// configured attempt budget with a fixed inter-attempt delay.
    pub async fn update_field(&self, issue_key: &str, value: &str) -> Result<(), UpdateError> {
        retry_fixed("issue field update", self.attempts, self.delay, || {
            self.store.set_field_value(issue_key, &self.field_id, value)
        })
        .await
        .map_err(|last_error| UpdateError::Exhausted {
            issue_key: issue_key.to_string(),
            attempts: self.attempts,
            last_error,
        })
    }
}
