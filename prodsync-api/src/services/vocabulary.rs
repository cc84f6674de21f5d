//! Vocabulary option creation
//!
//! Idempotent append to the external single-select field's option set. A
//! uniqueness conflict means another actor already created the value; the
//! desired end state holds either way.

use std::sync::Arc;
use tracing::{debug, info};

use crate::types::{StoreError, TicketStore};

/// Creates canonical options, tolerating concurrent creation
pub struct VocabularyWriter {
    store: Arc<dyn TicketStore>,
    field_id: String,
}

impl VocabularyWriter {
    pub fn new(store: Arc<dyn TicketStore>, field_id: String) -> Self {
        Self { store, field_id }
    }

    /// Ensure an option with the given value exists. A conflict reported by
    /// the store is success; any other error propagates unchanged.
    ///
    /// The store may not reflect the new option to subsequent reads
    /// immediately; the caller owns the propagation wait.
    pub async fn ensure_option(&self, value: &str) -> Result<(), StoreError> {
        match self.store.create_field_option(&self.field_id, value).await {
            Ok(option) => {
                info!(
                    field = %self.field_id,
                    value = %option.value,
                    id = %option.id,
                    "Created vocabulary option"
                );
                Ok(())
            }
            Err(StoreError::Conflict(message)) => {
                debug!(
                    field = %self.field_id,
                    value = %value,
                    message = %message,
                    "Option already exists, treating as success"
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
