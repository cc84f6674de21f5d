//! End-to-end resolution orchestration
//!
//! Composes short-circuit lookup, extraction, vocabulary matching, option
//! creation, and the issue field update. Owns the propagation-delay policy
//! for the eventually consistent option store: after a creation, wait once,
//! re-fetch, and re-match; an option still invisible after the wait is a
//! fatal outcome because the stored representation cannot be confirmed.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{IssueSummary, ResolutionOutcome, ResolutionResult};
use crate::services::extractor::ProductExtractor;
use crate::services::matcher::find_match;
use crate::services::normalizer::normalize;
use crate::services::record_updater::{RecordUpdater, UpdateError};
use crate::services::vocabulary::VocabularyWriter;
use crate::types::{StoreError, TicketStore};

/// Resolution pipeline errors
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Ticket store error: {0}")]
    Store(#[from] StoreError),

    /// Created option not visible after the propagation wait
    #[error("Created option \"{value}\" could not be confirmed after the propagation wait")]
    PropagationTimeout { value: String },

    #[error(transparent)]
    Update(#[from] UpdateError),
}

/// Orchestrates one resolution request end to end
pub struct ResolutionOrchestrator {
    store: Arc<dyn TicketStore>,
    extractor: ProductExtractor,
    vocabulary: VocabularyWriter,
    updater: RecordUpdater,
    project_key: String,
    field_id: String,
    propagation_delay: Duration,
}

impl ResolutionOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn TicketStore>,
        extractor: ProductExtractor,
        vocabulary: VocabularyWriter,
        updater: RecordUpdater,
        project_key: String,
        field_id: String,
        propagation_delay: Duration,
    ) -> Self {
        Self {
            store,
            extractor,
            vocabulary,
            updater,
            project_key,
            field_id,
            propagation_delay,
        }
    }

    /// Resolve the product for an issue summary and write it back.
    pub async fn resolve(
        &self,
        issue_key: &str,
        summary: &str,
    ) -> Result<ResolutionOutcome, ResolveError> {
        // Existing records first: when a known summary already names the
        // product, skip extraction and creation entirely.
        if let Some(existing) = self.short_circuit(issue_key, summary).await? {
            info!(
                issue = %issue_key,
                value = %existing,
                "Summary matched an existing record, short-circuiting"
            );
            self.updater.update_field(issue_key, &existing).await?;
            return Ok(ResolutionOutcome::Resolved(ResolutionResult {
                final_value: existing,
                was_created: false,
                matched_option: None,
            }));
        }

        let Some(candidate) = self.extractor.extract(summary).await else {
            info!(issue = %issue_key, "No product identified in summary");
            return Ok(ResolutionOutcome::NoProductIdentified);
        };
        debug!(
            issue = %issue_key,
            candidate = %candidate.text,
            source = ?candidate.source,
            validated = candidate.validated,
            "Candidate extracted"
        );

        let options = self.store.field_options(&self.field_id).await?;
        if let Some(matched) = find_match(&candidate.text, &options) {
            let option = matched.option.clone();
            info!(
                issue = %issue_key,
                candidate = %candidate.text,
                value = %option.value,
                tier = ?matched.tier,
                "Candidate matched an existing option"
            );
            self.updater.update_field(issue_key, &option.value).await?;
            return Ok(ResolutionOutcome::Resolved(ResolutionResult {
                final_value: option.value.clone(),
                was_created: false,
                matched_option: Some(option),
            }));
        }

        // No match: append to the vocabulary, then confirm the stored
        // representation (its casing may differ from the candidate's) with
        // one delayed re-read.
        info!(
            issue = %issue_key,
            candidate = %candidate.text,
            "No existing option matched, creating"
        );
        self.vocabulary.ensure_option(&candidate.text).await?;
        tokio::time::sleep(self.propagation_delay).await;

        let options = self.store.field_options(&self.field_id).await?;
        let Some(matched) = find_match(&candidate.text, &options) else {
            return Err(ResolveError::PropagationTimeout {
                value: candidate.text,
            });
        };
        let option = matched.option.clone();

        self.updater.update_field(issue_key, &option.value).await?;
        Ok(ResolutionOutcome::Resolved(ResolutionResult {
            final_value: option.value.clone(),
            was_created: true,
            matched_option: Some(option),
        }))
    }

    /// Scan every pre-existing record summary in the project for a
    /// containment match (either direction) with the incoming summary,
    /// preferring the longest matching existing summary. The originating
    /// issue itself is excluded from the scan.
    async fn short_circuit(
        &self,
        issue_key: &str,
        summary: &str,
    ) -> Result<Option<String>, StoreError> {
        let summaries = self.store.project_summaries(&self.project_key).await?;
        let needle = normalize(summary);
        if needle.is_empty() {
            return Ok(None);
        }

        let mut best: Option<&IssueSummary> = None;
        for existing in &summaries {
            if existing.key == issue_key {
                continue;
            }
            let haystack = normalize(&existing.summary);
            if haystack.is_empty() {
                continue;
            }
            if needle.contains(&haystack) || haystack.contains(&needle) {
                if best.map_or(true, |b| existing.summary.len() > b.summary.len()) {
                    best = Some(existing);
                }
            }
        }

        Ok(best.map(|b| b.summary.clone()))
    }
}
