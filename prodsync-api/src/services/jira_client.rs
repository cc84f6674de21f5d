//! Jira REST API client
//!
//! Implements the narrow operation set the pipeline uses: paginated summary
//! scan, field option read/create, field value write, issue creation, and
//! commenting. Basic auth with email + API token, per-request rate limiting.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::models::{CanonicalOption, IssueSummary};
use crate::types::{StoreError, TicketStore};

const USER_AGENT: &str = "prodsync/0.1.0 (product field resolution)";
const RATE_LIMIT_MS: u64 = 200; // 5 requests per second
const PAGE_SIZE: u32 = 100;

/// Substring Jira uses to report an option uniqueness violation
const OPTION_EXISTS_MARKER: &str = "already exists";

/// Issue search page
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(rename = "startAt")]
    start_at: u32,
    total: u32,
    issues: Vec<SearchIssue>,
}

#[derive(Debug, Deserialize)]
struct SearchIssue {
    key: String,
    fields: SearchFields,
}

#[derive(Debug, Deserialize)]
struct SearchFields {
    summary: Option<String>,
}

/// Field option context page
#[derive(Debug, Deserialize)]
struct OptionPage {
    values: Vec<OptionDto>,
    #[serde(rename = "isLast")]
    is_last: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OptionDto {
    id: String,
    value: String,
}

/// POST option response: `{"options": [{"id": ..., "value": ...}]}`
#[derive(Debug, Deserialize)]
struct CreatedOptions {
    options: Vec<OptionDto>,
}

/// POST issue response
#[derive(Debug, Deserialize)]
struct CreatedIssue {
    key: String,
}

impl From<OptionDto> for CanonicalOption {
    fn from(dto: OptionDto) -> Self {
        CanonicalOption {
            id: dto.id,
            value: dto.value,
        }
    }
}

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with the rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Jira rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Jira REST client
pub struct JiraClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    base_url: String,
    email: String,
    api_token: String,
    issue_type: String,
}

impl JiraClient {
    pub fn new(
        base_url: &str,
        email: &str,
        api_token: &str,
        issue_type: &str,
    ) -> Result<Self, StoreError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
            api_token: api_token.to_string(),
            issue_type: issue_type.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success response into a typed error, attaching the
    /// upstream diagnostic payload.
    async fn error_for(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => StoreError::Auth(body),
            404 => StoreError::NotFound(body),
            code => StoreError::Api(code, body),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, StoreError> {
        self.rate_limiter.wait().await;

        let response = self
            .http_client
            .get(self.url(path))
            .basic_auth(&self.email, Some(&self.api_token))
            .query(query)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }

    async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, StoreError> {
        self.rate_limiter.wait().await;

        let response = self
            .http_client
            .request(method, self.url(path))
            .basic_auth(&self.email, Some(&self.api_token))
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(response)
    }
}

#[async_trait]
impl TicketStore for JiraClient {
    /// Accumulate every issue summary of the project via the paginated
    /// search endpoint.
    async fn project_summaries(&self, project_key: &str) -> Result<Vec<IssueSummary>, StoreError> {
        let jql = format!("project={}", project_key);
        let mut summaries = Vec::new();
        let mut start_at: u32 = 0;

        loop {
            let page: SearchPage = self
                .get_json(
                    "/rest/api/3/search",
                    &[
                        ("jql", jql.clone()),
                        ("fields", "summary".to_string()),
                        ("maxResults", PAGE_SIZE.to_string()),
                        ("startAt", start_at.to_string()),
                    ],
                )
                .await?;

            let fetched = page.issues.len() as u32;
            summaries.extend(page.issues.into_iter().filter_map(|issue| {
                issue.fields.summary.map(|summary| IssueSummary {
                    key: issue.key,
                    summary,
                })
            }));

            if fetched == 0 || page.start_at + fetched >= page.total {
                break;
            }
            start_at = page.start_at + fetched;
        }

        tracing::debug!(
            project = %project_key,
            count = summaries.len(),
            "Fetched project summaries"
        );

        Ok(summaries)
    }

    async fn field_options(&self, field_id: &str) -> Result<Vec<CanonicalOption>, StoreError> {
        let path = format!("/rest/api/3/field/{}/context/option", field_id);
        let mut options = Vec::new();
        let mut start_at: u32 = 0;

        loop {
            let page: OptionPage = self
                .get_json(
                    &path,
                    &[
                        ("maxResults", PAGE_SIZE.to_string()),
                        ("startAt", start_at.to_string()),
                    ],
                )
                .await?;

            let fetched = page.values.len() as u32;
            options.extend(page.values.into_iter().map(CanonicalOption::from));

            if fetched == 0 || page.is_last.unwrap_or(true) {
                break;
            }
            start_at += fetched;
        }

        tracing::debug!(field = %field_id, count = options.len(), "Fetched field options");

        Ok(options)
    }

    async fn create_field_option(
        &self,
        field_id: &str,
        value: &str,
    ) -> Result<CanonicalOption, StoreError> {
        let path = format!("/rest/api/3/field/{}/context/option", field_id);
        let response = self
            .send_json(
                reqwest::Method::POST,
                &path,
                json!({ "options": [{ "value": value }] }),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Uniqueness violations surface as a conflict so callers can
            // treat "the option exists" as the desired end state.
            if body.to_lowercase().contains(OPTION_EXISTS_MARKER) {
                return Err(StoreError::Conflict(body));
            }
            return match status.as_u16() {
                401 | 403 => Err(StoreError::Auth(body)),
                404 => Err(StoreError::NotFound(body)),
                code => Err(StoreError::Api(code, body)),
            };
        }

        let created: CreatedOptions = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        created
            .options
            .into_iter()
            .next()
            .map(CanonicalOption::from)
            .ok_or_else(|| StoreError::Parse("Create option response had no options".to_string()))
    }

    async fn set_field_value(
        &self,
        issue_key: &str,
        field_id: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let path = format!("/rest/api/3/issue/{}", issue_key);
        let response = self
            .send_json(
                reqwest::Method::PUT,
                &path,
                json!({ "fields": { field_id: { "value": value } } }),
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        tracing::debug!(issue = %issue_key, field = %field_id, value = %value, "Field updated");

        Ok(())
    }

    async fn create_issue(&self, project_key: &str, summary: &str) -> Result<String, StoreError> {
        let response = self
            .send_json(
                reqwest::Method::POST,
                "/rest/api/3/issue",
                json!({
                    "fields": {
                        "project": { "key": project_key },
                        "summary": summary,
                        "issuetype": { "name": &self.issue_type },
                    }
                }),
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let created: CreatedIssue = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        tracing::info!(issue = %created.key, project = %project_key, "Issue created");

        Ok(created.key)
    }

    async fn add_comment(&self, issue_key: &str, body: &str) -> Result<(), StoreError> {
        let path = format!("/rest/api/3/issue/{}/comment", issue_key);
        // Atlassian document format: one paragraph of plain text
        let response = self
            .send_json(
                reqwest::Method::POST,
                &path,
                json!({
                    "body": {
                        "type": "doc",
                        "version": 1,
                        "content": [{
                            "type": "paragraph",
                            "content": [{ "type": "text", "text": body }],
                        }],
                    }
                }),
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Ok(())
    }
}
