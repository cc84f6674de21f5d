//! Issue intake handler
//!
//! POST /issues creates an issue from a bare summary in the configured
//! project, then runs product resolution on it. When no product can be
//! identified, the new issue gets a comment saying so; comment failures are
//! logged and do not fail the request.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::required;
use crate::api::resolve::{run_resolution, ResolveResponse};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /issues request
#[derive(Debug, Deserialize)]
pub struct CreateIssueRequest {
    #[serde(default)]
    pub summary: Option<String>,
}

/// POST /issues response
#[derive(Debug, Serialize)]
pub struct CreateIssueResponse {
    pub issue_key: String,
    pub resolution: ResolveResponse,
}

/// POST /issues
pub async fn create_issue(
    State(state): State<AppState>,
    Json(request): Json<CreateIssueRequest>,
) -> ApiResult<Json<CreateIssueResponse>> {
    let summary = required(&request.summary, "summary")?;

    let issue_key = state
        .store
        .create_issue(&state.config.jira_project_key, summary)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "Issue creation failed");
            ApiError::from(err)
        })?;

    let resolution = run_resolution(&state, &issue_key, summary).await?;

    if matches!(resolution, ResolveResponse::NoProductIdentified { .. }) {
        let note = "No product could be identified from the issue summary; \
                    the product field was left unset.";
        if let Err(err) = state.store.add_comment(&issue_key, note).await {
            tracing::warn!(issue = %issue_key, error = %err, "Could not comment on issue");
        }
    }

    Ok(Json(CreateIssueResponse {
        issue_key,
        resolution,
    }))
}

/// Build issue intake routes
pub fn issue_routes() -> Router<AppState> {
    Router::new().route("/issues", post(create_issue))
}
