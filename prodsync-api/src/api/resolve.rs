//! Product resolution handler
//!
//! POST /resolve runs the full pipeline for an existing issue. Negative
//! outcomes ("no product identified") are 200-level responses so the
//! calling workflow can branch; only malformed requests and unrecoverable
//! pipeline errors map to failure statuses.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::required;
use crate::error::{ApiError, ApiResult};
use crate::models::ResolutionOutcome;
use crate::AppState;

/// POST /resolve request
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub issue_key: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Resolution response body
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolveResponse {
    Resolved {
        issue_key: String,
        final_value: String,
        was_created: bool,
    },
    NoProductIdentified {
        issue_key: String,
        message: String,
    },
}

/// Run the pipeline for an issue and map the outcome to a response body,
/// recording unrecoverable errors for the health endpoint.
pub(crate) async fn run_resolution(
    state: &AppState,
    issue_key: &str,
    summary: &str,
) -> ApiResult<ResolveResponse> {
    match state.orchestrator.resolve(issue_key, summary).await {
        Ok(ResolutionOutcome::Resolved(result)) => {
            tracing::info!(
                issue = %issue_key,
                value = %result.final_value,
                was_created = result.was_created,
                "Resolution complete"
            );
            Ok(ResolveResponse::Resolved {
                issue_key: issue_key.to_string(),
                final_value: result.final_value,
                was_created: result.was_created,
            })
        }
        Ok(ResolutionOutcome::NoProductIdentified) => Ok(ResolveResponse::NoProductIdentified {
            issue_key: issue_key.to_string(),
            message: "No product identified in summary".to_string(),
        }),
        Err(err) => {
            tracing::error!(issue = %issue_key, error = %err, "Resolution failed");
            *state.last_error.write().await = Some(err.to_string());
            Err(ApiError::from(err))
        }
    }
}

/// POST /resolve
pub async fn resolve_product(
    State(state): State<AppState>,
    Json(request): Json<ResolveRequest>,
) -> ApiResult<Json<ResolveResponse>> {
    let issue_key = required(&request.issue_key, "issue_key")?;
    let summary = required(&request.summary, "summary")?;

    let response = run_resolution(&state, issue_key, summary).await?;
    Ok(Json(response))
}

/// Build resolution routes
pub fn resolve_routes() -> Router<AppState> {
    Router::new().route("/resolve", post(resolve_product))
}
