//! HTTP API handlers

mod health;
mod issues;
mod resolve;

pub use health::health_routes;
pub use issues::issue_routes;
pub use resolve::{resolve_routes, ResolveResponse};

use crate::error::{ApiError, ApiResult};

/// Reject missing or blank request fields with a 400
pub(crate) fn required<'a>(value: &'a Option<String>, name: &str) -> ApiResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{} is required", name)))
}
