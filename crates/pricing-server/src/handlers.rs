//! HTTP Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::error::ServerError;
use crate::polar::PlanPage;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub polar_configured: bool,
}

/// Error body of the plan function
#[derive(Debug, Serialize)]
pub struct FunctionError {
    pub error: String,
    pub details: Option<String>,
}

impl From<ServerError> for FunctionError {
    fn from(err: ServerError) -> Self {
        Self {
            details: err.details(),
            error: err.to_string(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        polar_configured: state.polar_configured(),
    })
}

/// List plans: active Polar products as an `{ items, pagination }` envelope
pub async fn get_plans(
    State(state): State<AppState>,
) -> Result<Json<PlanPage>, (StatusCode, Json<FunctionError>)> {
    tracing::info!("Starting get-plans function");

    let polar = state.polar.as_ref().map_err(|missing| {
        tracing::error!(error = %missing, "Error in get-plans function");
        reject(ServerError::Config(missing.clone()))
    })?;

    tracing::info!(organization_id = %polar.organization_id(), "Listing Polar products");
    let page = polar.list_products().await.map_err(|e| {
        tracing::error!(error = %e, details = ?e.details(), "Error in get-plans function");
        reject(e)
    })?;

    if page.items.is_empty() {
        tracing::info!("No products found in Polar");
    } else {
        tracing::info!(count = page.items.len(), "Products found");
    }

    Ok(Json(PlanPage::from(page)))
}

fn reject(err: ServerError) -> (StatusCode, Json<FunctionError>) {
    (StatusCode::BAD_REQUEST, Json(FunctionError::from(err)))
}
