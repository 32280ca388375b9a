//! Recurring transaction detection and management handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, SuccessResponse};
use flowcast_core::detect::RecurringDetector;
use flowcast_core::models::{Frequency, RecurringSummary, RecurringTransaction};

/// Query params for the detection endpoint
#[derive(Debug, Deserialize)]
pub struct DetectQuery {
    /// Wipe the account's patterns and re-detect from scratch, discarding
    /// user overrides. Destructive; the UI confirms before sending.
    #[serde(default)]
    pub force: bool,
}

/// Detection response
#[derive(Serialize)]
pub struct DetectResponse {
    pub count: usize,
    pub patterns: Vec<RecurringTransaction>,
}

/// POST /api/accounts/:id/recurring/detect?force= - Run detection
pub async fn detect_recurring(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<i64>,
    Query(query): Query<DetectQuery>,
) -> Result<Json<DetectResponse>, AppError> {
    state
        .db
        .get_account(account_id)?
        .ok_or_else(|| AppError::not_found(&format!("Account {} not found", account_id)))?;

    let detector = RecurringDetector::new(&state.db);
    let patterns = detector.detect(account_id, query.force)?;

    info!(
        account_id,
        force = query.force,
        count = patterns.len(),
        "Detection requested via API"
    );

    Ok(Json(DetectResponse {
        count: patterns.len(),
        patterns,
    }))
}

/// Query params for listing recurring patterns
#[derive(Debug, Deserialize)]
pub struct ListRecurringQuery {
    pub account_id: Option<i64>,
    /// Only active (non-soft-deleted) patterns
    #[serde(default)]
    pub active: bool,
    pub frequency: Option<Frequency>,
}

/// GET /api/recurring - List recurring patterns
pub async fn list_recurring(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListRecurringQuery>,
) -> Result<Json<Vec<RecurringTransaction>>, AppError> {
    let patterns = state
        .db
        .list_recurring(query.account_id, query.active, query.frequency)?;
    Ok(Json(patterns))
}

/// GET /api/recurring/summary - Aggregate counts and monthly flow
pub async fn recurring_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListRecurringQuery>,
) -> Result<Json<RecurringSummary>, AppError> {
    Ok(Json(state.db.recurring_summary(query.account_id)?))
}

/// GET /api/recurring/:id - Get one pattern
pub async fn get_recurring(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<RecurringTransaction>, AppError> {
    let pattern = state
        .db
        .get_recurring(id)?
        .ok_or_else(|| AppError::not_found(&format!("Recurring pattern {} not found", id)))?;
    Ok(Json(pattern))
}

/// Request body for updating user-facing pattern fields
#[derive(Debug, Deserialize)]
pub struct UpdateRecurringRequest {
    pub display_name: Option<String>,
    /// Some(None) clears the category; use null in the JSON body
    pub category_id: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

/// PATCH /api/recurring/:id - Update display name, category, or active flag
pub async fn update_recurring(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRecurringRequest>,
) -> Result<Json<RecurringTransaction>, AppError> {
    state
        .db
        .get_recurring(id)?
        .ok_or_else(|| AppError::not_found(&format!("Recurring pattern {} not found", id)))?;

    if let Some(name) = req.display_name {
        if name.trim().is_empty() {
            return Err(AppError::bad_request("Display name must not be empty"));
        }
        state.db.rename_recurring(id, name.trim())?;
    }
    if let Some(category_id) = req.category_id {
        state.db.set_recurring_category(id, category_id)?;
    }
    if let Some(is_active) = req.is_active {
        state.db.set_recurring_active(id, is_active)?;
    }

    let updated = state
        .db
        .get_recurring(id)?
        .ok_or_else(|| AppError::internal("Pattern vanished during update"))?;
    Ok(Json(updated))
}

/// DELETE /api/recurring/:id - Delete a pattern
pub async fn delete_recurring(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .db
        .get_recurring(id)?
        .ok_or_else(|| AppError::not_found(&format!("Recurring pattern {} not found", id)))?;

    state.db.delete_recurring(id)?;
    Ok(Json(SuccessResponse { success: true }))
}
