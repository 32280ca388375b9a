//! Cashflow forecast handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{AppError, AppState};
use flowcast_core::forecast;
use flowcast_core::models::{MonthlyForecast, UpcomingCharge};

/// Query params for the upcoming-charges projection
#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub account_id: Option<i64>,
    /// Window size in days (default 30, capped at one year)
    pub days: Option<u32>,
}

/// GET /api/recurring/upcoming?days= - Charges expected in the next N days
pub async fn upcoming_charges(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<Vec<UpcomingCharge>>, AppError> {
    let days = query.days.unwrap_or(30).min(366);
    let today = Utc::now().date_naive();

    let charges = forecast::upcoming_charges(&state.db, query.account_id, days, today)?;
    Ok(Json(charges))
}

/// Query params for the monthly forecast
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub account_id: Option<i64>,
}

/// GET /api/forecast - Expected recurring cashflow for the current month
pub async fn monthly_forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<MonthlyForecast>, AppError> {
    let forecast = forecast::current_month_forecast(&state.db, query.account_id)?;
    Ok(Json(forecast))
}
