//! Account and category handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use flowcast_core::models::{Account, AccountType, Category};

/// Request body for creating an account
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    pub account_type: Option<AccountType>,
}

/// GET /api/accounts - List all accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = state.db.list_accounts()?;
    Ok(Json(accounts))
}

/// POST /api/accounts - Create (or fetch) an account by name
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<Json<Account>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::bad_request("Account name must not be empty"));
    }

    let id = state.db.upsert_account(req.name.trim(), req.account_type)?;
    let account = state
        .db
        .get_account(id)?
        .ok_or_else(|| AppError::internal("Account vanished after insert"))?;

    Ok(Json(account))
}

/// GET /api/accounts/:id - Get a single account
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Account>, AppError> {
    let account = state
        .db
        .get_account(id)?
        .ok_or_else(|| AppError::not_found(&format!("Account {} not found", id)))?;

    Ok(Json(account))
}

/// Request body for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// GET /api/categories - List categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.db.list_categories()?))
}

/// POST /api/categories - Create a category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::bad_request("Category name must not be empty"));
    }

    let id = state.db.create_category(req.name.trim())?;
    Ok(Json(serde_json::json!({ "id": id, "name": req.name.trim() })))
}
