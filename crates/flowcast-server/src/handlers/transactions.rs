//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, MAX_PAGE_LIMIT};
use flowcast_core::models::{NewTransaction, Transaction, TransactionType};

/// Query params for listing transactions
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    pub account_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/transactions - List transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let limit = query.limit.unwrap_or(100).clamp(1, MAX_PAGE_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    let transactions = state
        .db
        .list_transactions(query.account_id, limit, offset)?;
    Ok(Json(transactions))
}

/// Request body for manual transaction entry
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub account_id: i64,
    pub date: NaiveDate,
    pub amount_cents: i64,
    pub counterparty: Option<String>,
    pub description: String,
    pub transaction_type: TransactionType,
    pub category_id: Option<i64>,
}

/// Response for transaction creation
#[derive(Serialize)]
pub struct CreateTransactionResponse {
    pub id: Option<i64>,
    pub duplicate: bool,
}

/// POST /api/transactions - Record a transaction manually
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<Json<CreateTransactionResponse>, AppError> {
    state
        .db
        .get_account(req.account_id)?
        .ok_or_else(|| AppError::not_found(&format!("Account {} not found", req.account_id)))?;

    if req.description.trim().is_empty() {
        return Err(AppError::bad_request("Description must not be empty"));
    }

    let new_tx = NewTransaction {
        date: req.date,
        amount_cents: req.amount_cents,
        counterparty: req.counterparty,
        description: req.description,
        transaction_type: req.transaction_type,
        category_id: req.category_id,
    };

    let id = state.db.insert_transaction(req.account_id, &new_tx)?;
    Ok(Json(CreateTransactionResponse {
        duplicate: id.is_none(),
        id,
    }))
}
