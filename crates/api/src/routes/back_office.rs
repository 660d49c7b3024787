//! Inventory, expense, settings and audit log endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use common::{ExpenseId, InventoryItemId};
use domain::{
    AuditLog, CompanySettings, Expense, ExpenseCategory, ExpenseStatus, InventoryItem,
    InventoryPatch, Money, NewExpense, NewInventoryItem,
};
use serde::Deserialize;
use validator::Validate;

use crate::error::ApiError;
use crate::extract::CurrentActor;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryQuery {
    #[serde(default)]
    pub low_stock: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryItemRequest {
    #[validate(length(min = 1, max = 40, message = "Item code is required"))]
    pub code: String,
    #[validate(length(min = 1, max = 120, message = "Item name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 60))]
    pub manufacturer: String,
    #[serde(default)]
    #[validate(length(max = 60))]
    pub category: String,
    pub cost_price: Money,
    pub sell_price: Money,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub min_stock_level: i64,
}

impl From<CreateInventoryItemRequest> for NewInventoryItem {
    fn from(req: CreateInventoryItemRequest) -> Self {
        NewInventoryItem {
            code: req.code,
            name: req.name,
            manufacturer: req.manufacturer,
            category: req.category,
            cost_price: req.cost_price,
            sell_price: req.sell_price,
            stock_quantity: req.stock_quantity,
            min_stock_level: req.min_stock_level,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpensesQuery {
    #[serde(default)]
    pub overdue: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    #[validate(length(min = 1, max = 200, message = "Expense description is required"))]
    pub description: String,
    pub category: ExpenseCategory,
    pub amount: Money,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: ExpenseStatus,
}

impl From<CreateExpenseRequest> for NewExpense {
    fn from(req: CreateExpenseRequest) -> Self {
        NewExpense {
            description: req.description,
            category: req.category,
            amount: req.amount,
            due_date: req.due_date,
            status: req.status,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    #[validate(length(min = 1, max = 120, message = "Company name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 18))]
    pub cnpj: String,
    #[serde(default)]
    #[validate(length(max = 30))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = 120))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub address: String,
}

impl From<SettingsRequest> for CompanySettings {
    fn from(req: SettingsRequest) -> Self {
        CompanySettings {
            name: req.name,
            cnpj: req.cnpj,
            phone: req.phone,
            email: req.email,
            address: req.address,
        }
    }
}

/// GET /inventory?lowStock=true
#[tracing::instrument(skip(state, _actor))]
pub async fn list_inventory(
    State(state): State<Arc<AppState>>,
    _actor: CurrentActor,
    Query(query): Query<InventoryQuery>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    Ok(Json(state.service.list_inventory(query.low_stock).await?))
}

/// POST /inventory: admin only.
#[tracing::instrument(skip(state, actor, req))]
pub async fn create_inventory_item(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<CreateInventoryItemRequest>,
) -> Result<(StatusCode, Json<InventoryItem>), ApiError> {
    req.validate()?;
    let item = state
        .service
        .create_inventory_item(&actor, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /inventory/{id}: admin only; absent fields are kept.
#[tracing::instrument(skip(state, actor, patch))]
pub async fn update_inventory_item(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<InventoryItemId>,
    Json(patch): Json<InventoryPatch>,
) -> Result<Json<InventoryItem>, ApiError> {
    let item = state
        .service
        .update_inventory_item(&actor, id, patch)
        .await?;
    Ok(Json(item))
}

/// GET /expenses?overdue=true
#[tracing::instrument(skip(state, _actor))]
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    _actor: CurrentActor,
    Query(query): Query<ExpensesQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let expenses = state
        .service
        .list_expenses(query.overdue, Utc::now())
        .await?;
    Ok(Json(expenses))
}

/// POST /expenses: admin only.
#[tracing::instrument(skip(state, actor, req))]
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    req.validate()?;
    let expense = state.service.create_expense(&actor, req.into()).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// POST /expenses/{id}/pay
#[tracing::instrument(skip(state, actor))]
pub async fn pay_expense(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<ExpenseId>,
) -> Result<Json<Expense>, ApiError> {
    Ok(Json(state.service.pay_expense(&actor, id).await?))
}

/// GET /settings
#[tracing::instrument(skip(state, _actor))]
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    _actor: CurrentActor,
) -> Result<Json<CompanySettings>, ApiError> {
    Ok(Json(state.service.get_settings().await?))
}

/// PUT /settings: admin only.
#[tracing::instrument(skip(state, actor, req))]
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<SettingsRequest>,
) -> Result<Json<CompanySettings>, ApiError> {
    req.validate()?;
    let settings = state.service.update_settings(&actor, req.into()).await?;
    Ok(Json(settings))
}

/// GET /logs: admin only, newest first.
#[tracing::instrument(skip(state, actor))]
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<AuditLog>, ApiError> {
    Ok(Json(state.service.list_logs(&actor).await?))
}
