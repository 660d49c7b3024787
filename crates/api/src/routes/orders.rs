//! Service order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use common::{InventoryItemId, ItemId, LogId, NotificationId, OrderId, UserId};
use domain::{
    AddItem, AssignMechanic, AttachDiagnosis, ChangeStatus, Customer, DiagnosisRequest, ItemDraft,
    ItemStatus, ItemType, Money, OrderFilter, OrderIntake, OrderOutcome, OrderStatus,
    PaymentMethod, RegisterPayment, RemoveItem, ServiceOrder, SetDiscount, Vehicle, Warning,
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::ApiError;
use crate::extract::CurrentActor;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    #[validate(length(min = 1, max = 120, message = "Customer name is required"))]
    pub name: String,
    #[validate(length(max = 18))]
    pub cpf: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid customer email"))]
    pub email: Option<String>,
    #[serde(default)]
    pub accepts_notifications: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRequest {
    #[serde(default)]
    #[validate(length(max = 60))]
    pub manufacturer: String,
    #[validate(length(min = 1, max = 80, message = "Vehicle model is required"))]
    pub model: String,
    pub year: Option<u16>,
    #[validate(length(max = 40))]
    pub color: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub plate: String,
    pub mileage: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrderRequest {
    #[validate(nested)]
    pub customer: CustomerRequest,
    #[validate(nested)]
    pub vehicle: VehicleRequest,
    #[validate(length(min = 1, max = 2000, message = "Complaint is required"))]
    pub complaint: String,
    pub assigned_mechanic_id: Option<UserId>,
    #[validate(length(max = 2000))]
    pub fiscal_notes: Option<String>,
}

impl From<OpenOrderRequest> for OrderIntake {
    fn from(req: OpenOrderRequest) -> Self {
        OrderIntake {
            customer: Customer {
                name: req.customer.name,
                cpf: req.customer.cpf,
                phone: req.customer.phone,
                email: req.customer.email,
                accepts_notifications: req.customer.accepts_notifications,
            },
            vehicle: Vehicle {
                manufacturer: req.vehicle.manufacturer,
                model: req.vehicle.model,
                year: req.vehicle.year,
                color: req.vehicle.color,
                plate: req.vehicle.plate,
                mileage: req.vehicle.mileage,
            },
            complaint: req.complaint,
            assigned_mechanic_id: req.assigned_mechanic_id,
            fiscal_notes: req.fiscal_notes,
        }
    }
}

/// Query string of `GET /orders`.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub q: Option<String>,
    pub mechanic: Option<UserId>,
}

impl From<ListOrdersQuery> for OrderFilter {
    fn from(query: ListOrdersQuery) -> Self {
        OrderFilter {
            status: query.status,
            query: query.q,
            mechanic_id: query.mechanic,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[validate(length(max = 40))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Item description is required"))]
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[validate(range(min = 1, max = 10_000, message = "Quantity must be between 1 and 10000"))]
    pub quantity: u32,
    #[validate(custom(function = "validate_unit_price"))]
    pub unit_price: Money,
    #[serde(default)]
    pub from_inventory: bool,
    pub inventory_item_id: Option<InventoryItemId>,
    pub status: Option<ItemStatus>,
    pub mechanic_id: Option<UserId>,
}

/// Largest unit price accepted on a line item (R$ 10 milhões).
const MAX_UNIT_PRICE: Money = Money::from_cents(1_000_000_000);

fn validate_unit_price(price: &Money) -> Result<(), ValidationError> {
    if !price.is_positive() || *price > MAX_UNIT_PRICE {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &1);
        err.add_param("max".into(), &MAX_UNIT_PRICE.cents());
        err.message = Some("Unit price must be positive and at most R$ 10.000.000,00".into());
        return Err(err);
    }
    Ok(())
}

impl From<AddItemRequest> for ItemDraft {
    fn from(req: AddItemRequest) -> Self {
        ItemDraft {
            code: req.code,
            description: req.description,
            item_type: req.item_type,
            quantity: req.quantity,
            unit_price: req.unit_price,
            from_inventory: req.from_inventory,
            inventory_item_id: req.inventory_item_id,
            status: req.status,
            mechanic_id: req.mechanic_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DiscountRequest {
    pub percent: f64,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
    /// Compose the customer message for the new status.
    #[serde(default)]
    pub notify: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MechanicRequest {
    pub mechanic_id: Option<UserId>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    pub amount_confirmed: Money,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    #[serde(default = "default_notify")]
    pub notify: bool,
}

fn default_notify() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct DeleteOrderRequest {
    pub password: String,
}

// -- Response types --

/// An order after a mutation, with the warnings it raised.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order: ServiceOrder,
    pub warnings: Vec<Warning>,
    pub changed: bool,
    pub log_id: Option<LogId>,
}

impl From<OrderOutcome> for OrderResponse {
    fn from(outcome: OrderOutcome) -> Self {
        Self {
            changed: !outcome.is_noop(),
            order: outcome.order,
            warnings: outcome.warnings,
            log_id: outcome.log_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub order_id: OrderId,
    pub log_id: LogId,
}

#[derive(Debug, Serialize)]
pub struct ShareLinkResponse {
    pub url: String,
}

// -- Handlers --

/// POST /orders: open a service order.
#[tracing::instrument(skip(state, actor, req))]
pub async fn open(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<OpenOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    req.validate()?;
    let outcome = state.service.open_order(&actor, req.into()).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// GET /orders: list orders, newest first.
#[tracing::instrument(skip(state, _actor))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    _actor: CurrentActor,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<ServiceOrder>>, ApiError> {
    let orders = state.service.list_orders(&query.into()).await?;
    Ok(Json(orders))
}

/// GET /orders/export.csv: CSV of the filtered list.
#[tracing::instrument(skip(state, _actor))]
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    _actor: CurrentActor,
    Query(query): Query<ListOrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let csv = state.reports.orders_csv(&query.into()).await?;
    Ok(csv_response("ordens-de-servico.csv", csv))
}

/// GET /orders/{id}
#[tracing::instrument(skip(state, _actor))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    _actor: CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<ServiceOrder>, ApiError> {
    let order = state.service.get_order(parse_order_id(&id)?).await?;
    Ok(Json(order))
}

/// DELETE /orders/{id}: delete an unpaid order; requires the admin credential.
#[tracing::instrument(skip(state, actor, req))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<DeleteOrderRequest>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let log_id = state
        .service
        .delete_order(&actor, order_id, &req.password)
        .await?;
    Ok(Json(DeletedResponse { order_id, log_id }))
}

/// POST /orders/{id}/items
#[tracing::instrument(skip(state, actor, req))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    req.validate()?;
    let cmd = AddItem::new(parse_order_id(&id)?, req.into());
    let outcome = state.service.add_item(&actor, cmd).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// DELETE /orders/{id}/items/{item_id}
#[tracing::instrument(skip(state, actor))]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path((id, item_id)): Path<(String, ItemId)>,
) -> Result<Json<OrderResponse>, ApiError> {
    let cmd = RemoveItem::new(parse_order_id(&id)?, item_id);
    let outcome = state.service.remove_item(&actor, cmd).await?;
    Ok(Json(outcome.into()))
}

/// PUT /orders/{id}/discount
#[tracing::instrument(skip(state, actor))]
pub async fn set_discount(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<DiscountRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let cmd = SetDiscount::new(parse_order_id(&id)?, req.percent);
    let outcome = state.service.set_discount(&actor, cmd).await?;
    Ok(Json(outcome.into()))
}

/// POST /orders/{id}/status
#[tracing::instrument(skip(state, actor))]
pub async fn change_status(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let cmd = if req.notify {
        ChangeStatus::new(order_id, req.status)
    } else {
        ChangeStatus::silent(order_id, req.status)
    };
    let outcome = state.service.change_status(&actor, cmd).await?;
    Ok(Json(outcome.into()))
}

/// PUT /orders/{id}/mechanic
#[tracing::instrument(skip(state, actor))]
pub async fn assign_mechanic(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<MechanicRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let cmd = AssignMechanic::new(parse_order_id(&id)?, req.mechanic_id);
    let outcome = state.service.assign_mechanic(&actor, cmd).await?;
    Ok(Json(outcome.into()))
}

/// POST /orders/{id}/payment: register the payment that closes the order.
#[tracing::instrument(skip(state, actor, req))]
pub async fn register_payment(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    req.validate()?;
    let mut cmd = RegisterPayment::new(parse_order_id(&id)?, req.method, req.amount_confirmed);
    if let Some(notes) = req.notes.filter(|n| !n.trim().is_empty()) {
        cmd = cmd.with_notes(notes);
    }
    if !req.notify {
        cmd = cmd.silent();
    }
    let outcome = state.service.register_payment(&actor, cmd).await?;
    Ok(Json(outcome.into()))
}

/// POST /orders/{id}/diagnosis: ask the AI and attach the result.
///
/// A provider failure answers 502 and leaves the order untouched.
#[tracing::instrument(skip(state, actor))]
pub async fn diagnose(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.service.get_order(order_id).await?;

    let diagnosis = state
        .diagnosis
        .diagnose(&DiagnosisRequest::for_order(&order))
        .await?;

    let cmd = AttachDiagnosis::new(order_id, Some(diagnosis));
    let outcome = state.service.attach_diagnosis(&actor, cmd).await?;
    Ok(Json(outcome.into()))
}

/// POST /orders/{id}/reminder: compose the preventive maintenance reminder.
#[tracing::instrument(skip(state, actor))]
pub async fn send_reminder(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let outcome = state
        .service
        .send_preventive_reminder(&actor, parse_order_id(&id)?)
        .await?;
    Ok(Json(outcome.into()))
}

/// GET /orders/{id}/notifications/{notification_id}/whatsapp
#[tracing::instrument(skip(state, _actor))]
pub async fn share_link(
    State(state): State<Arc<AppState>>,
    _actor: CurrentActor,
    Path((id, notification_id)): Path<(String, NotificationId)>,
) -> Result<Json<ShareLinkResponse>, ApiError> {
    let url = state
        .service
        .notification_share_link(parse_order_id(&id)?, notification_id)
        .await?;
    Ok(Json(ShareLinkResponse { url }))
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid order id: {e}")))
}

pub(crate) fn csv_response(filename: &str, body: String) -> impl IntoResponse + use<> {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_id_accepts_both_forms() {
        assert_eq!(parse_order_id("OS-0007").unwrap(), OrderId::new(7));
        assert_eq!(parse_order_id("7").unwrap(), OrderId::new(7));
        assert!(matches!(
            parse_order_id("sete"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_open_order_request_validation() {
        let req: OpenOrderRequest = serde_json::from_value(serde_json::json!({
            "customer": { "name": "", "email": "not-an-email" },
            "vehicle": { "model": "Gol" },
            "complaint": "Barulho"
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        let customer = errors.errors().get("customer");
        assert!(customer.is_some());
    }

    #[test]
    fn test_add_item_request_bounds() {
        let item = |quantity: u64, unit_price: i64| -> AddItemRequest {
            serde_json::from_value(serde_json::json!({
                "description": "Mão de obra",
                "type": "LABOR",
                "quantity": quantity,
                "unitPrice": unit_price
            }))
            .unwrap()
        };

        assert!(item(2, 5_000).validate().is_ok());

        let errors = item(2, i64::MAX / 2 + 1).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("unit_price"));

        let errors = item(0, 5_000).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));

        assert!(item(10_001, 5_000).validate().is_err());
        assert!(item(1, 0).validate().is_err());
    }

    #[test]
    fn test_payment_notifies_by_default() {
        let req: PaymentRequest = serde_json::from_value(serde_json::json!({
            "method": "PIX",
            "amountConfirmed": 38000
        }))
        .unwrap();
        assert!(req.notify);
        assert_eq!(req.amount_confirmed, Money::from_reais(380));
    }
}
