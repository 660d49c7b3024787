//! Non-fatal conditions reported alongside a successful operation.

use common::InventoryItemId;
use serde::Serialize;

use crate::inventory::StockMovement;
use crate::money::{Money, Percentage};
use crate::order::{DiscountChangedData, OrderEvent, PaymentRegisteredData};

/// Something the operator should know about, though the operation succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Warning {
    /// The requested discount was outside 0..=10% and was clamped.
    #[serde(rename_all = "camelCase")]
    DiscountClamped { requested: f64, applied: Percentage },

    /// A stock deduction left the item below zero.
    #[serde(rename_all = "camelCase")]
    NegativeStock {
        item_id: InventoryItemId,
        code: String,
        stock_quantity: i64,
    },

    /// The confirmed payment differs from the order total.
    #[serde(rename_all = "camelCase")]
    PaymentAmountMismatch { confirmed: Money, total: Money },
}

impl Warning {
    /// Human readable message, in the operator's language.
    pub fn message(&self) -> String {
        match self {
            Warning::DiscountClamped { requested, applied } => {
                format!("Desconto solicitado de {requested}% ajustado para {applied}")
            }
            Warning::NegativeStock {
                code,
                stock_quantity,
                ..
            } => format!("Estoque negativo para {code}: {stock_quantity} unidade(s)"),
            Warning::PaymentAmountMismatch { confirmed, total } => {
                format!("Valor confirmado {confirmed} difere do total {total}")
            }
        }
    }

    /// Warning for an event, if the event carries one.
    pub fn from_event(event: &OrderEvent) -> Option<Self> {
        match event {
            OrderEvent::DiscountChanged(data) => Self::from_discount(data),
            OrderEvent::PaymentRegistered(data) => Self::from_payment(data),
            _ => None,
        }
    }

    /// Warning for a stock movement that went below zero.
    pub fn from_movement(movement: &StockMovement) -> Option<Self> {
        movement.went_negative().then(|| Warning::NegativeStock {
            item_id: movement.item_id,
            code: movement.code.clone(),
            stock_quantity: movement.after,
        })
    }

    fn from_discount(data: &DiscountChangedData) -> Option<Self> {
        data.was_clamped().then_some(Warning::DiscountClamped {
            requested: data.requested,
            applied: data.applied,
        })
    }

    fn from_payment(data: &PaymentRegisteredData) -> Option<Self> {
        data.is_mismatch().then_some(Warning::PaymentAmountMismatch {
            confirmed: data.amount_confirmed,
            total: data.total_at_payment,
        })
    }
}
