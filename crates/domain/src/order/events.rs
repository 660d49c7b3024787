//! Service order domain events.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::diagnosis::AiDiagnosis;
use crate::money::{Money, Percentage};

use super::ledger::MAX_DISCOUNT_PERCENT;
use super::{CustomerNotification, Customer, OrderStatus, PaymentMethod, ServiceItem, Vehicle};

/// Events that can occur on a service order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Order was opened at the front desk.
    OrderOpened(OrderOpenedData),

    /// Line item was added.
    ItemAdded(ItemAddedData),

    /// Line item was removed.
    ItemRemoved(ItemRemovedData),

    /// Discount was changed.
    DiscountChanged(DiscountChangedData),

    /// Status was changed manually.
    StatusChanged(StatusChangedData),

    /// Mechanic was assigned or unassigned.
    MechanicAssigned(MechanicAssignedData),

    /// AI diagnosis was attached.
    DiagnosisAttached(DiagnosisAttachedData),

    /// Payment was registered and the order closed.
    PaymentRegistered(PaymentRegisteredData),

    /// A customer message was composed.
    CustomerNotified(CustomerNotification),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderOpened(_) => "OrderOpened",
            OrderEvent::ItemAdded(_) => "ItemAdded",
            OrderEvent::ItemRemoved(_) => "ItemRemoved",
            OrderEvent::DiscountChanged(_) => "DiscountChanged",
            OrderEvent::StatusChanged(_) => "StatusChanged",
            OrderEvent::MechanicAssigned(_) => "MechanicAssigned",
            OrderEvent::DiagnosisAttached(_) => "DiagnosisAttached",
            OrderEvent::PaymentRegistered(_) => "PaymentRegistered",
            OrderEvent::CustomerNotified(_) => "CustomerNotified",
        }
    }
}

/// Data for OrderOpened event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderOpenedData {
    pub order_id: OrderId,
    pub customer: Customer,
    pub vehicle: Vehicle,
    pub complaint: String,
    pub assigned_mechanic_id: Option<UserId>,
    pub fiscal_notes: Option<String>,
    pub opened_at: DateTime<Utc>,
}

/// Data for ItemAdded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAddedData {
    pub item: ServiceItem,
    pub added_at: DateTime<Utc>,
}

/// Data for ItemRemoved event.
///
/// Carries the whole item so stock can be returned without looking it up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRemovedData {
    pub item: ServiceItem,
    pub removed_at: DateTime<Utc>,
}

/// Data for DiscountChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountChangedData {
    /// What the operator asked for.
    pub requested: f64,

    /// What was applied after clamping.
    pub applied: Percentage,

    pub changed_at: DateTime<Utc>,
}

impl DiscountChangedData {
    /// Returns true if the request was out of range.
    pub fn was_clamped(&self) -> bool {
        self.requested < 0.0 || self.requested > MAX_DISCOUNT_PERCENT
    }
}

/// Data for StatusChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangedData {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub changed_at: DateTime<Utc>,
}

/// Data for MechanicAssigned event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MechanicAssignedData {
    pub mechanic_id: Option<UserId>,
    pub assigned_at: DateTime<Utc>,
}

/// Data for DiagnosisAttached event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisAttachedData {
    pub diagnosis: AiDiagnosis,
    pub attached_at: DateTime<Utc>,
}

/// Data for PaymentRegistered event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRegisteredData {
    pub method: PaymentMethod,

    /// Amount the operator confirmed receiving.
    pub amount_confirmed: Money,

    /// Order total when the payment was registered.
    pub total_at_payment: Money,

    pub notes: Option<String>,
    pub paid_at: DateTime<Utc>,
}

impl PaymentRegisteredData {
    /// Returns true if the confirmed amount differs from the order total.
    pub fn is_mismatch(&self) -> bool {
        self.amount_confirmed != self.total_at_payment
    }
}

// Convenience constructors
impl OrderEvent {
    pub fn item_added(item: ServiceItem, at: DateTime<Utc>) -> Self {
        OrderEvent::ItemAdded(ItemAddedData { item, added_at: at })
    }

    pub fn item_removed(item: ServiceItem, at: DateTime<Utc>) -> Self {
        OrderEvent::ItemRemoved(ItemRemovedData {
            item,
            removed_at: at,
        })
    }

    pub fn discount_changed(requested: f64, applied: Percentage, at: DateTime<Utc>) -> Self {
        OrderEvent::DiscountChanged(DiscountChangedData {
            requested,
            applied,
            changed_at: at,
        })
    }

    pub fn status_changed(from: OrderStatus, to: OrderStatus, at: DateTime<Utc>) -> Self {
        OrderEvent::StatusChanged(StatusChangedData {
            from,
            to,
            changed_at: at,
        })
    }

    pub fn mechanic_assigned(mechanic_id: Option<UserId>, at: DateTime<Utc>) -> Self {
        OrderEvent::MechanicAssigned(MechanicAssignedData {
            mechanic_id,
            assigned_at: at,
        })
    }

    pub fn diagnosis_attached(diagnosis: AiDiagnosis, at: DateTime<Utc>) -> Self {
        OrderEvent::DiagnosisAttached(DiagnosisAttachedData {
            diagnosis,
            attached_at: at,
        })
    }

    /// Returns the timestamp the event happened at.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderOpened(d) => d.opened_at,
            OrderEvent::ItemAdded(d) => d.added_at,
            OrderEvent::ItemRemoved(d) => d.removed_at,
            OrderEvent::DiscountChanged(d) => d.changed_at,
            OrderEvent::StatusChanged(d) => d.changed_at,
            OrderEvent::MechanicAssigned(d) => d.assigned_at,
            OrderEvent::DiagnosisAttached(d) => d.attached_at,
            OrderEvent::PaymentRegistered(d) => d.paid_at,
            OrderEvent::CustomerNotified(n) => n.created_at,
        }
    }
}
