//! Service order aggregate and related types.

mod aggregate;
mod commands;
mod events;
pub mod ledger;
pub mod notification;
mod state;
mod value_objects;

pub use aggregate::ServiceOrder;
pub use commands::*;
pub use events::{
    DiagnosisAttachedData, DiscountChangedData, ItemAddedData, ItemRemovedData,
    MechanicAssignedData, OrderEvent, OrderOpenedData, PaymentRegisteredData, StatusChangedData,
};
pub use ledger::{MAX_DISCOUNT_PERCENT, MAX_ORDER_SUBTOTAL, Totals, recompute_totals};
pub use notification::{
    Channel, CustomerNotification, NotificationContext, NotificationTrigger, whatsapp_link,
};
pub use state::{OrderStatus, ParseStatusError};
pub use value_objects::{
    Customer, ItemDraft, ItemStatus, ItemType, OrderIntake, PaymentMethod, ServiceItem, Vehicle,
};

use thiserror::Error;

use crate::error::ErrorKind;
use crate::money::Money;

/// Errors that can occur during service order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Customer name is required to open an order.
    #[error("Customer name is required")]
    CustomerNameRequired,

    /// Complaint is required to open an order.
    #[error("Complaint is required")]
    ComplaintRequired,

    /// Line item description is required.
    #[error("Item description is required")]
    DescriptionRequired,

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Invalid unit price.
    #[error("Invalid unit price: {cents} cents (must be greater than 0)")]
    InvalidUnitPrice { cents: i64 },

    /// A part picked from inventory must reference its SKU.
    #[error("Part sourced from inventory requires an inventory item id")]
    InventoryLinkRequired,

    /// Only parts may reference inventory.
    #[error("Labor items cannot reference inventory")]
    LaborCannotLinkInventory,

    /// Discount is not a finite number.
    #[error("Invalid discount: {requested}")]
    InvalidDiscount { requested: f64 },

    /// The order is paid and closed.
    #[error("Order is paid: cannot {action}")]
    OrderPaid { action: &'static str },

    /// PAID can only be reached by registering a payment.
    #[error("Status PAID can only be set by registering a payment")]
    PaidRequiresPayment,

    /// Payment was already registered.
    #[error("Order is already paid")]
    AlreadyPaid,

    /// Amount exceeds the allowed ceiling.
    #[error("Amount exceeds limit of {limit}")]
    AmountTooLarge { limit: Money },

    /// A zero-total order cannot be paid.
    #[error("Order total is zero: nothing to pay")]
    ZeroTotal,
}

impl OrderError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::OrderPaid { .. }
            | OrderError::PaidRequiresPayment
            | OrderError::AlreadyPaid => ErrorKind::InvalidState,
            _ => ErrorKind::Validation,
        }
    }
}
