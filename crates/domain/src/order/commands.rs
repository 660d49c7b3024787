//! Service order commands.

use common::{ItemId, OrderId, UserId};

use crate::command::Command;
use crate::diagnosis::AiDiagnosis;
use crate::money::Money;

use super::{ItemDraft, OrderStatus, PaymentMethod, ServiceOrder};

/// Command to add a line item to an order.
#[derive(Debug, Clone)]
pub struct AddItem {
    /// The order to add the item to.
    pub order_id: OrderId,

    /// The item to add.
    pub draft: ItemDraft,
}

impl AddItem {
    /// Creates a new AddItem command.
    pub fn new(order_id: OrderId, draft: ItemDraft) -> Self {
        Self { order_id, draft }
    }
}

impl Command for AddItem {
    type Aggregate = ServiceOrder;

    fn aggregate_id(&self) -> OrderId {
        self.order_id
    }
}

/// Command to remove a line item.
#[derive(Debug, Clone)]
pub struct RemoveItem {
    pub order_id: OrderId,
    pub item_id: ItemId,
}

impl RemoveItem {
    /// Creates a new RemoveItem command.
    pub fn new(order_id: OrderId, item_id: ItemId) -> Self {
        Self { order_id, item_id }
    }
}

impl Command for RemoveItem {
    type Aggregate = ServiceOrder;

    fn aggregate_id(&self) -> OrderId {
        self.order_id
    }
}

/// Command to set the discount percentage.
#[derive(Debug, Clone)]
pub struct SetDiscount {
    pub order_id: OrderId,

    /// Requested percentage; clamped to `[0, 10]`.
    pub percent: f64,
}

impl SetDiscount {
    /// Creates a new SetDiscount command.
    pub fn new(order_id: OrderId, percent: f64) -> Self {
        Self { order_id, percent }
    }
}

impl Command for SetDiscount {
    type Aggregate = ServiceOrder;

    fn aggregate_id(&self) -> OrderId {
        self.order_id
    }
}

/// Command to change the status manually.
#[derive(Debug, Clone)]
pub struct ChangeStatus {
    pub order_id: OrderId,
    pub status: OrderStatus,

    /// Compose the customer message for the new status.
    pub notify: bool,
}

impl ChangeStatus {
    /// Creates a new ChangeStatus command that notifies the customer.
    pub fn new(order_id: OrderId, status: OrderStatus) -> Self {
        Self {
            order_id,
            status,
            notify: true,
        }
    }

    /// Changes the status without composing a message.
    pub fn silent(order_id: OrderId, status: OrderStatus) -> Self {
        Self {
            notify: false,
            ..Self::new(order_id, status)
        }
    }
}

impl Command for ChangeStatus {
    type Aggregate = ServiceOrder;

    fn aggregate_id(&self) -> OrderId {
        self.order_id
    }
}

/// Command to assign the responsible mechanic.
#[derive(Debug, Clone)]
pub struct AssignMechanic {
    pub order_id: OrderId,
    pub mechanic_id: Option<UserId>,
}

impl AssignMechanic {
    /// Creates a new AssignMechanic command.
    pub fn new(order_id: OrderId, mechanic_id: Option<UserId>) -> Self {
        Self {
            order_id,
            mechanic_id,
        }
    }
}

impl Command for AssignMechanic {
    type Aggregate = ServiceOrder;

    fn aggregate_id(&self) -> OrderId {
        self.order_id
    }
}

/// Command to register the payment that closes an order.
#[derive(Debug, Clone)]
pub struct RegisterPayment {
    pub order_id: OrderId,
    pub method: PaymentMethod,

    /// Amount the operator confirmed receiving.
    pub amount_confirmed: Money,
    pub notes: Option<String>,

    /// Compose the payment confirmation for the customer.
    pub notify: bool,
}

impl RegisterPayment {
    /// Creates a new RegisterPayment command.
    pub fn new(order_id: OrderId, method: PaymentMethod, amount_confirmed: Money) -> Self {
        Self {
            order_id,
            method,
            amount_confirmed,
            notes: None,
            notify: true,
        }
    }

    /// Adds operator notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Skips the payment confirmation message.
    pub fn silent(mut self) -> Self {
        self.notify = false;
        self
    }
}

impl Command for RegisterPayment {
    type Aggregate = ServiceOrder;

    fn aggregate_id(&self) -> OrderId {
        self.order_id
    }
}

/// Command to attach the result of an AI diagnosis.
#[derive(Debug, Clone)]
pub struct AttachDiagnosis {
    pub order_id: OrderId,

    /// None when the AI call failed or returned nothing.
    pub diagnosis: Option<AiDiagnosis>,
}

impl AttachDiagnosis {
    /// Creates a new AttachDiagnosis command.
    pub fn new(order_id: OrderId, diagnosis: Option<AiDiagnosis>) -> Self {
        Self {
            order_id,
            diagnosis,
        }
    }
}

impl Command for AttachDiagnosis {
    type Aggregate = ServiceOrder;

    fn aggregate_id(&self) -> OrderId {
        self.order_id
    }
}
