//! Service order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{ItemId, NotificationId, OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::command::CommandResult;
use crate::diagnosis::AiDiagnosis;
use crate::money::{Money, Percentage};

use super::{
    CustomerNotification, Customer, ItemDraft, ItemType, NotificationContext, NotificationTrigger,
    OrderError, OrderEvent, OrderIntake, OrderStatus, PaymentMethod, ServiceItem, Vehicle,
    events::{OrderOpenedData, PaymentRegisteredData},
    ledger::{Totals, checked_subtotal, clamp_discount, recompute_totals},
    notification::compose,
};

/// Service order aggregate root.
///
/// One customer repair job: intake data, the billable ledger, the status
/// workflow and the payment that closes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrder {
    id: OrderId,
    customer: Customer,
    vehicle: Vehicle,
    complaint: String,
    status: OrderStatus,
    #[serde(default)]
    assigned_mechanic_id: Option<UserId>,

    /// Insertion order is display order.
    #[serde(default)]
    items: Vec<ServiceItem>,

    #[serde(default)]
    labor_cost: Money,
    #[serde(default)]
    parts_cost: Money,
    #[serde(default)]
    discount_percentage: Percentage,
    #[serde(default)]
    total_cost: Money,

    #[serde(default)]
    payment_method: Option<PaymentMethod>,
    #[serde(default)]
    payment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    amount_paid: Option<Money>,
    #[serde(default)]
    payment_notes: Option<String>,

    #[serde(default)]
    ai_diagnosis: Option<AiDiagnosis>,

    /// Newest first.
    #[serde(default)]
    notifications: Vec<CustomerNotification>,

    #[serde(default)]
    fiscal_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

impl Aggregate for ServiceOrder {
    type Id = OrderId;
    type Event = OrderEvent;
    type Error = OrderError;

    fn aggregate_type() -> &'static str {
        "ServiceOrder"
    }

    fn id(&self) -> OrderId {
        self.id
    }

    fn apply(&mut self, event: Self::Event) {
        self.updated_at = event.occurred_at();

        match event {
            OrderEvent::OrderOpened(data) => *self = Self::from_opened(data),
            OrderEvent::ItemAdded(data) => {
                self.items.push(data.item);
                self.refresh_totals();
            }
            OrderEvent::ItemRemoved(data) => {
                self.items.retain(|item| item.id != data.item.id);
                self.refresh_totals();
            }
            OrderEvent::DiscountChanged(data) => {
                self.discount_percentage = data.applied;
                self.refresh_totals();
            }
            OrderEvent::StatusChanged(data) => {
                self.status = data.to;
                if data.to == OrderStatus::Completed {
                    self.completed_at = Some(data.changed_at);
                }
            }
            OrderEvent::MechanicAssigned(data) => {
                self.assigned_mechanic_id = data.mechanic_id;
            }
            OrderEvent::DiagnosisAttached(data) => {
                self.ai_diagnosis = Some(data.diagnosis);
            }
            OrderEvent::PaymentRegistered(data) => self.apply_payment(data),
            OrderEvent::CustomerNotified(notification) => {
                self.notifications.insert(0, notification);
            }
        }
    }
}

// Query methods
impl ServiceOrder {
    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn complaint(&self) -> &str {
        &self.complaint
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn assigned_mechanic_id(&self) -> Option<UserId> {
        self.assigned_mechanic_id
    }

    pub fn items(&self) -> &[ServiceItem] {
        &self.items
    }

    pub fn get_item(&self, item_id: ItemId) -> Option<&ServiceItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn labor_cost(&self) -> Money {
        self.labor_cost
    }

    pub fn parts_cost(&self) -> Money {
        self.parts_cost
    }

    pub fn discount_percentage(&self) -> Percentage {
        self.discount_percentage
    }

    pub fn total_cost(&self) -> Money {
        self.total_cost
    }

    /// Returns the three cost fields together.
    pub fn totals(&self) -> Totals {
        Totals {
            labor_cost: self.labor_cost,
            parts_cost: self.parts_cost,
            total_cost: self.total_cost,
        }
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn payment_date(&self) -> Option<DateTime<Utc>> {
        self.payment_date
    }

    pub fn amount_paid(&self) -> Option<Money> {
        self.amount_paid
    }

    pub fn payment_notes(&self) -> Option<&str> {
        self.payment_notes.as_deref()
    }

    pub fn ai_diagnosis(&self) -> Option<&AiDiagnosis> {
        self.ai_diagnosis.as_ref()
    }

    /// Composed customer messages, newest first.
    pub fn notifications(&self) -> &[CustomerNotification] {
        &self.notifications
    }

    pub fn get_notification(&self, id: NotificationId) -> Option<&CustomerNotification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    pub fn fiscal_notes(&self) -> Option<&str> {
        self.fiscal_notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns true once the payment has been registered.
    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }

    /// When the work ended: completion time, or payment time if the order
    /// skipped the COMPLETED status.
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at.or(self.payment_date)
    }

    /// Returns true if the stored totals match a fresh computation.
    pub fn totals_consistent(&self) -> bool {
        recompute_totals(&self.items, self.discount_percentage) == self.totals()
    }
}

// Command methods (return events)
impl ServiceOrder {
    /// Opens a new order.
    ///
    /// Also composes the "order created" message when the customer consented.
    pub fn open(
        id: OrderId,
        intake: OrderIntake,
        ctx: &NotificationContext,
    ) -> Result<CommandResult<ServiceOrder>, OrderError> {
        if intake.customer.name.trim().is_empty() {
            return Err(OrderError::CustomerNameRequired);
        }
        if intake.complaint.trim().is_empty() {
            return Err(OrderError::ComplaintRequired);
        }

        let mut customer = intake.customer;
        customer.name = customer.name.trim().to_string();

        let data = OrderOpenedData {
            order_id: id,
            customer,
            vehicle: intake.vehicle,
            complaint: intake.complaint.trim().to_string(),
            assigned_mechanic_id: intake.assigned_mechanic_id,
            fiscal_notes: intake.fiscal_notes.filter(|n| !n.trim().is_empty()),
            opened_at: ctx.now,
        };

        let mut events = vec![OrderEvent::OrderOpened(data.clone())];
        let mut order = Self::from_opened(data);

        if let Some(notification) = compose(&order, NotificationTrigger::OrderCreated, ctx) {
            let event = OrderEvent::CustomerNotified(notification);
            order.apply(event.clone());
            events.push(event);
        }

        Ok(CommandResult {
            aggregate: order,
            events,
        })
    }

    /// Adds a line item.
    pub fn add_item(
        &self,
        item_id: ItemId,
        draft: ItemDraft,
        now: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_ledger_editable("add item")?;

        if draft.description.trim().is_empty() {
            return Err(OrderError::DescriptionRequired);
        }
        if draft.quantity == 0 {
            return Err(OrderError::InvalidQuantity {
                quantity: draft.quantity,
            });
        }
        if !draft.unit_price.is_positive() {
            return Err(OrderError::InvalidUnitPrice {
                cents: draft.unit_price.cents(),
            });
        }
        match draft.item_type {
            ItemType::Part if draft.from_inventory && draft.inventory_item_id.is_none() => {
                return Err(OrderError::InventoryLinkRequired);
            }
            ItemType::Labor if draft.inventory_item_id.is_some() => {
                return Err(OrderError::LaborCannotLinkInventory);
            }
            _ => {}
        }

        checked_subtotal(self.totals().subtotal(), draft.unit_price, draft.quantity)?;

        let item = ServiceItem::from_draft(item_id, draft);
        Ok(vec![OrderEvent::item_added(item, now)])
    }

    /// Removes a line item.
    ///
    /// An unknown id is not an error: no events are produced.
    pub fn remove_item(
        &self,
        item_id: ItemId,
        now: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_ledger_editable("remove item")?;

        match self.get_item(item_id) {
            Some(item) => Ok(vec![OrderEvent::item_removed(item.clone(), now)]),
            None => Ok(vec![]),
        }
    }

    /// Sets the discount, clamped to the allowed range.
    pub fn set_discount(
        &self,
        requested: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_ledger_editable("change discount")?;

        let discount = clamp_discount(requested)?;
        if discount.applied == self.discount_percentage && !discount.was_clamped() {
            return Ok(vec![]);
        }

        Ok(vec![OrderEvent::discount_changed(
            requested,
            discount.applied,
            now,
        )])
    }

    /// Changes the status manually.
    ///
    /// With `notify`, composes the template for the new status when the
    /// customer consented. Setting the current status again does nothing.
    pub fn change_status(
        &self,
        to: OrderStatus,
        notify: bool,
        ctx: &NotificationContext,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_change_manually() {
            return Err(OrderError::OrderPaid {
                action: "change status",
            });
        }
        if !to.is_manual_target() {
            return Err(OrderError::PaidRequiresPayment);
        }
        if to == self.status {
            return Ok(vec![]);
        }

        let mut events = vec![OrderEvent::status_changed(self.status, to, ctx.now)];
        if notify {
            events.extend(self.notification_after(&events, NotificationTrigger::for_status(to), ctx));
        }
        Ok(events)
    }

    /// Assigns (or with None, unassigns) the responsible mechanic.
    pub fn assign_mechanic(
        &self,
        mechanic_id: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if mechanic_id == self.assigned_mechanic_id {
            return Ok(vec![]);
        }
        Ok(vec![OrderEvent::mechanic_assigned(mechanic_id, now)])
    }

    /// Attaches an AI diagnosis. A missing result leaves the order as it is.
    pub fn attach_diagnosis(
        &self,
        diagnosis: Option<AiDiagnosis>,
        now: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match diagnosis {
            Some(diagnosis) if !diagnosis.is_empty() => {
                Ok(vec![OrderEvent::diagnosis_attached(diagnosis, now)])
            }
            _ => Ok(vec![]),
        }
    }

    /// Registers the payment and closes the order.
    ///
    /// The confirmed amount is trusted as entered; a difference from the
    /// total is recorded, not rejected.
    pub fn register_payment(
        &self,
        method: PaymentMethod,
        amount_confirmed: Money,
        notes: Option<String>,
        notify: bool,
        ctx: &NotificationContext,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_register_payment() {
            return Err(OrderError::AlreadyPaid);
        }
        if !self.total_cost.is_positive() {
            return Err(OrderError::ZeroTotal);
        }

        let mut events = vec![OrderEvent::PaymentRegistered(PaymentRegisteredData {
            method,
            amount_confirmed,
            total_at_payment: self.total_cost,
            notes: notes.filter(|n| !n.trim().is_empty()),
            paid_at: ctx.now,
        })];
        if notify {
            events.extend(self.notification_after(&events, Some(NotificationTrigger::Paid), ctx));
        }
        Ok(events)
    }

    /// Composes the preventive maintenance reminder from the attached diagnosis.
    ///
    /// Produces nothing without consent or without a diagnosis.
    pub fn send_preventive_reminder(
        &self,
        ctx: &NotificationContext,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        Ok(compose(self, NotificationTrigger::PreventiveReminder, ctx)
            .map(OrderEvent::CustomerNotified)
            .into_iter()
            .collect())
    }

    fn ensure_ledger_editable(&self, action: &'static str) -> Result<(), OrderError> {
        if self.status.can_edit_ledger() {
            Ok(())
        } else {
            Err(OrderError::OrderPaid { action })
        }
    }

    /// Composes a message against the state the preceding events produce.
    fn notification_after(
        &self,
        events: &[OrderEvent],
        trigger: Option<NotificationTrigger>,
        ctx: &NotificationContext,
    ) -> Option<OrderEvent> {
        let trigger = trigger?;
        let mut next = self.clone();
        next.apply_events(events.iter().cloned());
        compose(&next, trigger, ctx).map(OrderEvent::CustomerNotified)
    }
}

// Apply event helpers
impl ServiceOrder {
    fn from_opened(data: OrderOpenedData) -> Self {
        Self {
            id: data.order_id,
            customer: data.customer,
            vehicle: data.vehicle,
            complaint: data.complaint,
            status: OrderStatus::Pending,
            assigned_mechanic_id: data.assigned_mechanic_id,
            items: Vec::new(),
            labor_cost: Money::zero(),
            parts_cost: Money::zero(),
            discount_percentage: Percentage::ZERO,
            total_cost: Money::zero(),
            payment_method: None,
            payment_date: None,
            amount_paid: None,
            payment_notes: None,
            ai_diagnosis: None,
            notifications: Vec::new(),
            fiscal_notes: data.fiscal_notes,
            created_at: data.opened_at,
            updated_at: data.opened_at,
            completed_at: None,
        }
    }

    /// Sole writer of the three cost fields.
    fn refresh_totals(&mut self) {
        let totals = recompute_totals(&self.items, self.discount_percentage);
        self.labor_cost = totals.labor_cost;
        self.parts_cost = totals.parts_cost;
        self.total_cost = totals.total_cost;
    }

    fn apply_payment(&mut self, data: PaymentRegisteredData) {
        self.status = OrderStatus::Paid;
        self.payment_method = Some(data.method);
        self.payment_date = Some(data.paid_at);
        self.amount_paid = Some(data.amount_confirmed);
        self.payment_notes = data.notes;
    }
}
