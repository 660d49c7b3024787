//! Service order operations.

use chrono::Utc;
use common::{ItemId, LogId, NotificationId, OrderId, UserId};
use metrics::{counter, histogram};
use serde::Deserialize;
use store::{BlobWrite, CollectionKey, Revision, StateStore, WriteOptions};

use super::{WorkshopService, find_order};
use crate::aggregate::Aggregate;
use crate::audit::{AuditAction, AuditLogEntry};
use crate::auth::Actor;
use crate::command::{self, Command, CommandResult};
use crate::error::DomainError;
use crate::inventory::Inventory;
use crate::order::{
    AddItem, AssignMechanic, AttachDiagnosis, ChangeStatus, NotificationContext, OrderError,
    OrderEvent, OrderIntake, OrderStatus, RegisterPayment, RemoveItem, ServiceOrder, SetDiscount,
    whatsapp_link,
};
use crate::warning::Warning;

/// Criteria for listing orders. Empty criteria match everything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    #[serde(default)]
    pub status: Option<OrderStatus>,

    /// Case-insensitive text matched against order number, customer,
    /// plate and vehicle model.
    #[serde(default)]
    pub query: Option<String>,

    #[serde(default)]
    pub mechanic_id: Option<UserId>,
}

impl OrderFilter {
    pub fn matches(&self, order: &ServiceOrder) -> bool {
        if self.status.is_some_and(|status| order.status() != status) {
            return false;
        }
        if self
            .mechanic_id
            .is_some_and(|id| order.assigned_mechanic_id() != Some(id))
        {
            return false;
        }

        match self.query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => {
                let query = query.to_lowercase();
                [
                    order.id().to_string(),
                    order.customer().name.clone(),
                    order.vehicle().plate.clone(),
                    order.vehicle().model.clone(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
            }
            _ => true,
        }
    }
}

/// Result of an order mutation.
#[derive(Debug, Clone)]
pub struct OrderOutcome {
    /// The order after the mutation.
    pub order: ServiceOrder,

    /// Events the mutation produced. Empty when nothing changed.
    pub events: Vec<OrderEvent>,

    pub warnings: Vec<Warning>,

    /// Audit entry written for the mutation, if anything changed.
    pub log_id: Option<LogId>,
}

impl OrderOutcome {
    fn unchanged(order: ServiceOrder) -> Self {
        Self {
            order,
            events: Vec::new(),
            warnings: Vec::new(),
            log_id: None,
        }
    }

    /// Returns true if the mutation changed nothing.
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }
}

impl<S: StateStore> WorkshopService<S> {
    /// Opens a new service order with the next free number.
    #[tracing::instrument(skip(self, actor, intake), fields(actor = %actor.name))]
    pub async fn open_order(
        &self,
        actor: &Actor,
        intake: OrderIntake,
    ) -> Result<OrderOutcome, DomainError> {
        let (mut orders, revision) = self.load_orders().await?;
        let id = orders
            .iter()
            .map(|order| order.id())
            .max()
            .map(|last| last.next())
            .unwrap_or(OrderId::FIRST);

        let ctx = self.notification_context(intake.assigned_mechanic_id).await?;
        let CommandResult {
            aggregate: order,
            events,
        } = ServiceOrder::open(id, intake, &ctx)?;

        orders.push(order.clone());
        let entry = AuditLogEntry::new(
            AuditAction::Create,
            actor,
            describe_events(id, &events),
            ctx.now,
        )
        .with_target(id);
        let log_id = self
            .commit_with_audit(
                vec![BlobWrite::new(
                    CollectionKey::Orders,
                    &orders,
                    WriteOptions::expect_revision(revision),
                )?],
                entry,
            )
            .await?;

        record_metrics(&events);
        tracing::info!(order_id = %id, customer = %order.customer().name, "Order opened");

        Ok(OrderOutcome {
            order,
            events,
            warnings: Vec::new(),
            log_id: Some(log_id),
        })
    }

    /// Gets an order by id.
    pub async fn get_order(&self, id: OrderId) -> Result<ServiceOrder, DomainError> {
        let (mut orders, _) = self.load_orders().await?;
        let index = find_order(&orders, id)?;
        Ok(orders.swap_remove(index))
    }

    /// Lists orders matching `filter`, newest first.
    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<ServiceOrder>, DomainError> {
        let (orders, _) = self.load_orders().await?;
        let mut matching: Vec<_> = orders.into_iter().filter(|o| filter.matches(o)).collect();
        matching.sort_by_key(|order| std::cmp::Reverse(order.id()));
        Ok(matching)
    }

    /// Adds a line item. Parts linked to inventory take their quantity out of stock.
    #[tracing::instrument(skip(self, actor, cmd), fields(order_id = %cmd.aggregate_id()))]
    pub async fn add_item(&self, actor: &Actor, cmd: AddItem) -> Result<OrderOutcome, DomainError> {
        let item_id = ItemId::new();
        self.mutate_order(actor, cmd.order_id, |order, ctx| {
            order.add_item(item_id, cmd.draft, ctx.now)
        })
        .await
    }

    /// Removes a line item, giving linked stock back.
    #[tracing::instrument(skip(self, actor, cmd), fields(order_id = %cmd.aggregate_id()))]
    pub async fn remove_item(
        &self,
        actor: &Actor,
        cmd: RemoveItem,
    ) -> Result<OrderOutcome, DomainError> {
        self.mutate_order(actor, cmd.order_id, |order, ctx| {
            order.remove_item(cmd.item_id, ctx.now)
        })
        .await
    }

    /// Sets the discount. Out-of-range requests are clamped and reported.
    #[tracing::instrument(skip(self, actor, cmd), fields(order_id = %cmd.aggregate_id()))]
    pub async fn set_discount(
        &self,
        actor: &Actor,
        cmd: SetDiscount,
    ) -> Result<OrderOutcome, DomainError> {
        self.mutate_order(actor, cmd.order_id, |order, ctx| {
            order.set_discount(cmd.percent, ctx.now)
        })
        .await
    }

    /// Moves the order through the workflow.
    #[tracing::instrument(skip(self, actor, cmd), fields(order_id = %cmd.aggregate_id(), to = %cmd.status))]
    pub async fn change_status(
        &self,
        actor: &Actor,
        cmd: ChangeStatus,
    ) -> Result<OrderOutcome, DomainError> {
        self.mutate_order(actor, cmd.order_id, |order, ctx| {
            order.change_status(cmd.status, cmd.notify, ctx)
        })
        .await
    }

    /// Assigns the responsible mechanic, who must be an active user.
    #[tracing::instrument(skip(self, actor, cmd), fields(order_id = %cmd.aggregate_id()))]
    pub async fn assign_mechanic(
        &self,
        actor: &Actor,
        cmd: AssignMechanic,
    ) -> Result<OrderOutcome, DomainError> {
        if let Some(mechanic_id) = cmd.mechanic_id {
            let (users, _) = self.load_users().await?;
            let user = users
                .iter()
                .find(|u| u.id == mechanic_id)
                .ok_or_else(|| DomainError::not_found("user", mechanic_id))?;
            if !user.active {
                return Err(DomainError::InvalidState(format!(
                    "user {} is inactive",
                    user.name
                )));
            }
        }

        self.mutate_order(actor, cmd.order_id, |order, ctx| {
            order.assign_mechanic(cmd.mechanic_id, ctx.now)
        })
        .await
    }

    /// Registers the payment and closes the order.
    #[tracing::instrument(skip(self, actor, cmd), fields(order_id = %cmd.aggregate_id(), method = %cmd.method.as_str()))]
    pub async fn register_payment(
        &self,
        actor: &Actor,
        cmd: RegisterPayment,
    ) -> Result<OrderOutcome, DomainError> {
        self.mutate_order(actor, cmd.order_id, |order, ctx| {
            order.register_payment(cmd.method, cmd.amount_confirmed, cmd.notes, cmd.notify, ctx)
        })
        .await
    }

    /// Attaches an AI diagnosis. Without one the order is left as it is.
    #[tracing::instrument(skip(self, actor, cmd), fields(order_id = %cmd.aggregate_id()))]
    pub async fn attach_diagnosis(
        &self,
        actor: &Actor,
        cmd: AttachDiagnosis,
    ) -> Result<OrderOutcome, DomainError> {
        self.mutate_order(actor, cmd.order_id, |order, ctx| {
            order.attach_diagnosis(cmd.diagnosis, ctx.now)
        })
        .await
    }

    /// Composes the preventive maintenance reminder.
    #[tracing::instrument(skip(self, actor))]
    pub async fn send_preventive_reminder(
        &self,
        actor: &Actor,
        order_id: OrderId,
    ) -> Result<OrderOutcome, DomainError> {
        self.mutate_order(actor, order_id, |order, ctx| {
            order.send_preventive_reminder(ctx)
        })
        .await
    }

    /// Builds the WhatsApp share link for a stored message.
    pub async fn notification_share_link(
        &self,
        order_id: OrderId,
        notification_id: NotificationId,
    ) -> Result<String, DomainError> {
        let order = self.get_order(order_id).await?;
        let notification = order
            .get_notification(notification_id)
            .ok_or_else(|| DomainError::not_found("notification", notification_id))?;

        order
            .customer()
            .phone
            .as_deref()
            .and_then(|phone| whatsapp_link(phone, &notification.message))
            .ok_or_else(|| DomainError::Validation("customer has no phone number".to_string()))
    }

    /// Deletes an order after the delete authorizer approves.
    ///
    /// Paid orders are kept. The audit entry carries a full copy of the
    /// deleted order.
    #[tracing::instrument(skip(self, actor, password), fields(actor = %actor.name))]
    pub async fn delete_order(
        &self,
        actor: &Actor,
        order_id: OrderId,
        password: &str,
    ) -> Result<LogId, DomainError> {
        self.authorizer.authorize_delete(actor, password)?;

        let (mut orders, revision) = self.load_orders().await?;
        let index = find_order(&orders, order_id)?;
        if orders[index].is_paid() {
            return Err(OrderError::OrderPaid { action: "delete" }.into());
        }

        let order = orders.remove(index);
        let entry = AuditLogEntry::new(
            AuditAction::Delete,
            actor,
            format!(
                "{} excluída ({}, {})",
                order_id,
                order.customer().name,
                order.total_cost()
            ),
            Utc::now(),
        )
        .with_target(order_id)
        .with_snapshot(order);

        let log_id = self
            .commit_with_audit(
                vec![BlobWrite::new(
                    CollectionKey::Orders,
                    &orders,
                    WriteOptions::expect_revision(revision),
                )?],
                entry,
            )
            .await?;

        counter!("orders_deleted_total").increment(1);
        tracing::info!(%order_id, "Order deleted");

        Ok(log_id)
    }

    /// Runs a command against one order and commits the result.
    ///
    /// A command that produces no events writes nothing, not even an
    /// audit entry.
    async fn mutate_order<F>(
        &self,
        actor: &Actor,
        order_id: OrderId,
        command_fn: F,
    ) -> Result<OrderOutcome, DomainError>
    where
        F: FnOnce(&ServiceOrder, &NotificationContext) -> Result<Vec<OrderEvent>, OrderError>,
    {
        let (mut orders, orders_revision) = self.load_orders().await?;
        let index = find_order(&orders, order_id)?;
        let ctx = self
            .notification_context(orders[index].assigned_mechanic_id())
            .await?;

        let result = command::execute(&orders[index], |order| command_fn(order, &ctx))?;
        if result.is_noop() {
            tracing::debug!(%order_id, "Command produced no events");
            return Ok(OrderOutcome::unchanged(result.aggregate));
        }
        let CommandResult {
            aggregate: order,
            events,
        } = result;

        let mut warnings: Vec<Warning> = events.iter().filter_map(Warning::from_event).collect();
        let mut writes = Vec::with_capacity(2);

        orders[index] = order.clone();
        writes.push(BlobWrite::new(
            CollectionKey::Orders,
            &orders,
            WriteOptions::expect_revision(orders_revision),
        )?);

        if let Some((inventory, revision, stock_warnings)) = self.move_stock(&events).await? {
            warnings.extend(stock_warnings);
            writes.push(BlobWrite::new(
                CollectionKey::Inventory,
                &inventory,
                WriteOptions::expect_revision(revision),
            )?);
        }

        let entry = AuditLogEntry::new(
            audit_action(&events),
            actor,
            describe_events(order_id, &events),
            ctx.now,
        )
        .with_target(order_id);
        let log_id = self.commit_with_audit(writes, entry).await?;

        record_metrics(&events);
        for warning in &warnings {
            tracing::warn!(%order_id, warning = %warning.message(), "Order changed with warning");
        }

        Ok(OrderOutcome {
            order,
            events,
            warnings,
            log_id: Some(log_id),
        })
    }

    /// Applies the stock side of ledger events to a copy of the inventory.
    ///
    /// Returns None when no event touches stock.
    async fn move_stock(
        &self,
        events: &[OrderEvent],
    ) -> Result<Option<(Inventory, Revision, Vec<Warning>)>, DomainError> {
        let linked = events.iter().any(|event| match event {
            OrderEvent::ItemAdded(data) => data.item.is_stock_linked(),
            OrderEvent::ItemRemoved(data) => data.item.is_stock_linked(),
            _ => false,
        });
        if !linked {
            return Ok(None);
        }

        let (mut inventory, revision) = self.load_inventory().await?;
        let mut warnings = Vec::new();

        for event in events {
            match event {
                OrderEvent::ItemAdded(data) => {
                    if let Some(stock_id) = data.item.inventory_item_id {
                        let movement =
                            inventory.deduct_stock(stock_id, data.item.quantity, self.stock_policy)?;
                        if let Some(warning) = Warning::from_movement(&movement) {
                            warnings.push(warning);
                        }
                    }
                }
                OrderEvent::ItemRemoved(data) => {
                    if let Some(stock_id) = data.item.inventory_item_id
                        && let Err(e) = inventory.return_stock(stock_id, data.item.quantity)
                    {
                        tracing::warn!(%stock_id, error = %e, "Could not return stock for removed item");
                    }
                }
                _ => {}
            }
        }

        Ok(Some((inventory, revision, warnings)))
    }

    /// Builds the template context, resolving the mechanic's first name.
    async fn notification_context(
        &self,
        mechanic_id: Option<UserId>,
    ) -> Result<NotificationContext, DomainError> {
        let ctx = NotificationContext::at(Utc::now());
        let Some(mechanic_id) = mechanic_id else {
            return Ok(ctx);
        };

        let (users, _) = self.load_users().await?;
        Ok(match users.iter().find(|u| u.id == mechanic_id) {
            Some(user) => ctx.with_mechanic(user.first_name()),
            None => ctx,
        })
    }
}

fn audit_action(events: &[OrderEvent]) -> AuditAction {
    if events
        .iter()
        .any(|e| matches!(e, OrderEvent::PaymentRegistered(_)))
    {
        AuditAction::Finance
    } else if events.iter().any(|e| matches!(e, OrderEvent::OrderOpened(_))) {
        AuditAction::Create
    } else {
        AuditAction::Update
    }
}

fn describe_events(order_id: OrderId, events: &[OrderEvent]) -> String {
    events
        .iter()
        .map(|event| match event {
            OrderEvent::OrderOpened(data) => {
                format!("{} aberta para {}", order_id, data.customer.name)
            }
            OrderEvent::ItemAdded(data) => format!(
                "Item adicionado à {}: {} ({}x {})",
                order_id, data.item.description, data.item.quantity, data.item.unit_price
            ),
            OrderEvent::ItemRemoved(data) => {
                format!("Item removido da {}: {}", order_id, data.item.description)
            }
            OrderEvent::DiscountChanged(data) => {
                format!("Desconto da {} alterado para {}", order_id, data.applied)
            }
            OrderEvent::StatusChanged(data) => format!(
                "Status da {} alterado de {} para {}",
                order_id,
                data.from.label(),
                data.to.label()
            ),
            OrderEvent::MechanicAssigned(data) => match data.mechanic_id {
                Some(_) => format!("Mecânico responsável da {} alterado", order_id),
                None => format!("Mecânico responsável removido da {}", order_id),
            },
            OrderEvent::DiagnosisAttached(_) => {
                format!("Diagnóstico IA anexado à {}", order_id)
            }
            OrderEvent::PaymentRegistered(data) => format!(
                "Pagamento da {} registrado: {} via {}",
                order_id,
                data.amount_confirmed,
                data.method.label()
            ),
            OrderEvent::CustomerNotified(notification) => format!(
                "Mensagem ao cliente gerada para {} ({:?})",
                order_id, notification.trigger
            ),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn record_metrics(events: &[OrderEvent]) {
    for event in events {
        match event {
            OrderEvent::OrderOpened(_) => counter!("orders_opened_total").increment(1),
            OrderEvent::ItemAdded(data) => {
                counter!("order_items_added_total", "type" => data.item.item_type.as_str())
                    .increment(1)
            }
            OrderEvent::ItemRemoved(_) => counter!("order_items_removed_total").increment(1),
            OrderEvent::PaymentRegistered(data) => {
                counter!("payments_registered_total", "method" => data.method.as_str())
                    .increment(1);
                histogram!("payment_amount_cents").record(data.amount_confirmed.cents() as f64);
            }
            OrderEvent::CustomerNotified(_) => {
                counter!("notifications_generated_total").increment(1)
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Customer, Vehicle};

    fn order(status: OrderStatus) -> ServiceOrder {
        let intake = OrderIntake {
            customer: Customer {
                name: "João Silva".to_string(),
                cpf: None,
                phone: None,
                email: None,
                accepts_notifications: false,
            },
            vehicle: Vehicle {
                manufacturer: "Fiat".to_string(),
                model: "Uno".to_string(),
                year: Some(2012),
                color: None,
                plate: "ABC1D23".to_string(),
                mileage: None,
            },
            complaint: "Barulho no freio".to_string(),
            assigned_mechanic_id: None,
            fiscal_notes: None,
        };
        let ctx = NotificationContext::at(Utc::now());
        let opened = ServiceOrder::open(OrderId::new(7), intake, &ctx).unwrap();
        if status == OrderStatus::Pending {
            return opened.aggregate;
        }
        command::execute(&opened.aggregate, |o| o.change_status(status, false, &ctx))
            .unwrap()
            .aggregate
    }

    #[test]
    fn test_filter_by_query_matches_plate_and_number() {
        let order = order(OrderStatus::Pending);
        let by_plate = OrderFilter {
            query: Some("abc1".to_string()),
            ..Default::default()
        };
        let by_number = OrderFilter {
            query: Some("os-0007".to_string()),
            ..Default::default()
        };
        let miss = OrderFilter {
            query: Some("gol".to_string()),
            ..Default::default()
        };

        assert!(by_plate.matches(&order));
        assert!(by_number.matches(&order));
        assert!(!miss.matches(&order));
        assert!(OrderFilter::default().matches(&order));
    }

    #[test]
    fn test_filter_by_status_and_mechanic() {
        let order = order(OrderStatus::InProgress);
        let in_progress = OrderFilter {
            status: Some(OrderStatus::InProgress),
            ..Default::default()
        };
        let someone = OrderFilter {
            mechanic_id: Some(UserId::new()),
            ..Default::default()
        };
        assert!(in_progress.matches(&order));
        assert!(!someone.matches(&order));
    }

    #[test]
    fn test_status_change_is_an_update() {
        let events = vec![OrderEvent::status_changed(
            OrderStatus::Pending,
            OrderStatus::Approval,
            Utc::now(),
        )];
        assert_eq!(audit_action(&events), AuditAction::Update);
    }

    #[test]
    fn test_describe_status_change_in_portuguese() {
        let events = vec![OrderEvent::status_changed(
            OrderStatus::Pending,
            OrderStatus::Completed,
            Utc::now(),
        )];
        let text = describe_events(OrderId::new(3), &events);
        assert!(text.starts_with("Status da OS-0003 alterado de "));
    }
}
