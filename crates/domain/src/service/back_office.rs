//! Inventory, expenses, settings and the audit log.

use chrono::{DateTime, Utc};
use common::{ExpenseId, InventoryItemId};
use store::{BlobWrite, CollectionKey, StateStore, StateStoreExt, WriteOptions};

use super::WorkshopService;
use crate::audit::{AuditAction, AuditLog, AuditLogEntry};
use crate::auth::Actor;
use crate::error::DomainError;
use crate::expense::{Expense, NewExpense};
use crate::inventory::{InventoryItem, InventoryPatch, NewInventoryItem};
use crate::settings::CompanySettings;

impl<S: StateStore> WorkshopService<S> {
    /// Lists inventory items, optionally only those at or below their minimum.
    pub async fn list_inventory(&self, low_only: bool) -> Result<Vec<InventoryItem>, DomainError> {
        let (inventory, _) = self.load_inventory().await?;
        Ok(if low_only {
            inventory.low_stock().cloned().collect()
        } else {
            inventory.items().to_vec()
        })
    }

    /// Creates an inventory item. Codes are unique, ignoring case.
    #[tracing::instrument(skip(self, actor, new), fields(code = %new.code))]
    pub async fn create_inventory_item(
        &self,
        actor: &Actor,
        new: NewInventoryItem,
    ) -> Result<InventoryItem, DomainError> {
        actor.require_admin("manage inventory")?;

        let (mut inventory, revision) = self.load_inventory().await?;
        let item = inventory.add(new)?.clone();

        let entry = AuditLogEntry::new(
            AuditAction::Update,
            actor,
            format!("Item de estoque cadastrado: {} ({})", item.name, item.code),
            Utc::now(),
        )
        .with_target(item.id);
        self.commit_with_audit(
            vec![BlobWrite::new(
                CollectionKey::Inventory,
                &inventory,
                WriteOptions::expect_revision(revision),
            )?],
            entry,
        )
        .await?;

        tracing::info!(item_id = %item.id, code = %item.code, "Inventory item created");
        Ok(item)
    }

    /// Applies an admin edit to an inventory item.
    #[tracing::instrument(skip(self, actor, patch))]
    pub async fn update_inventory_item(
        &self,
        actor: &Actor,
        id: InventoryItemId,
        patch: InventoryPatch,
    ) -> Result<InventoryItem, DomainError> {
        actor.require_admin("manage inventory")?;

        let (mut inventory, revision) = self.load_inventory().await?;
        let item = inventory.update(id, patch)?.clone();

        let entry = AuditLogEntry::new(
            AuditAction::Update,
            actor,
            format!(
                "Item de estoque {} atualizado (estoque: {})",
                item.code, item.stock_quantity
            ),
            Utc::now(),
        )
        .with_target(id);
        self.commit_with_audit(
            vec![BlobWrite::new(
                CollectionKey::Inventory,
                &inventory,
                WriteOptions::expect_revision(revision),
            )?],
            entry,
        )
        .await?;

        Ok(item)
    }

    /// Lists expenses by due date, optionally only the overdue ones.
    pub async fn list_expenses(
        &self,
        only_overdue: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Expense>, DomainError> {
        let (mut expenses, _) = self.load_expenses().await?;
        if only_overdue {
            expenses.retain(|e| e.is_overdue(now));
        }
        expenses.sort_by_key(|e| e.due_date);
        Ok(expenses)
    }

    /// Records a new expense.
    #[tracing::instrument(skip(self, actor, new))]
    pub async fn create_expense(
        &self,
        actor: &Actor,
        new: NewExpense,
    ) -> Result<Expense, DomainError> {
        actor.require_admin("manage expenses")?;

        let now = Utc::now();
        let expense = Expense::create(new, now)?;
        let (mut expenses, revision) = self.load_expenses().await?;
        expenses.push(expense.clone());

        let entry = AuditLogEntry::new(
            AuditAction::Finance,
            actor,
            format!(
                "Despesa lançada: {} ({}, {})",
                expense.description,
                expense.category.label(),
                expense.amount
            ),
            now,
        )
        .with_target(expense.id);
        self.commit_with_audit(
            vec![BlobWrite::new(
                CollectionKey::Expenses,
                &expenses,
                WriteOptions::expect_revision(revision),
            )?],
            entry,
        )
        .await?;

        metrics::counter!("expenses_created_total", "category" => expense.category.as_str())
            .increment(1);
        Ok(expense)
    }

    /// Marks an expense as paid.
    #[tracing::instrument(skip(self, actor))]
    pub async fn pay_expense(&self, actor: &Actor, id: ExpenseId) -> Result<Expense, DomainError> {
        actor.require_admin("manage expenses")?;

        let now = Utc::now();
        let (mut expenses, revision) = self.load_expenses().await?;
        let expense = expenses
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| DomainError::not_found("expense", id))?;
        expense.pay(now)?;
        let expense = expense.clone();

        let entry = AuditLogEntry::new(
            AuditAction::Finance,
            actor,
            format!("Despesa paga: {} ({})", expense.description, expense.amount),
            now,
        )
        .with_target(id);
        self.commit_with_audit(
            vec![BlobWrite::new(
                CollectionKey::Expenses,
                &expenses,
                WriteOptions::expect_revision(revision),
            )?],
            entry,
        )
        .await?;

        Ok(expense)
    }

    pub async fn get_settings(&self) -> Result<CompanySettings, DomainError> {
        let (settings, _) = self
            .store
            .load_collection::<CompanySettings>(CollectionKey::Settings)
            .await?;
        Ok(settings)
    }

    /// Replaces the company settings.
    #[tracing::instrument(skip(self, actor, settings))]
    pub async fn update_settings(
        &self,
        actor: &Actor,
        settings: CompanySettings,
    ) -> Result<CompanySettings, DomainError> {
        actor.require_admin("change company settings")?;
        settings.validate()?;

        let revision = self.store.revision(CollectionKey::Settings).await?;
        let entry = AuditLogEntry::new(
            AuditAction::Update,
            actor,
            format!("Dados da empresa atualizados: {}", settings.name),
            Utc::now(),
        );
        self.commit_with_audit(
            vec![BlobWrite::new(
                CollectionKey::Settings,
                &settings,
                WriteOptions::expect_revision(revision),
            )?],
            entry,
        )
        .await?;

        Ok(settings)
    }

    /// Returns the audit log, newest first.
    pub async fn list_logs(&self, actor: &Actor) -> Result<AuditLog, DomainError> {
        actor.require_admin("read the audit log")?;
        let (log, _) = self
            .store
            .load_collection::<AuditLog>(CollectionKey::Logs)
            .await?;
        Ok(log)
    }
}
