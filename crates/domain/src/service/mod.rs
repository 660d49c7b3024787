//! Workshop service: the transactional boundary around the domain.
//!
//! Every mutation loads the collections it touches with their revisions,
//! runs a pure domain command, and commits all changed collections together
//! with the audit entry in a single batch. A failure at any step leaves the
//! stored state untouched.

mod back_office;
mod orders;
mod team;

pub use orders::{OrderFilter, OrderOutcome};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{LogId, OrderId};
use serde::Serialize;
use store::{BlobWrite, CollectionKey, Revision, StateStore, StateStoreExt, WriteOptions};

use crate::aggregate::Aggregate;
use crate::audit::{AuditLog, AuditLogEntry};
use crate::auth::DeleteAuthorizer;
use crate::error::DomainError;
use crate::expense::Expense;
use crate::inventory::{Inventory, StockPolicy};
use crate::order::ServiceOrder;
use crate::settings::CompanySettings;
use crate::user::User;

/// Read-only copy of every collection, as used by reports.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopSnapshot {
    pub orders: Vec<ServiceOrder>,
    pub users: Vec<User>,
    pub expenses: Vec<Expense>,
    pub inventory: Inventory,
    pub settings: CompanySettings,
    pub taken_at: DateTime<Utc>,
}

/// Application service for the workshop.
///
/// Generic over the state store so tests run against memory and the binary
/// picks a backend at startup.
pub struct WorkshopService<S: StateStore> {
    store: S,
    authorizer: Arc<dyn DeleteAuthorizer>,
    stock_policy: StockPolicy,
}

impl<S: StateStore> WorkshopService<S> {
    /// Creates a service with the default stock policy.
    pub fn new(store: S, authorizer: Arc<dyn DeleteAuthorizer>) -> Self {
        Self {
            store,
            authorizer,
            stock_policy: StockPolicy::default(),
        }
    }

    pub fn with_stock_policy(mut self, policy: StockPolicy) -> Self {
        self.stock_policy = policy;
        self
    }

    pub fn stock_policy(&self) -> StockPolicy {
        self.stock_policy
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads every collection except the audit log.
    #[tracing::instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<WorkshopSnapshot, DomainError> {
        let (orders, _) = self.load_orders().await?;
        let (users, _) = self.load_users().await?;
        let (expenses, _) = self.load_expenses().await?;
        let (inventory, _) = self.load_inventory().await?;
        let (settings, _) = self
            .store
            .load_collection::<CompanySettings>(CollectionKey::Settings)
            .await?;

        Ok(WorkshopSnapshot {
            orders,
            users,
            expenses,
            inventory,
            settings,
            taken_at: Utc::now(),
        })
    }

    async fn load_orders(&self) -> Result<(Vec<ServiceOrder>, Revision), DomainError> {
        Ok(self.store.load_collection(CollectionKey::Orders).await?)
    }

    async fn load_users(&self) -> Result<(Vec<User>, Revision), DomainError> {
        Ok(self.store.load_collection(CollectionKey::Users).await?)
    }

    async fn load_expenses(&self) -> Result<(Vec<Expense>, Revision), DomainError> {
        Ok(self.store.load_collection(CollectionKey::Expenses).await?)
    }

    async fn load_inventory(&self) -> Result<(Inventory, Revision), DomainError> {
        Ok(self.store.load_collection(CollectionKey::Inventory).await?)
    }

    /// Appends `entry` to the log and commits it together with `writes`.
    async fn commit_with_audit(
        &self,
        mut writes: Vec<BlobWrite>,
        entry: AuditLogEntry,
    ) -> Result<LogId, DomainError> {
        let (mut log, revision) = self
            .store
            .load_collection::<AuditLog>(CollectionKey::Logs)
            .await?;
        let log_id = log.append(entry);

        writes.push(BlobWrite::new(
            CollectionKey::Logs,
            &log,
            WriteOptions::expect_revision(revision),
        )?);
        self.store.commit(writes).await?;

        Ok(log_id)
    }
}

fn find_order(orders: &[ServiceOrder], id: OrderId) -> Result<usize, DomainError> {
    orders
        .iter()
        .position(|order| order.id() == id)
        .ok_or_else(|| DomainError::not_found("order", id))
}
