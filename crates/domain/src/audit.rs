//! Append-only audit log.

use chrono::{DateTime, Utc};
use common::{LogId, UserId};
use serde::{Deserialize, Serialize};

use crate::auth::Actor;
use crate::order::ServiceOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Login,
    Finance,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Login => "LOGIN",
            AuditAction::Finance => "FINANCE",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One audit record. Never changed after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: LogId,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub actor_id: Option<UserId>,
    pub actor_name: String,
    pub details: String,
    #[serde(default)]
    pub target_id: Option<String>,

    /// Full copy of a deleted order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Box<ServiceOrder>>,
}

impl AuditLogEntry {
    pub fn new(
        action: AuditAction,
        actor: &Actor,
        details: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LogId::new(),
            timestamp: now,
            action,
            actor_id: Some(actor.user_id),
            actor_name: actor.name.clone(),
            details: details.into(),
            target_id: None,
            snapshot: None,
        }
    }

    pub fn with_target(mut self, target: impl ToString) -> Self {
        self.target_id = Some(target.to_string());
        self
    }

    pub fn with_snapshot(mut self, order: ServiceOrder) -> Self {
        self.snapshot = Some(Box::new(order));
        self
    }
}

/// The log collection, newest entry first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLog {
    entries: Vec<AuditLogEntry>,
}

impl AuditLog {
    /// Appends an entry and returns its id.
    pub fn append(&mut self, entry: AuditLogEntry) -> LogId {
        let id = entry.id;
        self.entries.insert(0, entry);
        id
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[AuditLogEntry] {
        &self.entries
    }

    pub fn get(&self, id: LogId) -> Option<&AuditLogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<AuditLogEntry> {
        self.entries
    }
}
