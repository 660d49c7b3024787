//! Staff members.

use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Percentage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Mechanic,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Mechanic => "MECHANIC",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A staff member. Never deleted, only deactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    /// Share of completed labor revenue paid as commission.
    #[serde(default)]
    pub commission_rate: Percentage,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Input for a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub commission_rate: Percentage,
}

impl User {
    /// Validates the input and creates an active user.
    pub fn create(new: NewUser, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation("user name is required".to_string()));
        }
        if new.commission_rate > Percentage::from_basis_points(10_000) {
            return Err(DomainError::Validation(
                "commission rate cannot exceed 100%".to_string(),
            ));
        }

        Ok(Self {
            id: UserId::new(),
            name: name.to_string(),
            email: new.email.filter(|e| !e.trim().is_empty()),
            role: new.role,
            commission_rate: new.commission_rate,
            active: true,
            created_at: now,
        })
    }

    /// First word of the name, as used in customer messages.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
