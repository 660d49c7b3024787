use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Human-readable, monotonically allocated service order number.
///
/// Displayed as `OS-0042`. Parsing accepts both the prefixed form and the
/// bare number so operators can type either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u32);

impl OrderId {
    /// The first number handed out in an empty workshop.
    pub const FIRST: OrderId = OrderId(1);

    /// Creates an order id from its number.
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    /// Returns the numeric part.
    pub fn number(&self) -> u32 {
        self.0
    }

    /// Returns the id that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OS-{:04}", self.0)
    }
}

/// Error returned when a string is not a valid order number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOrderIdError(String);

impl std::fmt::Display for ParseOrderIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid order id: {}", self.0)
    }
}

impl std::error::Error for ParseOrderIdError {}

impl FromStr for OrderId {
    type Err = ParseOrderIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("OS-")
            .or_else(|| trimmed.strip_prefix("os-"))
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .map(OrderId)
            .map_err(|_| ParseOrderIdError(s.to_string()))
    }
}

/// Declares a UUID-backed identifier with the usual conversions.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Identifier of a billable line on a service order.
    ItemId
);
uuid_id!(
    /// Identifier of a stock-keeping unit.
    InventoryItemId
);
uuid_id!(
    /// Identifier of a staff member.
    UserId
);
uuid_id!(
    /// Identifier of an operating expense.
    ExpenseId
);
uuid_id!(
    /// Identifier of an audit log entry.
    LogId
);
uuid_id!(
    /// Identifier of a customer-facing notification.
    NotificationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_displays_with_prefix_and_padding() {
        assert_eq!(OrderId::new(42).to_string(), "OS-0042");
        assert_eq!(OrderId::new(12345).to_string(), "OS-12345");
    }

    #[test]
    fn order_id_parses_prefixed_and_bare_forms() {
        assert_eq!("OS-0042".parse::<OrderId>().unwrap(), OrderId::new(42));
        assert_eq!("17".parse::<OrderId>().unwrap(), OrderId::new(17));
        assert!("OS-abc".parse::<OrderId>().is_err());
    }

    #[test]
    fn order_id_next_is_monotonic() {
        let id = OrderId::FIRST;
        assert_eq!(id.next(), OrderId::new(2));
        assert!(id.next() > id);
    }

    #[test]
    fn uuid_ids_are_unique() {
        let id1 = ItemId::new();
        let id2 = ItemId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn uuid_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = UserId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
        assert_eq!(id.to_string().parse::<UserId>().unwrap(), id);
    }

    #[test]
    fn order_id_serializes_as_number() {
        let json = serde_json::to_string(&OrderId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OrderId::new(7));
    }
}
