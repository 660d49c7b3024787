//! Identifier types shared across the OSMech workspace.

pub mod types;

pub use types::{
    ExpenseId, InventoryItemId, ItemId, LogId, NotificationId, OrderId, ParseOrderIdError, UserId,
};
