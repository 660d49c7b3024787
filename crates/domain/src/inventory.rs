//! Inventory items and the stock linkage used by the ledger.

use std::str::FromStr;

use common::InventoryItemId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;
use crate::money::Money;

/// Errors that can occur during inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// No item with this id.
    #[error("Inventory item not found: {0}")]
    NotFound(InventoryItemId),

    /// Another item already uses this code.
    #[error("Inventory code already in use: {0}")]
    DuplicateCode(String),

    /// Deduction would take stock below zero under `FloorAtZero`.
    #[error("Insufficient stock for {code}: {available} available, {requested} requested")]
    InsufficientStock {
        code: String,
        available: i64,
        requested: u32,
    },

    /// Required field missing or out of range.
    #[error("Invalid inventory item: {0}")]
    InvalidItem(&'static str),
}

impl InventoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InventoryError::NotFound(_) => ErrorKind::NotFound,
            InventoryError::DuplicateCode(_) => ErrorKind::Conflict,
            InventoryError::InsufficientStock { .. } => ErrorKind::InvalidState,
            InventoryError::InvalidItem(_) => ErrorKind::Validation,
        }
    }
}

/// What happens when a deduction would take stock below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockPolicy {
    /// Stock may go negative; the caller gets a warning.
    #[default]
    AllowNegative,

    /// Deductions beyond the available stock are rejected.
    FloorAtZero,
}

impl FromStr for StockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow-negative" => Ok(StockPolicy::AllowNegative),
            "floor-at-zero" => Ok(StockPolicy::FloorAtZero),
            other => Err(format!("unknown stock policy: {other}")),
        }
    }
}

/// Derived stock classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockLevel {
    Ok,
    Low,
}

/// A stock-keeping unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub category: String,
    pub cost_price: Money,
    pub sell_price: Money,
    /// May be negative when the operator overrides a low-stock warning.
    pub stock_quantity: i64,
    pub min_stock_level: i64,
}

impl InventoryItem {
    /// `Low` when stock is at or below the minimum level.
    pub fn stock_level(&self) -> StockLevel {
        if self.stock_quantity <= self.min_stock_level {
            StockLevel::Low
        } else {
            StockLevel::Ok
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock_level() == StockLevel::Low
    }
}

/// Input for a new inventory item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub category: String,
    pub cost_price: Money,
    pub sell_price: Money,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub min_stock_level: i64,
}

/// Admin edit of an inventory item; absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPatch {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    pub cost_price: Option<Money>,
    pub sell_price: Option<Money>,
    pub stock_quantity: Option<i64>,
    pub min_stock_level: Option<i64>,
}

/// A stock change applied to one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMovement {
    pub item_id: InventoryItemId,
    pub code: String,
    pub before: i64,
    pub after: i64,
}

impl StockMovement {
    /// Returns true if this movement left the item below zero.
    pub fn went_negative(&self) -> bool {
        self.after < 0 && self.after < self.before
    }
}

/// The inventory collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: Vec<InventoryItem>,
}

impl Inventory {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn get(&self, id: InventoryItemId) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Finds an item by code, ignoring case.
    pub fn get_by_code(&self, code: &str) -> Option<&InventoryItem> {
        let code = code.trim();
        self.items
            .iter()
            .find(|item| item.code.eq_ignore_ascii_case(code))
    }

    /// Items at or below their minimum level.
    pub fn low_stock(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.iter().filter(|item| item.is_low_stock())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a new item. Codes are unique regardless of case.
    pub fn add(&mut self, new: NewInventoryItem) -> Result<&InventoryItem, InventoryError> {
        let code = new.code.trim().to_string();
        if code.is_empty() {
            return Err(InventoryError::InvalidItem("code is required"));
        }
        if new.name.trim().is_empty() {
            return Err(InventoryError::InvalidItem("name is required"));
        }
        if new.cost_price.is_negative() || new.sell_price.is_negative() {
            return Err(InventoryError::InvalidItem("prices cannot be negative"));
        }
        if self.get_by_code(&code).is_some() {
            return Err(InventoryError::DuplicateCode(code));
        }

        self.items.push(InventoryItem {
            id: InventoryItemId::new(),
            code,
            name: new.name.trim().to_string(),
            manufacturer: new.manufacturer,
            category: new.category,
            cost_price: new.cost_price,
            sell_price: new.sell_price,
            stock_quantity: new.stock_quantity,
            min_stock_level: new.min_stock_level,
        });
        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    /// Applies an admin edit.
    pub fn update(
        &mut self,
        id: InventoryItemId,
        patch: InventoryPatch,
    ) -> Result<&InventoryItem, InventoryError> {
        if patch.cost_price.is_some_and(|p| p.is_negative())
            || patch.sell_price.is_some_and(|p| p.is_negative())
        {
            return Err(InventoryError::InvalidItem("prices cannot be negative"));
        }
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(InventoryError::InvalidItem("name is required"));
        }

        let item = self.find_mut(id)?;
        if let Some(name) = patch.name {
            item.name = name.trim().to_string();
        }
        if let Some(manufacturer) = patch.manufacturer {
            item.manufacturer = manufacturer;
        }
        if let Some(category) = patch.category {
            item.category = category;
        }
        if let Some(cost_price) = patch.cost_price {
            item.cost_price = cost_price;
        }
        if let Some(sell_price) = patch.sell_price {
            item.sell_price = sell_price;
        }
        if let Some(stock_quantity) = patch.stock_quantity {
            item.stock_quantity = stock_quantity;
        }
        if let Some(min_stock_level) = patch.min_stock_level {
            item.min_stock_level = min_stock_level;
        }
        Ok(item)
    }

    /// Takes `quantity` units out of stock.
    ///
    /// Under `AllowNegative` the deduction is unconditional and the returned
    /// movement may end below zero.
    pub fn deduct_stock(
        &mut self,
        id: InventoryItemId,
        quantity: u32,
        policy: StockPolicy,
    ) -> Result<StockMovement, InventoryError> {
        let item = self.find_mut(id)?;
        let before = item.stock_quantity;
        let after = before - quantity as i64;

        if policy == StockPolicy::FloorAtZero && after < 0 {
            return Err(InventoryError::InsufficientStock {
                code: item.code.clone(),
                available: before,
                requested: quantity,
            });
        }

        item.stock_quantity = after;
        Ok(StockMovement {
            item_id: id,
            code: item.code.clone(),
            before,
            after,
        })
    }

    /// Puts `quantity` units back into stock.
    pub fn return_stock(
        &mut self,
        id: InventoryItemId,
        quantity: u32,
    ) -> Result<StockMovement, InventoryError> {
        let item = self.find_mut(id)?;
        let before = item.stock_quantity;
        item.stock_quantity = before + quantity as i64;
        Ok(StockMovement {
            item_id: id,
            code: item.code.clone(),
            before,
            after: item.stock_quantity,
        })
    }

    fn find_mut(&mut self, id: InventoryItemId) -> Result<&mut InventoryItem, InventoryError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(InventoryError::NotFound(id))
    }
}
