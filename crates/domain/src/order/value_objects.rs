//! Value objects for the service order aggregate.

use common::{InventoryItemId, ItemId, UserId};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// The customer who brought the vehicle in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// LGPD consent: no customer message is ever generated without it.
    #[serde(default)]
    pub accepts_notifications: bool,
}

impl Customer {
    /// Returns the first word of the customer's name.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or_default()
    }
}

/// The vehicle being serviced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(default)]
    pub manufacturer: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub plate: String,
    #[serde(default)]
    pub mileage: Option<u32>,
}

impl Vehicle {
    /// Returns "manufacturer model", skipping empty parts.
    pub fn display_name(&self) -> String {
        [self.manufacturer.trim(), self.model.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// What the front desk fills in to open an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIntake {
    pub customer: Customer,
    pub vehicle: Vehicle,
    pub complaint: String,
    #[serde(default)]
    pub assigned_mechanic_id: Option<UserId>,
    #[serde(default)]
    pub fiscal_notes: Option<String>,
}

/// Kind of a billable line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Part,
    Labor,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Part => "PART",
            ItemType::Labor => "LABOR",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Execution progress of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Pending,
    InProgress,
    Done,
}

/// One billable line of a service order.
///
/// Immutable once created; `total_price` is always `quantity * unit_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub id: ItemId,
    #[serde(default)]
    pub code: Option<String>,
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub quantity: u32,
    pub unit_price: Money,
    pub total_price: Money,
    #[serde(default)]
    pub inventory_item_id: Option<InventoryItemId>,
    #[serde(default)]
    pub status: Option<ItemStatus>,
    #[serde(default)]
    pub mechanic_id: Option<UserId>,
}

impl ServiceItem {
    /// Builds an item from a validated draft.
    pub(crate) fn from_draft(id: ItemId, draft: ItemDraft) -> Self {
        Self {
            id,
            code: draft.code.filter(|c| !c.trim().is_empty()),
            description: draft.description.trim().to_string(),
            item_type: draft.item_type,
            quantity: draft.quantity,
            unit_price: draft.unit_price,
            total_price: draft.unit_price.multiply(draft.quantity),
            inventory_item_id: draft.inventory_item_id,
            status: draft.status,
            mechanic_id: draft.mechanic_id,
        }
    }

    /// Returns true if removing this item must give stock back.
    pub fn is_stock_linked(&self) -> bool {
        self.item_type == ItemType::Part && self.inventory_item_id.is_some()
    }
}

/// Caller input for a new line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    #[serde(default)]
    pub code: Option<String>,
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub quantity: u32,
    pub unit_price: Money,
    /// The part was picked from inventory and must carry its SKU.
    #[serde(default)]
    pub from_inventory: bool,
    #[serde(default)]
    pub inventory_item_id: Option<InventoryItemId>,
    #[serde(default)]
    pub status: Option<ItemStatus>,
    #[serde(default)]
    pub mechanic_id: Option<UserId>,
}

impl ItemDraft {
    /// A labor line.
    pub fn labor(description: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            code: None,
            description: description.into(),
            item_type: ItemType::Labor,
            quantity,
            unit_price,
            from_inventory: false,
            inventory_item_id: None,
            status: None,
            mechanic_id: None,
        }
    }

    /// A part line not tracked in inventory.
    pub fn part(description: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            item_type: ItemType::Part,
            ..Self::labor(description, quantity, unit_price)
        }
    }

    /// A part line sourced from an inventory SKU.
    pub fn inventory_part(
        inventory_item_id: InventoryItemId,
        description: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            from_inventory: true,
            inventory_item_id: Some(inventory_item_id),
            ..Self::part(description, quantity, unit_price)
        }
    }

    /// Sets the item code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Pix,
    Cash,
    CreditCard,
    DebitCard,
    Boleto,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Cash => "CASH",
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::DebitCard => "DEBIT_CARD",
            PaymentMethod::Boleto => "BOLETO",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "Pix",
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::CreditCard => "Cartão de crédito",
            PaymentMethod::DebitCard => "Cartão de débito",
            PaymentMethod::Boleto => "Boleto",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_total_is_quantity_times_price() {
        let item = ServiceItem::from_draft(
            ItemId::new(),
            ItemDraft::part("Filtro de óleo", 2, Money::from_cents(4550)),
        );
        assert_eq!(item.total_price, Money::from_cents(9100));
        assert!(!item.is_stock_linked());
    }

    #[test]
    fn test_inventory_part_is_stock_linked() {
        let item = ServiceItem::from_draft(
            ItemId::new(),
            ItemDraft::inventory_part(InventoryItemId::new(), "Pastilha", 1, Money::from_reais(90)),
        );
        assert!(item.is_stock_linked());
    }

    #[test]
    fn test_blank_code_is_dropped() {
        let item = ServiceItem::from_draft(
            ItemId::new(),
            ItemDraft::labor("  Alinhamento ", 1, Money::from_reais(80)).with_code("  "),
        );
        assert_eq!(item.code, None);
        assert_eq!(item.description, "Alinhamento");
    }

    #[test]
    fn test_item_serializes_type_field() {
        let item = ServiceItem::from_draft(
            ItemId::new(),
            ItemDraft::labor("Revisão", 1, Money::from_reais(300)),
        );
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "LABOR");
        assert_eq!(json["unitPrice"], 30000);
        assert_eq!(json["totalPrice"], 30000);
    }

    #[test]
    fn test_customer_first_name() {
        let customer = Customer {
            name: "  Maria da Silva".to_string(),
            ..Default::default()
        };
        assert_eq!(customer.first_name(), "Maria");
        assert_eq!(Customer::default().first_name(), "");
    }

    #[test]
    fn test_vehicle_display_name() {
        let vehicle = Vehicle {
            manufacturer: "Fiat".to_string(),
            model: "Uno".to_string(),
            ..Default::default()
        };
        assert_eq!(vehicle.display_name(), "Fiat Uno");
    }

    #[test]
    fn test_payment_method_serialization() {
        let json = serde_json::to_string(&PaymentMethod::CreditCard).unwrap();
        assert_eq!(json, "\"CREDIT_CARD\"");
        assert_eq!(PaymentMethod::Pix.label(), "Pix");
    }
}
