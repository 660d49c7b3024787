use serde::{Deserialize, Serialize};

/// The independently persisted collections of the workshop.
///
/// Each collection lives under its own key and carries its own revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKey {
    Orders,
    Users,
    Expenses,
    Inventory,
    Logs,
    Settings,
}

impl CollectionKey {
    /// Every collection, in a stable order.
    pub const ALL: [CollectionKey; 6] = [
        CollectionKey::Orders,
        CollectionKey::Users,
        CollectionKey::Expenses,
        CollectionKey::Inventory,
        CollectionKey::Logs,
        CollectionKey::Settings,
    ];

    /// Returns the collection name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKey::Orders => "orders",
            CollectionKey::Users => "users",
            CollectionKey::Expenses => "expenses",
            CollectionKey::Inventory => "inventory",
            CollectionKey::Logs => "logs",
            CollectionKey::Settings => "settings",
        }
    }

    /// Returns the storage key the collection is persisted under.
    pub fn storage_key(&self) -> String {
        format!("osmech.{}", self.as_str())
    }
}

impl std::fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_keys_are_namespaced_and_distinct() {
        let keys: std::collections::HashSet<_> =
            CollectionKey::ALL.iter().map(|c| c.storage_key()).collect();
        assert_eq!(keys.len(), CollectionKey::ALL.len());
        assert_eq!(CollectionKey::Orders.storage_key(), "osmech.orders");
    }
}
