//! Service order status workflow.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The status of a service order in its lifecycle.
///
/// The nominal flow is:
/// ```text
/// Pending ──► Diagnosing ──► Approval ──► WaitingParts ──► InProgress ──► Completed ──► Paid
/// ```
/// Any status except `Paid` may be selected manually at any time. `Paid` is
/// terminal and only reachable by registering a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Vehicle received, nothing done yet.
    #[default]
    Pending,

    /// Mechanic is diagnosing the complaint.
    Diagnosing,

    /// Quote sent, waiting for the customer's approval.
    Approval,

    /// Approved, waiting for parts to arrive.
    WaitingParts,

    /// Work is being done.
    InProgress,

    /// Work is done, vehicle ready for pickup.
    Completed,

    /// Payment registered (terminal state).
    Paid,
}

impl OrderStatus {
    /// Every status, in workflow order.
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Diagnosing,
        OrderStatus::Approval,
        OrderStatus::WaitingParts,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Paid,
    ];

    /// Returns true if line items and discount can be changed in this status.
    pub fn can_edit_ledger(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the status can be changed manually from this status.
    pub fn can_change_manually(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this status can be picked as a manual target.
    pub fn is_manual_target(&self) -> bool {
        !matches!(self, OrderStatus::Paid)
    }

    /// Returns true if a payment can be registered in this status.
    pub fn can_register_payment(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid)
    }

    /// Returns true if the work on the order is finished.
    pub fn is_finished(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Paid)
    }

    /// Statuses offered for manual selection.
    pub fn manual_options() -> impl Iterator<Item = OrderStatus> {
        Self::ALL.into_iter().filter(|s| s.is_manual_target())
    }

    /// Returns the status name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Diagnosing => "DIAGNOSING",
            OrderStatus::Approval => "APPROVAL",
            OrderStatus::WaitingParts => "WAITING_PARTS",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Paid => "PAID",
        }
    }

    /// Returns the label shown to operators.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendente",
            OrderStatus::Diagnosing => "Em diagnóstico",
            OrderStatus::Approval => "Aguardando aprovação",
            OrderStatus::WaitingParts => "Aguardando peças",
            OrderStatus::InProgress => "Em execução",
            OrderStatus::Completed => "Concluído",
            OrderStatus::Paid => "Pago",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string is not a known status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_only_paid_locks_the_ledger() {
        for status in OrderStatus::ALL {
            assert_eq!(status.can_edit_ledger(), status != OrderStatus::Paid);
        }
    }

    #[test]
    fn test_paid_is_not_a_manual_option() {
        let options: Vec<_> = OrderStatus::manual_options().collect();
        assert_eq!(options.len(), 6);
        assert!(options.contains(&OrderStatus::WaitingParts));
        assert!(!options.contains(&OrderStatus::Paid));
    }

    #[test]
    fn test_finished_states() {
        assert!(OrderStatus::Completed.is_finished());
        assert!(OrderStatus::Paid.is_finished());
        assert!(!OrderStatus::InProgress.is_finished());
    }

    #[test]
    fn test_serialization_uses_screaming_case() {
        let json = serde_json::to_string(&OrderStatus::WaitingParts).unwrap();
        assert_eq!(json, "\"WAITING_PARTS\"");
        let back: OrderStatus = serde_json::from_str("\"IN_PROGRESS\"").unwrap();
        assert_eq!(back, OrderStatus::InProgress);
    }

    #[test]
    fn test_parse() {
        assert_eq!("waiting-parts".parse(), Ok(OrderStatus::WaitingParts));
        assert_eq!("PAID".parse(), Ok(OrderStatus::Paid));
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(OrderStatus::Approval.to_string(), "APPROVAL");
        assert_eq!(OrderStatus::Approval.label(), "Aguardando aprovação");
    }
}
