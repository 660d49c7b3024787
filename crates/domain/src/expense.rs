//! Operating expenses.

use chrono::{DateTime, NaiveDate, Utc};
use common::ExpenseId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;

/// Expense category, as used by the DRE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    Fixed,
    Variable,
    Payroll,
    Parts,
    Taxes,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Fixed,
        ExpenseCategory::Variable,
        ExpenseCategory::Payroll,
        ExpenseCategory::Parts,
        ExpenseCategory::Taxes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Fixed => "FIXED",
            ExpenseCategory::Variable => "VARIABLE",
            ExpenseCategory::Payroll => "PAYROLL",
            ExpenseCategory::Parts => "PARTS",
            ExpenseCategory::Taxes => "TAXES",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Fixed => "Despesas fixas",
            ExpenseCategory::Variable => "Despesas variáveis",
            ExpenseCategory::Payroll => "Folha de pagamento",
            ExpenseCategory::Parts => "Compra de peças",
            ExpenseCategory::Taxes => "Impostos",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    #[default]
    Pending,
    Paid,
}

/// An operating cost record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    pub category: ExpenseCategory,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub status: ExpenseStatus,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for a new expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub description: String,
    pub category: ExpenseCategory,
    pub amount: Money,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: ExpenseStatus,
}

impl Expense {
    /// Validates the input and creates the record.
    pub fn create(new: NewExpense, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if new.description.trim().is_empty() {
            return Err(DomainError::Validation(
                "expense description is required".to_string(),
            ));
        }
        if !new.amount.is_positive() {
            return Err(DomainError::Validation(
                "expense amount must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            id: ExpenseId::new(),
            description: new.description.trim().to_string(),
            category: new.category,
            amount: new.amount,
            due_date: new.due_date,
            paid_at: (new.status == ExpenseStatus::Paid).then_some(now),
            status: new.status,
            created_at: now,
        })
    }

    /// Pending and past its due date.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == ExpenseStatus::Pending && self.due_date < now.date_naive()
    }

    /// Marks the expense as paid.
    pub fn pay(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status == ExpenseStatus::Paid {
            return Err(DomainError::InvalidState(format!(
                "expense {} is already paid",
                self.id
            )));
        }
        self.status = ExpenseStatus::Paid;
        self.paid_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn rent(due: NaiveDate) -> Expense {
        Expense::create(
            NewExpense {
                description: "Aluguel do galpão".into(),
                category: ExpenseCategory::Fixed,
                amount: Money::from_reais(3500),
                due_date: due,
                status: ExpenseStatus::Pending,
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn test_overdue_only_when_pending_and_past_due() {
        let yesterday = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

        assert!(rent(yesterday).is_overdue(now()));
        assert!(!rent(today).is_overdue(now()));

        let mut paid = rent(yesterday);
        paid.pay(now()).unwrap();
        assert!(!paid.is_overdue(now()));
        assert_eq!(paid.paid_at, Some(now()));
    }

    #[test]
    fn test_cannot_pay_twice() {
        let mut expense = rent(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        expense.pay(now()).unwrap();
        assert!(matches!(
            expense.pay(now()),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn test_create_validates() {
        let result = Expense::create(
            NewExpense {
                description: "Luz".into(),
                category: ExpenseCategory::Fixed,
                amount: Money::zero(),
                due_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                status: ExpenseStatus::Pending,
            },
            now(),
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_created_paid_records_payment_time() {
        let expense = Expense::create(
            NewExpense {
                description: "DAS".into(),
                category: ExpenseCategory::Taxes,
                amount: Money::from_reais(420),
                due_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
                status: ExpenseStatus::Paid,
            },
            now(),
        )
        .unwrap();
        assert_eq!(expense.paid_at, Some(now()));
    }

    #[test]
    fn test_serialization() {
        let expense = rent(NaiveDate::from_ymd_opt(2024, 5, 5).unwrap());
        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["category"], "FIXED");
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["dueDate"], "2024-05-05");
    }
}
