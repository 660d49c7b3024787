//! DRE (Demonstração do Resultado): income statement for a period.

use domain::{ExpenseCategory, ExpenseStatus, Money, WorkshopSnapshot};
use serde::Serialize;

use crate::Result;
use crate::csv::{CsvWriter, Field};
use crate::period::Period;
use crate::report::Report;

/// Expenses of one category due in the period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryExpenses {
    pub category: ExpenseCategory,
    pub label: &'static str,
    pub paid: Money,
    pub pending: Money,
    pub total: Money,
}

/// Income statement.
///
/// Revenue counts orders paid inside the period; expenses count records due
/// inside the period, paid or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DreReport {
    pub period: Period,
    pub paid_orders: usize,
    pub labor_revenue: Money,
    pub parts_revenue: Money,
    /// Labor plus parts, before discounts.
    pub gross_revenue: Money,
    pub discounts: Money,
    pub net_revenue: Money,
    /// One entry per category, in category order.
    pub expenses: Vec<CategoryExpenses>,
    pub total_expenses: Money,
    pub operating_result: Money,
    /// Operating result over net revenue, in percent. Zero without revenue.
    pub margin_percent: f64,
}

impl Report for DreReport {
    type Params = Period;

    fn name() -> &'static str {
        "dre"
    }

    fn build(snapshot: &WorkshopSnapshot, period: &Period) -> Result<Self> {
        let paid: Vec<_> = snapshot
            .orders
            .iter()
            .filter(|o| o.payment_date().is_some_and(|d| period.contains_instant(d)))
            .collect();

        let labor_revenue: Money = paid.iter().map(|o| o.labor_cost()).sum();
        let parts_revenue: Money = paid.iter().map(|o| o.parts_cost()).sum();
        let discounts: Money = paid.iter().map(|o| o.totals().discount_amount()).sum();
        let net_revenue: Money = paid.iter().map(|o| o.total_cost()).sum();

        let expenses: Vec<CategoryExpenses> = ExpenseCategory::ALL
            .iter()
            .map(|&category| {
                let due = snapshot
                    .expenses
                    .iter()
                    .filter(|e| e.category == category && period.contains(e.due_date));
                let (paid, pending) = due.fold(
                    (Money::zero(), Money::zero()),
                    |(paid, pending), e| match e.status {
                        ExpenseStatus::Paid => (paid + e.amount, pending),
                        ExpenseStatus::Pending => (paid, pending + e.amount),
                    },
                );
                CategoryExpenses {
                    category,
                    label: category.label(),
                    paid,
                    pending,
                    total: paid + pending,
                }
            })
            .collect();
        let total_expenses: Money = expenses.iter().map(|c| c.total).sum();
        let operating_result = net_revenue - total_expenses;

        Ok(Self {
            period: *period,
            paid_orders: paid.len(),
            labor_revenue,
            parts_revenue,
            gross_revenue: labor_revenue + parts_revenue,
            discounts,
            net_revenue,
            expenses,
            total_expenses,
            operating_result,
            margin_percent: margin(operating_result, net_revenue),
        })
    }
}

impl DreReport {
    /// Exports the statement as two-column CSV.
    pub fn to_csv(&self) -> String {
        let mut csv = CsvWriter::with_header(&["Linha", "Valor"]);
        let period = self.period.to_string();
        csv.row([Field::Text("Período"), Field::Text(&period)]);
        csv.row([
            Field::Text("OS pagas"),
            Field::Integer(self.paid_orders as i64),
        ]);
        csv.row([Field::Text("Receita de mão de obra"), Field::Money(self.labor_revenue)]);
        csv.row([Field::Text("Receita de peças"), Field::Money(self.parts_revenue)]);
        csv.row([Field::Text("Receita bruta"), Field::Money(self.gross_revenue)]);
        csv.row([Field::Text("Descontos concedidos"), Field::Money(self.discounts)]);
        csv.row([Field::Text("Receita líquida"), Field::Money(self.net_revenue)]);
        for category in &self.expenses {
            let line = format!("Despesas: {}", category.label);
            csv.row([Field::Text(&line), Field::Money(category.total)]);
        }
        csv.row([Field::Text("Total de despesas"), Field::Money(self.total_expenses)]);
        csv.row([Field::Text("Resultado operacional"), Field::Money(self.operating_result)]);
        csv.row([Field::Text("Margem (%)"), Field::Number(self.margin_percent)]);
        csv.finish()
    }
}

fn margin(result: Money, revenue: Money) -> f64 {
    if !revenue.is_positive() {
        return 0.0;
    }
    let percent = result.cents() as f64 / revenue.cents() as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at, bill, open, pay};
    use chrono::NaiveDate;
    use domain::{Expense, NewExpense};

    fn march() -> Period {
        Period::month_of(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    }

    fn expense(category: ExpenseCategory, reais: i64, due: (u32, u32), paid: bool) -> Expense {
        let mut expense = Expense::create(
            NewExpense {
                description: format!("{category:?}"),
                category,
                amount: Money::from_reais(reais),
                due_date: NaiveDate::from_ymd_opt(2024, due.0, due.1).unwrap(),
                status: ExpenseStatus::Pending,
            },
            at(2024, 1, 1, 9),
        )
        .unwrap();
        if paid {
            expense.pay(at(2024, due.0, due.1, 12)).unwrap();
        }
        expense
    }

    fn snapshot() -> WorkshopSnapshot {
        let paid_in_march = pay(bill(open(1, at(2024, 3, 2, 9)), 300, 100, 5.0), at(2024, 3, 5, 15));
        let paid_in_april = pay(bill(open(2, at(2024, 3, 20, 9)), 200, 0, 0.0), at(2024, 4, 1, 10));
        let unpaid = bill(open(3, at(2024, 3, 10, 9)), 500, 0, 0.0);

        WorkshopSnapshot {
            orders: vec![paid_in_march, paid_in_april, unpaid],
            expenses: vec![
                expense(ExpenseCategory::Fixed, 150, (3, 10), true),
                expense(ExpenseCategory::Payroll, 100, (3, 31), false),
                expense(ExpenseCategory::Taxes, 999, (4, 1), false),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_revenue_counts_orders_paid_in_period() {
        let dre = DreReport::build(&snapshot(), &march()).unwrap();

        assert_eq!(dre.paid_orders, 1);
        assert_eq!(dre.labor_revenue, Money::from_reais(300));
        assert_eq!(dre.parts_revenue, Money::from_reais(100));
        assert_eq!(dre.gross_revenue, Money::from_reais(400));
        assert_eq!(dre.discounts, Money::from_reais(20));
        assert_eq!(dre.net_revenue, Money::from_reais(380));
    }

    #[test]
    fn test_expenses_by_due_date_paid_and_pending() {
        let dre = DreReport::build(&snapshot(), &march()).unwrap();

        assert_eq!(dre.expenses.len(), ExpenseCategory::ALL.len());
        let fixed = &dre.expenses[0];
        assert_eq!(fixed.paid, Money::from_reais(150));
        let payroll = dre
            .expenses
            .iter()
            .find(|c| c.category == ExpenseCategory::Payroll)
            .unwrap();
        assert_eq!(payroll.pending, Money::from_reais(100));

        assert_eq!(dre.total_expenses, Money::from_reais(250));
        assert_eq!(dre.operating_result, Money::from_reais(130));
        assert_eq!(dre.margin_percent, 34.21);
    }

    #[test]
    fn test_empty_period_has_zero_margin() {
        let dre = DreReport::build(&WorkshopSnapshot::default(), &march()).unwrap();
        assert_eq!(dre.net_revenue, Money::zero());
        assert_eq!(dre.margin_percent, 0.0);
    }

    #[test]
    fn test_csv_export() {
        let csv = DreReport::build(&snapshot(), &march()).unwrap().to_csv();
        assert!(csv.contains("\"Receita líquida\",380.00\n"));
        assert!(csv.contains("\"Resultado operacional\",130.00\n"));
    }
}
