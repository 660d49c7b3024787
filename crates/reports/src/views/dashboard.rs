//! Dashboard summary.

use chrono::{DateTime, Utc};
use common::InventoryItemId;
use domain::{Money, OrderStatus, WorkshopSnapshot};
use serde::Serialize;

use crate::Result;
use crate::period::Period;
use crate::report::Report;

#[derive(Debug, Clone, Copy)]
pub struct DashboardParams {
    /// Reference instant; selects the current month.
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: OrderStatus,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub id: InventoryItemId,
    pub code: String,
    pub name: String,
    pub stock_quantity: i64,
    pub min_stock_level: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub generated_at: DateTime<Utc>,
    /// Every status, in workflow order, including empty ones.
    pub orders_by_status: Vec<StatusCount>,
    pub total_orders: usize,
    /// Orders not yet paid.
    pub open_orders: usize,
    pub month: Period,
    pub month_revenue: Money,
    pub month_paid_orders: usize,
    /// Month revenue over paid orders, rounded half-up.
    pub average_ticket: Money,
    pub low_stock: Vec<LowStockItem>,
    pub overdue_expenses: usize,
    pub overdue_amount: Money,
}

impl Report for Dashboard {
    type Params = DashboardParams;

    fn name() -> &'static str {
        "dashboard"
    }

    fn build(snapshot: &WorkshopSnapshot, params: &DashboardParams) -> Result<Self> {
        let orders = &snapshot.orders;
        let month = Period::month_of(params.now.date_naive());

        let orders_by_status = OrderStatus::ALL
            .iter()
            .map(|&status| StatusCount {
                status,
                label: status.label(),
                count: orders.iter().filter(|o| o.status() == status).count(),
            })
            .collect();

        let paid_this_month: Vec<_> = orders
            .iter()
            .filter(|o| o.payment_date().is_some_and(|d| month.contains_instant(d)))
            .collect();
        let month_revenue: Money = paid_this_month.iter().map(|o| o.total_cost()).sum();

        let low_stock = snapshot
            .inventory
            .low_stock()
            .map(|item| LowStockItem {
                id: item.id,
                code: item.code.clone(),
                name: item.name.clone(),
                stock_quantity: item.stock_quantity,
                min_stock_level: item.min_stock_level,
            })
            .collect();

        let overdue: Vec<_> = snapshot
            .expenses
            .iter()
            .filter(|e| e.is_overdue(params.now))
            .collect();

        Ok(Self {
            generated_at: params.now,
            orders_by_status,
            total_orders: orders.len(),
            open_orders: orders.iter().filter(|o| !o.is_paid()).count(),
            month,
            month_revenue,
            month_paid_orders: paid_this_month.len(),
            average_ticket: average(month_revenue, paid_this_month.len()),
            low_stock,
            overdue_expenses: overdue.len(),
            overdue_amount: overdue.iter().map(|e| e.amount).sum(),
        })
    }
}

fn average(total: Money, count: usize) -> Money {
    if count == 0 {
        return Money::zero();
    }
    let count = count as i64;
    Money::from_cents((2 * total.cents() + count) / (2 * count))
}
