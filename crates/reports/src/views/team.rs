//! Team report: completed work, commission and turnaround per mechanic.

use common::UserId;
use domain::{Money, Percentage, Role, ServiceOrder, WorkshopSnapshot};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::period::Period;
use crate::report::Report;

/// Which finished orders the team report covers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TeamParams {
    /// Only orders finished inside the period. None covers all time.
    pub period: Option<Period>,
}

/// One mechanic's line in the team report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MechanicPerformance {
    pub user_id: UserId,
    pub name: String,
    pub active: bool,
    pub commission_rate: Percentage,
    /// Orders in COMPLETED or PAID assigned to this mechanic.
    pub completed_orders: usize,
    pub labor_revenue: Money,
    pub commission: Money,
    /// Average hours from opening to completion (TMA).
    pub average_turnaround_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamReport {
    pub period: Option<Period>,
    /// Highest labor revenue first.
    pub mechanics: Vec<MechanicPerformance>,
}

impl Report for TeamReport {
    type Params = TeamParams;

    fn name() -> &'static str {
        "team"
    }

    fn build(snapshot: &WorkshopSnapshot, params: &TeamParams) -> Result<Self> {
        let mut mechanics: Vec<MechanicPerformance> = snapshot
            .users
            .iter()
            .filter_map(|user| {
                let finished: Vec<&ServiceOrder> = snapshot
                    .orders
                    .iter()
                    .filter(|o| o.assigned_mechanic_id() == Some(user.id))
                    .filter(|o| is_counted(o, params.period))
                    .collect();

                if user.role != Role::Mechanic && finished.is_empty() {
                    return None;
                }

                let labor_revenue: Money = finished.iter().map(|o| o.labor_cost()).sum();
                Some(MechanicPerformance {
                    user_id: user.id,
                    name: user.name.clone(),
                    active: user.active,
                    commission_rate: user.commission_rate,
                    completed_orders: finished.len(),
                    labor_revenue,
                    commission: labor_revenue.percentage(user.commission_rate),
                    average_turnaround_hours: average_turnaround_hours(&finished),
                })
            })
            .collect();

        mechanics.sort_by(|a, b| {
            b.labor_revenue
                .cmp(&a.labor_revenue)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(Self {
            period: params.period,
            mechanics,
        })
    }
}

fn is_counted(order: &ServiceOrder, period: Option<Period>) -> bool {
    if !order.status().is_finished() {
        return false;
    }
    match period {
        Some(period) => order
            .finished_at()
            .is_some_and(|at| period.contains_instant(at)),
        None => true,
    }
}

/// Mean of completion minus creation, in hours with two decimals.
fn average_turnaround_hours(orders: &[&ServiceOrder]) -> Option<f64> {
    let minutes: Vec<i64> = orders
        .iter()
        .filter_map(|o| o.finished_at().map(|done| (done - o.created_at()).num_minutes()))
        .collect();
    if minutes.is_empty() {
        return None;
    }

    let hours = minutes.iter().sum::<i64>() as f64 / minutes.len() as f64 / 60.0;
    Some((hours * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{assign, at, bill, complete, open, pay};
    use chrono::Utc;
    use domain::{NewUser, User};

    fn user(name: &str, role: Role, commission_bp: u32) -> User {
        User::create(
            NewUser {
                name: name.to_string(),
                email: None,
                role,
                commission_rate: Percentage::from_basis_points(commission_bp),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_commission_and_turnaround() {
        let carlos = user("Carlos", Role::Mechanic, 1000);
        let bruno = user("Bruno", Role::Mechanic, 500);
        let admin = user("Admin", Role::Admin, 0);

        let done = complete(
            assign(bill(open(1, at(2024, 3, 1, 8)), 300, 50, 0.0), carlos.id),
            at(2024, 3, 1, 14),
        );
        let paid = pay(
            assign(bill(open(2, at(2024, 3, 2, 8)), 200, 0, 0.0), carlos.id),
            at(2024, 3, 2, 10),
        );
        let in_progress = assign(bill(open(3, at(2024, 3, 3, 8)), 900, 0, 0.0), carlos.id);

        let snapshot = WorkshopSnapshot {
            orders: vec![done, paid, in_progress],
            users: vec![bruno, carlos.clone(), admin],
            ..Default::default()
        };
        let report = TeamReport::build(&snapshot, &TeamParams::default()).unwrap();

        assert_eq!(report.mechanics.len(), 2);
        let top = &report.mechanics[0];
        assert_eq!(top.user_id, carlos.id);
        assert_eq!(top.completed_orders, 2);
        assert_eq!(top.labor_revenue, Money::from_reais(500));
        assert_eq!(top.commission, Money::from_reais(50));
        assert_eq!(top.average_turnaround_hours, Some(4.0));

        let idle = &report.mechanics[1];
        assert_eq!(idle.completed_orders, 0);
        assert_eq!(idle.average_turnaround_hours, None);
    }

    #[test]
    fn test_period_filters_by_completion() {
        let carlos = user("Carlos", Role::Mechanic, 1000);
        let february = complete(
            assign(bill(open(1, at(2024, 2, 28, 8)), 100, 0, 0.0), carlos.id),
            at(2024, 2, 29, 8),
        );
        let march = complete(
            assign(bill(open(2, at(2024, 2, 28, 8)), 250, 0, 0.0), carlos.id),
            at(2024, 3, 1, 8),
        );

        let snapshot = WorkshopSnapshot {
            orders: vec![february, march],
            users: vec![carlos],
            ..Default::default()
        };
        let params = TeamParams {
            period: Some(Period::month_of(at(2024, 3, 1, 0).date_naive())),
        };
        let report = TeamReport::build(&snapshot, &params).unwrap();

        assert_eq!(report.mechanics[0].completed_orders, 1);
        assert_eq!(report.mechanics[0].labor_revenue, Money::from_reais(250));
        assert_eq!(report.mechanics[0].average_turnaround_hours, Some(48.0));
    }
}
