//! Order builders shared by the report tests.

use chrono::{DateTime, TimeZone, Utc};
use common::{ItemId, OrderId, UserId};
use domain::{
    Customer, ItemDraft, Money, OrderIntake, OrderStatus, PaymentMethod, ServiceOrder, Vehicle,
    command, order::NotificationContext,
};

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub fn open(number: u32, opened: DateTime<Utc>) -> ServiceOrder {
    let intake = OrderIntake {
        customer: Customer {
            name: format!("Cliente {number}"),
            cpf: None,
            phone: None,
            email: None,
            accepts_notifications: false,
        },
        vehicle: Vehicle {
            manufacturer: "Chevrolet".to_string(),
            model: "Onix".to_string(),
            year: Some(2020),
            color: None,
            plate: format!("ONX{number:04}"),
            mileage: None,
        },
        complaint: "Revisão".to_string(),
        assigned_mechanic_id: None,
        fiscal_notes: None,
    };
    ServiceOrder::open(OrderId::new(number), intake, &NotificationContext::at(opened))
        .unwrap()
        .aggregate
}

pub fn bill(order: ServiceOrder, labor_reais: i64, parts_reais: i64, discount: f64) -> ServiceOrder {
    let now = order.created_at();
    let mut order = order;
    if labor_reais > 0 {
        order = command::execute(&order, |o| {
            o.add_item(ItemId::new(), ItemDraft::labor("Serviço", 1, Money::from_reais(labor_reais)), now)
        })
        .unwrap()
        .aggregate;
    }
    if parts_reais > 0 {
        order = command::execute(&order, |o| {
            o.add_item(ItemId::new(), ItemDraft::part("Peça", 1, Money::from_reais(parts_reais)), now)
        })
        .unwrap()
        .aggregate;
    }
    command::execute(&order, |o| o.set_discount(discount, now))
        .unwrap()
        .aggregate
}

pub fn assign(order: ServiceOrder, mechanic: UserId) -> ServiceOrder {
    let now = order.created_at();
    command::execute(&order, |o| o.assign_mechanic(Some(mechanic), now))
        .unwrap()
        .aggregate
}

pub fn complete(order: ServiceOrder, when: DateTime<Utc>) -> ServiceOrder {
    let ctx = NotificationContext::at(when);
    command::execute(&order, |o| o.change_status(OrderStatus::Completed, false, &ctx))
        .unwrap()
        .aggregate
}

pub fn pay(order: ServiceOrder, when: DateTime<Utc>) -> ServiceOrder {
    let ctx = NotificationContext::at(when);
    let total = order.total_cost();
    command::execute(&order, |o| {
        o.register_payment(PaymentMethod::Pix, total, None, false, &ctx)
    })
    .unwrap()
    .aggregate
}
