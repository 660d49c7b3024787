use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use domain::{
    AddItem, AdminCredentialAuthorizer, Aggregate, Customer, ItemDraft, Money, OrderIntake,
    Percentage, ServiceItem, Vehicle, WorkshopService, order::recompute_totals,
};
use store::InMemoryStateStore;

fn intake() -> OrderIntake {
    OrderIntake {
        customer: Customer {
            name: "Cliente Bench".to_string(),
            cpf: None,
            phone: None,
            email: None,
            accepts_notifications: false,
        },
        vehicle: Vehicle {
            manufacturer: "Fiat".to_string(),
            model: "Palio".to_string(),
            year: None,
            color: None,
            plate: "BEN0C11".to_string(),
            mileage: None,
        },
        complaint: "Revisão".to_string(),
        assigned_mechanic_id: None,
        fiscal_notes: None,
    }
}

fn items(count: usize) -> Vec<ServiceItem> {
    let json: Vec<_> = (0..count)
        .map(|i| {
            serde_json::json!({
                "id": common::ItemId::new(),
                "description": format!("Item {i}"),
                "type": if i % 2 == 0 { "PART" } else { "LABOR" },
                "quantity": 1 + (i % 3),
                "unitPrice": 1_999 + i as i64,
                "totalPrice": (1_999 + i as i64) * (1 + (i % 3)) as i64,
            })
        })
        .collect();
    serde_json::from_value(serde_json::Value::Array(json)).unwrap()
}

fn bench_recompute_totals(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger/recompute_totals");
    let discount = Percentage::from_basis_points(750);

    for count in [5, 50, 500] {
        let items = items(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |b, items| {
            b.iter(|| recompute_totals(items, discount));
        });
    }
    group.finish();
}

fn bench_add_item(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = WorkshopService::new(
        InMemoryStateStore::new(),
        Arc::new(AdminCredentialAuthorizer::disabled()),
    );
    let (actor, order_id) = rt.block_on(async {
        let admin = service
            .ensure_default_admin("Bench", None)
            .await
            .unwrap()
            .unwrap();
        let actor = service.resolve_actor(admin.id).await.unwrap();
        let order_id = service.open_order(&actor, intake()).await.unwrap().order.id();
        (actor, order_id)
    });

    c.bench_function("ledger/add_item", |b| {
        b.iter(|| {
            rt.block_on(async {
                let draft = ItemDraft::part("Parafuso", 1, Money::from_cents(150));
                service
                    .add_item(&actor, AddItem::new(order_id, draft))
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_recompute_totals, bench_add_item);
criterion_main!(benches);
