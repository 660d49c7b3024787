use std::sync::Arc;

use chrono::Utc;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use domain::{
    AddItem, AdminCredentialAuthorizer, Aggregate, Customer, ItemDraft, Money, OrderIntake,
    PaymentMethod, RegisterPayment, Vehicle, WorkshopService, WorkshopSnapshot,
};
use reports::{Dashboard, DashboardParams, DreReport, Period, Report, TeamParams, TeamReport};
use store::InMemoryStateStore;

/// Opens, bills and pays `n` orders, then snapshots the store.
async fn populate(n: usize) -> WorkshopSnapshot {
    let service = WorkshopService::new(
        InMemoryStateStore::new(),
        Arc::new(AdminCredentialAuthorizer::disabled()),
    );
    let admin = service
        .ensure_default_admin("Bench", None)
        .await
        .unwrap()
        .unwrap();
    let actor = service.resolve_actor(admin.id).await.unwrap();

    for i in 0..n {
        let intake = OrderIntake {
            customer: Customer {
                name: format!("Cliente {i}"),
                ..Default::default()
            },
            vehicle: Vehicle {
                model: "Ka".to_string(),
                plate: format!("BCH{i:04}"),
                ..Default::default()
            },
            complaint: "Revisão".to_string(),
            ..Default::default()
        };
        let order_id = service.open_order(&actor, intake).await.unwrap().order.id();
        let draft = ItemDraft::labor("Revisão", 1, Money::from_cents(15_000 + i as i64));
        service
            .add_item(&actor, AddItem::new(order_id, draft))
            .await
            .unwrap();
        if i % 2 == 0 {
            let total = service.get_order(order_id).await.unwrap().total_cost();
            service
                .register_payment(
                    &actor,
                    RegisterPayment::new(order_id, PaymentMethod::Pix, total).silent(),
                )
                .await
                .unwrap();
        }
    }

    service.snapshot().await.unwrap()
}

fn bench_reports(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let month = Period::month_of(Utc::now().date_naive());
    let mut group = c.benchmark_group("reports/build");

    for n in [10, 100] {
        let snapshot = rt.block_on(populate(n));

        group.bench_with_input(BenchmarkId::new("dre", n), &snapshot, |b, s| {
            b.iter(|| DreReport::build(s, &month).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("team", n), &snapshot, |b, s| {
            b.iter(|| TeamReport::build(s, &TeamParams::default()).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("dashboard", n), &snapshot, |b, s| {
            b.iter(|| Dashboard::build(s, &DashboardParams { now: Utc::now() }).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reports);
criterion_main!(benches);
