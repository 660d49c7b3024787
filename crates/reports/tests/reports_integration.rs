//! Integration tests: WorkshopService mutations → ReportGenerator → views.

use std::sync::Arc;

use chrono::Utc;
use domain::{
    Actor, AddItem, AdminCredentialAuthorizer, Aggregate, AssignMechanic, ChangeStatus, Customer,
    ExpenseCategory, ExpenseStatus, ItemDraft, Money, NewExpense, NewUser, OrderFilter,
    OrderIntake, OrderStatus, PaymentMethod, Percentage, RegisterPayment, Role, SetDiscount,
    Vehicle, WorkshopService,
};
use reports::{Dashboard, DashboardParams, DreReport, Period, ReportGenerator, TeamParams, TeamReport};
use store::InMemoryStateStore;

async fn setup() -> (
    Arc<WorkshopService<InMemoryStateStore>>,
    ReportGenerator<InMemoryStateStore>,
    Actor,
) {
    let service = Arc::new(WorkshopService::new(
        InMemoryStateStore::new(),
        Arc::new(AdminCredentialAuthorizer::disabled()),
    ));
    let admin = service
        .ensure_default_admin("Gerente", None)
        .await
        .unwrap()
        .unwrap();
    let actor = service.resolve_actor(admin.id).await.unwrap();
    let generator = ReportGenerator::new(Arc::clone(&service));
    (service, generator, actor)
}

fn intake(customer: &str) -> OrderIntake {
    OrderIntake {
        customer: Customer {
            name: customer.to_string(),
            cpf: None,
            phone: None,
            email: None,
            accepts_notifications: false,
        },
        vehicle: Vehicle {
            manufacturer: "Honda".to_string(),
            model: "Civic \"Si\"".to_string(),
            year: Some(2018),
            color: None,
            plate: "HND2E18".to_string(),
            mileage: None,
        },
        complaint: "Troca de óleo".to_string(),
        assigned_mechanic_id: None,
        fiscal_notes: None,
    }
}

#[tokio::test]
async fn test_month_reports_reflect_service_operations() {
    let (service, generator, admin) = setup().await;

    let mechanic = service
        .create_user(
            &admin,
            NewUser {
                name: "Carlos Souza".to_string(),
                email: None,
                role: Role::Mechanic,
                commission_rate: Percentage::from_basis_points(1000),
            },
        )
        .await
        .unwrap();

    let order_id = service
        .open_order(&admin, intake("Fernanda"))
        .await
        .unwrap()
        .order
        .id();
    service
        .assign_mechanic(&admin, AssignMechanic::new(order_id, Some(mechanic.id)))
        .await
        .unwrap();
    service
        .add_item(
            &admin,
            AddItem::new(order_id, ItemDraft::labor("Mão de obra", 1, Money::from_reais(300))),
        )
        .await
        .unwrap();
    service
        .add_item(
            &admin,
            AddItem::new(order_id, ItemDraft::part("Filtro", 1, Money::from_reais(100))),
        )
        .await
        .unwrap();
    service
        .set_discount(&admin, SetDiscount::new(order_id, 5.0))
        .await
        .unwrap();
    service
        .change_status(&admin, ChangeStatus::silent(order_id, OrderStatus::Completed))
        .await
        .unwrap();
    service
        .register_payment(
            &admin,
            RegisterPayment::new(order_id, PaymentMethod::CreditCard, Money::from_reais(380)),
        )
        .await
        .unwrap();

    service
        .open_order(&admin, intake("Gustavo"))
        .await
        .unwrap();

    let today = Utc::now().date_naive();
    service
        .create_expense(
            &admin,
            NewExpense {
                description: "Energia".to_string(),
                category: ExpenseCategory::Fixed,
                amount: Money::from_reais(80),
                due_date: today,
                status: ExpenseStatus::Paid,
            },
        )
        .await
        .unwrap();

    let dre: DreReport = generator.generate(&Period::month_of(today)).await.unwrap();
    assert_eq!(dre.paid_orders, 1);
    assert_eq!(dre.net_revenue, Money::from_reais(380));
    assert_eq!(dre.discounts, Money::from_reais(20));
    assert_eq!(dre.total_expenses, Money::from_reais(80));
    assert_eq!(dre.operating_result, Money::from_reais(300));

    let team: TeamReport = generator.generate(&TeamParams::default()).await.unwrap();
    assert_eq!(team.mechanics.len(), 1);
    assert_eq!(team.mechanics[0].labor_revenue, Money::from_reais(300));
    assert_eq!(team.mechanics[0].commission, Money::from_reais(30));

    let dashboard: Dashboard = generator
        .generate(&DashboardParams { now: Utc::now() })
        .await
        .unwrap();
    assert_eq!(dashboard.total_orders, 2);
    assert_eq!(dashboard.open_orders, 1);
    assert_eq!(dashboard.average_ticket, Money::from_reais(380));
}

#[tokio::test]
async fn test_orders_csv_escapes_quotes() {
    let (service, generator, admin) = setup().await;
    service
        .open_order(&admin, intake("Ana \"Aninha\" Lopes"))
        .await
        .unwrap();

    let csv = generator.orders_csv(&OrderFilter::default()).await.unwrap();
    let row = csv.lines().nth(1).unwrap();

    assert!(row.starts_with("\"OS-0001\","));
    assert!(row.contains("\"Ana \"\"Aninha\"\" Lopes\""));
    assert!(row.contains("\"Honda Civic \"\"Si\"\"\""));
}
