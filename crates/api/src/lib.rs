//! HTTP API for the OSMech workshop system.
//!
//! JSON endpoints for every workshop operation, CSV exports, Prometheus
//! metrics and a health check. The acting user is identified by the
//! `x-osmech-user` header.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::{ApiError, StartupError};
pub use state::{AppState, DynStore};

use routes::{back_office, orders, reports, team};

/// Builds the OSMech router: workshop endpoints, health and Prometheus scrape.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/session", post(team::login))
        .route("/orders", post(orders::open).get(orders::list))
        .route("/orders/export.csv", get(orders::export_csv))
        .route("/orders/{id}", get(orders::get).delete(orders::delete))
        .route("/orders/{id}/items", post(orders::add_item))
        .route("/orders/{id}/items/{item_id}", delete(orders::remove_item))
        .route("/orders/{id}/discount", put(orders::set_discount))
        .route("/orders/{id}/status", post(orders::change_status))
        .route("/orders/{id}/mechanic", put(orders::assign_mechanic))
        .route("/orders/{id}/payment", post(orders::register_payment))
        .route("/orders/{id}/diagnosis", post(orders::diagnose))
        .route("/orders/{id}/reminder", post(orders::send_reminder))
        .route(
            "/orders/{id}/notifications/{notification_id}/whatsapp",
            get(orders::share_link),
        )
        .route(
            "/inventory",
            get(back_office::list_inventory).post(back_office::create_inventory_item),
        )
        .route("/inventory/{id}", put(back_office::update_inventory_item))
        .route(
            "/expenses",
            get(back_office::list_expenses).post(back_office::create_expense),
        )
        .route("/expenses/{id}/pay", post(back_office::pay_expense))
        .route("/users", get(team::list).post(team::create))
        .route("/users/{id}", delete(team::deactivate))
        .route(
            "/settings",
            get(back_office::get_settings).put(back_office::update_settings),
        )
        .route("/logs", get(back_office::list_logs))
        .route("/reports/dre", get(reports::dre))
        .route("/reports/dre.csv", get(reports::dre_csv))
        .route("/reports/team", get(reports::team))
        .route("/reports/dashboard", get(reports::dashboard))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
