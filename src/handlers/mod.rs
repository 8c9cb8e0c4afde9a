pub mod production_orders;
pub mod quotes;
pub mod reconciliation;
pub mod shipments;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::AppState;

/// All fulfillment routes, mounted under `/api/v1` by the app router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotes/:id", get(quotes::get_quote))
        .route("/quotes/:id/accept", post(quotes::accept_quote))
        .route(
            "/production-orders/:id",
            get(production_orders::get_production_order),
        )
        .route(
            "/production-orders/:id/release",
            post(production_orders::release_production_order),
        )
        .route(
            "/production-orders/:id/start",
            post(production_orders::start_production),
        )
        .route(
            "/production-orders/:id/complete",
            post(production_orders::complete_production),
        )
        .route(
            "/production-orders/:id/pass-qc",
            post(production_orders::pass_qc),
        )
        .route(
            "/production-orders/:id/fail-qc",
            post(production_orders::fail_qc),
        )
        .route(
            "/production-orders/:id/cancel",
            post(production_orders::cancel_production),
        )
        .route(
            "/production-orders/:id/reconcile",
            get(reconciliation::reconcile_order),
        )
        .route("/reconciliation", get(reconciliation::reconcile_all))
        .route("/sales-orders/:id", get(shipments::get_sales_order))
        .route("/sales-orders/:id/ship", post(shipments::ship_order))
        .route(
            "/sales-orders/:id/tracking",
            put(shipments::update_tracking),
        )
        .route("/sales-orders/:id/close", post(shipments::close_order))
}
