//! Fulfillment core for a make-to-order 3D printing shop: quote acceptance,
//! BOM explosion, the production-order state machine, material reservation
//! and consumption against a dual stock model, QC verdicts, shipping, and a
//! ledger reconciliation audit.

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::FulfillmentSettings;
use crate::events::EventSender;
use crate::services::{
    BomService, InventorySyncService, ProductionService, QcService, QuoteService,
    ReconciliationService, ShippingService,
};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub bom: Arc<BomService>,
    pub inventory: Arc<InventorySyncService>,
    pub production: Arc<ProductionService>,
    pub qc: Arc<QcService>,
    pub quotes: Arc<QuoteService>,
    pub shipping: Arc<ShippingService>,
    pub reconciliation: Arc<ReconciliationService>,
}

impl AppState {
    /// Wires the service graph over one connection pool.
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Option<EventSender>,
        settings: FulfillmentSettings,
    ) -> Self {
        let bom = Arc::new(BomService::new(db.clone()));
        let inventory = Arc::new(InventorySyncService::new());
        let production = Arc::new(ProductionService::new(
            db.clone(),
            bom.clone(),
            inventory.clone(),
            event_sender.clone(),
            settings.clone(),
        ));
        let qc = Arc::new(QcService::new(db.clone(), event_sender.clone()));
        let quotes = Arc::new(QuoteService::new(
            db.clone(),
            event_sender.clone(),
            settings.clone(),
        ));
        let shipping = Arc::new(ShippingService::new(
            db.clone(),
            bom.clone(),
            inventory.clone(),
            event_sender,
            settings.clone(),
        ));
        let reconciliation = Arc::new(ReconciliationService::new(db.clone(), bom.clone()));

        Self {
            db,
            bom,
            inventory,
            production,
            qc,
            quotes,
            shipping,
            reconciliation,
        }
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "printforge-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Builds the application router with middleware applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", handlers::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state)
}
