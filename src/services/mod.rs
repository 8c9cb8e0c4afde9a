pub mod bom;
pub mod inventory_sync;
pub mod production;
pub mod qc;
pub mod quotes;
pub mod reconciliation;
pub mod shipping;

pub use bom::BomService;
pub use inventory_sync::InventorySyncService;
pub use production::ProductionService;
pub use qc::QcService;
pub use quotes::QuoteService;
pub use reconciliation::ReconciliationService;
pub use shipping::ShippingService;
