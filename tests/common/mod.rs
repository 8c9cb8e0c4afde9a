#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};

use printforge_api::{
    config::FulfillmentSettings,
    db,
    entities::{
        bom_header, bom_line, inventory_balance, inventory_transaction, item_master,
        material_inventory, production_order, quote, sales_order,
    },
    services::{
        BomService, InventorySyncService, ProductionService, QcService, QuoteService,
        ReconciliationService, ShippingService,
    },
    state::{
        ConsumeStage, FulfillmentStatus, ItemType, ProcurementType, ProductionStatus, QuoteStatus,
        SalesOrderStatus,
    },
};

pub const LOCATION: i32 = 1;

pub struct TestContext {
    pub db: Arc<DatabaseConnection>,
    pub bom: Arc<BomService>,
    pub inventory: Arc<InventorySyncService>,
    pub production: ProductionService,
    pub qc: QcService,
    pub quotes: QuoteService,
    pub shipping: ShippingService,
    pub reconciliation: ReconciliationService,
}

pub async fn setup() -> TestContext {
    setup_with(FulfillmentSettings::for_tests()).await
}

pub async fn setup_with(settings: FulfillmentSettings) -> TestContext {
    let pool = db::establish_connection("sqlite::memory:")
        .await
        .expect("in-memory database");
    db::run_migrations(&pool).await.expect("migrations");
    let db = Arc::new(pool);

    let bom = Arc::new(BomService::new(db.clone()));
    let inventory = Arc::new(InventorySyncService::new());
    let production = ProductionService::new(
        db.clone(),
        bom.clone(),
        inventory.clone(),
        None,
        settings.clone(),
    );
    let qc = QcService::new(db.clone(), None);
    let quotes = QuoteService::new(db.clone(), None, settings.clone());
    let shipping = ShippingService::new(
        db.clone(),
        bom.clone(),
        inventory.clone(),
        None,
        settings,
    );
    let reconciliation = ReconciliationService::new(db.clone(), bom.clone());

    TestContext {
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

pub async fn seed_item(
    db: &DatabaseConnection,
    item_number: &str,
    item_type: ItemType,
    procurement: ProcurementType,
    requires_qc: bool,
) -> item_master::Model {
    let now = Utc::now();
    item_master::ActiveModel {
        item_number: Set(item_number.to_string()),
        description: Set(None),
        item_type: Set(item_type.to_string()),
        procurement_type: Set(procurement.to_string()),
        is_raw_material: Set(false),
        track_lots: Set(false),
        track_serials: Set(false),
        requires_qc: Set(requires_qc),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed item")
}

pub async fn seed_raw_material(
    db: &DatabaseConnection,
    item_number: &str,
    material_type: &str,
    color: &str,
) -> item_master::Model {
    let now = Utc::now();
    item_master::ActiveModel {
        item_number: Set(item_number.to_string()),
        description: Set(Some(format!("{} filament, {}", material_type, color))),
        item_type: Set(ItemType::Component.to_string()),
        procurement_type: Set(ProcurementType::Buy.to_string()),
        is_raw_material: Set(true),
        track_lots: Set(false),
        track_serials: Set(false),
        requires_qc: Set(false),
        material_type: Set(Some(material_type.to_string())),
        color: Set(Some(color.to_string())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed raw material")
}

pub async fn seed_material_stock(
    db: &DatabaseConnection,
    material_type: &str,
    color: &str,
    quantity_kg: Decimal,
) -> material_inventory::Model {
    let now = Utc::now();
    material_inventory::ActiveModel {
        material_type: Set(material_type.to_string()),
        color: Set(color.to_string()),
        quantity_kg: Set(quantity_kg),
        in_stock: Set(quantity_kg > Decimal::ZERO),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed material stock")
}

pub async fn seed_bom(
    db: &DatabaseConnection,
    product_item_id: i64,
    lines: &[(i64, Decimal, Decimal, ConsumeStage)],
) -> i64 {
    let now = Utc::now();
    let header = bom_header::ActiveModel {
        bom_name: Set(format!("BOM item {}", product_item_id)),
        item_id: Set(product_item_id),
        revision: Set(Some("A".to_string())),
        status_code: Set("ACTIVE".to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed bom header");

    for (component_item_id, per_unit, scrap, stage) in lines {
        bom_line::ActiveModel {
            bom_id: Set(header.bom_id),
            component_item_id: Set(*component_item_id),
            quantity_per_unit: Set(*per_unit),
            scrap_factor: Set(*scrap),
            consume_stage: Set(stage.to_string()),
            is_cost_only: Set(false),
            uom_code: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("seed bom line");
    }

    header.bom_id
}

pub async fn seed_balance(
    db: &DatabaseConnection,
    item_id: i64,
    quantity_on_hand: Decimal,
) -> inventory_balance::Model {
    let now = Utc::now();
    inventory_balance::ActiveModel {
        item_id: Set(item_id),
        location_id: Set(LOCATION),
        quantity_on_hand: Set(quantity_on_hand),
        quantity_allocated: Set(Decimal::ZERO),
        quantity_available: Set(quantity_on_hand),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed balance")
}

pub async fn seed_sales_order(
    db: &DatabaseConnection,
    item_id: i64,
    quantity: Decimal,
) -> sales_order::Model {
    let now = Utc::now();
    sales_order::ActiveModel {
        order_number: Set(format!("SO-{}", item_id)),
        customer_id: Set(42),
        item_id: Set(item_id),
        quantity: Set(quantity),
        status: Set(SalesOrderStatus::Confirmed.to_string()),
        fulfillment_status: Set(FulfillmentStatus::Pending.to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed sales order")
}

pub async fn seed_production_order(
    db: &DatabaseConnection,
    sales_order_id: Option<i64>,
    item_id: i64,
    quantity: Decimal,
    status: ProductionStatus,
) -> production_order::Model {
    let now = Utc::now();
    production_order::ActiveModel {
        order_number: Set(format!("PO-{}", item_id)),
        sales_order_id: Set(sales_order_id),
        item_id: Set(item_id),
        status: Set(status.to_string()),
        quantity_ordered: Set(quantity),
        quantity_completed: Set(Decimal::ZERO),
        quantity_scrapped: Set(Decimal::ZERO),
        priority: Set(0),
        location_id: Set(LOCATION),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed production order")
}

pub async fn seed_quote(
    db: &DatabaseConnection,
    material_type: &str,
    color: &str,
    quantity: Decimal,
    unit_weight_kg: Decimal,
) -> quote::Model {
    let now = Utc::now();
    quote::ActiveModel {
        quote_number: Set(format!("Q-{}-{}", material_type, color)),
        customer_id: Set(42),
        status: Set(QuoteStatus::Open.to_string()),
        material_type: Set(material_type.to_string()),
        color: Set(color.to_string()),
        quantity: Set(quantity),
        unit_price: Set(Decimal::new(1999, 2)),
        unit_weight_kg: Set(unit_weight_kg),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed quote")
}

pub async fn balance_of(
    db: &DatabaseConnection,
    item_id: i64,
) -> Option<inventory_balance::Model> {
    inventory_balance::Entity::find()
        .filter(inventory_balance::Column::ItemId.eq(item_id))
        .filter(inventory_balance::Column::LocationId.eq(LOCATION))
        .one(db)
        .await
        .expect("query balance")
}

pub async fn material_stock_of(
    db: &DatabaseConnection,
    material_type: &str,
    color: &str,
) -> material_inventory::Model {
    material_inventory::Entity::find()
        .filter(material_inventory::Column::MaterialType.eq(material_type))
        .filter(material_inventory::Column::Color.eq(color))
        .one(db)
        .await
        .expect("query material stock")
        .expect("material stock row")
}

pub async fn ledger_rows(
    db: &DatabaseConnection,
    reference_type: &str,
    reference_id: i64,
) -> Vec<inventory_transaction::Model> {
    inventory_transaction::Entity::find()
        .filter(inventory_transaction::Column::ReferenceType.eq(reference_type))
        .filter(inventory_transaction::Column::ReferenceId.eq(reference_id))
        .all(db)
        .await
        .expect("query ledger")
}

pub fn ledger_total(rows: &[inventory_transaction::Model], entry_type: &str, item_id: i64) -> Decimal {
    rows.iter()
        .filter(|r| r.entry_type == entry_type && r.item_id == item_id)
        .map(|r| r.quantity)
        .sum()
}
