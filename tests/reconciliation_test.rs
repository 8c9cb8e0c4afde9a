mod common;

use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};

use printforge_api::{
    entities::inventory_transaction,
    services::reconciliation::GapType,
    state::{ConsumeStage, ItemType, ProcurementType, ProductionStatus},
};

use common::*;

struct Fixture {
    product_id: i64,
    filament_id: i64,
    sales_order_id: i64,
    production_order_id: i64,
}

async fn completed_order(ctx: &TestContext, tag: &str) -> Fixture {
    let product = seed_item(
        &ctx.db,
        &format!("WIDGET-{}", tag),
        ItemType::FinishedGood,
        ProcurementType::Make,
        false,
    )
    .await;
    let filament = seed_raw_material(
        &ctx.db,
        &format!("FIL-{}", tag),
        &format!("PLA-{}", tag),
        "black",
    )
    .await;
    seed_material_stock(&ctx.db, &format!("PLA-{}", tag), "black", dec!(1.0)).await;
    seed_bom(
        &ctx.db,
        product.item_id,
        &[(filament.item_id, dec!(0.01), dec!(0), ConsumeStage::Production)],
    )
    .await;
    let so = seed_sales_order(&ctx.db, product.item_id, dec!(5)).await;
    let po = seed_production_order(
        &ctx.db,
        Some(so.sales_order_id),
        product.item_id,
        dec!(5),
        ProductionStatus::Released,
    )
    .await;

    ctx.production
        .start_production(po.production_order_id)
        .await
        .unwrap();
    ctx.production
        .complete_production(po.production_order_id, dec!(5), dec!(0), dec!(7))
        .await
        .unwrap();

    Fixture {
        product_id: product.item_id,
        filament_id: filament.item_id,
        sales_order_id: so.sales_order_id,
        production_order_id: po.production_order_id,
    }
}

async fn delete_ledger_rows(ctx: &TestContext, reference_id: i64, entry_type: &str) {
    inventory_transaction::Entity::delete_many()
        .filter(inventory_transaction::Column::ReferenceId.eq(reference_id))
        .filter(inventory_transaction::Column::EntryType.eq(entry_type))
        .exec(&*ctx.db)
        .await
        .unwrap();
}

#[tokio::test]
async fn clean_order_reports_no_gaps() {
    let ctx = setup().await;
    let fx = completed_order(&ctx, "A").await;

    let result = ctx
        .reconciliation
        .reconcile_order(fx.production_order_id)
        .await
        .unwrap();
    assert!(result.is_clean(), "unexpected gaps: {:?}", result.gaps);

    let report = ctx.reconciliation.reconcile_all().await.unwrap();
    assert_eq!(report.orders_checked, 1);
    assert_eq!(report.orders_with_gaps, 0);
    assert!((report.health_score - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn missing_receipt_is_detected() {
    let ctx = setup().await;
    let clean = completed_order(&ctx, "A").await;
    let broken = completed_order(&ctx, "B").await;

    // Simulate a lost write: the receipt row vanishes from the ledger.
    delete_ledger_rows(&ctx, broken.production_order_id, "receipt").await;

    let result = ctx
        .reconciliation
        .reconcile_order(broken.production_order_id)
        .await
        .unwrap();
    assert_eq!(result.gaps.len(), 1);
    assert_eq!(result.gaps[0].gap_type, GapType::MissingReceipt);
    assert_eq!(result.gaps[0].item_id, broken.product_id);
    assert_eq!(result.gaps[0].expected, dec!(5));

    let report = ctx.reconciliation.reconcile_all().await.unwrap();
    assert_eq!(report.orders_checked, 2);
    assert_eq!(report.orders_with_gaps, 1);
    assert!((report.health_score - 0.5).abs() < f64::EPSILON);

    // The clean order stays clean.
    let clean_result = ctx
        .reconciliation
        .reconcile_order(clean.production_order_id)
        .await
        .unwrap();
    assert!(clean_result.is_clean());
}

#[tokio::test]
async fn missing_consumption_is_detected() {
    let ctx = setup().await;
    let fx = completed_order(&ctx, "A").await;
    delete_ledger_rows(&ctx, fx.production_order_id, "consumption").await;

    let result = ctx
        .reconciliation
        .reconcile_order(fx.production_order_id)
        .await
        .unwrap();
    let gap_types: Vec<GapType> = result.gaps.iter().map(|g| g.gap_type).collect();
    assert!(gap_types.contains(&GapType::MissingConsumption));
    // Deleting consumption rows also strands the original reservation.
    assert!(gap_types.contains(&GapType::OrphanedReservation));
}

#[tokio::test]
async fn quantity_mismatch_is_detected() {
    let ctx = setup().await;
    let fx = completed_order(&ctx, "A").await;

    // Tamper with the consumption quantity.
    let row = inventory_transaction::Entity::find()
        .filter(inventory_transaction::Column::ReferenceId.eq(fx.production_order_id))
        .filter(inventory_transaction::Column::EntryType.eq("consumption"))
        .one(&*ctx.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: inventory_transaction::ActiveModel = row.into();
    active.quantity = Set(dec!(0.02));
    active.update(&*ctx.db).await.unwrap();

    let result = ctx
        .reconciliation
        .reconcile_order(fx.production_order_id)
        .await
        .unwrap();
    let mismatch = result
        .gaps
        .iter()
        .find(|g| g.gap_type == GapType::QuantityMismatch && g.item_id == fx.filament_id)
        .expect("quantity mismatch gap");
    assert_eq!(mismatch.expected, dec!(0.05));
    assert_eq!(mismatch.actual, dec!(0.02));
}

#[tokio::test]
async fn missing_shipment_is_detected() {
    let ctx = setup().await;
    let fx = completed_order(&ctx, "A").await;

    ctx.shipping
        .ship_order(fx.sales_order_id, "UPS".to_string(), "1Z999".to_string())
        .await
        .unwrap();
    inventory_transaction::Entity::delete_many()
        .filter(inventory_transaction::Column::ReferenceId.eq(fx.sales_order_id))
        .filter(inventory_transaction::Column::ReferenceType.eq("sales_order"))
        .filter(inventory_transaction::Column::EntryType.eq("shipment"))
        .exec(&*ctx.db)
        .await
        .unwrap();

    let result = ctx
        .reconciliation
        .reconcile_order(fx.production_order_id)
        .await
        .unwrap();
    assert_eq!(result.gaps.len(), 1);
    assert_eq!(result.gaps[0].gap_type, GapType::MissingShipment);
}

#[tokio::test]
async fn in_progress_orders_are_not_flagged() {
    let ctx = setup().await;
    let product = seed_item(&ctx.db, "WIDGET", ItemType::FinishedGood, ProcurementType::Make, false).await;
    let filament = seed_raw_material(&ctx.db, "FIL-PLA-BLK", "PLA", "black").await;
    seed_material_stock(&ctx.db, "PLA", "black", dec!(1.0)).await;
    seed_bom(
        &ctx.db,
        product.item_id,
        &[(filament.item_id, dec!(0.01), dec!(0), ConsumeStage::Production)],
    )
    .await;
    let po = seed_production_order(&ctx.db, None, product.item_id, dec!(5), ProductionStatus::Released).await;
    ctx.production
        .start_production(po.production_order_id)
        .await
        .unwrap();

    // An open reservation on a running order is normal, not a gap.
    let result = ctx
        .reconciliation
        .reconcile_order(po.production_order_id)
        .await
        .unwrap();
    assert!(result.is_clean());

    let report = ctx.reconciliation.reconcile_all().await.unwrap();
    assert!((report.health_score - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn empty_database_scores_perfect_health() {
    let ctx = setup().await;
    let report = ctx.reconciliation.reconcile_all().await.unwrap();
    assert_eq!(report.orders_checked, 0);
    assert!((report.health_score - 1.0).abs() < f64::EPSILON);
}
