mod common;

use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

use printforge_api::{
    config::FulfillmentSettings,
    entities::{item_master, production_order, quote, sales_order},
    errors::ServiceError,
    state::{ItemType, ProcurementType},
};

use common::*;

#[tokio::test]
async fn acceptance_spawns_item_bom_and_orders() {
    let ctx = setup().await;
    seed_raw_material(&ctx.db, "FIL-PLA-BLK", "PLA", "black").await;
    seed_material_stock(&ctx.db, "PLA", "black", dec!(2.0)).await;
    let q = seed_quote(&ctx.db, "PLA", "black", dec!(3), dec!(0.05)).await;

    let acceptance = ctx.quotes.accept_quote(q.quote_id).await.unwrap();

    let item = item_master::Entity::find_by_id(acceptance.item_id)
        .one(&*ctx.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.item_type, "finished_good");
    assert_eq!(item.procurement_type, "make");
    assert!(item.requires_qc);

    // BOM line sized by quoted unit weight; explosion proves it resolves.
    let explosion = ctx.bom.explode(acceptance.item_id, dec!(3)).await.unwrap();
    assert_eq!(explosion.bom_id, Some(acceptance.bom_id));
    assert_eq!(explosion.production.len(), 1);
    assert_eq!(explosion.production[0].required_quantity, dec!(0.15));
    assert!(explosion.shipping.is_empty());

    let so = sales_order::Entity::find_by_id(acceptance.sales_order_id)
        .one(&*ctx.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(so.status, "confirmed");
    assert_eq!(so.fulfillment_status, "pending");
    assert_eq!(so.quantity, dec!(3));

    let po = production_order::Entity::find_by_id(acceptance.production_order_id)
        .one(&*ctx.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(po.status, "draft");
    assert_eq!(po.quantity_ordered, dec!(3));
    assert_eq!(po.sales_order_id, Some(acceptance.sales_order_id));

    let accepted = quote::Entity::find_by_id(q.quote_id)
        .one(&*ctx.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(accepted.status, "accepted");
    assert_eq!(accepted.item_id, Some(acceptance.item_id));
}

#[tokio::test]
async fn acceptance_applies_default_scrap_factor() {
    let settings = FulfillmentSettings {
        default_scrap_factor: dec!(0.10),
        ..FulfillmentSettings::for_tests()
    };
    let ctx = setup_with(settings).await;
    seed_raw_material(&ctx.db, "FIL-PLA-BLK", "PLA", "black").await;
    let q = seed_quote(&ctx.db, "PLA", "black", dec!(2), dec!(0.05)).await;

    let acceptance = ctx.quotes.accept_quote(q.quote_id).await.unwrap();
    let explosion = ctx.bom.explode(acceptance.item_id, dec!(2)).await.unwrap();
    // 0.05 * 1.10 per unit, times 2 units
    assert_eq!(explosion.production[0].required_quantity, dec!(0.11));
}

#[tokio::test]
async fn acceptance_adds_packaging_line_when_configured() {
    let ctx = setup().await;
    seed_raw_material(&ctx.db, "FIL-PLA-BLK", "PLA", "black").await;
    let box_item = seed_item(&ctx.db, "BOX-S", ItemType::Supply, ProcurementType::Buy, false).await;

    let settings = FulfillmentSettings {
        packaging_item_id: Some(box_item.item_id),
        ..FulfillmentSettings::for_tests()
    };
    let quotes = printforge_api::services::QuoteService::new(ctx.db.clone(), None, settings);

    let q = seed_quote(&ctx.db, "PLA", "black", dec!(4), dec!(0.05)).await;
    let acceptance = quotes.accept_quote(q.quote_id).await.unwrap();

    let explosion = ctx.bom.explode(acceptance.item_id, dec!(4)).await.unwrap();
    assert_eq!(explosion.shipping.len(), 1);
    assert_eq!(explosion.shipping[0].item_id, box_item.item_id);
    assert_eq!(explosion.shipping[0].required_quantity, dec!(4));
}

#[tokio::test]
async fn unknown_material_rejects_acceptance_and_leaves_quote_open() {
    let ctx = setup().await;
    let q = seed_quote(&ctx.db, "PEEK", "clear", dec!(1), dec!(0.02)).await;

    let err = ctx.quotes.accept_quote(q.quote_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let unchanged = quote::Entity::find_by_id(q.quote_id)
        .one(&*ctx.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, "open");
    assert!(unchanged.item_id.is_none());
}

#[tokio::test]
async fn quotes_can_only_be_accepted_once() {
    let ctx = setup().await;
    seed_raw_material(&ctx.db, "FIL-PLA-BLK", "PLA", "black").await;
    let q = seed_quote(&ctx.db, "PLA", "black", dec!(1), dec!(0.05)).await;

    ctx.quotes.accept_quote(q.quote_id).await.unwrap();
    let err = ctx.quotes.accept_quote(q.quote_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

/// Quote to shipped order, end to end, with a clean ledger at the finish.
#[tokio::test]
async fn quote_to_shipment_round_trip() {
    let ctx = setup().await;
    seed_raw_material(&ctx.db, "FIL-PLA-BLK", "PLA", "black").await;
    seed_material_stock(&ctx.db, "PLA", "black", dec!(1.0)).await;
    let q = seed_quote(&ctx.db, "PLA", "black", dec!(2), dec!(0.05)).await;

    let acceptance = ctx.quotes.accept_quote(q.quote_id).await.unwrap();
    let po_id = acceptance.production_order_id;

    ctx.production.release_order(po_id).await.unwrap();
    let start = ctx.production.start_production(po_id).await.unwrap();
    assert!(start.materials_insufficient.is_empty());

    let completion = ctx
        .production
        .complete_production(po_id, dec!(2), dec!(0), dec!(5))
        .await
        .unwrap();
    // Custom items are QC-gated.
    assert_eq!(completion.new_status, "printed");

    let verdict = ctx.qc.pass_qc(po_id, None).await.unwrap();
    assert_eq!(
        verdict.sales_order_fulfillment_status.as_deref(),
        Some("ready_to_ship")
    );

    let shipped = ctx
        .shipping
        .ship_order(acceptance.sales_order_id, "DHL".to_string(), "JD014".to_string())
        .await
        .unwrap();
    assert_eq!(shipped.finished_goods_issued, dec!(2));

    let stock = material_stock_of(&ctx.db, "PLA", "black").await;
    assert_eq!(stock.quantity_kg, dec!(0.9));

    let report = ctx.reconciliation.reconcile_all().await.unwrap();
    assert_eq!(report.orders_with_gaps, 0);
    assert!((report.health_score - 1.0).abs() < f64::EPSILON);
}
