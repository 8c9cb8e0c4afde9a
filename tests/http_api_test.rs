mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use printforge_api::{app, AppState};
use printforge_api::config::FulfillmentSettings;
use printforge_api::state::{ConsumeStage, ItemType, ProcurementType, ProductionStatus};

use common::*;

async fn test_app(ctx: &TestContext) -> axum::Router {
    app(AppState::new(
        ctx.db.clone(),
        None,
        FulfillmentSettings::for_tests(),
    ))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let ctx = setup().await;
    let app = test_app(&ctx).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn start_and_complete_over_http() {
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

    let app = test_app(&ctx).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/production-orders/{}/start", po.production_order_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["new_status"], "in_progress");

    let payload = json!({
        "quantity_good": "4",
        "quantity_bad": "1",
        "actual_hours": "6.5",
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!(
                    "/api/v1/production-orders/{}/complete",
                    po.production_order_id
                ))
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["new_status"], "completed");
    assert_eq!(body["finished_goods_added"], "4");

    // Replaying the completion maps the state error to 409.
    let payload = json!({
        "quantity_good": "4",
        "quantity_bad": "1",
        "actual_hours": "6.5",
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!(
                    "/api/v1/production-orders/{}/complete",
                    po.production_order_id
                ))
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Conflict");
}

#[tokio::test]
async fn unknown_production_order_maps_to_404() {
    let ctx = setup().await;
    let app = test_app(&ctx).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/production-orders/9999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
