use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    entities::sales_order, errors::ServiceError, services::shipping::ShipmentResult, AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct ShipOrderRequest {
    #[validate(length(min = 1, max = 100))]
    pub carrier: String,
    #[validate(length(min = 1, max = 100))]
    pub tracking_number: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTrackingRequest {
    #[validate(length(min = 1, max = 100))]
    pub carrier: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub tracking_number: Option<String>,
}

pub async fn get_sales_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<sales_order::Model>, ServiceError> {
    Ok(Json(state.shipping.get_order(id).await?))
}

pub async fn ship_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ShipOrderRequest>,
) -> Result<Json<ShipmentResult>, ServiceError> {
    payload.validate()?;
    let result = state
        .shipping
        .ship_order(id, payload.carrier, payload.tracking_number)
        .await?;
    Ok(Json(result))
}

pub async fn update_tracking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTrackingRequest>,
) -> Result<Json<sales_order::Model>, ServiceError> {
    payload.validate()?;
    if payload.carrier.is_none() && payload.tracking_number.is_none() {
        return Err(ServiceError::ValidationError(
            "provide a carrier or tracking number to update".to_string(),
        ));
    }
    let updated = state
        .shipping
        .update_tracking(id, payload.carrier, payload.tracking_number)
        .await?;
    Ok(Json(updated))
}

pub async fn close_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<sales_order::Model>, ServiceError> {
    Ok(Json(state.shipping.close_order(id).await?))
}
