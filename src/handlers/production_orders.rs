use axum::{
    extract::{Path, State},
    response::Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::{
    entities::production_order,
    errors::ServiceError,
    services::{
        production::{CompletionResult, StartProductionResult},
        qc::{FailureDisposition, QcFailResult, QcPassResult},
    },
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteProductionRequest {
    pub quantity_good: Decimal,
    #[serde(default)]
    pub quantity_bad: Decimal,
    pub actual_hours: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PassQcRequest {
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FailQcRequest {
    #[validate(length(min = 1, max = 1000))]
    pub failure_reason: String,
    pub disposition: FailureDisposition,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelProductionRequest {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

pub async fn get_production_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<production_order::Model>, ServiceError> {
    Ok(Json(state.production.get_order(id).await?))
}

pub async fn release_production_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<production_order::Model>, ServiceError> {
    Ok(Json(state.production.release_order(id).await?))
}

pub async fn start_production(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StartProductionResult>, ServiceError> {
    Ok(Json(state.production.start_production(id).await?))
}

pub async fn complete_production(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CompleteProductionRequest>,
) -> Result<Json<CompletionResult>, ServiceError> {
    payload.validate()?;
    let result = state
        .production
        .complete_production(
            id,
            payload.quantity_good,
            payload.quantity_bad,
            payload.actual_hours,
        )
        .await?;
    Ok(Json(result))
}

pub async fn pass_qc(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PassQcRequest>,
) -> Result<Json<QcPassResult>, ServiceError> {
    payload.validate()?;
    Ok(Json(state.qc.pass_qc(id, payload.notes).await?))
}

pub async fn fail_qc(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<FailQcRequest>,
) -> Result<Json<QcFailResult>, ServiceError> {
    payload.validate()?;
    let result = state
        .qc
        .fail_qc(id, payload.failure_reason, payload.disposition)
        .await?;
    Ok(Json(result))
}

pub async fn cancel_production(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CancelProductionRequest>,
) -> Result<Json<production_order::Model>, ServiceError> {
    payload.validate()?;
    Ok(Json(
        state.production.cancel_production(id, payload.reason).await?,
    ))
}
