use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::{
    errors::ServiceError,
    services::reconciliation::{OrderReconciliation, ReconciliationReport},
    AppState,
};

pub async fn reconcile_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderReconciliation>, ServiceError> {
    Ok(Json(state.reconciliation.reconcile_order(id).await?))
}

pub async fn reconcile_all(
    State(state): State<AppState>,
) -> Result<Json<ReconciliationReport>, ServiceError> {
    Ok(Json(state.reconciliation.reconcile_all().await?))
}
