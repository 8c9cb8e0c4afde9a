use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::{entities::quote, errors::ServiceError, services::quotes::QuoteAcceptance, AppState};

pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<quote::Model>, ServiceError> {
    Ok(Json(state.quotes.get_quote(id).await?))
}

pub async fn accept_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<QuoteAcceptance>, ServiceError> {
    Ok(Json(state.quotes.accept_quote(id).await?))
}
