//! Point handlers

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use core_kernel::{Points, UserId};

use crate::dto::point::*;
use crate::{error::ApiError, AppState};

fn parse_user(id: &str) -> Result<UserId, ApiError> {
    id.parse().map_err(|e: core_kernel::IdParseError| ApiError::BadRequest(e.to_string()))
}

/// Gets a user's current balance
pub async fn get_point(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PointResponse>, ApiError> {
    let user_id = parse_user(&id)?;
    let record = state.engine.get_balance(user_id).await?;
    Ok(Json(record.into()))
}

/// Lists a user's committed history in sequence order
pub async fn get_histories(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<HistoryResponse>>, ApiError> {
    let user_id = parse_user(&id)?;
    let entries = state.engine.get_history(user_id).await?;
    Ok(Json(entries.into_iter().map(HistoryResponse::from).collect()))
}

/// Charges points to a user
pub async fn charge(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PointAmountRequest>,
) -> Result<Json<PointResponse>, ApiError> {
    let user_id = parse_user(&id)?;
    request.validate()?;

    let record = state
        .engine
        .charge(user_id, Points::new(request.amount))
        .await?;
    Ok(Json(record.into()))
}

/// Uses (debits) points from a user
pub async fn use_points(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PointAmountRequest>,
) -> Result<Json<PointResponse>, ApiError> {
    let user_id = parse_user(&id)?;
    request.validate()?;

    let record = state
        .engine
        .debit(user_id, Points::new(request.amount))
        .await?;
    Ok(Json(record.into()))
}
