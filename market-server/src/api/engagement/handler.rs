//! Review / like handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Like, Review, ReviewCreate};
use shared::util::now_millis;

use crate::auth::{Access, CurrentUser, authorize};
use crate::core::ServerState;
use crate::utils::validation::validate_payload;
use crate::utils::{ApiResponse, AppResult, ok};

/// Allowed while completed purchases of the product outnumber prior reviews
pub async fn add_review(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ReviewCreate>,
) -> AppResult<Json<ApiResponse<Review>>> {
    authorize(Some(&user), Access::CUSTOMER)?;
    validate_payload(&payload)?;
    let review = state
        .engagement
        .add_review(&user.id, payload, now_millis())?;
    Ok(ok(review))
}

pub async fn delete_review(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    authorize(Some(&user), Access::CUSTOMER)?;
    state.engagement.delete_review(&user.id, &id)?;
    Ok(ok(true))
}

pub async fn liked_sellers(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    authorize(Some(&user), Access::CUSTOMER)?;
    Ok(ok(state.engagement.liked_sellers(&user.id)))
}

pub async fn like(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(seller_id): Path<String>,
) -> AppResult<Json<ApiResponse<Like>>> {
    authorize(Some(&user), Access::CUSTOMER)?;
    let like = state
        .engagement
        .like_seller(&user.id, &seller_id, now_millis())?;
    Ok(ok(like))
}

pub async fn unlike(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(seller_id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    authorize(Some(&user), Access::CUSTOMER)?;
    state.engagement.unlike_seller(&user.id, &seller_id)?;
    Ok(ok(true))
}
