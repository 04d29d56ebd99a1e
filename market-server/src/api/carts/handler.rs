//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{
    Cart, CartLineInput, UpdateQuantityRequest, ValidateCartRequest, ValidatedCart,
};
use shared::util::now_millis;

use crate::auth::{Access, CurrentUser, authorize};
use crate::core::ServerState;
use crate::utils::validation::validate_payload;
use crate::utils::{ApiResponse, AppResult, ok};

/// Re-price a client cart; invalid lines are dropped, nothing is stored
pub async fn validate(
    State(state): State<ServerState>,
    Json(payload): Json<ValidateCartRequest>,
) -> AppResult<Json<ApiResponse<ValidatedCart>>> {
    authorize(None, Access::Public)?;
    Ok(ok(state.pricer.validate(&payload)))
}

pub async fn get_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Cart>>> {
    authorize(Some(&user), Access::Authenticated)?;
    Ok(ok(state.carts.get_cart(&user.id)?))
}

pub async fn add_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(seller_id): Path<String>,
    Json(payload): Json<CartLineInput>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    authorize(Some(&user), Access::Authenticated)?;
    validate_payload(&payload)?;
    let cart = state
        .carts
        .add_item(&user.id, &seller_id, &payload, now_millis())?;
    Ok(ok(cart))
}

pub async fn update_quantity(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((seller_id, line_id)): Path<(String, String)>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    authorize(Some(&user), Access::Authenticated)?;
    validate_payload(&payload)?;
    let cart = state.carts.update_quantity(
        &user.id,
        &seller_id,
        &line_id,
        payload.quantity,
        now_millis(),
    )?;
    Ok(ok(cart))
}

pub async fn remove_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((seller_id, line_id)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    authorize(Some(&user), Access::Authenticated)?;
    let cart = state
        .carts
        .remove_item(&user.id, &seller_id, &line_id, now_millis())?;
    Ok(ok(cart))
}

pub async fn clear_seller(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(seller_id): Path<String>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    authorize(Some(&user), Access::Authenticated)?;
    let cart = state
        .carts
        .clear_seller(&user.id, &seller_id, now_millis())?;
    Ok(ok(cart))
}
