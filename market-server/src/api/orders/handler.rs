//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{CreateOrderRequest, Order, OrderStatus, StatusChange, UpdateStatusRequest};
use shared::util::now_millis;
use shared::{PageQuery, Paginated};

use crate::auth::{Access, CurrentUser, authorize};
use crate::core::ServerState;
use crate::orders::ManagerError;
use crate::security_log;
use crate::storage::OrderFilter;
use crate::utils::validation::validate_payload;
use crate::utils::{ApiResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// Admin listing filters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub seller_id: Option<String>,
}

pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    authorize(Some(&user), Access::Authenticated)?;
    validate_payload(&payload)?;
    let order = state.orders.create_order(&user.id, payload, now_millis())?;
    Ok(ok_with_message(order, "Order placed"))
}

pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Paginated<Order>>>> {
    authorize(Some(&user), Access::ADMIN)?;
    let filter = OrderFilter {
        customer_id: query.customer_id,
        seller_id: query.seller_id,
        status: query.status,
        include_deleted: false,
    };
    Ok(ok(state.orders.list_orders(&filter, page.resolve())?))
}

pub async fn list_as_customer(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<StatusQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Paginated<Order>>>> {
    authorize(Some(&user), Access::CUSTOMER)?;
    let orders = state
        .orders
        .orders_of_customer(&user.id, query.status, page.resolve())?;
    Ok(ok(orders))
}

pub async fn list_as_seller(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<StatusQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Paginated<Order>>>> {
    authorize(Some(&user), Access::SELLER)?;
    let orders = state
        .orders
        .orders_of_seller(&user.id, query.status, page.resolve())?;
    Ok(ok(orders))
}

/// Visible to its buyer, its seller and admins; anyone else gets not-found
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    authorize(Some(&user), Access::Authenticated)?;
    let order = state.orders.get_order(&id)?;
    if !user.is_admin() && order.customer_id != user.id && order.seller_id != user.id {
        security_log!(
            "WARN",
            "order_read_denied",
            user_id = user.id.clone(),
            order_id = id.clone()
        );
        return Err(ManagerError::OrderNotFound(id).into());
    }
    Ok(ok(order))
}

pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<StatusChange>>> {
    authorize(Some(&user), Access::SELLER)?;
    let change = state
        .orders
        .update_status(&user.id, &id, payload.status, now_millis())?;
    let message = change.message.clone();
    Ok(ok_with_message(change, message))
}

pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    authorize(Some(&user), Access::ADMIN)?;
    state.orders.delete_order(&id, now_millis())?;
    Ok(ok(true))
}
