//! Seller API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::User;

use crate::auth::{Access, CurrentUser, authorize};
use crate::catalog::{CatalogAccessor, CatalogError};
use crate::core::ServerState;
use crate::geo::SellerSummary;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRequest {
    pub is_open: bool,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenResponse {
    #[serde(flatten)]
    pub seller: SellerSummary,
    pub is_open: bool,
}

/// Distinct category ids of the seller's live products
pub async fn categories(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    authorize(None, Access::Public)?;
    if state.catalog.get_seller(&id).is_none() {
        return Err(CatalogError::SellerNotFound(id).into());
    }
    Ok(ok(state.catalog.seller_categories(&id)))
}

/// Closed sellers disappear from discovery and stop accepting orders
pub async fn set_open(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OpenRequest>,
) -> AppResult<Json<ApiResponse<OpenResponse>>> {
    authorize(Some(&user), Access::SELLER)?;
    let seller: User = state.catalog.set_seller_open(&user.id, payload.is_open)?;
    tracing::info!(seller_id = %seller.id, is_open = seller.is_open, "Seller open flag changed");
    Ok(ok(OpenResponse {
        seller: SellerSummary::from(&seller),
        is_open: seller.is_open,
    }))
}
