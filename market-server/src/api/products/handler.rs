//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{Product, Review};

use crate::auth::{Access, CurrentUser, authorize};
use crate::catalog::{CatalogAccessor, CatalogError};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRequest {
    pub in_stock: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReviews {
    pub product_id: String,
    pub average_rating: f64,
    pub reviews: Vec<Review>,
}

/// Toggle availability; only the owning seller may do it
pub async fn set_stock(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<StockRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    authorize(Some(&user), Access::SELLER)?;
    let product = state
        .catalog
        .set_product_stock(&user.id, &id, payload.in_stock)?;
    tracing::info!(product_id = %id, in_stock = payload.in_stock, "Product stock changed");
    Ok(ok(product))
}

pub async fn reviews(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ProductReviews>>> {
    authorize(None, Access::Public)?;
    if state.catalog.get_product(&id).is_none() {
        return Err(CatalogError::ProductNotFound(id).into());
    }
    let average_rating = state.engagement.average_rating([id.as_str()]);
    Ok(ok(ProductReviews {
        reviews: state.engagement.reviews_of_product(&id),
        product_id: id,
        average_rating,
    }))
}
