//! Discovery API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::GeoPoint;
use shared::{PageQuery, Paginated};

use crate::auth::{Access, CurrentUser, authorize};
use crate::core::ServerState;
use crate::geo::{
    CategorizedSellers, NearbyParams, NearbyProduct, NearbySeller, NearbySellerWithProducts,
};
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub category_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeQuery {
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub category_id: Option<String>,
}

fn params(state: &ServerState, query: NearbyQuery, page: &PageQuery) -> NearbyParams {
    NearbyParams {
        origin: GeoPoint::new(query.lat, query.lng),
        radius_km: query.radius.unwrap_or(state.config.default_search_radius_km),
        category_id: query.category_id.filter(|c| !c.is_empty()),
        page: page.resolve(),
    }
}

pub async fn nearby(
    State(state): State<ServerState>,
    Query(query): Query<NearbyQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Paginated<NearbySeller>>>> {
    authorize(None, Access::Public)?;
    let params = params(&state, query, &page);
    Ok(ok(state.discovery.nearby_sellers(&params)?))
}

pub async fn nearby_with_products(
    State(state): State<ServerState>,
    Query(query): Query<NearbyQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Paginated<NearbySellerWithProducts>>>> {
    authorize(None, Access::Public)?;
    let params = params(&state, query, &page);
    Ok(ok(state.discovery.nearby_sellers_with_products(&params)?))
}

pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<NearbyQuery>,
    Query(search): Query<SearchQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Paginated<NearbyProduct>>>> {
    authorize(None, Access::Public)?;
    let params = params(&state, query, &page);
    Ok(ok(state.discovery.search_products(&params, &search.keyword)?))
}

/// Anchored at the caller's stored location; all eligible sellers when none
pub async fn nearby_for_me(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<MeQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Paginated<NearbySeller>>>> {
    authorize(Some(&user), Access::Authenticated)?;
    let sellers = state.discovery.nearby_for_user(
        &user.id,
        query.radius.unwrap_or(state.config.default_search_radius_km),
        query.category_id.filter(|c| !c.is_empty()),
        page.resolve(),
    )?;
    Ok(ok(sellers))
}

pub async fn categorized_for_me(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<MeQuery>,
) -> AppResult<Json<ApiResponse<CategorizedSellers>>> {
    authorize(Some(&user), Access::Authenticated)?;
    let radius = query.radius.unwrap_or(state.config.default_search_radius_km);
    Ok(ok(state.discovery.categorize(&user.id, radius)?))
}
