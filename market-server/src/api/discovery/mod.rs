//! Discovery API Module
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/discovery/nearby | GET | 无 |
//! | /api/discovery/nearby/products | GET | 无 |
//! | /api/discovery/search | GET | 无 |
//! | /api/discovery/me/nearby | GET | 登录 |
//! | /api/discovery/me/categorized | GET | 登录 |
//!
//! Radius is in kilometers; distances in responses are kilometers.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/discovery", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/nearby", get(handler::nearby))
        .route("/nearby/products", get(handler::nearby_with_products))
        .route("/search", get(handler::search))
        .route("/me/nearby", get(handler::nearby_for_me))
        .route("/me/categorized", get(handler::categorized_for_me))
}
