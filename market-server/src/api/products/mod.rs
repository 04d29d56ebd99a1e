//! Product API Module
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/products/{id}/stock | PATCH | 卖家 (自己的商品) |
//! | /api/products/{id}/reviews | GET | 无 |

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}/stock", patch(handler::set_stock))
        .route("/{id}/reviews", get(handler::reviews))
}
