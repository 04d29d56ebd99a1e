//! Seller API Module
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/sellers/{id}/categories | GET | 无 |
//! | /api/sellers/me/open | PATCH | 卖家 |

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sellers", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/me/open", patch(handler::set_open))
        .route("/{id}/categories", get(handler::categories))
}
