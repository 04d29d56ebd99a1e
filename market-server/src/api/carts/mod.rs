//! Cart API Module
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/carts/validate | POST | 无 |
//! | /api/cart | GET | 登录 |
//! | /api/cart/{seller_id} | POST / DELETE | 登录 |
//! | /api/cart/{seller_id}/{line_id} | PATCH / DELETE | 登录 |

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/carts/validate", post(handler::validate))
        .nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get_cart))
        .route(
            "/{seller_id}",
            post(handler::add_item).delete(handler::clear_seller),
        )
        .route(
            "/{seller_id}/{line_id}",
            patch(handler::update_quantity).delete(handler::remove_item),
        )
}
