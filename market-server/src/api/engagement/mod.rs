//! Reviews and likes
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/reviews | POST | 买家 |
//! | /api/reviews/{id} | DELETE | 买家 (自己的评价) |
//! | /api/likes | GET | 买家 |
//! | /api/likes/{seller_id} | POST / DELETE | 买家 |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/reviews", post(handler::add_review))
        .route("/api/reviews/{id}", delete(handler::delete_review))
        .route("/api/likes", get(handler::liked_sellers))
        .route(
            "/api/likes/{seller_id}",
            post(handler::like).delete(handler::unlike),
        )
}
