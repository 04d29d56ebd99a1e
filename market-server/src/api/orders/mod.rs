//! Order API Module
//!
//! All mutations go through [`OrdersManager`](crate::orders::OrdersManager).

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // admin listing / any authenticated user places orders
        .route("/", get(handler::list).post(handler::create))
        .route("/customer", get(handler::list_as_customer))
        .route("/seller", get(handler::list_as_seller))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/status", patch(handler::update_status))
}
