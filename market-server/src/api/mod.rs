//! API 路由模块
//!
//! 每个子模块导出 `router()`，并在处理器里先执行 [`authorize`](crate::auth::authorize)
//! 再调用引擎。
//!
//! - [`health`] - 健康检查
//! - [`carts`] - 购物车校验和持久化购物车
//! - [`orders`] - 下单、状态流转、订单查询
//! - [`discovery`] - 附近卖家 / 商品搜索 / 分类排行
//! - [`sellers`] - 卖家分类、营业开关
//! - [`profile`] - 当前用户位置
//! - [`products`] - 库存开关、商品评价
//! - [`engagement`] - 评价、收藏
//! - [`notifications`] - SSE 实时通知流

pub mod carts;
pub mod discovery;
pub mod engagement;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod profile;
pub mod sellers;

use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Request/response routes (subject to the request timeout)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(carts::router())
        .merge(orders::router())
        .merge(discovery::router())
        .merge(sellers::router())
        .merge(profile::router())
        .merge(products::router())
        .merge(engagement::router())
}

/// Build the fully configured application
///
/// Streaming routes are merged after the timeout layer so long-lived SSE
/// responses are not cut off.
pub fn build_app(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    build_router()
        .layer(TimeoutLayer::new(timeout))
        .merge(notifications::router())
        .with_state(state)
        // ========== Tower HTTP Middleware ==========
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
