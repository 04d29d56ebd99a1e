//! 实时通知流 (SSE)
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/notifications/seller/stream | GET | 卖家 |
//! | /api/notifications/customer/stream | GET | 买家 |
//!
//! 每个事件的 `event` 字段为 `NEW_ORDER` 或 `ORDER_STATUS_UPDATE`，
//! `data` 为 JSON 负载。断开连接即取消订阅。

use std::convert::Infallible;
use std::pin::Pin;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, KeepAliveStream, Sse},
    routing::get,
};
use futures::{Stream, StreamExt};
use shared::NotificationEvent;

use crate::auth::{Access, CurrentUser, authorize};
use crate::core::ServerState;
use crate::notifications::{Audience, Subscription};
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/notifications/seller/stream", get(seller_stream))
        .route("/api/notifications/customer/stream", get(customer_stream))
}

type BoxedEvents = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;
type EventStream = Sse<KeepAliveStream<BoxedEvents>>;

fn to_sse(subscription: Subscription) -> EventStream {
    let key = subscription.key().to_string();
    let stream = subscription.into_stream().filter_map(move |event: NotificationEvent| {
        let encoded = Event::default().event(event.name()).json_data(&event);
        let out = match encoded {
            Ok(sse) => Some(Ok(sse)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Dropping unencodable notification");
                None
            }
        };
        futures::future::ready(out)
    });
    let stream: BoxedEvents = Box::pin(stream);
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn seller_stream(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<EventStream> {
    authorize(Some(&user), Access::SELLER)?;
    let subscription = state.hub.subscribe(Audience::Seller, &user.id)?;
    tracing::info!(seller_id = %user.id, "Seller stream opened");
    Ok(to_sse(subscription))
}

pub async fn customer_stream(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<EventStream> {
    authorize(Some(&user), Access::CUSTOMER)?;
    let subscription = state.hub.subscribe(Audience::Customer, &user.id)?;
    tracing::info!(customer_id = %user.id, "Customer stream opened");
    Ok(to_sse(subscription))
}
