//! 通知中心
//!
//! # 结构
//!
//! ```text
//! NotificationHub
//!   ├─ sellers:   DashMap<seller_id,   broadcast::Sender<NotificationEvent>>
//!   └─ customers: DashMap<customer_id, broadcast::Sender<NotificationEvent>>
//! ```
//!
//! - `subscribe` 惰性创建通道; 同一 key 的订阅共享同一个通道
//! - `publish` 无订阅者时直接丢弃 (无缓冲、无重放)
//! - 订阅被 drop 后, 若无剩余接收者则移除通道
//! - `shutdown` 关闭所有通道, 之后拒绝新订阅

use std::sync::Arc;

use dashmap::DashMap;
use futures::Stream;
use shared::message::{Audience, NotificationEvent};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

/// Default per-stream buffer
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("Notification hub is shut down")]
    Closed,
}

impl From<HubError> for shared::AppError {
    fn from(err: HubError) -> Self {
        shared::AppError::with_message(shared::ErrorCode::ServiceUnavailable, err.to_string())
    }
}

type Channels = DashMap<String, broadcast::Sender<NotificationEvent>>;

/// Lifecycle-scoped registry of notification streams
///
/// Cloning shares the same registry.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    sellers: Arc<Channels>,
    customers: Arc<Channels>,
    capacity: usize,
    shutdown_token: CancellationToken,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            sellers: Arc::new(DashMap::new()),
            customers: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
            shutdown_token: CancellationToken::new(),
        }
    }

    fn channels(&self, audience: Audience) -> &Channels {
        match audience {
            Audience::Seller => &self.sellers,
            Audience::Customer => &self.customers,
        }
    }

    /// Attach to the stream for `key`, creating it if absent
    pub fn subscribe(&self, audience: Audience, key: &str) -> Result<Subscription, HubError> {
        if self.shutdown_token.is_cancelled() {
            return Err(HubError::Closed);
        }
        let receiver = self
            .channels(audience)
            .entry(key.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();

        tracing::debug!(?audience, key, "Notification stream subscribed");
        Ok(Subscription {
            hub: self.clone(),
            audience,
            key: key.to_string(),
            receiver: Some(receiver),
        })
    }

    /// Deliver to the current stream for `key`
    ///
    /// Returns the number of receivers reached; 0 when nobody listens.
    /// Never blocks and never fails.
    pub fn publish(&self, audience: Audience, key: &str, event: NotificationEvent) -> usize {
        let Some(sender) = self.channels(audience).get(key).map(|s| s.value().clone()) else {
            tracing::debug!(?audience, key, event = event.name(), "No subscriber, event dropped");
            return 0;
        };
        match sender.send(event) {
            Ok(count) => count,
            Err(_) => {
                tracing::debug!(?audience, key, "Stream has no receivers, event dropped");
                0
            }
        }
    }

    /// Close and remove the stream for `key`; attached receivers end
    pub fn unsubscribe(&self, audience: Audience, key: &str) -> bool {
        self.channels(audience).remove(key).is_some()
    }

    /// Remove the stream once its last receiver is gone
    fn release(&self, audience: Audience, key: &str) {
        let removed = self
            .channels(audience)
            .remove_if(key, |_, sender| sender.receiver_count() == 0);
        if removed.is_some() {
            tracing::debug!(?audience, key, "Notification stream released");
        }
    }

    pub fn is_subscribed(&self, audience: Audience, key: &str) -> bool {
        self.channels(audience).contains_key(key)
    }

    pub fn stream_count(&self) -> usize {
        self.sellers.len() + self.customers.len()
    }

    /// Close every stream and refuse new subscriptions
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
        let streams = self.stream_count();
        self.sellers.clear();
        self.customers.clear();
        tracing::info!(streams, "Notification hub shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }
}

/// One attached receiver
///
/// Dropping it releases the stream when no other receiver remains.
#[derive(Debug)]
pub struct Subscription {
    hub: NotificationHub,
    audience: Audience,
    key: String,
    receiver: Option<broadcast::Receiver<NotificationEvent>>,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Next event; `None` once the stream is closed or the hub shuts down
    pub async fn recv(&mut self) -> Option<NotificationEvent> {
        let receiver = self.receiver.as_mut()?;
        loop {
            tokio::select! {
                _ = self.hub.shutdown_token.cancelled() => return None,
                result = receiver.recv() => match result {
                    Ok(event) => return Some(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(key = %self.key, skipped, "Slow subscriber skipped events");
                    }
                    Err(RecvError::Closed) => return None,
                },
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = NotificationEvent> + Send {
        futures::stream::unfold(self, |mut subscription| async move {
            subscription
                .recv()
                .await
                .map(|event| (event, subscription))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        drop(self.receiver.take());
        self.hub.release(self.audience, &self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use shared::models::OrderStatus;

    fn update(order_id: &str) -> NotificationEvent {
        NotificationEvent::status_update(order_id, OrderStatus::Confirmed)
    }

    #[test]
    fn test_publish_without_subscriber_is_dropped() {
        let hub = NotificationHub::default();
        assert_eq!(hub.publish(Audience::Seller, "s1", update("o1")), 0);
        assert_eq!(hub.stream_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_share_stream() {
        let hub = NotificationHub::default();
        let mut a = hub.subscribe(Audience::Seller, "s1").unwrap();
        let mut b = hub.subscribe(Audience::Seller, "s1").unwrap();
        assert_eq!(hub.stream_count(), 1);

        assert_eq!(hub.publish(Audience::Seller, "s1", update("o1")), 2);
        assert_eq!(a.recv().await, Some(update("o1")));
        assert_eq!(b.recv().await, Some(update("o1")));
    }

    #[tokio::test]
    async fn test_audiences_are_disjoint() {
        let hub = NotificationHub::default();
        let _seller = hub.subscribe(Audience::Seller, "u1").unwrap();
        assert_eq!(hub.publish(Audience::Customer, "u1", update("o1")), 0);
        assert_eq!(hub.publish(Audience::Seller, "u1", update("o1")), 1);
    }

    #[tokio::test]
    async fn test_drop_releases_when_last_receiver_leaves() {
        let hub = NotificationHub::default();
        let a = hub.subscribe(Audience::Customer, "c1").unwrap();
        let b = hub.subscribe(Audience::Customer, "c1").unwrap();
        drop(a);
        assert!(hub.is_subscribed(Audience::Customer, "c1"));
        drop(b);
        assert!(!hub.is_subscribed(Audience::Customer, "c1"));
    }

    #[tokio::test]
    async fn test_unsubscribe_ends_stream() {
        let hub = NotificationHub::default();
        let mut sub = hub.subscribe(Audience::Seller, "s1").unwrap();
        assert!(hub.unsubscribe(Audience::Seller, "s1"));
        assert_eq!(sub.recv().await, None);
        assert!(!hub.unsubscribe(Audience::Seller, "s1"));
    }

    #[tokio::test]
    async fn test_shutdown_closes_everything() {
        let hub = NotificationHub::default();
        let sub = hub.subscribe(Audience::Seller, "s1").unwrap();
        let mut stream = Box::pin(sub.into_stream());

        hub.publish(Audience::Seller, "s1", update("o1"));
        assert_eq!(stream.next().await, Some(update("o1")));

        hub.shutdown();
        assert_eq!(stream.next().await, None);
        assert!(matches!(
            hub.subscribe(Audience::Seller, "s1"),
            Err(HubError::Closed)
        ));
        assert_eq!(hub.stream_count(), 0);
    }
}
