//! 实时通知 (Notification Fan-Out)
//!
//! - [`hub`]: in-memory per-seller / per-customer broadcast streams
//! - [`push`]: external push delivery, best-effort backup channel

pub mod hub;
pub mod push;

pub use hub::{DEFAULT_CHANNEL_CAPACITY, HubError, NotificationHub, Subscription};
pub use push::{
    DEFAULT_EXPO_PUSH_URL, DisabledPushNotifier, ExpoPushNotifier, PushError, PushMessage,
    PushNotifier, dispatch_push, is_expo_token,
};
pub use shared::message::Audience;
