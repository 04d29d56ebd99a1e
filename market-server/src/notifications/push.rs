//! Push delivery (Expo)
//!
//! Best-effort backup for the in-memory streams: failures are logged and
//! never reach the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;

pub const DEFAULT_EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Not an Expo push token: {0}")]
    InvalidToken(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Push rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// One device notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    pub data: Value,
    pub sound: &'static str,
}

impl PushMessage {
    pub fn new(to: impl Into<String>, title: impl Into<String>, body: impl Into<String>, data: Value) -> Self {
        Self {
            to: to.into(),
            title: title.into(),
            body: body.into(),
            data,
            sound: "default",
        }
    }
}

/// Push-delivery collaborator
#[async_trait]
pub trait PushNotifier: Send + Sync {
    async fn send(&self, message: PushMessage) -> Result<(), PushError>;
}

/// `ExponentPushToken[...]` or `ExpoPushToken[...]`
pub fn is_expo_token(token: &str) -> bool {
    (token.starts_with("ExponentPushToken[") || token.starts_with("ExpoPushToken["))
        && token.ends_with(']')
}

/// Posts to the Expo push API
#[derive(Debug, Clone)]
pub struct ExpoPushNotifier {
    client: Client,
    endpoint: String,
}

impl ExpoPushNotifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PushError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl PushNotifier for ExpoPushNotifier {
    async fn send(&self, message: PushMessage) -> Result<(), PushError> {
        if !is_expo_token(&message.to) {
            return Err(PushError::InvalidToken(message.to));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&[&message])
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(PushError::Rejected {
                status: status.as_u16(),
                body: body.to_string(),
            });
        }

        // 200 with per-ticket errors
        let ticket_error = body["data"]
            .as_array()
            .into_iter()
            .flatten()
            .find(|ticket| ticket["status"] == "error");
        if let Some(ticket) = ticket_error {
            return Err(PushError::Rejected {
                status: status.as_u16(),
                body: ticket.to_string(),
            });
        }
        Ok(())
    }
}

/// Used when `PUSH_ENABLED=false`
#[derive(Debug, Clone, Default)]
pub struct DisabledPushNotifier;

#[async_trait]
impl PushNotifier for DisabledPushNotifier {
    async fn send(&self, message: PushMessage) -> Result<(), PushError> {
        tracing::debug!(to = %message.to, title = %message.title, "Push disabled, skipped");
        Ok(())
    }
}

/// Fire-and-forget delivery on the current runtime
///
/// Returns `None` when there is no token or no runtime to run on.
pub fn dispatch_push(notifier: Arc<dyn PushNotifier>, message: PushMessage) -> Option<JoinHandle<()>> {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        tracing::debug!(to = %message.to, "No runtime, push skipped");
        return None;
    };
    Some(handle.spawn(async move {
        let to = message.to.clone();
        match notifier.send(message).await {
            Ok(()) => tracing::debug!(%to, "Push delivered"),
            Err(PushError::InvalidToken(token)) => {
                tracing::warn!(token = %token, "Skipping push to malformed token");
            }
            Err(e) => tracing::warn!(%to, error = %e, "Push delivery failed"),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<PushMessage>>,
    }

    #[async_trait]
    impl PushNotifier for Recorder {
        async fn send(&self, message: PushMessage) -> Result<(), PushError> {
            self.sent.lock().push(message);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl PushNotifier for Failing {
        async fn send(&self, _message: PushMessage) -> Result<(), PushError> {
            Err(PushError::Rejected {
                status: 500,
                body: "boom".into(),
            })
        }
    }

    #[test]
    fn test_expo_token_shape() {
        assert!(is_expo_token("ExponentPushToken[abc123]"));
        assert!(is_expo_token("ExpoPushToken[abc123]"));
        assert!(!is_expo_token("abc123"));
        assert!(!is_expo_token("ExponentPushToken[abc123"));
    }

    #[test]
    fn test_message_serializes_for_expo() {
        let msg = PushMessage::new("ExpoPushToken[x]", "order update", "Confirmed", serde_json::json!({"orderId": "o1"}));
        let json = serde_json::to_value([&msg]).unwrap();
        assert_eq!(json[0]["to"], "ExpoPushToken[x]");
        assert_eq!(json[0]["sound"], "default");
        assert_eq!(json[0]["data"]["orderId"], "o1");
    }

    #[test]
    fn test_dispatch_without_runtime_is_skipped() {
        let recorder = Arc::new(Recorder::default());
        let msg = PushMessage::new("ExpoPushToken[x]", "t", "b", Value::Null);
        assert!(dispatch_push(recorder.clone(), msg).is_none());
        assert!(recorder.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_delivers_and_swallows_errors() {
        let recorder = Arc::new(Recorder::default());
        let msg = PushMessage::new("ExpoPushToken[x]", "t", "b", Value::Null);
        dispatch_push(recorder.clone(), msg).unwrap().await.unwrap();
        assert_eq!(recorder.sent.lock().len(), 1);

        let msg = PushMessage::new("ExpoPushToken[x]", "t", "b", Value::Null);
        dispatch_push(Arc::new(Failing), msg).unwrap().await.unwrap();
    }

    #[tokio::test]
    async fn test_expo_rejects_malformed_token_before_sending() {
        let notifier = ExpoPushNotifier::new("http://127.0.0.1:9", Duration::from_millis(100)).unwrap();
        let msg = PushMessage::new("not-a-token", "t", "b", Value::Null);
        assert!(matches!(
            notifier.send(msg).await,
            Err(PushError::InvalidToken(_))
        ));
    }
}
