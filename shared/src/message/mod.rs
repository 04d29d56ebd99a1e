//! 实时通知消息类型
//!
//! Payloads pushed over the seller/customer streams. Shared with the
//! mobile clients, which switch on `type`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Order, OrderStatus};

/// Which keyed stream set an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Seller,
    Customer,
}

/// Compact order view sent to the seller on creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: String,
    pub total_price: Decimal,
    pub distance: f64,
    pub shipping_cost: Decimal,
    pub receiver_name: String,
    pub note: String,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            total_price: order.total_with_shipping,
            distance: order.distance,
            shipping_cost: order.shipping_cost,
            receiver_name: order.receiver_name.clone(),
            note: order.note.clone(),
        }
    }
}

/// Notification event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum NotificationEvent {
    /// → seller
    NewOrder { order: OrderSummary },
    /// → customer
    OrderStatusUpdate {
        order_id: String,
        status: OrderStatus,
        message: String,
    },
}

impl NotificationEvent {
    pub fn new_order(order: &Order) -> Self {
        Self::NewOrder {
            order: order.into(),
        }
    }

    pub fn status_update(order_id: impl Into<String>, status: OrderStatus) -> Self {
        Self::OrderStatusUpdate {
            order_id: order_id.into(),
            status,
            message: status.message().to_string(),
        }
    }

    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewOrder { .. } => "NEW_ORDER",
            Self::OrderStatusUpdate { .. } => "ORDER_STATUS_UPDATE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_update_wire_shape() {
        let event = NotificationEvent::status_update("o1", OrderStatus::Delivering);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ORDER_STATUS_UPDATE");
        assert_eq!(json["orderId"], "o1");
        assert_eq!(json["status"], "delivering");
        assert_eq!(json["message"], OrderStatus::Delivering.message());
        assert_eq!(event.name(), "ORDER_STATUS_UPDATE");
    }

    #[test]
    fn test_new_order_wire_shape() {
        let event = NotificationEvent::NewOrder {
            order: OrderSummary {
                id: "o1".into(),
                total_price: Decimal::from(68000),
                distance: 2.0,
                shipping_cost: Decimal::from(8000),
                receiver_name: "An".into(),
                note: String::new(),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "NEW_ORDER");
        assert_eq!(json["order"]["totalPrice"], 68000.0);
        assert_eq!(json["order"]["shippingCost"], 8000.0);
        assert_eq!(json["order"]["receiverName"], "An");
        let back: NotificationEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
