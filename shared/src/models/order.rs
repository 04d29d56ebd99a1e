//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::cart::{CartLineInput, PricedLine};
use super::location::LocationInput;

/// 订单状态
///
/// | State | Allowed next states |
/// |---|---|
/// | pending | confirmed, cancelled |
/// | confirmed | preparing, cancelled |
/// | preparing | delivering, cancelled |
/// | delivering | completed, cancelled |
/// | completed | (terminal) |
/// | cancelled | (terminal) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Delivering,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Delivering,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Allowed next states
    pub fn next_states(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
            OrderStatus::Confirmed => &[OrderStatus::Preparing, OrderStatus::Cancelled],
            OrderStatus::Preparing => &[OrderStatus::Delivering, OrderStatus::Cancelled],
            OrderStatus::Delivering => &[OrderStatus::Completed, OrderStatus::Cancelled],
            OrderStatus::Completed | OrderStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.next_states().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.next_states().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Customer-facing message for a status change
    pub fn message(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Your order has been placed",
            OrderStatus::Confirmed => "Your order has been confirmed 🧾",
            OrderStatus::Preparing => "Your order is being prepared 🍳",
            OrderStatus::Delivering => "Your order is on the way 🚚",
            OrderStatus::Completed => "Your order has been delivered 🎉",
            OrderStatus::Cancelled => "Your order has been cancelled ❌",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {}", s))
    }
}

/// Order entity
///
/// Lines are immutable after creation; only `status` (and `delivered_at`,
/// `updated_at`) change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Human-friendly sequence number
    pub order_no: u64,
    pub customer_id: String,
    pub seller_id: String,
    pub items: Vec<PricedLine>,
    pub status: OrderStatus,
    pub delivery_location_id: String,
    #[serde(default)]
    pub receiver_name: String,
    #[serde(default)]
    pub receiver_phone: String,
    #[serde(default)]
    pub note: String,
    /// Great-circle distance seller → delivery (km)
    pub distance: f64,
    pub shipping_cost: Decimal,
    /// Σ line totals (no shipping)
    pub items_total: Decimal,
    /// items_total + shipping_cost
    pub total_with_shipping: Decimal,
    #[serde(default)]
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub delivered_at: Option<i64>,
}

impl Order {
    pub fn contains_product(&self, product_id: &str) -> bool {
        self.items.iter().any(|l| l.product_id == product_id)
    }
}

/// Order creation payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub seller_id: String,
    #[validate(nested)]
    pub items: Vec<CartLineInput>,
    /// New delivery position (persisted as a Location)
    #[serde(default)]
    #[validate(nested)]
    pub location: Option<LocationInput>,
    /// Existing Location record to deliver to
    #[serde(default)]
    pub delivery_address_id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub receiver_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub receiver_phone: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// Status transition payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Result of an accepted transition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub message: String,
    pub previous: OrderStatus,
    pub order: Order,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_is_allowed() {
        let path = [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Delivering,
            OrderStatus::Completed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_full_transition_table() {
        use OrderStatus::*;
        let allowed = [
            (Pending, Confirmed),
            (Pending, Cancelled),
            (Confirmed, Preparing),
            (Confirmed, Cancelled),
            (Preparing, Delivering),
            (Preparing, Cancelled),
            (Delivering, Completed),
            (Delivering, Cancelled),
        ];
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Delivering.is_terminal());
    }

    #[test]
    fn test_parse_and_serde() {
        assert_eq!("preparing".parse::<OrderStatus>(), Ok(OrderStatus::Preparing));
        assert!("shipped".parse::<OrderStatus>().is_err());
        let req: UpdateStatusRequest = serde_json::from_str(r#"{"status":"confirmed"}"#).unwrap();
        assert_eq!(req.status, OrderStatus::Confirmed);
    }
}
