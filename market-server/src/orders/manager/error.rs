use shared::models::OrderStatus;
use shared::{AppError, ErrorCode};
use thiserror::Error;

use crate::locations::LocationError;
use crate::pricing::PricingError;
use crate::storage::StorageError;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Invalid order request: {0}")]
    Validation(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("A delivery location or an existing delivery address is required")]
    DeliveryLocationRequired,

    #[error("Seller has no location: {0}")]
    SellerLocationMissing(String),

    #[error("Delivery distance {distance_km:.2} km exceeds {max_km} km")]
    OutOfServiceArea { distance_km: f64, max_km: f64 },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Validation(msg) => AppError::validation(msg),
            ManagerError::Pricing(e) => e.into(),
            ManagerError::DeliveryLocationRequired => {
                AppError::new(ErrorCode::DeliveryLocationRequired)
            }
            ManagerError::SellerLocationMissing(seller_id) => {
                AppError::new(ErrorCode::SellerLocationMissing).with_detail("seller_id", seller_id)
            }
            ManagerError::OutOfServiceArea {
                distance_km,
                max_km,
            } => AppError::with_message(
                ErrorCode::OutOfServiceArea,
                format!("Delivery distance {:.2} km exceeds {} km", distance_km, max_km),
            )
            .with_detail("distance_km", distance_km)
            .with_detail("max_km", max_km),
            // same shape for missing and not-owned orders
            ManagerError::OrderNotFound(order_id) => {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
            }
            ManagerError::InvalidTransition { from, to } => AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                format!("Cannot change order status from {} to {}", from, to),
            )
            .with_detail("from", from.as_str())
            .with_detail("to", to.as_str()),
            ManagerError::Location(e) => e.into(),
            ManagerError::Storage(e) => e.into(),
            ManagerError::Internal(msg) => AppError::internal(msg),
        }
    }
}
