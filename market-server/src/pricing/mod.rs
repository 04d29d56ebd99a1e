//! 价格计算 (Cart Pricing & Validation)
//!
//! Prices are always re-derived from the catalog; client-submitted prices
//! are never read.
//!
//! - [`calculator`]: one line, one product
//! - [`validator`]: whole carts (lenient, drops lines) and order lines
//!   (strict, rejects)

mod calculator;
mod validator;

pub use calculator::{VariantPolicy, price_line, unit_price};
pub use validator::CartPricer;

use shared::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Product is no longer available: {0}")]
    ProductUnavailable(String),

    #[error("Product is out of stock: {0}")]
    OutOfStock(String),

    #[error("Size {size_id} no longer exists on product {product_id}")]
    StaleSize { product_id: String, size_id: String },

    #[error("Topping {topping_id} no longer exists on product {product_id}")]
    StaleTopping {
        product_id: String,
        topping_id: String,
    },

    #[error("Product {product_id} belongs to seller {actual}, not {expected}")]
    CrossSeller {
        product_id: String,
        expected: String,
        actual: String,
    },

    #[error("Seller not found: {0}")]
    SellerNotFound(String),

    #[error("Seller is not accepting orders: {0}")]
    SellerUnavailable(String),

    #[error("Quantity out of range for product {0}")]
    InvalidQuantity(String),

    #[error("No items to price")]
    Empty,
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        let (code, key, value) = match &err {
            PricingError::ProductNotFound(id) => (ErrorCode::ProductNotFound, "product_id", id.clone()),
            PricingError::ProductUnavailable(id) => {
                (ErrorCode::ProductUnavailable, "product_id", id.clone())
            }
            PricingError::OutOfStock(id) => (ErrorCode::ProductOutOfStock, "product_id", id.clone()),
            PricingError::StaleSize { size_id, .. } => (ErrorCode::StaleVariant, "size_id", size_id.clone()),
            PricingError::StaleTopping { topping_id, .. } => {
                (ErrorCode::StaleVariant, "topping_id", topping_id.clone())
            }
            PricingError::CrossSeller { product_id, .. } => {
                (ErrorCode::CrossSellerOrder, "product_id", product_id.clone())
            }
            PricingError::SellerNotFound(id) => (ErrorCode::SellerNotFound, "seller_id", id.clone()),
            PricingError::SellerUnavailable(id) => {
                (ErrorCode::SellerUnavailable, "seller_id", id.clone())
            }
            PricingError::InvalidQuantity(id) => (ErrorCode::InvalidQuantity, "product_id", id.clone()),
            PricingError::Empty => return AppError::new(ErrorCode::OrderEmpty),
        };
        AppError::with_message(code, err.to_string()).with_detail(key, value)
    }
}
