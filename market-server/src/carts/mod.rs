//! 购物车 (stored-cart mutator)
//!
//! The only writer of persisted carts. Each mutation runs inside one redb
//! write transaction via [`MarketStorage::mutate_cart`], which recomputes
//! every group total and the grand total before writing.

use shared::models::{Cart, CartLineInput, MAX_LINE_QUANTITY, SellerGroup};
use shared::{AppError, ErrorCode};
use thiserror::Error;

use crate::pricing::{CartPricer, PricingError};
use crate::storage::{MarketStorage, StorageError};

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Cart has no group for seller {0}")]
    SellerGroupNotFound(String),

    #[error("Cart line {line_id} not found in seller group {seller_id}")]
    LineNotFound { seller_id: String, line_id: String },

    #[error("Quantity must be between 1 and {max}", max = MAX_LINE_QUANTITY)]
    InvalidQuantity,

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::SellerGroupNotFound(seller_id) => {
                AppError::new(ErrorCode::CartSellerNotFound).with_detail("seller_id", seller_id)
            }
            CartError::LineNotFound { seller_id, line_id } => {
                AppError::new(ErrorCode::CartItemNotFound)
                    .with_detail("seller_id", seller_id)
                    .with_detail("line_id", line_id)
            }
            CartError::InvalidQuantity => AppError::new(ErrorCode::InvalidQuantity),
            CartError::Pricing(e) => e.into(),
            CartError::Storage(e) => e.into(),
        }
    }
}

pub type CartResult<T> = Result<T, CartError>;

#[derive(Debug, Clone)]
pub struct CartService {
    storage: MarketStorage,
    pricer: CartPricer,
}

impl CartService {
    pub fn new(storage: MarketStorage, pricer: CartPricer) -> Self {
        Self { storage, pricer }
    }

    pub fn get_cart(&self, customer_id: &str) -> CartResult<Cart> {
        Ok(self
            .storage
            .get_cart(customer_id)?
            .unwrap_or_else(|| Cart::empty(customer_id)))
    }

    /// Add a line, merging with an identical selection
    ///
    /// The line is priced now; its unit price is captured in the cart.
    pub fn add_item(
        &self,
        customer_id: &str,
        seller_id: &str,
        input: &CartLineInput,
        now: i64,
    ) -> CartResult<Cart> {
        let seller = self.pricer.resolve_seller(seller_id)?;
        let line = self.pricer.price_cart_line(&seller.id, input)?;

        let (cart, ()) = self.storage.mutate_cart(customer_id, now, |cart| {
            if cart.group_mut(&seller.id).is_none() {
                cart.groups
                    .push(SellerGroup::new(seller.id.clone(), seller.name.clone()));
            }
            let group = cart
                .group_mut(&seller.id)
                .ok_or_else(|| CartError::SellerGroupNotFound(seller.id.clone()))?;

            match group.items.iter_mut().find(|l| l.same_selection(&line)) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(line.quantity)
                        .filter(|q| *q <= MAX_LINE_QUANTITY)
                        .ok_or(CartError::InvalidQuantity)?;
                }
                None => group.items.push(line),
            }
            Ok::<_, CartError>(())
        })?;

        tracing::debug!(customer_id, seller_id, "Cart item added");
        Ok(cart)
    }

    pub fn update_quantity(
        &self,
        customer_id: &str,
        seller_id: &str,
        line_id: &str,
        quantity: u32,
        now: i64,
    ) -> CartResult<Cart> {
        if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
            return Err(CartError::InvalidQuantity);
        }
        let (cart, ()) = self.storage.mutate_cart(customer_id, now, |cart| {
            let line = cart
                .group_mut(seller_id)
                .ok_or_else(|| CartError::SellerGroupNotFound(seller_id.to_string()))?
                .items
                .iter_mut()
                .find(|l| l.line_id == line_id)
                .ok_or_else(|| CartError::LineNotFound {
                    seller_id: seller_id.to_string(),
                    line_id: line_id.to_string(),
                })?;
            line.quantity = quantity;
            Ok::<_, CartError>(())
        })?;
        Ok(cart)
    }

    /// Remove a line; a group left empty disappears with the recompute
    pub fn remove_item(
        &self,
        customer_id: &str,
        seller_id: &str,
        line_id: &str,
        now: i64,
    ) -> CartResult<Cart> {
        let (cart, ()) = self.storage.mutate_cart(customer_id, now, |cart| {
            let group = cart
                .group_mut(seller_id)
                .ok_or_else(|| CartError::SellerGroupNotFound(seller_id.to_string()))?;
            let before = group.items.len();
            group.items.retain(|l| l.line_id != line_id);
            if group.items.len() == before {
                return Err(CartError::LineNotFound {
                    seller_id: seller_id.to_string(),
                    line_id: line_id.to_string(),
                });
            }
            Ok(())
        })?;
        Ok(cart)
    }

    pub fn clear_seller(&self, customer_id: &str, seller_id: &str, now: i64) -> CartResult<Cart> {
        let (cart, ()) = self.storage.mutate_cart(customer_id, now, |cart| {
            let before = cart.groups.len();
            cart.groups.retain(|g| g.seller_id != seller_id);
            if cart.groups.len() == before {
                return Err(CartError::SellerGroupNotFound(seller_id.to_string()));
            }
            Ok(())
        })?;
        Ok(cart)
    }
}
