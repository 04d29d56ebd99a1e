//! Cart-level pricing
//!
//! [`CartPricer::validate`] is read-only and forgiving: bad groups and
//! lines are dropped. [`CartPricer::order_products`] and
//! [`CartPricer::price_order_lines`] are strict: any problem rejects the
//! whole order.

use shared::models::{
    CartLineInput, PricedLine, Product, SellerGroup, User, ValidateCartRequest, ValidatedCart,
};
use shared::util::new_id;
use std::sync::Arc;

use super::PricingError;
use super::calculator::{VariantPolicy, price_line};
use crate::catalog::CatalogAccessor;

#[derive(Clone)]
pub struct CartPricer {
    catalog: Arc<dyn CatalogAccessor>,
}

impl std::fmt::Debug for CartPricer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartPricer").finish_non_exhaustive()
    }
}

impl CartPricer {
    pub fn new(catalog: Arc<dyn CatalogAccessor>) -> Self {
        Self { catalog }
    }

    /// Eligible seller or why not
    pub fn resolve_seller(&self, seller_id: &str) -> Result<User, PricingError> {
        let seller = self
            .catalog
            .get_seller(seller_id)
            .filter(|s| !s.is_deleted)
            .ok_or_else(|| PricingError::SellerNotFound(seller_id.to_string()))?;
        if !seller.is_eligible_seller() {
            return Err(PricingError::SellerUnavailable(seller_id.to_string()));
        }
        Ok(seller)
    }

    /// Product of `seller_id`, or why not
    fn resolve_owned_product(&self, seller_id: &str, product_id: &str) -> Result<Product, PricingError> {
        let product = self
            .catalog
            .get_product(product_id)
            .ok_or_else(|| PricingError::ProductNotFound(product_id.to_string()))?;
        if product.seller_id != seller_id {
            return Err(PricingError::CrossSeller {
                product_id: product_id.to_string(),
                expected: seller_id.to_string(),
                actual: product.seller_id,
            });
        }
        Ok(product)
    }

    /// Price one stored-cart line (lenient toppings, strict everything else)
    pub fn price_cart_line(
        &self,
        seller_id: &str,
        input: &CartLineInput,
    ) -> Result<PricedLine, PricingError> {
        let product = self.resolve_owned_product(seller_id, &input.product_id)?;
        price_line(&product, input, new_id(), VariantPolicy::Lenient)
    }

    /// Re-derive a client cart from current catalog state
    ///
    /// Groups whose seller is missing, closed, inactive or deleted are
    /// dropped whole. Lines are dropped when the product is missing,
    /// belongs to another seller, is deleted or out of stock, or names a
    /// size that no longer exists. Stale toppings are omitted. Repeated
    /// seller ids are merged into one group.
    pub fn validate(&self, request: &ValidateCartRequest) -> ValidatedCart {
        let mut groups: Vec<SellerGroup> = Vec::new();

        for group in &request.groups {
            let seller = match self.resolve_seller(&group.seller_id) {
                Ok(seller) => seller,
                Err(reason) => {
                    tracing::debug!(seller_id = %group.seller_id, %reason, "Dropping seller group");
                    continue;
                }
            };

            let lines: Vec<PricedLine> = group
                .items
                .iter()
                .filter_map(|input| match self.price_cart_line(&seller.id, input) {
                    Ok(line) => Some(line),
                    Err(reason) => {
                        tracing::debug!(product_id = %input.product_id, %reason, "Dropping cart line");
                        None
                    }
                })
                .collect();

            match groups.iter_mut().find(|g| g.seller_id == seller.id) {
                Some(existing) => existing.items.extend(lines),
                None => {
                    let mut priced = SellerGroup::new(seller.id.clone(), seller.name.clone());
                    priced.items = lines;
                    groups.push(priced);
                }
            }
        }

        ValidatedCart::from_groups(groups)
    }

    /// Products of an order, in line order
    ///
    /// Runs before the declared seller is looked at: lines spanning two
    /// sellers fail with `CrossSeller` whatever seller id the order names.
    pub fn order_products(&self, items: &[CartLineInput]) -> Result<Vec<Product>, PricingError> {
        if items.is_empty() {
            return Err(PricingError::Empty);
        }

        let products: Vec<Product> = items
            .iter()
            .map(|input| {
                self.catalog
                    .get_product(&input.product_id)
                    .ok_or_else(|| PricingError::ProductNotFound(input.product_id.clone()))
            })
            .collect::<Result<_, _>>()?;

        let mixed = products.split_first().and_then(|(first, rest)| {
            rest.iter()
                .find(|p| p.seller_id != first.seller_id)
                .map(|other| PricingError::CrossSeller {
                    product_id: other.id.clone(),
                    expected: first.seller_id.clone(),
                    actual: other.seller_id.clone(),
                })
        });
        match mixed {
            Some(err) => Err(err),
            None => Ok(products),
        }
    }

    /// Price order lines against products from [`Self::order_products`]
    ///
    /// Products not owned by `seller_id` fail with `CrossSeller`.
    pub fn price_order_lines(
        &self,
        seller_id: &str,
        products: &[Product],
        items: &[CartLineInput],
    ) -> Result<Vec<PricedLine>, PricingError> {
        if let Some(foreign) = products.iter().find(|p| p.seller_id != seller_id) {
            return Err(PricingError::CrossSeller {
                product_id: foreign.id.clone(),
                expected: seller_id.to_string(),
                actual: foreign.seller_id.clone(),
            });
        }

        products
            .iter()
            .zip(items)
            .map(|(product, input)| price_line(product, input, new_id(), VariantPolicy::Strict))
            .collect()
    }
}
