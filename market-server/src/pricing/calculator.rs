//! Line price calculator
//!
//! unit = base + size delta + Σ topping deltas; line total = unit × quantity.

use rust_decimal::Decimal;
use shared::models::{CartLineInput, ChosenVariant, MAX_LINE_QUANTITY, PricedLine, Product};

use super::PricingError;

/// What to do with a topping id the product no longer offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantPolicy {
    /// Omit the topping, keep the line (cart validation, stored cart)
    Lenient,
    /// Reject the line (order creation)
    Strict,
}

pub fn unit_price(base: Decimal, size: Option<&ChosenVariant>, toppings: &[ChosenVariant]) -> Decimal {
    base + size.map(|s| s.price).unwrap_or(Decimal::ZERO) + toppings.iter().map(|t| t.price).sum::<Decimal>()
}

/// Price one line against the current product record
///
/// An unknown size id always fails the line; there is no fallback to the
/// base price. Repeated topping ids count once.
pub fn price_line(
    product: &Product,
    input: &CartLineInput,
    line_id: String,
    policy: VariantPolicy,
) -> Result<PricedLine, PricingError> {
    if !(1..=MAX_LINE_QUANTITY).contains(&input.quantity) {
        return Err(PricingError::InvalidQuantity(product.id.clone()));
    }
    if product.is_deleted {
        return Err(PricingError::ProductUnavailable(product.id.clone()));
    }
    if !product.in_stock {
        return Err(PricingError::OutOfStock(product.id.clone()));
    }

    let size = match input.size_id.as_deref() {
        Some(size_id) => {
            let variant = product
                .find_size(size_id)
                .ok_or_else(|| PricingError::StaleSize {
                    product_id: product.id.clone(),
                    size_id: size_id.to_string(),
                })?;
            Some(ChosenVariant {
                id: variant.id.clone(),
                name: variant.name.clone(),
                price: variant.price,
            })
        }
        None => None,
    };

    let mut toppings: Vec<ChosenVariant> = Vec::with_capacity(input.topping_ids.len());
    for topping_id in &input.topping_ids {
        if toppings.iter().any(|t| t.id == *topping_id) {
            continue;
        }
        match product.find_topping(topping_id) {
            Some(variant) => toppings.push(ChosenVariant {
                id: variant.id.clone(),
                name: variant.name.clone(),
                price: variant.price,
            }),
            None if policy == VariantPolicy::Strict => {
                return Err(PricingError::StaleTopping {
                    product_id: product.id.clone(),
                    topping_id: topping_id.clone(),
                });
            }
            None => {
                tracing::debug!(product_id = %product.id, topping_id = %topping_id, "Stale topping omitted");
            }
        }
    }

    let unit = unit_price(product.base_price, size.as_ref(), &toppings);
    Ok(PricedLine {
        line_id,
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        image: product.image.clone(),
        base_price: product.base_price,
        size,
        toppings,
        quantity: input.quantity,
        unit_price: unit,
        line_total: unit * Decimal::from(input.quantity),
    })
}
