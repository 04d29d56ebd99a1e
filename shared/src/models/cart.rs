//! Cart Model
//!
//! Client submissions (`*Input`) carry only identities and quantities.
//! Priced types carry values re-derived from the catalog.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Upper bound for one line's quantity (kept in sync with the validators below)
pub const MAX_LINE_QUANTITY: u32 = 999;

/// One line as submitted by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub product_id: String,
    #[serde(default)]
    pub size_id: Option<String>,
    #[serde(default)]
    pub topping_ids: Vec<String>,
    #[validate(range(min = 1, max = 999))]
    pub quantity: u32,
}

/// Per-seller group of submitted lines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartGroupInput {
    pub seller_id: String,
    #[serde(default)]
    pub items: Vec<CartLineInput>,
}

/// Body of the cart validation call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCartRequest {
    #[serde(default)]
    pub groups: Vec<CartGroupInput>,
}

/// Body of the stored-cart quantity update
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    #[validate(range(min = 1, max = 999))]
    pub quantity: u32,
}

/// A chosen size or topping, captured at pricing time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChosenVariant {
    pub id: String,
    pub name: String,
    pub price: Decimal,
}

/// Priced cart/order line
///
/// Name, image and prices are denormalized copies, not live links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub line_id: String,
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub base_price: Decimal,
    #[serde(default)]
    pub size: Option<ChosenVariant>,
    #[serde(default)]
    pub toppings: Vec<ChosenVariant>,
    pub quantity: u32,
    /// base + size delta + Σ topping deltas
    pub unit_price: Decimal,
    /// unit_price × quantity
    pub line_total: Decimal,
}

impl PricedLine {
    /// Merge identity: product, size and the topping set (order-insensitive)
    pub fn same_selection(&self, other: &PricedLine) -> bool {
        self.product_id == other.product_id
            && self.size.as_ref().map(|s| s.id.as_str()) == other.size.as_ref().map(|s| s.id.as_str())
            && self.topping_key() == other.topping_key()
    }

    fn topping_key(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.toppings.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn recompute(&mut self) {
        self.line_total = self.unit_price * Decimal::from(self.quantity);
    }
}

/// Lines of one seller with the rolled-up total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerGroup {
    pub seller_id: String,
    #[serde(default)]
    pub seller_name: String,
    pub items: Vec<PricedLine>,
    pub total: Decimal,
}

impl SellerGroup {
    pub fn new(seller_id: impl Into<String>, seller_name: impl Into<String>) -> Self {
        Self {
            seller_id: seller_id.into(),
            seller_name: seller_name.into(),
            items: Vec::new(),
            total: Decimal::ZERO,
        }
    }
}

/// Full totals pass: line totals, group totals, drop empty groups.
/// Returns the grand total.
pub fn recompute_groups(groups: &mut Vec<SellerGroup>) -> Decimal {
    groups.retain(|g| !g.items.is_empty());
    let mut grand_total = Decimal::ZERO;
    for group in groups.iter_mut() {
        for line in group.items.iter_mut() {
            line.recompute();
        }
        group.total = group.items.iter().map(|l| l.line_total).sum();
        grand_total += group.total;
    }
    grand_total
}

/// Result of validating a client cart (read-only, not persisted)
///
/// `grand_total` excludes shipping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedCart {
    pub groups: Vec<SellerGroup>,
    pub grand_total: Decimal,
}

impl ValidatedCart {
    pub fn from_groups(mut groups: Vec<SellerGroup>) -> Self {
        let grand_total = recompute_groups(&mut groups);
        Self {
            groups,
            grand_total,
        }
    }
}

/// Persisted per-customer cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub customer_id: String,
    pub groups: Vec<SellerGroup>,
    pub grand_total: Decimal,
    #[serde(default)]
    pub updated_at: i64,
}

impl Cart {
    pub fn empty(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            groups: Vec::new(),
            grand_total: Decimal::ZERO,
            updated_at: 0,
        }
    }

    pub fn group_mut(&mut self, seller_id: &str) -> Option<&mut SellerGroup> {
        self.groups.iter_mut().find(|g| g.seller_id == seller_id)
    }

    pub fn recompute_totals(&mut self) {
        self.grand_total = recompute_groups(&mut self.groups);
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }
}
