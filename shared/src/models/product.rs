//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Size option of a product (price delta on top of the base price)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeVariant {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub is_default: bool,
}

/// Topping option of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToppingVariant {
    pub id: String,
    pub name: String,
    pub price: Decimal,
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    pub base_price: Decimal,
    /// Ordered list of sizes
    #[serde(default)]
    pub sizes: Vec<SizeVariant>,
    #[serde(default)]
    pub toppings: Vec<ToppingVariant>,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub is_deleted: bool,
    /// Owning seller (User id)
    pub seller_id: String,
    pub category_id: String,
    /// Units sold counter
    #[serde(default)]
    pub sold: u64,
    #[serde(default)]
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Not deleted and in stock
    pub fn is_available(&self) -> bool {
        !self.is_deleted && self.in_stock
    }

    pub fn find_size(&self, size_id: &str) -> Option<&SizeVariant> {
        self.sizes.iter().find(|s| s.id == size_id)
    }

    pub fn find_topping(&self, topping_id: &str) -> Option<&ToppingVariant> {
        self.toppings.iter().find(|t| t.id == topping_id)
    }

    /// Case-insensitive substring match against name and description
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn product() -> Product {
        Product {
            id: "p1".into(),
            name: "Trà Sữa Trân Châu".into(),
            description: "Milk tea with Pearls".into(),
            image: None,
            base_price: dec(20000),
            sizes: vec![SizeVariant {
                id: "L".into(),
                name: "Large".into(),
                price: dec(5000),
                is_default: false,
            }],
            toppings: vec![ToppingVariant {
                id: "t1".into(),
                name: "Pudding".into(),
                price: dec(2000),
            }],
            in_stock: true,
            is_deleted: false,
            seller_id: "s1".into(),
            category_id: "drinks".into(),
            sold: 0,
            created_at: 0,
        }
    }

    #[test]
    fn test_availability() {
        let mut p = product();
        assert!(p.is_available());
        p.in_stock = false;
        assert!(!p.is_available());
        p.in_stock = true;
        p.is_deleted = true;
        assert!(!p.is_available());
    }

    #[test]
    fn test_variant_lookup() {
        let p = product();
        assert_eq!(p.find_size("L").map(|s| s.price), Some(dec(5000)));
        assert!(p.find_size("XL").is_none());
        assert!(p.find_topping("t1").is_some());
        assert!(p.find_topping("t9").is_none());
    }

    #[test]
    fn test_keyword_case_insensitive() {
        let p = product();
        assert!(p.matches_keyword("PEARL"));
        assert!(p.matches_keyword("trà"));
        assert!(!p.matches_keyword("coffee"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"id":"p2","name":"Bánh","basePrice":15000,"sellerId":"s1","categoryId":"c"}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert!(p.in_stock);
        assert!(!p.is_deleted);
        assert!(p.sizes.is_empty());
        assert_eq!(p.base_price, dec(15000));
    }
}
