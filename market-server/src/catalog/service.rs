//! Catalog Service - in-memory products and users
//!
//! Loaded from a JSON seed at startup. Mutations are limited to the flags
//! the marketplace flips at runtime (stock, open, soft delete, position,
//! sold counter).

use parking_lot::RwLock;
use serde::Deserialize;
use shared::models::{Location, PricedLine, Product, User};
use shared::{AppError, ErrorCode};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::CatalogAccessor;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Seller not found: {0}")]
    SellerNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Product {product_id} does not belong to seller {seller_id}")]
    NotOwner {
        product_id: String,
        seller_id: String,
    },

    #[error("Failed to read catalog seed: {0}")]
    SeedIo(#[from] std::io::Error),

    #[error("Invalid catalog seed: {0}")]
    SeedParse(#[from] serde_json::Error),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ProductNotFound(id) => {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", id)
            }
            CatalogError::SellerNotFound(id) => {
                AppError::new(ErrorCode::SellerNotFound).with_detail("seller_id", id)
            }
            CatalogError::UserNotFound(id) => AppError::not_found(format!("User {}", id)),
            CatalogError::NotOwner { .. } => {
                AppError::with_message(ErrorCode::ProductNotOwned, err.to_string())
            }
            CatalogError::SeedIo(_) | CatalogError::SeedParse(_) => {
                AppError::with_message(ErrorCode::ConfigError, err.to_string())
            }
        }
    }
}

/// Startup data (`CATALOG_SEED`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogSeed {
    pub users: Vec<User>,
    pub products: Vec<Product>,
    pub locations: Vec<Location>,
}

impl CatalogSeed {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Products with a per-seller secondary index
#[derive(Debug, Default)]
struct ProductTable {
    /// product_id -> Product
    by_id: HashMap<String, Product>,
    /// seller_id -> product ids, insertion order
    by_seller: HashMap<String, Vec<String>>,
}

impl ProductTable {
    fn insert(&mut self, product: Product) {
        let moved_from = self
            .by_id
            .get(&product.id)
            .filter(|previous| previous.seller_id != product.seller_id)
            .map(|previous| previous.seller_id.clone());
        if let Some(ids) = moved_from.and_then(|s| self.by_seller.get_mut(&s)) {
            ids.retain(|id| id != &product.id);
        }
        let ids = self.by_seller.entry(product.seller_id.clone()).or_default();
        if !ids.contains(&product.id) {
            ids.push(product.id.clone());
        }
        self.by_id.insert(product.id.clone(), product);
    }

    fn of_seller<'a>(&'a self, seller_id: &str) -> impl Iterator<Item = &'a Product> + 'a {
        self.by_seller
            .get(seller_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
    }
}

#[derive(Clone, Default)]
pub struct CatalogService {
    products: Arc<RwLock<ProductTable>>,
    /// user_id -> User (customers, sellers, admins)
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("products_count", &self.products.read().by_id.len())
            .field("users_count", &self.users.read().len())
            .finish()
    }
}

impl CatalogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load users and products (locations are handled by the location service)
    pub fn warmup(&self, seed: &CatalogSeed) {
        {
            let mut users = self.users.write();
            for user in &seed.users {
                users.insert(user.id.clone(), user.clone());
            }
        }
        {
            let mut products = self.products.write();
            for product in &seed.products {
                products.insert(product.clone());
            }
        }
        tracing::info!(
            users = seed.users.len(),
            products = seed.products.len(),
            "Catalog warmed up"
        );
    }

    pub fn upsert_user(&self, user: User) {
        self.users.write().insert(user.id.clone(), user);
    }

    pub fn upsert_product(&self, product: Product) {
        self.products.write().insert(product);
    }

    fn owned_product_mut<'a>(
        products: &'a mut HashMap<String, Product>,
        seller_id: &str,
        product_id: &str,
    ) -> Result<&'a mut Product, CatalogError> {
        let product = products
            .get_mut(product_id)
            .filter(|p| !p.is_deleted)
            .ok_or_else(|| CatalogError::ProductNotFound(product_id.to_string()))?;
        if product.seller_id != seller_id {
            return Err(CatalogError::NotOwner {
                product_id: product_id.to_string(),
                seller_id: seller_id.to_string(),
            });
        }
        Ok(product)
    }

    /// 上架/下架 (seller's own products only)
    pub fn set_product_stock(
        &self,
        seller_id: &str,
        product_id: &str,
        in_stock: bool,
    ) -> Result<Product, CatalogError> {
        let mut products = self.products.write();
        let product = Self::owned_product_mut(&mut products.by_id, seller_id, product_id)?;
        product.in_stock = in_stock;
        Ok(product.clone())
    }

    pub fn soft_delete_product(&self, seller_id: &str, product_id: &str) -> Result<(), CatalogError> {
        let mut products = self.products.write();
        let product = Self::owned_product_mut(&mut products.by_id, seller_id, product_id)?;
        product.is_deleted = true;
        Ok(())
    }

    pub fn set_seller_open(&self, seller_id: &str, open: bool) -> Result<User, CatalogError> {
        let mut users = self.users.write();
        let seller = users
            .get_mut(seller_id)
            .filter(|u| u.is_seller() && !u.is_deleted)
            .ok_or_else(|| CatalogError::SellerNotFound(seller_id.to_string()))?;
        seller.is_open = open;
        Ok(seller.clone())
    }

    /// Re-point a user at a new location, returning the superseded one
    pub fn set_user_location(
        &self,
        user_id: &str,
        location_id: &str,
    ) -> Result<Option<String>, CatalogError> {
        let mut users = self.users.write();
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| CatalogError::UserNotFound(user_id.to_string()))?;
        Ok(user.location_id.replace(location_id.to_string()))
    }

    /// Bump `sold` for each line of a completed order
    pub fn record_sales(&self, lines: &[PricedLine]) {
        let mut products = self.products.write();
        for line in lines {
            if let Some(product) = products.by_id.get_mut(&line.product_id) {
                product.sold += u64::from(line.quantity);
            }
        }
    }

    /// Distinct category ids of a seller's live products
    pub fn seller_categories(&self, seller_id: &str) -> Vec<String> {
        let products = self.products.read();
        let mut categories: Vec<String> = products
            .of_seller(seller_id)
            .filter(|p| !p.is_deleted)
            .map(|p| p.category_id.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }
}

impl CatalogAccessor for CatalogService {
    fn get_product(&self, product_id: &str) -> Option<Product> {
        self.products.read().by_id.get(product_id).cloned()
    }

    fn get_user(&self, user_id: &str) -> Option<User> {
        self.users.read().get(user_id).cloned()
    }

    /// Reads only the seller's own entries, never the whole catalog
    fn products_of_seller(&self, seller_id: &str) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .of_seller(seller_id)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        products
    }

    fn sellers(&self) -> Vec<User> {
        let mut sellers: Vec<User> = self
            .users
            .read()
            .values()
            .filter(|u| u.is_seller())
            .cloned()
            .collect();
        sellers.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        sellers
    }
}
