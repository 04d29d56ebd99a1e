//! 商品目录 (Catalog Snapshot)
//!
//! 产品与卖家的只读快照, 供定价、发现与下单使用。
//! Reviews and likes live in [`engagement`].

pub mod engagement;
pub mod service;

pub use engagement::{EngagementError, EngagementService};
pub use service::{CatalogError, CatalogSeed, CatalogService};

use shared::models::{Product, User};

/// Read-only access to current product and seller records
pub trait CatalogAccessor: Send + Sync {
    fn get_product(&self, product_id: &str) -> Option<Product>;

    fn get_user(&self, user_id: &str) -> Option<User>;

    /// Seller-role user, eligible or not
    fn get_seller(&self, seller_id: &str) -> Option<User> {
        self.get_user(seller_id).filter(User::is_seller)
    }

    /// All products of a seller, deleted ones included, oldest first
    fn products_of_seller(&self, seller_id: &str) -> Vec<Product>;

    /// All seller-role users, oldest first
    fn sellers(&self) -> Vec<User>;
}
