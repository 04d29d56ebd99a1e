//! Reviews and likes
//!
//! 评价仅限已完成订单的购买者; 每购买一次可评价一次。

use parking_lot::RwLock;
use shared::models::{Like, Review, ReviewCreate};
use shared::util::new_id;
use shared::{AppError, ErrorCode};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::CatalogAccessor;
use super::service::CatalogService;
use crate::storage::{MarketStorage, StorageError};

/// Neutral score for sellers/products nobody has reviewed yet
pub const DEFAULT_RATING: f64 = 5.0;

#[derive(Debug, Error)]
pub enum EngagementError {
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("No completed purchase left to review for product {0}")]
    ReviewNotAllowed(String),

    #[error("Review not found: {0}")]
    ReviewNotFound(String),

    #[error("Seller not found: {0}")]
    SellerNotFound(String),

    #[error("Cannot like yourself")]
    CannotLikeSelf,

    #[error("Seller {0} already liked")]
    AlreadyLiked(String),

    #[error("Seller {0} is not liked")]
    LikeNotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<EngagementError> for AppError {
    fn from(err: EngagementError) -> Self {
        let code = match &err {
            EngagementError::InvalidRating(_) => ErrorCode::InvalidRating,
            EngagementError::ProductNotFound(_) => ErrorCode::ProductNotFound,
            EngagementError::ReviewNotAllowed(_) => ErrorCode::ReviewNotAllowed,
            EngagementError::ReviewNotFound(_) => ErrorCode::NotFound,
            EngagementError::SellerNotFound(_) => ErrorCode::SellerNotFound,
            EngagementError::CannotLikeSelf => ErrorCode::CannotLikeSelf,
            EngagementError::AlreadyLiked(_) => ErrorCode::AlreadyLiked,
            EngagementError::LikeNotFound(_) => ErrorCode::LikeNotFound,
            EngagementError::Storage(_) => return AppError::database(err.to_string()),
        };
        AppError::with_message(code, err.to_string())
    }
}

#[derive(Clone)]
pub struct EngagementService {
    storage: MarketStorage,
    catalog: CatalogService,
    /// product_id -> reviews
    reviews: Arc<RwLock<HashMap<String, Vec<Review>>>>,
    /// Like records in creation order
    likes: Arc<RwLock<Vec<Like>>>,
}

impl std::fmt::Debug for EngagementService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reviews: usize = self.reviews.read().values().map(Vec::len).sum();
        f.debug_struct("EngagementService")
            .field("reviews_count", &reviews)
            .field("likes_count", &self.likes.read().len())
            .finish()
    }
}

impl EngagementService {
    pub fn new(storage: MarketStorage, catalog: CatalogService) -> Self {
        Self {
            storage,
            catalog,
            reviews: Arc::new(RwLock::new(HashMap::new())),
            likes: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Review a purchased product
    ///
    /// Allowed while completed purchases of the product exceed the reviews
    /// the user already wrote for it.
    pub fn add_review(
        &self,
        user_id: &str,
        input: ReviewCreate,
        now: i64,
    ) -> Result<Review, EngagementError> {
        if !(1..=5).contains(&input.rating) {
            return Err(EngagementError::InvalidRating(input.rating));
        }
        let product = self
            .catalog
            .get_product(&input.product_id)
            .filter(|p| !p.is_deleted)
            .ok_or_else(|| EngagementError::ProductNotFound(input.product_id.clone()))?;

        // write lock held across check and insert
        let mut reviews = self.reviews.write();
        let purchased = self.storage.count_purchased(user_id, &product.id)?;
        let reviewed = reviews
            .get(&product.id)
            .map(|list| {
                list.iter()
                    .filter(|r| r.user_id == user_id && !r.is_deleted)
                    .count() as u64
            })
            .unwrap_or(0);
        if purchased <= reviewed {
            return Err(EngagementError::ReviewNotAllowed(product.id));
        }

        let review = Review {
            id: new_id(),
            product_id: product.id.clone(),
            seller_id: product.seller_id.clone(),
            user_id: user_id.to_string(),
            rating: input.rating,
            comment: input.comment,
            is_deleted: false,
            created_at: now,
        };
        reviews.entry(product.id).or_default().push(review.clone());
        tracing::debug!(review_id = %review.id, product_id = %review.product_id, "Review added");
        Ok(review)
    }

    /// Soft delete (author only)
    pub fn delete_review(&self, user_id: &str, review_id: &str) -> Result<(), EngagementError> {
        let mut reviews = self.reviews.write();
        let review = reviews
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|r| r.id == review_id && r.user_id == user_id && !r.is_deleted)
            .ok_or_else(|| EngagementError::ReviewNotFound(review_id.to_string()))?;
        review.is_deleted = true;
        Ok(())
    }

    pub fn reviews_of_product(&self, product_id: &str) -> Vec<Review> {
        self.reviews
            .read()
            .get(product_id)
            .map(|list| list.iter().filter(|r| !r.is_deleted).cloned().collect())
            .unwrap_or_default()
    }

    /// Mean rating over the given products' live reviews, 5 when there are none
    pub fn average_rating<'a>(&self, product_ids: impl IntoIterator<Item = &'a str>) -> f64 {
        let reviews = self.reviews.read();
        let (sum, count) = product_ids
            .into_iter()
            .filter_map(|id| reviews.get(id))
            .flat_map(|list| list.iter())
            .filter(|r| !r.is_deleted)
            .fold((0u64, 0u64), |(sum, count), r| {
                (sum + u64::from(r.rating), count + 1)
            });

        if count == 0 {
            DEFAULT_RATING
        } else {
            sum as f64 / count as f64
        }
    }

    pub fn like_seller(
        &self,
        user_id: &str,
        seller_id: &str,
        now: i64,
    ) -> Result<Like, EngagementError> {
        if user_id == seller_id {
            return Err(EngagementError::CannotLikeSelf);
        }
        self.catalog
            .get_seller(seller_id)
            .filter(|s| !s.is_deleted)
            .ok_or_else(|| EngagementError::SellerNotFound(seller_id.to_string()))?;

        let mut likes = self.likes.write();
        if likes
            .iter()
            .any(|l| l.user_id == user_id && l.seller_id == seller_id)
        {
            return Err(EngagementError::AlreadyLiked(seller_id.to_string()));
        }
        let like = Like {
            id: new_id(),
            user_id: user_id.to_string(),
            seller_id: seller_id.to_string(),
            created_at: now,
        };
        likes.push(like.clone());
        Ok(like)
    }

    pub fn unlike_seller(&self, user_id: &str, seller_id: &str) -> Result<(), EngagementError> {
        let mut likes = self.likes.write();
        let before = likes.len();
        likes.retain(|l| !(l.user_id == user_id && l.seller_id == seller_id));
        if likes.len() == before {
            return Err(EngagementError::LikeNotFound(seller_id.to_string()));
        }
        Ok(())
    }

    /// Seller ids the user liked, oldest like first
    pub fn liked_sellers(&self, user_id: &str) -> Vec<String> {
        self.likes
            .read()
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| l.seller_id.clone())
            .collect()
    }
}
