//! Composable query pipeline
//!
//! Every discovery variant is the same chain of stages:
//! base (range query + seller join + eligibility) → optional product join
//! → variant filter/project → sort → paginate. Stages are plain closures
//! over an owned row vector; sorts are stable so distance order survives
//! as the tie-breaker.

use shared::models::{GeoPoint, Product, User};
use shared::{Page, Paginated};
use std::cmp::Ordering;

use super::index::SpatialIndex;
use crate::catalog::CatalogAccessor;

#[derive(Debug, Clone)]
pub struct Pipeline<R> {
    rows: Vec<R>,
}

impl<R> Pipeline<R> {
    pub fn from_rows(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn filter(mut self, mut keep: impl FnMut(&R) -> bool) -> Self {
        self.rows.retain(|row| keep(row));
        self
    }

    pub fn project<U>(self, f: impl FnMut(R) -> U) -> Pipeline<U> {
        Pipeline {
            rows: self.rows.into_iter().map(f).collect(),
        }
    }

    /// Join that drops rows without a partner
    pub fn join<U>(self, f: impl FnMut(R) -> Option<U>) -> Pipeline<U> {
        Pipeline {
            rows: self.rows.into_iter().filter_map(f).collect(),
        }
    }

    /// One-to-many projection ($unwind)
    pub fn unwind<U, I>(self, f: impl FnMut(R) -> I) -> Pipeline<U>
    where
        I: IntoIterator<Item = U>,
    {
        Pipeline {
            rows: self.rows.into_iter().flat_map(f).collect(),
        }
    }

    /// Stable sort
    pub fn sort_by(mut self, compare: impl FnMut(&R, &R) -> Ordering) -> Self {
        self.rows.sort_by(compare);
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.rows.truncate(n);
        self
    }

    pub fn paginate(self, page: Page) -> Paginated<R> {
        page.slice(self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }
}

/// Base row: an eligible seller with its distance and joined products
#[derive(Debug, Clone)]
pub struct SellerHit {
    pub seller: User,
    /// km; `None` when the listing is not anchored at a position
    pub distance_km: Option<f64>,
    pub products: Vec<Product>,
}

impl SellerHit {
    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(|p| p.id.as_str())
    }

    pub fn total_sold(&self) -> u64 {
        self.products.iter().map(|p| p.sold).sum()
    }
}

impl Pipeline<SellerHit> {
    /// Eligible sellers within `radius_km` of `origin`, nearest first
    pub fn near(
        index: &SpatialIndex,
        catalog: &impl CatalogAccessor,
        origin: GeoPoint,
        radius_km: f64,
    ) -> Self {
        let hits = index.range_query(origin, radius_km * 1000.0);
        Pipeline::from_rows(hits)
            .join(|hit| {
                catalog.get_seller(&hit.id).map(|seller| SellerHit {
                    seller,
                    distance_km: Some(hit.distance_m / 1000.0),
                    products: Vec::new(),
                })
            })
            .filter(|row| row.seller.is_eligible_seller())
    }

    /// Every eligible seller, catalog order (no position to rank by)
    pub fn all_sellers(catalog: &impl CatalogAccessor) -> Self {
        Pipeline::from_rows(catalog.sellers())
            .filter(User::is_eligible_seller)
            .project(|seller| SellerHit {
                seller,
                distance_km: None,
                products: Vec::new(),
            })
    }

    /// Attach each seller's available products matching `keep`
    ///
    /// With `require_match`, sellers left without products are dropped.
    pub fn join_products(
        self,
        catalog: &impl CatalogAccessor,
        mut keep: impl FnMut(&Product) -> bool,
        require_match: bool,
    ) -> Self {
        self.project(|mut row| {
            row.products = catalog
                .products_of_seller(&row.seller.id)
                .into_iter()
                .filter(|p| p.is_available() && keep(p))
                .collect();
            row
        })
        .filter(|row| !require_match || !row.products.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogService;
    use crate::test_support::{product, seller};

    fn fixture() -> (SpatialIndex, CatalogService) {
        let index = SpatialIndex::new();
        let catalog = CatalogService::new();
        let origin = GeoPoint::new(10.7769, 106.7009);

        // ~1.1 km, ~2.2 km, ~3.3 km north
        for (i, id) in ["near", "mid", "far"].iter().enumerate() {
            catalog.upsert_user(seller(id, id));
            index.upsert(id, GeoPoint::new(origin.lat + 0.01 * (i + 1) as f64, origin.lng));
        }
        let mut closed = seller("closed", "closed");
        closed.is_open = false;
        catalog.upsert_user(closed);
        index.upsert("closed", GeoPoint::new(origin.lat + 0.005, origin.lng));

        catalog.upsert_product(product("p-near", "near", 10000));
        let mut food = product("p-mid", "mid", 20000);
        food.category_id = "food".into();
        catalog.upsert_product(food);
        (index, catalog)
    }

    #[test]
    fn test_near_filters_eligibility_and_orders() {
        let (index, catalog) = fixture();
        let rows = Pipeline::near(&index, &catalog, GeoPoint::new(10.7769, 106.7009), 5.0).into_rows();
        let ids: Vec<&str> = rows.iter().map(|r| r.seller.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
        let d = rows[0].distance_km.unwrap();
        assert!((d - 1.11).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_join_products_by_category() {
        let (index, catalog) = fixture();
        let rows = Pipeline::near(&index, &catalog, GeoPoint::new(10.7769, 106.7009), 5.0)
            .join_products(&catalog, |p| p.category_id == "food", true)
            .into_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].seller.id, "mid");
        assert_eq!(rows[0].products.len(), 1);
    }

    #[test]
    fn test_out_of_stock_products_not_joined() {
        let (index, catalog) = fixture();
        catalog.set_product_stock("near", "p-near", false).unwrap();
        let rows = Pipeline::near(&index, &catalog, GeoPoint::new(10.7769, 106.7009), 5.0)
            .join_products(&catalog, |_| true, true)
            .into_rows();
        let ids: Vec<&str> = rows.iter().map(|r| r.seller.id.as_str()).collect();
        assert_eq!(ids, vec!["mid"]);
    }

    #[test]
    fn test_paginate_reports_total() {
        let (index, catalog) = fixture();
        let page = Pipeline::near(&index, &catalog, GeoPoint::new(10.7769, 106.7009), 5.0)
            .paginate(Page::new(2, 2));
        assert_eq!(page.meta.total, 3);
        assert_eq!(page.meta.pages, 2);
        assert_eq!(page.result.len(), 1);
        assert_eq!(page.result[0].seller.id, "far");
    }

    #[test]
    fn test_empty_radius_is_empty_not_error() {
        let (index, catalog) = fixture();
        let page = Pipeline::near(&index, &catalog, GeoPoint::new(21.0, 105.8), 5.0)
            .paginate(Page::default());
        assert_eq!(page.meta.total, 0);
        assert!(page.result.is_empty());
    }

    #[test]
    fn test_all_sellers_skips_ineligible() {
        let (_, catalog) = fixture();
        let rows = Pipeline::all_sellers(&catalog).into_rows();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.distance_km.is_none()));
    }

    #[test]
    fn test_sort_is_stable() {
        let rows = Pipeline::from_rows(vec![(1, "a"), (0, "b"), (1, "c"), (0, "d")])
            .sort_by(|x, y| x.0.cmp(&y.0))
            .into_rows();
        assert_eq!(rows, vec![(0, "b"), (0, "d"), (1, "a"), (1, "c")]);
    }
}
