//! 附近卖家/商品发现
//!
//! All four variants start from the same base pipeline (range query,
//! seller join, eligibility filter) and add their own stages.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{GeoPoint, Product, User};
use shared::{AppError, AppResult, ErrorCode, Page, Paginated};
use std::collections::HashSet;
use std::sync::Arc;

use super::index::SpatialIndex;
use super::pipeline::{Pipeline, SellerHit};
use crate::catalog::{CatalogAccessor, CatalogService, EngagementService};
use crate::locations::LocationService;
use crate::storage::MarketStorage;

/// Public seller fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerSummary {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
}

impl From<&User> for SellerSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            phone: user.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbySeller {
    pub seller: SellerSummary,
    /// km
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbySellerWithProducts {
    pub seller: SellerSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    pub average_rating: f64,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyProduct {
    pub seller: SellerSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    pub product: Product,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSeller {
    pub seller: SellerSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    pub total_sold: u64,
    pub average_rating: f64,
    /// Cheapest available base price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
}

/// The four home-screen rankings
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedSellers {
    pub top_selling: Vec<RankedSeller>,
    pub liked: Vec<RankedSeller>,
    pub previously_ordered: Vec<RankedSeller>,
    pub top_rated: Vec<RankedSeller>,
}

/// Anchored query parameters
#[derive(Debug, Clone)]
pub struct NearbyParams {
    pub origin: GeoPoint,
    pub radius_km: f64,
    pub category_id: Option<String>,
    pub page: Page,
}

impl NearbyParams {
    fn check(&self) -> AppResult<()> {
        if !self.origin.is_valid() {
            return Err(AppError::new(ErrorCode::InvalidCoordinates)
                .with_detail("latitude", self.origin.lat)
                .with_detail("longitude", self.origin.lng));
        }
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "radius must be a positive number of kilometers",
            )
            .with_detail("radius", self.radius_km));
        }
        Ok(())
    }

    fn category_matches(&self, product: &Product) -> bool {
        self.category_id
            .as_deref()
            .is_none_or(|c| product.category_id == c)
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryService {
    index: Arc<SpatialIndex>,
    catalog: CatalogService,
    locations: LocationService,
    engagement: EngagementService,
    storage: MarketStorage,
    ranking_limit: usize,
}

impl DiscoveryService {
    pub fn new(
        index: Arc<SpatialIndex>,
        catalog: CatalogService,
        locations: LocationService,
        engagement: EngagementService,
        storage: MarketStorage,
        ranking_limit: usize,
    ) -> Self {
        Self {
            index,
            catalog,
            locations,
            engagement,
            storage,
            ranking_limit,
        }
    }

    fn base(&self, params: &NearbyParams) -> Pipeline<SellerHit> {
        Pipeline::near(&self.index, &self.catalog, params.origin, params.radius_km)
    }

    /// Eligible sellers by distance; with a category, only sellers that
    /// have an available product in it
    pub fn nearby_sellers(&self, params: &NearbyParams) -> AppResult<Paginated<NearbySeller>> {
        params.check()?;
        let mut pipeline = self.base(params);
        if params.category_id.is_some() {
            pipeline = pipeline.join_products(&self.catalog, |p| params.category_matches(p), true);
        }
        Ok(pipeline.project(to_nearby_seller).paginate(params.page))
    }

    /// Sellers with their matching products embedded
    ///
    /// `averageRating` covers the embedded products; 5 when nobody has
    /// reviewed them yet.
    pub fn nearby_sellers_with_products(
        &self,
        params: &NearbyParams,
    ) -> AppResult<Paginated<NearbySellerWithProducts>> {
        params.check()?;
        Ok(self
            .base(params)
            .join_products(&self.catalog, |p| params.category_matches(p), true)
            .project(|row| NearbySellerWithProducts {
                average_rating: self.engagement.average_rating(row.product_ids()),
                seller: SellerSummary::from(&row.seller),
                distance: row.distance_km,
                products: row.products,
            })
            .paginate(params.page))
    }

    /// Case-insensitive keyword search over name/description,
    /// one row per (seller, product), nearest seller first
    pub fn search_products(
        &self,
        params: &NearbyParams,
        keyword: &str,
    ) -> AppResult<Paginated<NearbyProduct>> {
        params.check()?;
        let keyword = keyword.trim();
        Ok(self
            .base(params)
            .join_products(
                &self.catalog,
                |p| params.category_matches(p) && (keyword.is_empty() || p.matches_keyword(keyword)),
                true,
            )
            .unwind(|row| {
                let seller = SellerSummary::from(&row.seller);
                let distance = row.distance_km;
                row.products.into_iter().map(move |product| NearbyProduct {
                    seller: seller.clone(),
                    distance,
                    product,
                })
            })
            .paginate(params.page))
    }

    /// Nearby sellers around the user's stored position
    ///
    /// Users without a position get the full eligible listing instead.
    pub fn nearby_for_user(
        &self,
        user_id: &str,
        radius_km: f64,
        category_id: Option<String>,
        page: Page,
    ) -> AppResult<Paginated<NearbySeller>> {
        match self.user_origin(user_id)? {
            Some(origin) => self.nearby_sellers(&NearbyParams {
                origin,
                radius_km,
                category_id,
                page,
            }),
            None => {
                tracing::debug!(user_id, "User has no location, falling back to full listing");
                let mut pipeline = Pipeline::all_sellers(&self.catalog);
                if let Some(category) = category_id.as_deref() {
                    pipeline = pipeline.join_products(&self.catalog, |p| p.category_id == category, true);
                }
                Ok(pipeline.project(to_nearby_seller).paginate(page))
            }
        }
    }

    /// Four independent rankings over the same base set
    pub fn categorize(&self, user_id: &str, radius_km: f64) -> AppResult<CategorizedSellers> {
        let base = match self.user_origin(user_id)? {
            Some(origin) => {
                let params = NearbyParams {
                    origin,
                    radius_km,
                    category_id: None,
                    page: Page::default(),
                };
                params.check()?;
                self.base(&params)
            }
            None => Pipeline::all_sellers(&self.catalog),
        }
        .join_products(&self.catalog, |_| true, false);

        let limit = self.ranking_limit;
        let liked: HashSet<String> = self.engagement.liked_sellers(user_id).into_iter().collect();
        let ordered: HashSet<String> = self
            .storage
            .sellers_ordered_from(user_id)
            .map_err(AppError::from)?
            .into_iter()
            .collect();

        let ranked = base.project(|row| self.rank(row));

        let top_selling = ranked
            .clone()
            .filter(|r| r.total_sold > 0)
            .sort_by(|a, b| b.total_sold.cmp(&a.total_sold))
            .limit(limit)
            .into_rows();

        let liked = ranked
            .clone()
            .filter(|r| liked.contains(&r.seller.id))
            .limit(limit)
            .into_rows();

        let previously_ordered = ranked
            .clone()
            .filter(|r| ordered.contains(&r.seller.id))
            .limit(limit)
            .into_rows();

        let top_rated = ranked
            .sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating))
            .limit(limit)
            .into_rows();

        Ok(CategorizedSellers {
            top_selling,
            liked,
            previously_ordered,
            top_rated,
        })
    }

    fn rank(&self, row: SellerHit) -> RankedSeller {
        RankedSeller {
            seller: SellerSummary::from(&row.seller),
            distance: row.distance_km,
            total_sold: row.total_sold(),
            average_rating: self.engagement.average_rating(row.product_ids()),
            min_price: row.products.iter().map(|p| p.base_price).min(),
        }
    }

    fn user_origin(&self, user_id: &str) -> AppResult<Option<GeoPoint>> {
        let Some(user) = self.catalog.get_user(user_id) else {
            return Ok(None);
        };
        Ok(self.locations.user_point(&user)?)
    }
}

fn to_nearby_seller(row: SellerHit) -> NearbySeller {
    NearbySeller {
        seller: SellerSummary::from(&row.seller),
        distance: row.distance_km,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{completed_order, customer, product, seller};
    use shared::models::{LocationInput, ReviewCreate};

    const ORIGIN: GeoPoint = GeoPoint {
        lat: 10.7769,
        lng: 106.7009,
    };

    struct Fixture {
        discovery: DiscoveryService,
        catalog: CatalogService,
        locations: LocationService,
        engagement: EngagementService,
        storage: MarketStorage,
    }

    /// s1 ~1.1 km, s2 ~2.2 km, s3 ~3.3 km, s4 ~22 km north of ORIGIN
    fn fixture() -> Fixture {
        let storage = MarketStorage::open_in_memory().unwrap();
        let catalog = CatalogService::new();
        let index = Arc::new(SpatialIndex::new());
        let locations = LocationService::new(storage.clone(), catalog.clone(), index.clone());
        let engagement = EngagementService::new(storage.clone(), catalog.clone());

        for (id, offset) in [("s1", 0.01), ("s2", 0.02), ("s3", 0.03), ("s4", 0.2)] {
            catalog.upsert_user(seller(id, id));
            locations
                .assign_user_location(
                    id,
                    &LocationInput {
                        latitude: ORIGIN.lat + offset,
                        longitude: ORIGIN.lng,
                        address: None,
                    },
                    0,
                )
                .unwrap();
        }
        catalog.upsert_user(customer("c1"));

        let mut tea = product("tea", "s1", 20000);
        tea.name = "Trà sữa".into();
        tea.sold = 3;
        catalog.upsert_product(tea);
        let mut coffee = product("coffee", "s2", 25000);
        coffee.name = "Cà phê sữa".into();
        coffee.sold = 10;
        catalog.upsert_product(coffee);
        let mut rice = product("rice", "s3", 35000);
        rice.name = "Cơm tấm".into();
        rice.category_id = "food".into();
        catalog.upsert_product(rice);

        let discovery = DiscoveryService::new(
            index,
            catalog.clone(),
            locations.clone(),
            engagement.clone(),
            storage.clone(),
            8,
        );
        Fixture {
            discovery,
            catalog,
            locations,
            engagement,
            storage,
        }
    }

    fn params(radius_km: f64) -> NearbyParams {
        NearbyParams {
            origin: ORIGIN,
            radius_km,
            category_id: None,
            page: Page::default(),
        }
    }

    fn ids<T>(rows: &[T], f: impl Fn(&T) -> &str) -> Vec<String> {
        rows.iter().map(|r| f(r).to_string()).collect()
    }

    #[test]
    fn test_nearby_sellers_by_distance() {
        let f = fixture();
        let page = f.discovery.nearby_sellers(&params(5.0)).unwrap();
        assert_eq!(page.meta.total, 3);
        assert_eq!(ids(&page.result, |r| &r.seller.id), vec!["s1", "s2", "s3"]);
        assert!(page.result[0].distance.unwrap() < page.result[1].distance.unwrap());
    }

    #[test]
    fn test_closed_seller_never_returned() {
        let f = fixture();
        f.catalog.set_seller_open("s2", false).unwrap();
        for radius in [1.0, 5.0, 50.0] {
            let page = f.discovery.nearby_sellers(&params(radius)).unwrap();
            assert!(page.result.iter().all(|r| r.seller.id != "s2"));
        }
    }

    #[test]
    fn test_category_filter_excludes_sellers_without_match() {
        let f = fixture();
        let mut p = params(5.0);
        p.category_id = Some("food".into());
        let page = f.discovery.nearby_sellers(&p).unwrap();
        assert_eq!(ids(&page.result, |r| &r.seller.id), vec!["s3"]);
    }

    #[test]
    fn test_invalid_radius_rejected() {
        let f = fixture();
        let err = f.discovery.nearby_sellers(&params(0.0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn test_with_products_default_rating_is_five() {
        let f = fixture();
        let page = f.discovery.nearby_sellers_with_products(&params(5.0)).unwrap();
        assert_eq!(page.meta.total, 3);
        assert!(page.result.iter().all(|r| r.average_rating == 5.0));
        assert_eq!(page.result[0].products[0].id, "tea");
    }

    #[test]
    fn test_search_is_case_insensitive_and_flattened() {
        let f = fixture();
        let page = f.discovery.search_products(&params(5.0), "SỮA").unwrap();
        assert_eq!(ids(&page.result, |r| &r.product.id), vec!["tea", "coffee"]);
        assert_eq!(page.result[1].seller.id, "s2");

        let none = f.discovery.search_products(&params(5.0), "pizza").unwrap();
        assert_eq!(none.meta.total, 0);
    }

    #[test]
    fn test_user_without_location_gets_full_listing() {
        let f = fixture();
        let page = f
            .discovery
            .nearby_for_user("c1", 5.0, None, Page::default())
            .unwrap();
        assert_eq!(page.meta.total, 4);
        assert!(page.result.iter().all(|r| r.distance.is_none()));
    }

    #[test]
    fn test_user_with_location_is_anchored() {
        let f = fixture();
        f.locations
            .assign_user_location(
                "c1",
                &LocationInput {
                    latitude: ORIGIN.lat,
                    longitude: ORIGIN.lng,
                    address: None,
                },
                1,
            )
            .unwrap();
        let page = f
            .discovery
            .nearby_for_user("c1", 5.0, None, Page::default())
            .unwrap();
        assert_eq!(page.meta.total, 3);
    }

    #[test]
    fn test_categorize() {
        let f = fixture();
        f.locations
            .assign_user_location(
                "c1",
                &LocationInput {
                    latitude: ORIGIN.lat,
                    longitude: ORIGIN.lng,
                    address: None,
                },
                1,
            )
            .unwrap();
        f.engagement.like_seller("c1", "s3", 1).unwrap();
        f.storage
            .insert_order(&completed_order("o1", "c1", "s1", &["tea"]))
            .unwrap();
        f.engagement
            .add_review(
                "c1",
                ReviewCreate {
                    product_id: "tea".into(),
                    rating: 2,
                    comment: String::new(),
                },
                2,
            )
            .unwrap();

        let result = f.discovery.categorize("c1", 5.0).unwrap();
        assert_eq!(ids(&result.top_selling, |r| &r.seller.id), vec!["s2", "s1"]);
        assert_eq!(ids(&result.liked, |r| &r.seller.id), vec!["s3"]);
        assert_eq!(ids(&result.previously_ordered, |r| &r.seller.id), vec!["s1"]);
        // unreviewed sellers sit at 5, ties by distance
        assert_eq!(ids(&result.top_rated, |r| &r.seller.id), vec!["s2", "s3", "s1"]);
        assert_eq!(result.top_rated[2].average_rating, 2.0);
    }

    #[test]
    fn test_categorize_caps_each_list() {
        let f = fixture();
        for i in 0..12 {
            let id = format!("x{}", i);
            f.catalog.upsert_user(seller(&id, &id));
            f.locations
                .assign_user_location(
                    &id,
                    &LocationInput {
                        latitude: ORIGIN.lat,
                        longitude: ORIGIN.lng + 0.001 * i as f64,
                        address: None,
                    },
                    0,
                )
                .unwrap();
        }
        let result = f.discovery.categorize("c1", 5.0).unwrap();
        assert_eq!(result.top_rated.len(), 8);
    }
}
