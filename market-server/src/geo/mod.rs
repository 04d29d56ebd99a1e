//! 地理空间匹配
//!
//! - [`distance`]: haversine
//! - [`index`]: grid-bucketed spatial index over seller positions
//! - [`pipeline`]: composable filter → join → project → sort → paginate
//! - [`discovery`]: the nearby/search/ranking variants

pub mod discovery;
pub mod distance;
pub mod index;
pub mod pipeline;

pub use discovery::{
    CategorizedSellers, DiscoveryService, NearbyParams, NearbyProduct, NearbySeller,
    NearbySellerWithProducts, RankedSeller, SellerSummary,
};
pub use distance::{haversine_km, haversine_m};
pub use index::{RangeHit, SpatialIndex};
pub use pipeline::{Pipeline, SellerHit};
