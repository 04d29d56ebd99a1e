//! 位置服务
//!
//! Location records live in redb; seller positions are mirrored into the
//! spatial index so discovery never scans the catalog.

use shared::models::{GeoPoint, Location, LocationInput, User};
use shared::util::new_id;
use shared::{AppError, ErrorCode};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::{CatalogAccessor, CatalogError, CatalogService};
use crate::geo::SpatialIndex;
use crate::storage::{MarketStorage, StorageError};

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Invalid coordinates: lat={lat}, lng={lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("Location not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<LocationError> for AppError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::InvalidCoordinates { lat, lng } => {
                AppError::new(ErrorCode::InvalidCoordinates)
                    .with_detail("latitude", lat)
                    .with_detail("longitude", lng)
            }
            LocationError::NotFound(id) => {
                AppError::new(ErrorCode::LocationNotFound).with_detail("location_id", id)
            }
            LocationError::Catalog(e) => e.into(),
            LocationError::Storage(e) => e.into(),
        }
    }
}

pub type LocationResult<T> = Result<T, LocationError>;

#[derive(Debug, Clone)]
pub struct LocationService {
    storage: MarketStorage,
    catalog: CatalogService,
    index: Arc<SpatialIndex>,
}

impl LocationService {
    pub fn new(storage: MarketStorage, catalog: CatalogService, index: Arc<SpatialIndex>) -> Self {
        Self {
            storage,
            catalog,
            index,
        }
    }

    pub fn index(&self) -> &Arc<SpatialIndex> {
        &self.index
    }

    pub fn create_location(&self, input: &LocationInput, now: i64) -> LocationResult<Location> {
        let point = input.point();
        if !point.is_valid() {
            return Err(LocationError::InvalidCoordinates {
                lat: point.lat,
                lng: point.lng,
            });
        }
        let location = Location::new(new_id(), input, now);
        self.storage.insert_location(&location)?;
        Ok(location)
    }

    pub fn find_location(&self, location_id: &str) -> LocationResult<Option<Location>> {
        Ok(self.storage.get_location(location_id)?)
    }

    pub fn get_location(&self, location_id: &str) -> LocationResult<Location> {
        self.find_location(location_id)?
            .ok_or_else(|| LocationError::NotFound(location_id.to_string()))
    }

    pub fn remove_location(&self, location_id: &str) -> LocationResult<Option<Location>> {
        Ok(self.storage.remove_location(location_id)?)
    }

    /// Current position of a user, if any
    pub fn user_point(&self, user: &User) -> LocationResult<Option<GeoPoint>> {
        match user.location_id.as_deref() {
            Some(id) => Ok(self.find_location(id)?.map(|l| l.point())),
            None => Ok(None),
        }
    }

    /// Give a user a new position
    ///
    /// The assignment is persisted and the superseded location record is
    /// deleted. Sellers are re-indexed.
    pub fn assign_user_location(
        &self,
        user_id: &str,
        input: &LocationInput,
        now: i64,
    ) -> LocationResult<Location> {
        let user = self
            .catalog
            .get_user(user_id)
            .ok_or_else(|| CatalogError::UserNotFound(user_id.to_string()))?;

        let location = self.create_location(input, now)?;
        let stored_previous = self.storage.assign_user_location(user_id, &location.id)?;
        let cached_previous = self.catalog.set_user_location(user_id, &location.id)?;

        // seed positions have no stored assignment yet
        if let Some(old_id) = cached_previous
            .filter(|old| *old != location.id && Some(old) != stored_previous.as_ref())
        {
            if self.storage.remove_location(&old_id)?.is_none() {
                tracing::debug!(user_id, location_id = %old_id, "Superseded location already gone");
            }
        }
        if user.is_seller() {
            self.index.upsert(user_id, location.point());
        }

        tracing::info!(user_id, location_id = %location.id, "User location updated");
        Ok(location)
    }

    /// Store seed locations and index every located seller
    ///
    /// Stored assignments win over the seed; seed positions they replaced
    /// are not re-inserted.
    pub fn warmup(&self, locations: &[Location]) -> LocationResult<()> {
        let superseded = self.restore_assignments()?;
        for location in locations {
            if superseded.contains(&location.id) {
                tracing::debug!(location_id = %location.id, "Skipping superseded seed location");
                continue;
            }
            self.storage.insert_location(location)?;
        }
        self.index_sellers()
    }

    /// Re-apply persisted assignments, then re-index every seller
    pub fn rebuild_index(&self) -> LocationResult<()> {
        self.restore_assignments()?;
        self.index_sellers()
    }

    /// Point catalog users at their stored positions.
    /// Returns the location ids those assignments replaced.
    fn restore_assignments(&self) -> LocationResult<HashSet<String>> {
        let mut superseded = HashSet::new();
        for (user_id, location_id) in self.storage.user_locations()? {
            match self.catalog.set_user_location(&user_id, &location_id) {
                Ok(Some(previous)) if previous != location_id => {
                    superseded.insert(previous);
                }
                Ok(_) => {}
                Err(CatalogError::UserNotFound(_)) => {
                    tracing::debug!(%user_id, "Stored location for unknown user");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(superseded)
    }

    fn index_sellers(&self) -> LocationResult<()> {
        let mut indexed = 0usize;
        for seller in self.catalog.sellers() {
            match self.user_point(&seller)? {
                Some(point) if point.is_valid() => {
                    self.index.upsert(&seller.id, point);
                    indexed += 1;
                }
                _ => {
                    self.index.remove(&seller.id);
                }
            }
        }
        tracing::info!(sellers = indexed, "Spatial index rebuilt");
        Ok(())
    }
}
