//! 网格空间索引
//!
//! Seller positions bucketed into fixed-size lat/lng cells. A range query
//! visits only the cells intersecting the spherical cap's bounding box, so
//! its cost follows the radius and local density instead of the total
//! number of indexed sellers.

use parking_lot::RwLock;
use shared::models::GeoPoint;
use std::collections::HashMap;

use super::distance::{EARTH_RADIUS_KM, haversine_m};

/// ~5.5 km cells
pub const DEFAULT_CELL_DEG: f64 = 0.05;

/// One range query hit
#[derive(Debug, Clone, PartialEq)]
pub struct RangeHit {
    pub id: String,
    pub distance_m: f64,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    point: GeoPoint,
    cell: (i64, i64),
    /// Insertion order, kept across relocations (tie-breaker)
    seq: u64,
}

#[derive(Debug, Default)]
struct Grid {
    entries: HashMap<String, Entry>,
    cells: HashMap<(i64, i64), Vec<String>>,
    next_seq: u64,
}

impl Grid {
    fn detach(&mut self, cell: (i64, i64), id: &str) {
        if let Some(ids) = self.cells.get_mut(&cell) {
            ids.retain(|x| x != id);
            if ids.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }
}

/// Spatial index over entity positions
#[derive(Debug)]
pub struct SpatialIndex {
    cell_deg: f64,
    columns: i64,
    inner: RwLock<Grid>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::with_cell_size(DEFAULT_CELL_DEG)
    }

    pub fn with_cell_size(cell_deg: f64) -> Self {
        let cell_deg = if cell_deg.is_finite() && cell_deg > 0.0 {
            cell_deg.min(360.0)
        } else {
            DEFAULT_CELL_DEG
        };
        Self {
            cell_deg,
            columns: ((360.0 / cell_deg).ceil() as i64).max(1),
            inner: RwLock::new(Grid::default()),
        }
    }

    /// Wrap a longitude column into [-columns/2, columns/2)
    fn wrap_column(&self, col: i64) -> i64 {
        let half = self.columns / 2;
        (col + half).rem_euclid(self.columns) - half
    }

    fn cell_of(&self, point: GeoPoint) -> (i64, i64) {
        let row = (point.lat / self.cell_deg).floor() as i64;
        let col = (point.lng / self.cell_deg).floor() as i64;
        (row, self.wrap_column(col))
    }

    /// Insert or move an entity
    pub fn upsert(&self, id: &str, point: GeoPoint) {
        let cell = self.cell_of(point);
        let mut grid = self.inner.write();

        let seq = match grid.entries.remove(id) {
            Some(previous) => {
                grid.detach(previous.cell, id);
                previous.seq
            }
            None => {
                grid.next_seq += 1;
                grid.next_seq
            }
        };

        grid.cells.entry(cell).or_default().push(id.to_string());
        grid.entries.insert(id.to_string(), Entry { point, cell, seq });
    }

    pub fn remove(&self, id: &str) -> bool {
        let mut grid = self.inner.write();
        match grid.entries.remove(id) {
            Some(entry) => {
                grid.detach(entry.cell, id);
                true
            }
            None => false,
        }
    }

    pub fn position(&self, id: &str) -> Option<GeoPoint> {
        self.inner.read().entries.get(id).map(|e| e.point)
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entities within `radius_m` of `origin` (inclusive), nearest first.
    /// Equal distances keep insertion order.
    pub fn range_query(&self, origin: GeoPoint, radius_m: f64) -> Vec<RangeHit> {
        if !origin.is_valid() || !radius_m.is_finite() || radius_m < 0.0 {
            return Vec::new();
        }

        let grid = self.inner.read();
        let window = self.query_window(origin, radius_m / 1000.0);

        let mut hits: Vec<(u64, RangeHit)> = Vec::new();
        let mut consider = |id: &String, entry: &Entry| {
            let distance_m = haversine_m(origin, entry.point);
            if distance_m <= radius_m {
                hits.push((
                    entry.seq,
                    RangeHit {
                        id: id.clone(),
                        distance_m,
                    },
                ));
            }
        };

        if window.cell_count() > grid.cells.len() as u64 {
            // Window larger than the occupied grid: walk occupied cells instead
            for ((row, col), ids) in grid.cells.iter() {
                if window.contains(*row, *col, self) {
                    for id in ids {
                        if let Some(entry) = grid.entries.get(id) {
                            consider(id, entry);
                        }
                    }
                }
            }
        } else {
            for row in window.min_row..=window.max_row {
                for col in window.columns(self) {
                    if let Some(ids) = grid.cells.get(&(row, col)) {
                        for id in ids {
                            if let Some(entry) = grid.entries.get(id) {
                                consider(id, entry);
                            }
                        }
                    }
                }
            }
        }

        hits.sort_by(|(seq_a, a), (seq_b, b)| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then_with(|| seq_a.cmp(seq_b))
        });
        hits.into_iter().map(|(_, hit)| hit).collect()
    }

    /// Bounding box of the spherical cap, in cell coordinates
    fn query_window(&self, origin: GeoPoint, radius_km: f64) -> Window {
        let angular = radius_km / EARTH_RADIUS_KM;
        let lat0 = origin.lat.to_radians();
        let min_lat = (lat0 - angular).to_degrees();
        let max_lat = (lat0 + angular).to_degrees();

        let lng_span = if angular >= std::f64::consts::PI || min_lat <= -90.0 || max_lat >= 90.0 {
            None
        } else {
            let ratio = angular.sin() / lat0.cos();
            if ratio >= 1.0 {
                None
            } else {
                let delta = ratio.asin().to_degrees();
                Some((origin.lng - delta, origin.lng + delta))
            }
        };

        let min_row = (min_lat.max(-90.0) / self.cell_deg).floor() as i64;
        let max_row = (max_lat.min(90.0) / self.cell_deg).floor() as i64;
        let cols = lng_span.map(|(lo, hi)| {
            (
                (lo / self.cell_deg).floor() as i64,
                (hi / self.cell_deg).floor() as i64,
            )
        });

        Window {
            min_row,
            max_row,
            cols,
        }
    }
}

/// Cell window of a query. `cols == None` means every longitude.
#[derive(Debug, Clone, Copy)]
struct Window {
    min_row: i64,
    max_row: i64,
    cols: Option<(i64, i64)>,
}

impl Window {
    fn rows(&self) -> u64 {
        (self.max_row - self.min_row + 1).max(0) as u64
    }

    fn cell_count(&self) -> u64 {
        match self.cols {
            Some((lo, hi)) => self.rows().saturating_mul((hi - lo + 1).max(0) as u64),
            None => u64::MAX,
        }
    }

    fn columns(&self, index: &SpatialIndex) -> Vec<i64> {
        match self.cols {
            Some((lo, hi)) => (lo..=hi).map(|c| index.wrap_column(c)).collect(),
            None => (0..index.columns).map(|c| index.wrap_column(c)).collect(),
        }
    }

    fn contains(&self, row: i64, col: i64, index: &SpatialIndex) -> bool {
        if row < self.min_row || row > self.max_row {
            return false;
        }
        match self.cols {
            Some((lo, hi)) => (lo..=hi).any(|c| index.wrap_column(c) == col),
            None => true,
        }
    }
}
