#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for facility proximity queries.
//!
//! Wraps an R-tree over facility point coordinates and answers
//! nearest-neighbor and radius-containment queries in sub-linear time.
//! Built once per facility set and shared by all metric computations.
//!
//! Coordinates are treated as unprojected Euclidean degrees and scaled
//! to kilometers by a flat conversion constant (default
//! [`DEG_TO_KM_DEFAULT`], 1 degree at the equator). This is a deliberate
//! local approximation: the error grows with latitude and with east-west
//! distance, since longitude degrees shrink away from the equator.
//! Rankings derived from these distances are sensitive to the constant,
//! so it is a parameter rather than a hardcoded value.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use thiserror::Error;

/// Kilometers per degree at the equator, the default scale factor.
pub const DEG_TO_KM_DEFAULT: f64 = 111.0;

/// Errors from spatial index construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpatialError {
    /// The facility point set was empty. Callers must treat this as a
    /// normal outcome for filtered facility sets, not a fatal error.
    #[error("cannot build a spatial index from an empty point set")]
    EmptyIndex,
}

/// A facility point stored in the R-tree with its table index.
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    /// `[lat, lon]` in degrees.
    pos: [f64; 2],
    /// Position in the facility table the index was built from.
    index: usize,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.pos)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.pos[0] - point[0];
        let dy = self.pos[1] - point[1];
        dx.mul_add(dx, dy * dy)
    }
}

/// Pre-built R-tree index over a set of facility coordinates.
///
/// Query results identify facilities by their index into the point slice
/// the tree was built from.
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
    deg_to_km: f64,
    len: usize,
}

impl SpatialIndex {
    /// Builds an index from `(lat, lon)` pairs with the default
    /// degree-to-kilometer conversion.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::EmptyIndex`] if `points` is empty.
    pub fn build(points: &[(f64, f64)]) -> Result<Self, SpatialError> {
        Self::build_with_scale(points, DEG_TO_KM_DEFAULT)
    }

    /// Builds an index with an explicit degree-to-kilometer constant.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::EmptyIndex`] if `points` is empty.
    pub fn build_with_scale(points: &[(f64, f64)], deg_to_km: f64) -> Result<Self, SpatialError> {
        if points.is_empty() {
            return Err(SpatialError::EmptyIndex);
        }

        let entries: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(index, &(lat, lon))| IndexedPoint {
                pos: [lat, lon],
                index,
            })
            .collect();

        log::debug!("Built spatial index over {} points", entries.len());

        Ok(Self {
            tree: RTree::bulk_load(entries),
            deg_to_km,
            len: points.len(),
        })
    }

    /// Number of indexed points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the index is empty. Construction rejects empty sets, so
    /// this is always `false` for a built index.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the nearest facility to a query point as
    /// `(distance_km, index)`.
    #[must_use]
    pub fn nearest(&self, lat: f64, lon: f64) -> (f64, usize) {
        // The tree is never empty by construction.
        let entry = self
            .tree
            .nearest_neighbor(&[lat, lon])
            .copied()
            .unwrap_or(IndexedPoint {
                pos: [lat, lon],
                index: 0,
            });
        let dist_deg = entry.distance_2(&[lat, lon]).sqrt();
        (dist_deg * self.deg_to_km, entry.index)
    }

    /// Returns the `k` nearest facilities, closest first, as
    /// `(distance_km, index)` pairs. Fewer than `k` entries are returned
    /// when the index holds fewer points.
    #[must_use]
    pub fn nearest_k(&self, lat: f64, lon: f64, k: usize) -> Vec<(f64, usize)> {
        self.tree
            .nearest_neighbor_iter(&[lat, lon])
            .take(k)
            .map(|entry| {
                let dist_deg = entry.distance_2(&[lat, lon]).sqrt();
                (dist_deg * self.deg_to_km, entry.index)
            })
            .collect()
    }

    /// Returns the indices of all facilities within `radius_km` of the
    /// query point.
    #[must_use]
    pub fn within_radius(&self, lat: f64, lon: f64, radius_km: f64) -> Vec<usize> {
        let radius_deg = radius_km / self.deg_to_km;
        self.tree
            .locate_within_distance([lat, lon], radius_deg * radius_deg)
            .map(|entry| entry.index)
            .collect()
    }
}
