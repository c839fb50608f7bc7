//! Yard reconciliation
//!
//! Overlays cadastral parcels against "erf" land-use zones to isolate
//! the private-yard portion of each parcel. A parcel can abut more than
//! one zone; the zone covering the largest share of the parcel wins,
//! and candidates whose overlap share does not exceed the cutoff are
//! discarded as overlay artifacts (shared-edge slivers from CRS
//! snapping and the like).

use std::collections::HashSet;

use erfscan_core::{BoundingBox, Error, Result};
use geo::{Area, BooleanOps, BoundingRect, Intersects};
use geo_types::MultiPolygon;
use tracing::debug;

use crate::features::{Parcel, ParcelSet, ZoneSet};

/// One (parcel, zone) intersection emitted by the overlay step.
///
/// Several candidates may share a `parcel_id` when a parcel intersects
/// multiple zones; reconciliation keeps at most one.
#[derive(Debug, Clone)]
pub struct YardCandidate {
    pub parcel_id: String,
    pub zone_id: String,
    /// Intersection of the parcel and zone geometries
    pub geometry: MultiPolygon<f64>,
    /// Full parcel area, not the intersection area
    pub parcel_area: f64,
    pub overlap_area: f64,
    /// `overlap_area / parcel_area`
    pub overlap_percentage: f64,
}

/// A reconciled yard: the winning candidate for one parcel.
///
/// Invariants: at most one yard per parcel id; `overlap_percentage`
/// strictly exceeds the reconciliation cutoff; the geometry is a subset
/// of both the parcel and the zone it was matched with.
#[derive(Debug, Clone)]
pub struct Yard {
    pub parcel_id: String,
    pub zone_id: String,
    pub geometry: MultiPolygon<f64>,
    pub parcel_area: f64,
    pub overlap_area: f64,
    pub overlap_percentage: f64,
}

impl From<YardCandidate> for Yard {
    fn from(c: YardCandidate) -> Self {
        Self {
            parcel_id: c.parcel_id,
            zone_id: c.zone_id,
            geometry: c.geometry,
            parcel_area: c.parcel_area,
            overlap_area: c.overlap_area,
            overlap_percentage: c.overlap_percentage,
        }
    }
}

/// Reconcile parcels against pre-filtered "erf" zones within a query
/// window.
///
/// `cutoff` is the minimum share of a parcel that must be covered by a
/// zone for the match to count; the comparison is strictly
/// greater-than. Candidates per parcel are ranked by overlap area
/// descending with a stable sort, so two candidates with exactly equal
/// overlap keep their encounter order and the first wins.
///
/// Parcels whose geometry touches the exterior ring of the query window
/// are excluded entirely: they were truncated by the window and their
/// areas would bias the overlap shares.
///
/// An empty result is valid. Output is sorted by parcel id.
///
/// # Errors
///
/// [`Error::CrsMismatch`] when the two sets disagree on their CRS (no
/// silent reprojection), [`Error::InvalidParameter`] when `cutoff` is
/// outside `(0, 1]`.
pub fn reconcile(
    parcels: &ParcelSet,
    zones: &ZoneSet,
    bounds: BoundingBox,
    cutoff: f64,
) -> Result<Vec<Yard>> {
    if !parcels.crs.is_equivalent(&zones.crs) {
        return Err(Error::CrsMismatch(
            parcels.crs.identifier(),
            zones.crs.identifier(),
        ));
    }
    if !(cutoff > 0.0 && cutoff <= 1.0) {
        return Err(Error::InvalidParameter {
            name: "cutoff",
            value: cutoff.to_string(),
            reason: "must be in (0, 1]".to_string(),
        });
    }

    let query_rect = bounds.rect();
    let edge = bounds.exterior();

    // Coarse bbox restriction, then drop parcels truncated by the
    // query window.
    let interior: Vec<&Parcel> = parcels
        .features
        .iter()
        .filter(|p| {
            p.geometry
                .bounding_rect()
                .is_some_and(|r| r.intersects(&query_rect))
        })
        .filter(|p| !p.geometry.intersects(&edge))
        .collect();

    debug!(
        total = parcels.len(),
        interior = interior.len(),
        zones = zones.len(),
        "reconcile: parcels restricted to query window"
    );

    let zone_rects: Vec<_> = zones
        .features
        .iter()
        .map(|z| z.geometry.bounding_rect())
        .collect();

    let mut candidates: Vec<YardCandidate> = Vec::new();
    for parcel in &interior {
        let parcel_area = parcel.area();
        if parcel_area <= 0.0 {
            // Degenerate geometry, overlap share undefined
            continue;
        }
        let parcel_rect = parcel.geometry.bounding_rect();

        for (zone, zone_rect) in zones.features.iter().zip(&zone_rects) {
            let coarse_hit = match (parcel_rect, zone_rect) {
                (Some(a), Some(b)) => a.intersects(b),
                _ => false,
            };
            if !coarse_hit || !parcel.geometry.intersects(&zone.geometry) {
                continue;
            }

            let geometry = parcel.geometry.intersection(&zone.geometry);
            let overlap_area = geometry.unsigned_area();
            if overlap_area <= 0.0 {
                // Boundary contact only
                continue;
            }

            candidates.push(YardCandidate {
                parcel_id: parcel.id.clone(),
                zone_id: zone.id.clone(),
                geometry,
                parcel_area,
                overlap_area,
                overlap_percentage: overlap_area / parcel_area,
            });
        }
    }

    // Stable descending sort; ties keep encounter order and the first
    // candidate per parcel wins.
    candidates.sort_by(|a, b| {
        b.overlap_area
            .partial_cmp(&a.overlap_area)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut seen: HashSet<&str> = HashSet::new();
    let mut yards: Vec<Yard> = Vec::new();
    for candidate in &candidates {
        if !seen.insert(candidate.parcel_id.as_str()) {
            continue;
        }
        if candidate.overlap_percentage > cutoff {
            yards.push(candidate.clone().into());
        }
    }

    // Deterministic output order regardless of candidate ordering
    yards.sort_by(|a, b| a.parcel_id.cmp(&b.parcel_id));

    debug!(
        candidates = candidates.len(),
        yards = yards.len(),
        cutoff,
        "reconcile: overlay complete"
    );

    Ok(yards)
}
