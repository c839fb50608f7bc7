//! End-to-end yard survey
//!
//! The full pipeline composition: fetch both vector datasets for a
//! bounding box, reconcile them into yards, then sample imagery per
//! yard.

use erfscan_core::{BoundingBox, Result};
use tracing::debug;

use crate::reconcile::reconcile;
use crate::sample::{sample_yards, ImageStack, YardStatistic};
use crate::sources::{ParcelSource, ZoneSource};

/// Default minimum overlap share for a (parcel, zone) match.
///
/// Discards slivers from overlay imprecision while keeping genuinely
/// small yards.
pub const DEFAULT_OVERLAP_CUTOFF: f64 = 0.05;

/// Run the full pipeline for one bounding box.
///
/// Source failures and a CRS disagreement abort the run; yards that
/// miss the raster extent are skipped per [`sample_yards`].
pub fn yard_survey<P: ParcelSource, Z: ZoneSource>(
    parcel_source: &P,
    zone_source: &Z,
    bounds: BoundingBox,
    cutoff: f64,
    primary: &ImageStack,
    secondary: Option<&ImageStack>,
) -> Result<Vec<YardStatistic>> {
    let parcels = parcel_source.fetch_parcels(bounds)?;
    let zones = zone_source.fetch_zones(bounds)?;
    debug!(
        parcels = parcels.len(),
        zones = zones.len(),
        "yard_survey: sources fetched"
    );

    let yards = reconcile(&parcels, &zones, bounds, cutoff)?;
    sample_yards(&yards, primary, secondary)
}
