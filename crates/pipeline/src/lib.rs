//! # erfscan pipeline
//!
//! Batch pipeline that extracts private-yard polygons for a Dutch
//! bounding box and computes per-yard NDVI statistics from aerial
//! imagery.
//!
//! Two independently sourced polygon datasets go in: cadastral parcels
//! and "erf" (bare private terrain) land-use zones. [`reconcile`]
//! overlays them into one yard per parcel, [`sample_yards`] clips
//! co-registered imagery to each yard and aggregates NDVI, and
//! [`yard_survey`] chains the whole run.
//!
//! ## Modules
//!
//! - **features**: parcel and zone feature types
//! - **sources**: collaborator traits for the two vector sources and
//!   the raster reader, plus in-memory implementations
//! - **reconcile**: the parcel/zone overlay and selection algorithm
//! - **clip**: polygon raster clipping with masked windows
//! - **imagery**: NDVI over masked clips
//! - **sample**: per-yard clipping and aggregation
//! - **survey**: end-to-end composition

pub mod clip;
pub mod features;
pub mod imagery;
mod maybe_rayon;
pub mod reconcile;
pub mod sample;
pub mod sources;
pub mod survey;

pub use features::{Parcel, ParcelSet, Zone, ZoneSet, YARD_CATEGORY};
pub use reconcile::{reconcile, Yard, YardCandidate};
pub use sample::{sample_yards, ImageStack, YardStatistic, NIR_BAND, RED_BAND};
pub use sources::{ParcelSource, RasterReader, StaticParcelSource, StaticZoneSource, ZoneSource};
pub use survey::{yard_survey, DEFAULT_OVERLAP_CUTOFF};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::features::{Parcel, ParcelSet, Zone, ZoneSet, YARD_CATEGORY};
    pub use crate::imagery::{ndvi, normalized_difference};
    pub use crate::reconcile::{reconcile, Yard, YardCandidate};
    pub use crate::sample::{sample_yards, ImageStack, YardStatistic, NIR_BAND, RED_BAND};
    pub use crate::sources::{ParcelSource, RasterReader, ZoneSource};
    pub use crate::survey::{yard_survey, DEFAULT_OVERLAP_CUTOFF};
    pub use erfscan_core::prelude::*;
}
