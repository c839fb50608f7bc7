//! Data-source collaborator seams
//!
//! The pipeline consumes three external collaborators: a cadastral
//! parcel source, a land-use zone source and an already-decoded
//! raster reader. Wire-level clients (the PDOK download/OGC APIs, GML
//! extraction) live behind these traits; a failing client surfaces
//! [`erfscan_core::Error::SourceUnavailable`], which is fatal to a
//! run. The static implementations back tests and worked examples.

use erfscan_core::{BoundingBox, Result};
use geo::{BoundingRect, Intersects};

use crate::features::{ParcelSet, ZoneSet, YARD_CATEGORY};
use crate::sample::ImageStack;

/// Supplies cadastral parcel polygons for a bounding box.
///
/// Returned geometries share one CRS and may extend outside the box.
pub trait ParcelSource {
    fn fetch_parcels(&self, bounds: BoundingBox) -> Result<ParcelSet>;
}

/// Supplies bare-terrain zone polygons for a bounding box, filtered to
/// the "erf" category before reconciliation.
pub trait ZoneSource {
    fn fetch_zones(&self, bounds: BoundingBox) -> Result<ZoneSet>;
}

/// An opened, decoded raster dataset
pub trait RasterReader {
    fn read(&self) -> Result<ImageStack>;
}

impl RasterReader for ImageStack {
    fn read(&self) -> Result<ImageStack> {
        Ok(self.clone())
    }
}

/// In-memory parcel source answering bounding-box queries against a
/// fixed feature set
#[derive(Debug, Clone)]
pub struct StaticParcelSource {
    set: ParcelSet,
}

impl StaticParcelSource {
    pub fn new(set: ParcelSet) -> Self {
        Self { set }
    }
}

impl ParcelSource for StaticParcelSource {
    fn fetch_parcels(&self, bounds: BoundingBox) -> Result<ParcelSet> {
        let rect = bounds.rect();
        let features = self
            .set
            .features
            .iter()
            .filter(|p| {
                p.geometry
                    .bounding_rect()
                    .is_some_and(|r| r.intersects(&rect))
            })
            .cloned()
            .collect();
        Ok(ParcelSet::new(self.set.crs.clone(), features))
    }
}

/// In-memory zone source; applies the "erf" category filter the way
/// the BGT client does before handing zones to the reconciler
#[derive(Debug, Clone)]
pub struct StaticZoneSource {
    set: ZoneSet,
}

impl StaticZoneSource {
    pub fn new(set: ZoneSet) -> Self {
        Self { set }
    }
}

impl ZoneSource for StaticZoneSource {
    fn fetch_zones(&self, bounds: BoundingBox) -> Result<ZoneSet> {
        let rect = bounds.rect();
        let features = self
            .set
            .features
            .iter()
            .filter(|z| {
                z.geometry
                    .bounding_rect()
                    .is_some_and(|r| r.intersects(&rect))
            })
            .cloned()
            .collect();
        Ok(ZoneSet::new(self.set.crs.clone(), features).retain_category(YARD_CATEGORY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Parcel, Zone};
    use erfscan_core::Crs;
    use geo_types::{LineString, Polygon};

    fn rect_poly(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (min_x, min_y),
                (max_x, min_y),
                (max_x, max_y),
                (min_x, max_y),
                (min_x, min_y),
            ]),
            vec![],
        )
    }

    #[test]
    fn test_static_parcel_source_bbox_query() {
        let source = StaticParcelSource::new(ParcelSet::new(
            Crs::rd_new(),
            vec![
                Parcel::new("in", rect_poly(10.0, 10.0, 20.0, 20.0)),
                Parcel::new("out", rect_poly(200.0, 200.0, 210.0, 210.0)),
            ],
        ));

        let bounds = BoundingBox::new(0.0, 0.0, 100.0, 100.0).unwrap();
        let set = source.fetch_parcels(bounds).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.features[0].id, "in");
    }

    #[test]
    fn test_static_zone_source_filters_category() {
        let source = StaticZoneSource::new(ZoneSet::new(
            Crs::rd_new(),
            vec![
                Zone::new("Z1", rect_poly(10.0, 10.0, 20.0, 20.0), YARD_CATEGORY),
                Zone::new("Z2", rect_poly(10.0, 10.0, 20.0, 20.0), "open verharding"),
            ],
        ));

        let bounds = BoundingBox::new(0.0, 0.0, 100.0, 100.0).unwrap();
        let set = source.fetch_zones(bounds).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.features[0].id, "Z1");
    }
}
