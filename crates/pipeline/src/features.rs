//! Vector feature types for the two PDOK datasets
//!
//! Cadastral parcels ("perceel") and bare-terrain land-use zones
//! ("onbegroeidterreindeel") arrive as independently sourced polygon
//! sets, each tagged with the CRS its source served. Features are
//! value-like: the pipeline builds new tables at every stage instead
//! of mutating these in place.

use erfscan_core::Crs;
use geo::Area;
use geo_types::Polygon;

/// The physical-occurrence category that marks a zone as unbuilt
/// private terrain. Membership in this category is what makes a zone
/// a yard candidate.
pub const YARD_CATEGORY: &str = "erf";

/// A cadastral parcel polygon
#[derive(Debug, Clone)]
pub struct Parcel {
    /// Source-assigned unique parcel identifier
    pub id: String,
    pub geometry: Polygon<f64>,
}

impl Parcel {
    pub fn new(id: impl Into<String>, geometry: Polygon<f64>) -> Self {
        Self {
            id: id.into(),
            geometry,
        }
    }

    /// Planar area in CRS units squared, always derived from the geometry
    pub fn area(&self) -> f64 {
        self.geometry.unsigned_area()
    }
}

/// A land-use zone polygon tagged by physical-occurrence category
#[derive(Debug, Clone)]
pub struct Zone {
    /// Source-assigned unique zone identifier
    pub id: String,
    pub geometry: Polygon<f64>,
    /// Physical-occurrence category, e.g. "erf"
    pub category: String,
}

impl Zone {
    pub fn new(
        id: impl Into<String>,
        geometry: Polygon<f64>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            geometry,
            category: category.into(),
        }
    }
}

/// A set of parcels sharing one CRS
#[derive(Debug, Clone)]
pub struct ParcelSet {
    pub crs: Crs,
    pub features: Vec<Parcel>,
}

impl ParcelSet {
    pub fn new(crs: Crs, features: Vec<Parcel>) -> Self {
        Self { crs, features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// A set of zones sharing one CRS
#[derive(Debug, Clone)]
pub struct ZoneSet {
    pub crs: Crs,
    pub features: Vec<Zone>,
}

impl ZoneSet {
    pub fn new(crs: Crs, features: Vec<Zone>) -> Self {
        Self { crs, features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Keep only zones of the given category
    pub fn retain_category(mut self, category: &str) -> Self {
        self.features.retain(|z| z.category == category);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::LineString;

    fn square(size: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (size, 0.0),
                (size, size),
                (0.0, size),
                (0.0, 0.0),
            ]),
            vec![],
        )
    }

    #[test]
    fn test_parcel_area_derived() {
        let p = Parcel::new("P1", square(10.0));
        assert!((p.area() - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_retain_category() {
        let zones = ZoneSet::new(
            Crs::rd_new(),
            vec![
                Zone::new("Z1", square(5.0), YARD_CATEGORY),
                Zone::new("Z2", square(5.0), "gesloten verharding"),
                Zone::new("Z3", square(5.0), YARD_CATEGORY),
            ],
        );

        let erf = zones.retain_category(YARD_CATEGORY);
        assert_eq!(erf.len(), 2);
        assert!(erf.features.iter().all(|z| z.category == YARD_CATEGORY));
    }
}
