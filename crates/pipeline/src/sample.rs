//! Per-yard raster sampling
//!
//! Clips aerial imagery to each reconciled yard and aggregates NDVI
//! over the unmasked pixels. Yards that miss the raster extent are
//! skipped, never fatal; each yard is processed independently, so the
//! set iterates through `maybe_rayon` and the output is sorted by
//! parcel id to stay reproducible under the `parallel` feature.

use erfscan_core::{Crs, Error, GeoTransform, Raster, Result};
use ndarray::Array2;
use tracing::debug;

use crate::clip::{apply_window, clip_window, ClipWindow};
use crate::imagery;
use crate::maybe_rayon::*;
use crate::reconcile::Yard;

/// Band index of near-infrared in an [`ImageStack`]
pub const NIR_BAND: usize = 0;
/// Band index of red in an [`ImageStack`]
pub const RED_BAND: usize = 1;

/// A co-registered multi-band image.
///
/// All bands share one grid and one transform. The primary stack
/// handed to [`sample_yards`] must order its bands NIR first, red
/// second ([`NIR_BAND`], [`RED_BAND`]); further bands are carried
/// through the clip untouched.
#[derive(Debug, Clone)]
pub struct ImageStack {
    bands: Vec<Array2<f64>>,
    transform: GeoTransform,
    crs: Option<Crs>,
}

impl ImageStack {
    /// Create a stack from bands sharing one shape.
    pub fn new(bands: Vec<Array2<f64>>, transform: GeoTransform) -> Result<Self> {
        let first = bands.first().ok_or(Error::BandCount {
            expected: 1,
            actual: 0,
        })?;
        let shape = first.dim();
        for band in &bands {
            if band.dim() != shape {
                return Err(Error::SizeMismatch {
                    er: shape.0,
                    ec: shape.1,
                    ar: band.dim().0,
                    ac: band.dim().1,
                });
            }
        }
        Ok(Self {
            bands,
            transform,
            crs: None,
        })
    }

    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn bands(&self) -> &[Array2<f64>] {
        &self.bands
    }

    /// Grid dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.bands[0].dim()
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Geographic bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let (rows, cols) = self.shape();
        self.transform.bounds(cols, rows)
    }

    fn clip(&self, window: &ClipWindow) -> Vec<Raster<f64>> {
        self.bands
            .iter()
            .map(|band| {
                let mut clip = apply_window(band, window);
                clip.set_crs(self.crs.clone());
                clip
            })
            .collect()
    }
}

/// Vegetation statistics for one yard
#[derive(Debug, Clone)]
pub struct YardStatistic {
    pub parcel_id: String,
    pub zone_id: String,
    /// Masked clips of every primary band, cropped to the yard
    pub bands: Vec<Raster<f64>>,
    /// Masked clips of the secondary (true-color) stack, when supplied
    /// and overlapping the yard
    pub true_color: Option<Vec<Raster<f64>>>,
    /// Yard area in ground units: unmasked pixel count times pixel area
    pub area: f64,
    /// Per-pixel NDVI over the clip, masked like its inputs
    pub ndvi: Raster<f64>,
    /// Mean NDVI over unmasked pixels, NaN when every pixel is masked
    pub ndvi_mean: f64,
}

/// Compute per-yard vegetation statistics from co-registered imagery.
///
/// The primary stack needs at least two bands (NIR, red); an optional
/// secondary stack is clipped identically for visual inspection and
/// plays no part in the NDVI numbers. Yards whose geometry misses the
/// primary raster extent are skipped (best-effort over the yard set).
/// Output carries one row per surviving yard, sorted by parcel id.
///
/// # Errors
///
/// [`Error::BandCount`] when the primary stack has fewer than two
/// bands, [`Error::CrsMismatch`] when both stacks carry a CRS and they
/// disagree.
pub fn sample_yards(
    yards: &[Yard],
    primary: &ImageStack,
    secondary: Option<&ImageStack>,
) -> Result<Vec<YardStatistic>> {
    if primary.band_count() < 2 {
        return Err(Error::BandCount {
            expected: 2,
            actual: primary.band_count(),
        });
    }
    if let (Some(a), Some(b)) = (primary.crs(), secondary.and_then(|s| s.crs())) {
        if !a.is_equivalent(b) {
            return Err(Error::CrsMismatch(a.identifier(), b.identifier()));
        }
    }

    let mut statistics: Vec<YardStatistic> = (0..yards.len())
        .into_par_iter()
        .filter_map(|i| sample_one(&yards[i], primary, secondary))
        .collect();

    statistics.sort_by(|a, b| a.parcel_id.cmp(&b.parcel_id));

    debug!(
        yards = yards.len(),
        sampled = statistics.len(),
        "sample_yards: raster aggregation complete"
    );

    Ok(statistics)
}

/// Sample one yard; `None` is the recoverable skip for yards that
/// miss the raster extent.
fn sample_one(
    yard: &Yard,
    primary: &ImageStack,
    secondary: Option<&ImageStack>,
) -> Option<YardStatistic> {
    let window = match clip_window(primary.transform(), primary.shape(), &yard.geometry) {
        Some(w) => w,
        None => {
            debug!(
                parcel_id = %yard.parcel_id,
                "yard outside raster extent, skipped"
            );
            return None;
        }
    };

    let bands = primary.clip(&window);
    // Clips of one window share a shape, so ndvi cannot fail here
    let ndvi = imagery::ndvi(&bands[NIR_BAND], &bands[RED_BAND]).ok()?;
    let ndvi_mean = ndvi.mean_valid().unwrap_or(f64::NAN);
    let area = bands[NIR_BAND].valid_count() as f64 * primary.transform().pixel_area();

    let true_color = secondary.and_then(|stack| {
        clip_window(stack.transform(), stack.shape(), &yard.geometry).map(|w| stack.clip(&w))
    });

    Some(YardStatistic {
        parcel_id: yard.parcel_id.clone(),
        zone_id: yard.zone_id.clone(),
        bands,
        true_color,
        area,
        ndvi,
        ndvi_mean,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo_types::{LineString, MultiPolygon, Polygon};

    fn yard(id: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Yard {
        let geometry = MultiPolygon(vec![Polygon::new(
            LineString::from(vec![
                (min_x, min_y),
                (max_x, min_y),
                (max_x, max_y),
                (min_x, max_y),
                (min_x, min_y),
            ]),
            vec![],
        )]);
        let parcel_area = (max_x - min_x) * (max_y - min_y);
        Yard {
            parcel_id: id.to_string(),
            zone_id: format!("Z-{id}"),
            geometry,
            parcel_area,
            overlap_area: parcel_area,
            overlap_percentage: 1.0,
        }
    }

    // 20x20 grid over (0,0)..(20,20), NIR=0.6, red=0.2
    fn stack() -> ImageStack {
        let nir = Array2::from_elem((20, 20), 0.6);
        let red = Array2::from_elem((20, 20), 0.2);
        ImageStack::new(vec![nir, red], GeoTransform::new(0.0, 20.0, 1.0, -1.0)).unwrap()
    }

    #[test]
    fn test_single_band_rejected() {
        let single =
            ImageStack::new(vec![Array2::zeros((4, 4))], GeoTransform::default()).unwrap();
        let err = sample_yards(&[yard("P1", 1.0, 1.0, 2.0, 2.0)], &single, None).unwrap_err();
        assert!(matches!(err, Error::BandCount { .. }));
    }

    #[test]
    fn test_uniform_yard_statistics() {
        let yards = vec![yard("P1", 5.0, 5.0, 10.0, 10.0)];
        let stats = sample_yards(&yards, &stack(), None).unwrap();

        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.parcel_id, "P1");
        // 5x5 units at 1 unit^2 per pixel
        assert_relative_eq!(s.area, 25.0, epsilon = 1e-10);
        let expected = (0.6 - 0.2) / (0.6 + 0.2);
        assert_relative_eq!(s.ndvi_mean, expected, epsilon = 1e-12);
        assert!(s.true_color.is_none());
    }

    #[test]
    fn test_disjoint_yard_skipped_not_fatal() {
        let yards = vec![
            yard("P1", 5.0, 5.0, 10.0, 10.0),
            yard("P2", 100.0, 100.0, 110.0, 110.0),
        ];
        let stats = sample_yards(&yards, &stack(), None).unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].parcel_id, "P1");
    }

    #[test]
    fn test_output_sorted_by_parcel_id() {
        let yards = vec![
            yard("P3", 1.0, 1.0, 3.0, 3.0),
            yard("P1", 5.0, 5.0, 7.0, 7.0),
            yard("P2", 10.0, 10.0, 12.0, 12.0),
        ];
        let stats = sample_yards(&yards, &stack(), None).unwrap();

        let ids: Vec<&str> = stats.iter().map(|s| s.parcel_id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn test_secondary_clipped_alongside() {
        let rgb = ImageStack::new(
            vec![
                Array2::from_elem((20, 20), 120.0),
                Array2::from_elem((20, 20), 140.0),
                Array2::from_elem((20, 20), 90.0),
            ],
            GeoTransform::new(0.0, 20.0, 1.0, -1.0),
        )
        .unwrap();

        let yards = vec![yard("P1", 5.0, 5.0, 10.0, 10.0)];
        let stats = sample_yards(&yards, &stack(), Some(&rgb)).unwrap();

        let tc = stats[0].true_color.as_ref().unwrap();
        assert_eq!(tc.len(), 3);
        assert_eq!(tc[0].valid_count(), 25);
    }

    #[test]
    fn test_crs_disagreement_rejected() {
        let primary = stack().with_crs(Crs::rd_new());
        let secondary = stack().with_crs(Crs::wgs84());

        let err = sample_yards(&[yard("P1", 1.0, 1.0, 2.0, 2.0)], &primary, Some(&secondary))
            .unwrap_err();
        assert!(matches!(err, Error::CrsMismatch(_, _)));
    }

    #[test]
    fn test_zero_reflectance_yard_has_nan_mean() {
        let nir = Array2::zeros((20, 20));
        let red = Array2::zeros((20, 20));
        let dark = ImageStack::new(vec![nir, red], GeoTransform::new(0.0, 20.0, 1.0, -1.0))
            .unwrap();

        let stats = sample_yards(&[yard("P1", 5.0, 5.0, 10.0, 10.0)], &dark, None).unwrap();
        assert_eq!(stats.len(), 1);
        assert!(stats[0].ndvi_mean.is_nan());
        // Pixels exist under the polygon even though NDVI is undefined
        assert_relative_eq!(stats[0].area, 25.0, epsilon = 1e-10);
    }
}
