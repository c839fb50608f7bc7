//! Polygon raster clipping
//!
//! Crops a raster to the pixel window covering a polygon and masks the
//! pixels whose centers fall outside it. The mask and window are
//! computed once per geometry and applied to every band of an image
//! stack, so co-registered bands always share one mask.

use erfscan_core::{GeoTransform, Raster};
use geo::{BoundingRect, Intersects};
use geo_types::{MultiPolygon, Point};
use ndarray::Array2;

/// Pixel window and mask for one geometry against one raster grid.
///
/// `mask[(r, c)]` is true where the center of pixel
/// (`row_off + r`, `col_off + c`) lies on or inside the geometry.
#[derive(Debug, Clone)]
pub struct ClipWindow {
    pub row_off: usize,
    pub col_off: usize,
    /// Derived transform of the cropped window
    pub transform: GeoTransform,
    mask: Array2<bool>,
}

impl ClipWindow {
    /// Window dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.mask.dim()
    }

    /// Number of pixels covered by the geometry
    pub fn covered(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }
}

/// Compute the clip window for a geometry against a raster grid.
///
/// `shape` is the raster's (rows, cols) under `transform`. Returns
/// `None` when the geometry's extent misses the raster entirely or no
/// pixel center is covered; callers treat that as a recoverable skip,
/// not an error.
///
/// Pixel membership is decided by the pixel center (boundary contact
/// included), matching the conventional center-in rasterization rule.
pub fn clip_window(
    transform: &GeoTransform,
    shape: (usize, usize),
    geometry: &MultiPolygon<f64>,
) -> Option<ClipWindow> {
    let (rows, cols) = shape;
    let rect = geometry.bounding_rect()?;

    // Window corners in fractional pixel space. For north-up imagery
    // max_y maps to the top row.
    let (c0, r0) = transform.geo_to_pixel(rect.min().x, rect.max().y);
    let (c1, r1) = transform.geo_to_pixel(rect.max().x, rect.min().y);
    if !(c0.is_finite() && r0.is_finite() && c1.is_finite() && r1.is_finite()) {
        return None;
    }

    let col_start = c0.min(c1).floor().max(0.0) as usize;
    let row_start = r0.min(r1).floor().max(0.0) as usize;
    let col_end = (c0.max(c1).ceil() as isize).min(cols as isize);
    let row_end = (r0.max(r1).ceil() as isize).min(rows as isize);

    if col_end <= col_start as isize || row_end <= row_start as isize {
        return None;
    }
    let (col_end, row_end) = (col_end as usize, row_end as usize);

    let wrows = row_end - row_start;
    let wcols = col_end - col_start;
    let mut mask = Array2::from_elem((wrows, wcols), false);
    let mut covered = 0usize;

    for r in 0..wrows {
        for c in 0..wcols {
            let (x, y) = transform.pixel_to_geo(col_start + c, row_start + r);
            if geometry.intersects(&Point::new(x, y)) {
                mask[(r, c)] = true;
                covered += 1;
            }
        }
    }

    if covered == 0 {
        return None;
    }

    Some(ClipWindow {
        row_off: row_start,
        col_off: col_start,
        transform: transform.window(col_start, row_start),
        mask,
    })
}

/// Apply a clip window to one band, producing a masked raster.
///
/// Pixels outside the geometry become NaN; pixels inside keep their
/// source value (including source NaN). The result carries the
/// window's derived transform and a NaN no-data value.
pub fn apply_window(band: &Array2<f64>, window: &ClipWindow) -> Raster<f64> {
    let (wrows, wcols) = window.shape();
    let mut data = Array2::from_elem((wrows, wcols), f64::NAN);

    for r in 0..wrows {
        for c in 0..wcols {
            if window.mask[(r, c)] {
                data[(r, c)] = band[(window.row_off + r, window.col_off + c)];
            }
        }
    }

    let mut clip = Raster::from_array(data);
    clip.set_transform(window.transform);
    clip.set_nodata(Some(f64::NAN));
    clip
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Polygon};

    fn multi(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![
                (min_x, min_y),
                (max_x, min_y),
                (max_x, max_y),
                (min_x, max_y),
                (min_x, min_y),
            ]),
            vec![],
        )])
    }

    // 10x10 grid over (0,0)..(10,10), 1 unit pixels, north-up
    fn grid_transform() -> GeoTransform {
        GeoTransform::new(0.0, 10.0, 1.0, -1.0)
    }

    #[test]
    fn test_window_covers_polygon_footprint() {
        let geom = multi(2.0, 2.0, 6.0, 6.0);
        let window = clip_window(&grid_transform(), (10, 10), &geom).unwrap();

        // 4x4 units at 1 unit/pixel
        assert_eq!(window.covered(), 16);
    }

    #[test]
    fn test_disjoint_geometry_is_none() {
        let geom = multi(50.0, 50.0, 60.0, 60.0);
        assert!(clip_window(&grid_transform(), (10, 10), &geom).is_none());
    }

    #[test]
    fn test_window_clamped_to_extent() {
        // Polygon hangs over the right edge of the raster
        let geom = multi(7.0, 3.0, 15.0, 6.0);
        let window = clip_window(&grid_transform(), (10, 10), &geom).unwrap();

        let (_, wcols) = window.shape();
        assert!(window.col_off + wcols <= 10);
        // 3 columns remain inside (x in 7..10), 3 rows (y in 3..6)
        assert_eq!(window.covered(), 9);
    }

    #[test]
    fn test_apply_window_masks_outside() {
        let geom = multi(2.0, 2.0, 6.0, 6.0);
        let window = clip_window(&grid_transform(), (10, 10), &geom).unwrap();

        let band = Array2::from_elem((10, 10), 3.5);
        let clip = apply_window(&band, &window);

        assert_eq!(clip.valid_count(), 16);
        for &v in clip.data().iter() {
            assert!(v.is_nan() || v == 3.5);
        }
    }

    #[test]
    fn test_clip_transform_origin() {
        let geom = multi(2.0, 2.0, 6.0, 6.0);
        let window = clip_window(&grid_transform(), (10, 10), &geom).unwrap();

        // Window starts at pixel (col 2, row 4): x=2, y=8 in geo space
        assert_eq!(window.col_off, 2);
        assert_eq!(window.row_off, 4);
        assert!((window.transform.origin_x - 2.0).abs() < 1e-10);
        assert!((window.transform.origin_y - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_source_nan_stays_masked() {
        let geom = multi(2.0, 2.0, 6.0, 6.0);
        let window = clip_window(&grid_transform(), (10, 10), &geom).unwrap();

        let mut band = Array2::from_elem((10, 10), 1.0);
        band[(5, 3)] = f64::NAN; // inside the polygon window
        let clip = apply_window(&band, &window);

        assert_eq!(clip.valid_count(), 15);
    }
}
