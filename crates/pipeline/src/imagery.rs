//! Vegetation index computation
//!
//! NDVI over masked raster clips. Input bands use NaN for masked
//! cells; the output shares that convention, so masks propagate
//! through the index into the aggregation step.

use erfscan_core::{Error, Raster, RasterElement, Result};
use ndarray::Array2;

use crate::maybe_rayon::*;

/// Compute the normalized difference between two co-registered bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// Defined results lie in [-1, 1] for non-negative reflectance inputs.
/// Pixels where either band is masked, or where the sum is zero, are
/// NaN in the output rather than an error (IEEE semantics for the
/// division, a masked cell for the aggregate).
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    if band_a.shape() != band_b.shape() {
        return Err(Error::SizeMismatch {
            er: band_a.rows(),
            ec: band_a.cols(),
            ar: band_b.rows(),
            ac: band_b.cols(),
        });
    }

    let (rows, cols) = band_a.shape();
    let a = band_a.data();
    let b = band_b.data();
    let nodata_a = band_a.nodata();
    let nodata_b = band_b.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let x = a[(row, col)];
                let y = b[(row, col)];

                if x.is_nodata(nodata_a) || y.is_nodata(nodata_b) {
                    continue;
                }

                let sum = x + y;
                if sum.abs() < 1e-10 {
                    continue; // zero denominator stays masked
                }

                row_data[col] = (x - y) / sum;
            }
            row_data
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    let mut output = Raster::from_array(array);
    output.set_transform(*band_a.transform());
    output.set_crs(band_a.crs().cloned());
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
///
/// Dense vegetation approaches 1, bare soil sits near 0.1 to 0.2,
/// water goes negative.
pub fn ndvi(nir: &Raster<f64>, red: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, red)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn band(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_nodata(Some(f64::NAN));
        r
    }

    #[test]
    fn test_ndvi_value() {
        let nir = band(4, 4, 0.5);
        let red = band(4, 4, 0.1);

        let result = ndvi(&nir, &red).unwrap();
        let expected = (0.5 - 0.1) / (0.5 + 0.1);
        assert_relative_eq!(result.get(2, 2).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_ndvi_range() {
        // Non-negative reflectance keeps NDVI in [-1, 1]
        for (n, r) in [(0.9, 0.05), (0.0, 0.3), (0.4, 0.4), (0.01, 0.99)] {
            let result = ndvi(&band(2, 2, n), &band(2, 2, r)).unwrap();
            let v = result.get(0, 0).unwrap();
            assert!((-1.0..=1.0).contains(&v), "NDVI out of range: {}", v);
        }
    }

    #[test]
    fn test_zero_sum_masked() {
        let nir = band(3, 3, 0.0);
        let red = band(3, 3, 0.0);

        let result = ndvi(&nir, &red).unwrap();
        assert!(result.get(1, 1).unwrap().is_nan());
        assert_eq!(result.valid_count(), 0);
    }

    #[test]
    fn test_mask_propagates() {
        let mut nir = band(3, 3, 0.5);
        nir.set(0, 0, f64::NAN).unwrap();
        let red = band(3, 3, 0.1);

        let result = ndvi(&nir, &red).unwrap();
        assert!(result.get(0, 0).unwrap().is_nan());
        assert_eq!(result.valid_count(), 8);
    }

    #[test]
    fn test_shape_mismatch() {
        let nir = band(3, 3, 0.5);
        let red = band(3, 4, 0.1);
        assert!(ndvi(&nir, &red).is_err());
    }

    #[test]
    fn test_output_keeps_nan_nodata() {
        let result = ndvi(&band(2, 2, 0.5), &band(2, 2, 0.1)).unwrap();
        assert!(result.nodata().unwrap().is_nodata(None));
    }
}
