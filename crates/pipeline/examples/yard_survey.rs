//! Worked example: survey a synthetic neighborhood.
//!
//! Builds a small set of parcels and land-use zones, a two-band image
//! with a vegetated block, and runs the full pipeline. Run with:
//!
//! ```sh
//! cargo run --example yard_survey
//! ```

use erfscan_core::{BoundingBox, Crs, GeoTransform};
use erfscan_pipeline::prelude::*;
use erfscan_pipeline::{StaticParcelSource, StaticZoneSource};
use geo_types::{LineString, Polygon};
use ndarray::Array2;

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

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let bounds = BoundingBox::new(0.0, 0.0, 100.0, 100.0)?;

    let parcel_source = StaticParcelSource::new(ParcelSet::new(
        Crs::rd_new(),
        vec![
            Parcel::new("NL.IMKAD.001", rect_poly(10.0, 10.0, 25.0, 25.0)),
            Parcel::new("NL.IMKAD.002", rect_poly(30.0, 10.0, 45.0, 22.0)),
            Parcel::new("NL.IMKAD.003", rect_poly(60.0, 60.0, 78.0, 74.0)),
            // Truncated by the query window, will be excluded
            Parcel::new("NL.IMKAD.004", rect_poly(92.0, 40.0, 108.0, 55.0)),
        ],
    ));
    let zone_source = StaticZoneSource::new(ZoneSet::new(
        Crs::rd_new(),
        vec![
            Zone::new("bgt.erf.a", rect_poly(8.0, 8.0, 40.0, 28.0), YARD_CATEGORY),
            Zone::new("bgt.erf.b", rect_poly(38.0, 8.0, 50.0, 24.0), YARD_CATEGORY),
            Zone::new("bgt.erf.c", rect_poly(58.0, 58.0, 80.0, 76.0), YARD_CATEGORY),
            Zone::new("bgt.pav.d", rect_poly(0.0, 30.0, 100.0, 40.0), "gesloten verharding"),
        ],
    ));

    // Two-band image: sparse vegetation everywhere, a dense block over
    // the third parcel.
    let mut nir = Array2::from_elem((100, 100), 0.30);
    let red = Array2::from_elem((100, 100), 0.20);
    for row in 26..40 {
        for col in 60..78 {
            nir[(row, col)] = 0.85;
        }
    }
    let primary = ImageStack::new(vec![nir, red], GeoTransform::new(0.0, 100.0, 1.0, -1.0))?
        .with_crs(Crs::rd_new());

    let stats = yard_survey(
        &parcel_source,
        &zone_source,
        bounds,
        DEFAULT_OVERLAP_CUTOFF,
        &primary,
        None,
    )?;

    println!("{:<16} {:<12} {:>10} {:>10}", "parcel", "zone", "area", "ndvi");
    for s in &stats {
        println!(
            "{:<16} {:<12} {:>10.1} {:>10.3}",
            s.parcel_id, s.zone_id, s.area, s.ndvi_mean
        );
    }

    Ok(())
}
