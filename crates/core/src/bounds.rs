//! Query bounding box
//!
//! The rectangular window a pipeline run is scoped to. Both vector
//! sources are queried with it and the reconciler excludes parcels
//! truncated by its edge, so validity is checked once at construction.

use crate::error::{Error, Result};
use geo_types::{Coord, LineString, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// Axis-aligned query window in a projected CRS.
///
/// Invariant: `min_x < max_x`, `min_y < max_y`, all coordinates finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl BoundingBox {
    /// Create a bounding box, validating the ordering invariant
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        let finite = [min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite());
        if !finite || min_x >= max_x || min_y >= max_y {
            return Err(Error::InvalidBounds {
                min_x,
                min_y,
                max_x,
                max_y,
            });
        }
        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// The box as a `geo_types` rectangle
    pub fn rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.min_x,
                y: self.min_y,
            },
            Coord {
                x: self.max_x,
                y: self.max_y,
            },
        )
    }

    /// The box as a closed polygon
    pub fn polygon(&self) -> Polygon<f64> {
        Polygon::new(self.exterior(), vec![])
    }

    /// The exterior ring of the box.
    ///
    /// Geometries intersecting this ring were truncated by the query
    /// window; the reconciler drops them.
    pub fn exterior(&self) -> LineString<f64> {
        LineString::from(vec![
            (self.min_x, self.min_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
            (self.min_x, self.max_y),
            (self.min_x, self.min_y),
        ])
    }
}

impl TryFrom<(f64, f64, f64, f64)> for BoundingBox {
    type Error = Error;

    fn try_from(b: (f64, f64, f64, f64)) -> Result<Self> {
        Self::new(b.0, b.1, b.2, b.3)
    }
}
