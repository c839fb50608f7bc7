//! # erfscan core
//!
//! Core types for the erfscan yard analysis pipeline:
//! - [`Raster<T>`]: georeferenced raster grid over `ndarray`
//! - [`GeoTransform`]: affine georeferencing
//! - [`Crs`]: coordinate reference system identification
//! - [`BoundingBox`]: validated query window
//! - [`Error`] / [`Result`]: shared error handling

pub mod bounds;
pub mod crs;
pub mod error;
pub mod raster;

pub use bounds::BoundingBox;
pub use crs::Crs;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bounds::BoundingBox;
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
}
