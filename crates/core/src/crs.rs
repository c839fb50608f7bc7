//! Coordinate Reference System identifiers
//!
//! A lightweight CRS tag used to verify that datasets entering the
//! pipeline agree on their reference system. This is identification
//! only: erfscan never reprojects, it refuses mismatched inputs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    /// EPSG code if known
    epsg: Option<u32>,
    /// WKT representation
    wkt: Option<String>,
    /// PROJ string if available
    proj: Option<String>,
}

impl Crs {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            epsg: Some(code),
            wkt: None,
            proj: None,
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            epsg: None,
            wkt: Some(wkt.into()),
            proj: None,
        }
    }

    /// Create a CRS from a PROJ string
    pub fn from_proj(proj: impl Into<String>) -> Self {
        Self {
            epsg: None,
            wkt: None,
            proj: Some(proj.into()),
        }
    }

    /// Amersfoort / RD New (EPSG:28992), the projected CRS used by the
    /// Dutch Kadaster and BGT services
    pub fn rd_new() -> Self {
        Self::from_epsg(28992)
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Get PROJ string
    pub fn proj(&self) -> Option<&str> {
        self.proj.as_deref()
    }

    /// Check whether two CRS identify the same reference system.
    ///
    /// Compares EPSG codes when both are present, falling back to exact
    /// WKT or PROJ string equality. Two CRS with no common representation
    /// are never considered equivalent.
    pub fn is_equivalent(&self, other: &Crs) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.proj, &other.proj) {
            return a == b;
        }
        false
    }

    /// Short string identifier, used in error messages
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(proj) = &self.proj {
            return proj.clone();
        }
        if let Some(wkt) = &self.wkt {
            // Truncate on a char boundary; WKT names may hold
            // multibyte characters
            let mut end = wkt.len().min(50);
            while !wkt.is_char_boundary(end) {
                end -= 1;
            }
            return format!("WKT:{}", &wkt[..end]);
        }
        "Unknown".to_string()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::rd_new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rd_new_epsg() {
        let crs = Crs::rd_new();
        assert_eq!(crs.epsg(), Some(28992));
        assert_eq!(crs.identifier(), "EPSG:28992");
    }

    #[test]
    fn test_equivalence_epsg() {
        let a = Crs::from_epsg(28992);
        let b = Crs::rd_new();
        assert!(a.is_equivalent(&b));
        assert!(!a.is_equivalent(&Crs::wgs84()));
    }

    #[test]
    fn test_identifier_truncates_long_wkt_on_char_boundary() {
        // Byte 50 falls inside the two-byte "é"; the cut must back up
        // to the previous boundary instead of panicking
        let wkt = format!("{}émersfoort / RD New, extended description", "X".repeat(49));
        let crs = Crs::from_wkt(wkt);

        let id = crs.identifier();
        assert_eq!(id, format!("WKT:{}", "X".repeat(49)));
    }

    #[test]
    fn test_identifier_short_wkt_untruncated() {
        let crs = Crs::from_wkt("PROJCS[\"Amersfoort\"]");
        assert_eq!(crs.identifier(), "WKT:PROJCS[\"Amersfoort\"]");
    }

    #[test]
    fn test_no_common_representation() {
        let a = Crs::from_wkt("PROJCS[\"Amersfoort / RD New\"]");
        let b = Crs::from_proj("+proj=sterea");
        assert!(!a.is_equivalent(&b));
    }
}
