use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// A geographic point: longitude/latitude in decimal degrees plus an
/// ellipsoidal height in metres. Height defaults to 0 for pure 2D use.
///
/// Invariants (checked by `new`/`try_new`, not re-checked by every method
/// that receives an already-constructed `GeoPoint`):
///   - `lon` in `[-180, 180]`
///   - `lat` in `[-90, 90]`
///   - `height` finite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub height: f64,
}

impl GeoPoint {
    /// Creates a 2D point (height 0). Panics are never used here; invalid
    /// input is rejected via `Result`.
    pub fn try_new(lon: f64, lat: f64) -> Result<Self> {
        Self::try_new_with_height(lon, lat, 0.0)
    }

    pub fn try_new_with_height(lon: f64, lat: f64, height: f64) -> Result<Self> {
        if lon.is_nan() || lat.is_nan() || height.is_nan() {
            return Err(GridError::invalid_argument("coordinate is NaN"));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(GridError::invalid_argument(format!(
                "longitude {lon} out of range [-180, 180]"
            )));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GridError::invalid_argument(format!(
                "latitude {lat} out of range [-90, 90]"
            )));
        }
        if !height.is_finite() {
            return Err(GridError::invalid_argument("height is not finite"));
        }
        Ok(GeoPoint { lon, lat, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_longitude() {
        assert!(GeoPoint::try_new(181.0, 0.0).is_err());
    }

    #[test]
    fn rejects_nan_latitude() {
        assert!(GeoPoint::try_new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn accepts_boundary_values() {
        assert!(GeoPoint::try_new(180.0, 90.0).is_ok());
        assert!(GeoPoint::try_new(-180.0, -90.0).is_ok());
    }
}
