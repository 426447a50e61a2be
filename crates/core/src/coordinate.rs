//! Geographic position of the player.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A validated WGS84 position in degrees (altitude in meters, optional).
///
/// Created once per run (usually from geocoding) and read-only afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
}

impl ValueObject for Coordinate {}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// Out-of-range input is an error; it is never wrapped around.
    pub fn new(latitude: f64, longitude: f64, altitude: Option<f64>) -> DomainResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::invalid_coordinate(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::invalid_coordinate(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }
        if let Some(alt) = altitude {
            if !alt.is_finite() {
                return Err(DomainError::invalid_coordinate(format!(
                    "altitude {alt} is not finite"
                )));
            }
        }
        Ok(Self {
            latitude,
            longitude,
            altitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }
}

impl core::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)?;
        if let Some(alt) = self.altitude {
            write!(f, " ({alt:.1} m)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_boundaries() {
        assert!(Coordinate::new(90.0, 180.0, None).is_ok());
        assert!(Coordinate::new(-90.0, -180.0, Some(12.5)).is_ok());
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let err = Coordinate::new(90.5, 0.0, None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidCoordinate(_)));
    }

    #[test]
    fn rejects_out_of_range_longitude_instead_of_wrapping() {
        let err = Coordinate::new(0.0, 181.0, None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidCoordinate(_)));
    }

    #[test]
    fn rejects_nan() {
        assert!(Coordinate::new(f64::NAN, 0.0, None).is_err());
        assert!(Coordinate::new(0.0, 0.0, Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn display_is_compact() {
        let c = Coordinate::new(35.681236, 139.767125, None).unwrap();
        assert_eq!(c.to_string(), "35.681236, 139.767125");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: every in-range pair is accepted and read back unchanged.
            #[test]
            fn valid_range_round_trips(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
                let c = Coordinate::new(lat, lng, None).unwrap();
                prop_assert_eq!(c.latitude(), lat);
                prop_assert_eq!(c.longitude(), lng);
            }

            /// Property: latitudes beyond the poles are always rejected.
            #[test]
            fn beyond_poles_rejected(lat in 90.000_001f64..1.0e6, sign in prop::bool::ANY) {
                let lat = if sign { lat } else { -lat };
                prop_assert!(Coordinate::new(lat, 0.0, None).is_err());
            }
        }
    }
}
