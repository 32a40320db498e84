//! Radius-based permitted-location check

use thiserror::Error;

/// Mean Earth radius used by the Haversine formula
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid coordinates ({lat}, {lng})")]
pub struct InvalidCoordinates {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Latitude in [-90, 90], longitude in [-180, 180], both finite
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidCoordinates> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(InvalidCoordinates { lat, lng })
        }
    }
}

/// Great-circle distance in meters
pub fn haversine_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    EARTH_RADIUS_M * c
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("location is {distance_m:.1} m from the office, allowed radius is {radius_m:.1} m")]
pub struct GeofenceViolation {
    pub distance_m: f64,
    pub radius_m: f64,
}

/// Office location and the allowed check-in radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geofence {
    pub center: GeoPoint,
    pub radius_m: f64,
}

impl Geofence {
    /// `None` unless the radius is a positive finite number
    pub fn new(center: GeoPoint, radius_m: f64) -> Option<Self> {
        (radius_m.is_finite() && radius_m > 0.0).then_some(Self { center, radius_m })
    }

    /// Distance from the center; a point exactly on the radius is inside
    pub fn check(&self, point: GeoPoint) -> Result<f64, GeofenceViolation> {
        let distance_m = haversine_distance_m(self.center, point);
        if distance_m <= self.radius_m {
            Ok(distance_m)
        } else {
            Err(GeofenceViolation {
                distance_m,
                radius_m: self.radius_m,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn test_identical_points_are_zero() {
        let monas = p(-6.175392, 106.827153);
        assert_eq!(haversine_distance_m(monas, monas), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = p(-6.175392, 106.827153);
        let b = p(-6.194960, 106.823030);
        assert_eq!(haversine_distance_m(a, b), haversine_distance_m(b, a));
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_distance_m(p(0.0, 0.0), p(1.0, 0.0));
        let expected = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        assert!((d - expected).abs() < 1e-6, "{d} vs {expected}");
    }

    #[test]
    fn test_antipodal_points() {
        let d = haversine_distance_m(p(0.0, 0.0), p(0.0, 180.0));
        assert!((d - EARTH_RADIUS_M * std::f64::consts::PI).abs() < 1e-3);
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let center = p(-6.2, 106.8);
        let point = p(-6.2009, 106.8);
        let d = haversine_distance_m(center, point);

        let exact = Geofence::new(center, d).unwrap();
        assert_eq!(exact.check(point), Ok(d));

        let tighter = Geofence::new(center, d - 0.001).unwrap();
        let violation = tighter.check(point).unwrap_err();
        assert_eq!(violation.distance_m, d);
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(GeoPoint::new(90.5, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -180.1).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_non_positive_radius_disables_geofence() {
        assert!(Geofence::new(p(0.0, 0.0), 0.0).is_none());
        assert!(Geofence::new(p(0.0, 0.0), -5.0).is_none());
        assert!(Geofence::new(p(0.0, 0.0), f64::INFINITY).is_none());
    }
}
