//! Attendance: geofenced check-in, lateness, auto-checkout sweep
//!
//! - [`geofence`] - Haversine distance and radius check
//! - [`clock`] - time-of-day rules in the company time zone
//! - [`service`] - check-in/check-out/sweep against the database

pub mod clock;
pub mod geofence;
pub mod service;

pub use geofence::{GeoPoint, Geofence, GeofenceViolation, haversine_distance_m};
