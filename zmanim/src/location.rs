//! Observer location for astronomical calculations.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Where on Earth a formula is evaluated. Latitude north-positive,
/// longitude east-positive, elevation in meters above sea level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: f64,
    pub timezone: Tz,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64, timezone: Tz) -> Self {
        GeoLocation {
            latitude,
            longitude,
            elevation: 0.0,
            timezone,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }
}
