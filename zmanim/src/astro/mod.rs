//! Solar position and horizon-crossing calculations.
//!
//! `solar` holds the bare NOAA arithmetic (declination, equation of time,
//! hour angle); `sun_times` maps those onto civil timestamps for a
//! [`GeoLocation`](crate::location::GeoLocation) and date. All crossing
//! times are optional: near the poles the sun may never reach a requested
//! zenith, which surfaces as `None` rather than an error.

mod solar;
mod sun_times;

pub use solar::{elevation_dip_deg, GEOMETRIC_ZENITH, REFRACTION_DEG};
pub use sun_times::{
    crossings_at_zenith, seasonal_crossings, solar_noon, sun_times, visible_zenith,
    HorizonCrossings, SunTimes,
};
