//! NOAA solar position arithmetic, after Meeus, "Astronomical Algorithms".
//!
//! Everything here works in degrees and minutes-from-UTC-midnight; the
//! mapping to civil timestamps happens in `sun_times`. Accuracy is within
//! about a minute for the latitudes where a crossing exists, which matches
//! the published NOAA calculator.

use chrono::{Datelike, NaiveDate};

/// Atmospheric refraction plus the solar semi-diameter, in degrees.
pub const REFRACTION_DEG: f64 = 0.833;

/// Zenith angle of the geometric horizon.
pub const GEOMETRIC_ZENITH: f64 = 90.0;

/// Apparent dip of the horizon for an observer `elevation_m` meters above
/// sea level, in degrees.
pub fn elevation_dip_deg(elevation_m: f64) -> f64 {
    if elevation_m <= 0.0 {
        0.0
    } else {
        0.0347 * elevation_m.sqrt()
    }
}

/// Solar coordinates for one calendar day, computed at 12:00 UT.
pub(crate) struct SolarDay {
    pub declination_deg: f64,
    pub equation_of_time_min: f64,
}

pub(crate) fn solar_day(date: NaiveDate) -> SolarDay {
    // Julian centuries since J2000.0, at noon UT of the given date.
    let jc = (julian_day(date) + 0.5 - 2451545.0) / 36525.0;

    let mean_long = (280.46646 + jc * (36000.76983 + jc * 0.0003032)).rem_euclid(360.0);
    let mean_anom = 357.52911 + jc * (35999.05029 - 0.0001537 * jc);
    let eccentricity = 0.016708634 - jc * (0.000042037 + 0.0000001267 * jc);

    let anom_rad = mean_anom.to_radians();
    let eq_of_center = anom_rad.sin() * (1.914602 - jc * (0.004817 + 0.000014 * jc))
        + (2.0 * anom_rad).sin() * (0.019993 - 0.000101 * jc)
        + (3.0 * anom_rad).sin() * 0.000289;

    let true_long = mean_long + eq_of_center;
    let omega = (125.04 - 1934.136 * jc).to_radians();
    let apparent_long = true_long - 0.00569 - 0.00478 * omega.sin();

    let mean_obliq = 23.0
        + (26.0 + (21.448 - jc * (46.815 + jc * (0.00059 - jc * 0.001813))) / 60.0) / 60.0;
    let obliq = (mean_obliq + 0.00256 * omega.cos()).to_radians();

    let declination = (obliq.sin() * apparent_long.to_radians().sin()).asin();

    let var_y = (obliq / 2.0).tan().powi(2);
    let long_rad = mean_long.to_radians();
    let eq_of_time_rad = var_y * (2.0 * long_rad).sin() - 2.0 * eccentricity * anom_rad.sin()
        + 4.0 * eccentricity * var_y * anom_rad.sin() * (2.0 * long_rad).cos()
        - 0.5 * var_y * var_y * (4.0 * long_rad).sin()
        - 1.25 * eccentricity * eccentricity * (2.0 * anom_rad).sin();

    SolarDay {
        declination_deg: declination.to_degrees(),
        equation_of_time_min: 4.0 * eq_of_time_rad.to_degrees(),
    }
}

/// Hour angle at which the sun reaches `zenith_deg`, in degrees, or `None`
/// when the sun never crosses that zenith on this day (polar day/night).
pub(crate) fn hour_angle_deg(latitude: f64, declination_deg: f64, zenith_deg: f64) -> Option<f64> {
    let lat = latitude.to_radians();
    let decl = declination_deg.to_radians();
    let cos_ha = (zenith_deg.to_radians().cos() - lat.sin() * decl.sin()) / (lat.cos() * decl.cos());
    if !(-1.0..=1.0).contains(&cos_ha) {
        return None;
    }
    Some(cos_ha.acos().to_degrees())
}

fn julian_day(date: NaiveDate) -> f64 {
    let (year, month) = if date.month() <= 2 {
        (date.year() - 1, date.month() + 12)
    } else {
        (date.year(), date.month())
    };
    let a = (year as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (year as f64 + 4716.0)).floor()
        + (30.6001 * (month as f64 + 1.0)).floor()
        + date.day() as f64
        + b
        - 1524.5
}
