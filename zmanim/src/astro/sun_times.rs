//! Horizon crossings as civil timestamps.

use super::solar::{
    elevation_dip_deg, hour_angle_deg, solar_day, GEOMETRIC_ZENITH, REFRACTION_DEG,
};
use crate::location::GeoLocation;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta};
use chrono_tz::Tz;

/// Morning and evening crossings of one zenith angle. Either side is `None`
/// when the sun never reaches that zenith on the given day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonCrossings {
    pub dawn: Option<DateTime<Tz>>,
    pub dusk: Option<DateTime<Tz>>,
}

impl HorizonCrossings {
    const NONE: HorizonCrossings = HorizonCrossings {
        dawn: None,
        dusk: None,
    };
}

/// The anchor times of one day: visible sunrise and sunset plus solar noon.
/// Noon always exists; sunrise and sunset do not inside polar day or night.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub sunrise: Option<DateTime<Tz>>,
    pub sunset: Option<DateTime<Tz>>,
    pub solar_noon: DateTime<Tz>,
}

impl SunTimes {
    pub fn day_length(&self) -> Option<TimeDelta> {
        match (self.sunrise, self.sunset) {
            (Some(rise), Some(set)) => Some(set - rise),
            _ => None,
        }
    }
}

/// Zenith of the visible horizon: refraction, solar semi-diameter, and the
/// elevation dip of the observer.
pub fn visible_zenith(elevation_m: f64) -> f64 {
    GEOMETRIC_ZENITH + REFRACTION_DEG + elevation_dip_deg(elevation_m)
}

/// Both crossings of an arbitrary zenith angle on one day.
pub fn crossings_at_zenith(
    date: NaiveDate,
    location: &GeoLocation,
    zenith_deg: f64,
) -> HorizonCrossings {
    let day = solar_day(date);
    let noon_min = 720.0 - 4.0 * location.longitude - day.equation_of_time_min;
    match hour_angle_deg(location.latitude, day.declination_deg, zenith_deg) {
        Some(ha) => HorizonCrossings {
            dawn: Some(at_utc_minutes(date, noon_min - 4.0 * ha, location.timezone)),
            dusk: Some(at_utc_minutes(date, noon_min + 4.0 * ha, location.timezone)),
        },
        None => HorizonCrossings::NONE,
    }
}

/// Solar transit. Defined at every latitude.
pub fn solar_noon(date: NaiveDate, location: &GeoLocation) -> DateTime<Tz> {
    let day = solar_day(date);
    let noon_min = 720.0 - 4.0 * location.longitude - day.equation_of_time_min;
    at_utc_minutes(date, noon_min, location.timezone)
}

/// Visible sunrise, sunset, and noon for one day.
pub fn sun_times(date: NaiveDate, location: &GeoLocation) -> SunTimes {
    let crossings = crossings_at_zenith(date, location, visible_zenith(location.elevation));
    SunTimes {
        sunrise: crossings.dawn,
        sunset: crossings.dusk,
        solar_noon: solar_noon(date, location),
    }
}

/// Seasonally scaled depression crossings.
///
/// On the spring equinox the offset between the `angle_deg` crossing and
/// sunrise (or sunset) is measured, then stretched by the ratio of today's
/// half-day to the equinox half-day and applied to today's sunrise/sunset.
/// This keeps high-latitude dawn times proportionate in summer, where a
/// fixed depression angle may not be reached at all.
pub fn seasonal_crossings(
    date: NaiveDate,
    location: &GeoLocation,
    angle_deg: f64,
    visible_anchor: bool,
) -> HorizonCrossings {
    let Some(equinox) = NaiveDate::from_ymd_opt(date.year(), 3, 20) else {
        return HorizonCrossings::NONE;
    };
    let anchor_zenith = if visible_anchor {
        visible_zenith(location.elevation)
    } else {
        GEOMETRIC_ZENITH
    };
    let angle_zenith = GEOMETRIC_ZENITH + angle_deg + elevation_dip_deg(location.elevation);

    let eq_anchor = crossings_at_zenith(equinox, location, anchor_zenith);
    let eq_angle = crossings_at_zenith(equinox, location, angle_zenith);
    let eq_noon = solar_noon(equinox, location);
    let today_anchor = crossings_at_zenith(date, location, anchor_zenith);
    let today_noon = solar_noon(date, location);

    let dawn = match (eq_anchor.dawn, eq_angle.dawn, today_anchor.dawn) {
        (Some(eq_rise), Some(eq_dawn), Some(rise)) => {
            let offset = eq_rise - eq_dawn;
            let ratio = half_day_ratio(today_noon - rise, eq_noon - eq_rise);
            ratio.map(|r| rise - scale(offset, r))
        }
        _ => None,
    };
    let dusk = match (eq_anchor.dusk, eq_angle.dusk, today_anchor.dusk) {
        (Some(eq_set), Some(eq_dusk), Some(set)) => {
            let offset = eq_dusk - eq_set;
            let ratio = half_day_ratio(set - today_noon, eq_set - eq_noon);
            ratio.map(|r| set + scale(offset, r))
        }
        _ => None,
    };
    HorizonCrossings { dawn, dusk }
}

fn half_day_ratio(today: TimeDelta, equinox: TimeDelta) -> Option<f64> {
    let eq_secs = equinox.num_seconds();
    if eq_secs <= 0 {
        return None;
    }
    Some(today.num_seconds() as f64 / eq_secs as f64)
}

fn scale(delta: TimeDelta, ratio: f64) -> TimeDelta {
    TimeDelta::seconds((delta.num_seconds() as f64 * ratio).round() as i64)
}

fn at_utc_minutes(date: NaiveDate, minutes_from_midnight: f64, tz: Tz) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    let instant = midnight + TimeDelta::seconds((minutes_from_midnight * 60.0).round() as i64);
    instant.with_timezone(&tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn jerusalem() -> GeoLocation {
        GeoLocation::new(31.7683, 35.2137, chrono_tz::Asia::Jerusalem)
    }

    #[test]
    fn jerusalem_equinox_sunrise() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 21).unwrap();
        let times = sun_times(date, &jerusalem());
        let sunrise = times.sunrise.unwrap();
        // NOAA gives 05:42 local for this day.
        assert_eq!(sunrise.hour(), 5);
        assert!((sunrise.minute() as i64 - 42).abs() <= 2);
    }

    #[test]
    fn jerusalem_solstice_day_length() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let times = sun_times(date, &jerusalem());
        let len = times.day_length().unwrap();
        // Around 14h12m at this latitude.
        assert!((len.num_minutes() - 852).abs() <= 5);
    }

    #[test]
    fn polar_night_has_no_crossings() {
        let tromso = GeoLocation::new(70.0, 19.0, chrono_tz::Europe::Oslo);
        let date = NaiveDate::from_ymd_opt(2024, 12, 21).unwrap();
        let times = sun_times(date, &tromso);
        assert!(times.sunrise.is_none());
        assert!(times.sunset.is_none());
        assert!(times.day_length().is_none());
    }

    #[test]
    fn noon_defined_even_in_polar_night() {
        let tromso = GeoLocation::new(70.0, 19.0, chrono_tz::Europe::Oslo);
        let date = NaiveDate::from_ymd_opt(2024, 12, 21).unwrap();
        let noon = solar_noon(date, &tromso);
        assert_eq!(noon.hour(), 11);
    }

    #[test]
    fn elevation_widens_the_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 21).unwrap();
        let sea = sun_times(date, &jerusalem());
        let hill = sun_times(date, &jerusalem().with_elevation(800.0));
        assert!(hill.sunrise.unwrap() < sea.sunrise.unwrap());
        assert!(hill.sunset.unwrap() > sea.sunset.unwrap());
    }

    #[test]
    fn dawn_precedes_sunrise() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 21).unwrap();
        let loc = jerusalem();
        let dawn = crossings_at_zenith(date, &loc, GEOMETRIC_ZENITH + 16.1)
            .dawn
            .unwrap();
        let sunrise = sun_times(date, &loc).sunrise.unwrap();
        assert!(dawn < sunrise);
        // 16.1 degrees is roughly 72-80 minutes before sunrise near the equinox.
        let gap = (sunrise - dawn).num_minutes();
        assert!((70..=90).contains(&gap), "gap was {gap} minutes");
    }

    #[test]
    fn seasonal_matches_fixed_angle_near_equinox() {
        let loc = jerusalem();
        let date = NaiveDate::from_ymd_opt(2024, 3, 21).unwrap();
        let seasonal = seasonal_crossings(date, &loc, 16.1, true).dawn.unwrap();
        let fixed = crossings_at_zenith(
            date,
            &loc,
            GEOMETRIC_ZENITH + 16.1 + elevation_dip_deg(loc.elevation),
        )
        .dawn
        .unwrap();
        let diff = (seasonal - fixed).num_minutes().abs();
        assert!(diff <= 2, "seasonal drifted {diff} minutes from fixed");
    }

    #[test]
    fn seasonal_dawn_exists_where_fixed_angle_fails() {
        // Manchester in midsummer: 16.1 degrees is never reached, but the
        // seasonal projection still yields a dawn.
        let manchester = GeoLocation::new(53.48, -2.24, chrono_tz::Europe::London);
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        assert!(
            crossings_at_zenith(date, &manchester, GEOMETRIC_ZENITH + 16.1)
                .dawn
                .is_none()
        );
        let seasonal = seasonal_crossings(date, &manchester, 16.1, true);
        let dawn = seasonal.dawn.unwrap();
        let sunrise = sun_times(date, &manchester).sunrise.unwrap();
        assert!(dawn < sunrise);
    }
}
