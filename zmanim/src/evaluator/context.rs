//! Evaluation context: the date and place a formula is asked about.

use crate::astro::{self, SunTimes};
use crate::location::GeoLocation;
use chrono::{Datelike, NaiveDate};
use std::cell::OnceCell;

/// One (date, location) pair. The visible sun times are computed at most
/// once per context and shared by everything evaluated against it.
pub struct EvaluationContext {
    pub date: NaiveDate,
    pub location: GeoLocation,
    sun_times: OnceCell<SunTimes>,
}

impl EvaluationContext {
    pub fn new(date: NaiveDate, location: GeoLocation) -> Self {
        EvaluationContext {
            date,
            location,
            sun_times: OnceCell::new(),
        }
    }

    pub fn sun_times(&self) -> &SunTimes {
        self.sun_times
            .get_or_init(|| astro::sun_times(self.date, &self.location))
    }

    /// Meteorological season, flipped for the southern hemisphere.
    pub fn season(&self) -> &'static str {
        let north = match self.date.month() {
            3..=5 => "spring",
            6..=8 => "summer",
            9..=11 => "autumn",
            _ => "winter",
        };
        if self.location.latitude >= 0.0 {
            north
        } else {
            match north {
                "spring" => "autumn",
                "summer" => "winter",
                "autumn" => "spring",
                _ => "summer",
            }
        }
    }
}
