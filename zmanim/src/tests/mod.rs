//! Integration-style tests over the whole pipeline: parse, validate,
//! evaluate. Fixture locations cover a mid-latitude city, a high-latitude
//! city where steep angles fail in summer, and a polar location.

mod batch;
mod evaluation;

use crate::evaluator::EvaluationContext;
use crate::{GeoLocation, TimeValue, Value, ZmanResult};
use chrono::NaiveDate;
use std::collections::HashMap;

pub(crate) fn jerusalem() -> GeoLocation {
    GeoLocation::new(31.7683, 35.2137, chrono_tz::Asia::Jerusalem)
}

pub(crate) fn manchester() -> GeoLocation {
    GeoLocation::new(53.48, -2.24, chrono_tz::Europe::London)
}

pub(crate) fn lakewood() -> GeoLocation {
    GeoLocation::new(40.0828, -74.2094, chrono_tz::America::New_York)
}

pub(crate) fn tromso() -> GeoLocation {
    GeoLocation::new(70.0, 19.0, chrono_tz::Europe::Oslo)
}

pub(crate) fn equinox() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 21).unwrap()
}

pub(crate) fn summer_solstice() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 21).unwrap()
}

pub(crate) fn winter_solstice() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 21).unwrap()
}

pub(crate) fn ctx(date: NaiveDate, location: GeoLocation) -> EvaluationContext {
    EvaluationContext::new(date, location)
}

pub(crate) fn refs(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Evaluate with no references available.
pub(crate) fn eval(source: &str, context: &EvaluationContext) -> ZmanResult<Value> {
    crate::parse(source).and_then(|expr| crate::evaluate(&expr, context, &crate::NoReferences))
}

/// Evaluate a formula that must produce a time, panicking on errors.
pub(crate) fn eval_time(source: &str, context: &EvaluationContext) -> TimeValue {
    match eval(source, context) {
        Ok(Value::Time(time)) => time,
        other => panic!("{source} did not produce a time: {other:?}"),
    }
}
