//! Day-boundary resolution for the proportional-time functions.

use super::{scale_delta, Evaluator, Value};
use crate::ast::BaseExpr;
use crate::astro::{self, elevation_dip_deg, GEOMETRIC_ZENITH};
use crate::error::{ZmanError, ZmanResult};
use crate::keywords::BaseName;
use crate::TimeValue;
use chrono::TimeDelta;

/// The halachic day of one base: where it starts and where it ends. Either
/// side is `None` when its defining event does not occur.
pub(super) struct DayBoundary {
    pub start: TimeValue,
    pub end: TimeValue,
}

impl DayBoundary {
    pub fn day_length(&self) -> Option<TimeDelta> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

pub(super) fn resolve(eval: &mut Evaluator, base: &BaseExpr) -> ZmanResult<DayBoundary> {
    let ctx = eval.context();
    let times = *ctx.sun_times();
    let boundary = match base.name {
        BaseName::Gra => DayBoundary {
            start: times.sunrise,
            end: times.sunset,
        },
        BaseName::Mga60 => fixed_offset(&times, 60),
        BaseName::Mga72 => fixed_offset(&times, 72),
        BaseName::Mga90 => fixed_offset(&times, 90),
        BaseName::Mga96 => fixed_offset(&times, 96),
        BaseName::Mga120 => fixed_offset(&times, 120),
        BaseName::Mga72Zmanis => day_fraction(&times, 10.0),
        BaseName::Mga90Zmanis => day_fraction(&times, 8.0),
        BaseName::Mga96Zmanis => day_fraction(&times, 7.5),
        BaseName::Mga16_1 => depression(eval, 16.1),
        BaseName::Mga18 => depression(eval, 18.0),
        BaseName::Mga19_8 => depression(eval, 19.8),
        BaseName::Mga26 => depression(eval, 26.0),
        BaseName::BaalHatanya => depression(eval, 1.583),
        BaseName::AteretTorah => DayBoundary {
            start: times.sunrise,
            end: times.sunset.map(|set| set + TimeDelta::minutes(40)),
        },
        BaseName::Custom => return custom(eval, base),
    };
    Ok(boundary)
}

/// Sunrise minus N clock minutes to sunset plus N clock minutes.
fn fixed_offset(times: &astro::SunTimes, minutes: i64) -> DayBoundary {
    let offset = TimeDelta::minutes(minutes);
    DayBoundary {
        start: times.sunrise.map(|rise| rise - offset),
        end: times.sunset.map(|set| set + offset),
    }
}

/// Sunrise and sunset pushed out by a fraction of the visible day.
fn day_fraction(times: &astro::SunTimes, divisor: f64) -> DayBoundary {
    match times.day_length() {
        Some(len) => {
            let offset = scale_delta(len, 1.0 / divisor);
            DayBoundary {
                start: times.sunrise.map(|rise| rise - offset),
                end: times.sunset.map(|set| set + offset),
            }
        }
        None => DayBoundary {
            start: None,
            end: None,
        },
    }
}

/// Depression-angle dawn to depression-angle dusk, corrected for observer
/// elevation but not refraction.
fn depression(eval: &Evaluator, angle: f64) -> DayBoundary {
    let ctx = eval.context();
    let zenith = GEOMETRIC_ZENITH + angle + elevation_dip_deg(ctx.location.elevation);
    let crossings = astro::crossings_at_zenith(ctx.date, &ctx.location, zenith);
    DayBoundary {
        start: crossings.dawn,
        end: crossings.dusk,
    }
}

fn custom(eval: &mut Evaluator, base: &BaseExpr) -> ZmanResult<DayBoundary> {
    if base.custom_args.len() != 2 {
        return Err(ZmanError::Arity {
            function: "custom".to_string(),
            expected: "exactly 2".to_string(),
            got: base.custom_args.len(),
            span: None,
        });
    }
    let start = boundary_time(eval, &base.custom_args[0])?;
    let end = boundary_time(eval, &base.custom_args[1])?;
    Ok(DayBoundary { start, end })
}

fn boundary_time(
    eval: &mut Evaluator,
    expr: &crate::ast::Expression,
) -> ZmanResult<TimeValue> {
    match eval.evaluate(expr)? {
        Value::Time(time) => Ok(time),
        other => Err(ZmanError::engine(format!(
            "custom() boundaries must be times, got {}",
            other.type_name()
        ))),
    }
}
