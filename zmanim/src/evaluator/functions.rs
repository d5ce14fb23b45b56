//! Built-in function dispatch.

use super::day_boundary;
use super::{scale_delta, Evaluator, Value};
use crate::ast::{BaseExpr, Expression, ExpressionKind, Span};
use crate::astro::{self, elevation_dip_deg, GEOMETRIC_ZENITH, REFRACTION_DEG};
use crate::error::{ZmanError, ZmanResult};
use crate::keywords::{function_arity, Direction};
use crate::TimeValue;

pub(super) fn call(
    eval: &mut Evaluator,
    name: &str,
    args: &[Expression],
    span: Option<Span>,
) -> ZmanResult<Value> {
    let (min, max) = function_arity(name).ok_or_else(|| ZmanError::UnknownFunction {
        name: name.to_string(),
        span,
    })?;
    let ok = args.len() >= min && max.map_or(true, |max| args.len() <= max);
    if !ok {
        let expected = match max {
            Some(max) if max == min => format!("exactly {min}"),
            Some(max) => format!("{min} to {max}"),
            None => format!("at least {min}"),
        };
        return Err(ZmanError::Arity {
            function: name.to_string(),
            expected,
            got: args.len(),
            span,
        });
    }

    match name {
        "solar" => solar(eval, args),
        "seasonal_solar" => seasonal_solar(eval, args),
        "proportional_hours" => proportional_hours(eval, args),
        "proportional_minutes" => proportional_minutes(eval, args),
        "midpoint" => midpoint(eval, args),
        "first_valid" => first_valid(eval, args),
        "earlier_of" => earlier_or_later(eval, args, true),
        "later_of" => earlier_or_later(eval, args, false),
        _ => Err(ZmanError::UnknownFunction {
            name: name.to_string(),
            span,
        }),
    }
}

/// `solar(angle, direction)`: the instant the sun is `angle` degrees below
/// the horizon. Visible directions add refraction and elevation dip to the
/// zenith so that `solar(0, *_visible_*)` lands on visible sunrise/sunset,
/// geometric directions use the bare angle.
fn solar(eval: &mut Evaluator, args: &[Expression]) -> ZmanResult<Value> {
    let angle = expect_number(eval, &args[0], "solar() angle")?;
    let direction = expect_direction(&args[1], "solar")?;
    let ctx = eval.context();
    let mut zenith = GEOMETRIC_ZENITH + angle;
    if direction.is_visible() {
        zenith += REFRACTION_DEG + elevation_dip_deg(ctx.location.elevation);
    }
    let crossings = astro::crossings_at_zenith(ctx.date, &ctx.location, zenith);
    Ok(Value::Time(pick(crossings, direction)))
}

/// `seasonal_solar(angle, direction)`: the equinox offset for `angle`,
/// scaled by the length of today's half-day.
fn seasonal_solar(eval: &mut Evaluator, args: &[Expression]) -> ZmanResult<Value> {
    let angle = expect_number(eval, &args[0], "seasonal_solar() angle")?;
    let direction = expect_direction(&args[1], "seasonal_solar")?;
    if !direction.is_day_edge() {
        return Err(ZmanError::engine(format!(
            "seasonal_solar() direction must be before sunrise or after sunset, got '{direction}'"
        )));
    }
    let ctx = eval.context();
    let crossings =
        astro::seasonal_crossings(ctx.date, &ctx.location, angle, direction.is_visible());
    Ok(Value::Time(pick(crossings, direction)))
}

/// `proportional_hours(hours, base)`: `hours` twelfths of the base day
/// after its start.
fn proportional_hours(eval: &mut Evaluator, args: &[Expression]) -> ZmanResult<Value> {
    let hours = expect_number(eval, &args[0], "proportional_hours() count")?;
    let base = expect_base(&args[1], "proportional_hours")?;
    let boundary = day_boundary::resolve(eval, base)?;
    let time = match (boundary.start, boundary.day_length()) {
        (Some(start), Some(len)) => Some(start + scale_delta(len, hours / 12.0)),
        _ => None,
    };
    Ok(Value::Time(time))
}

/// `proportional_minutes(minutes, direction, base)`: `minutes` scaled by
/// the base day against a 12-hour standard, applied before sunrise or
/// after sunset.
fn proportional_minutes(eval: &mut Evaluator, args: &[Expression]) -> ZmanResult<Value> {
    let minutes = expect_number(eval, &args[0], "proportional_minutes() count")?;
    let direction = expect_direction(&args[1], "proportional_minutes")?;
    if !direction.is_day_edge() {
        return Err(ZmanError::engine(format!(
            "proportional_minutes() direction must be before sunrise or after sunset, got '{direction}'"
        )));
    }
    let base = expect_base(&args[2], "proportional_minutes")?;
    let boundary = day_boundary::resolve(eval, base)?;
    let Some(len) = boundary.day_length() else {
        return Ok(Value::Time(None));
    };
    let offset = scale_delta(len, minutes / 720.0);

    let ctx = eval.context();
    let anchor = if direction.is_visible() {
        let times = ctx.sun_times();
        if direction.is_morning() {
            times.sunrise
        } else {
            times.sunset
        }
    } else {
        let crossings = astro::crossings_at_zenith(ctx.date, &ctx.location, GEOMETRIC_ZENITH);
        pick(crossings, direction)
    };
    let time = anchor.map(|anchor| {
        if direction.is_morning() {
            anchor - offset
        } else {
            anchor + offset
        }
    });
    Ok(Value::Time(time))
}

/// `midpoint(a, b)`: halfway between two times; `None` if either is.
fn midpoint(eval: &mut Evaluator, args: &[Expression]) -> ZmanResult<Value> {
    let a = expect_time(eval, &args[0], "midpoint()")?;
    let b = expect_time(eval, &args[1], "midpoint()")?;
    let time = match (a, b) {
        (Some(a), Some(b)) => Some(a + scale_delta(b - a, 0.5)),
        _ => None,
    };
    Ok(Value::Time(time))
}

/// `first_valid(a, b, ...)`: the first argument that produces a defined
/// value. Arguments that are `None` or fail with a calculation error are
/// skipped; configuration errors (unknown references, cycles) still abort.
fn first_valid(eval: &mut Evaluator, args: &[Expression]) -> ZmanResult<Value> {
    for arg in args {
        match eval.evaluate(arg) {
            Ok(Value::Time(None)) => continue,
            Ok(value) => return Ok(value),
            Err(err) if err.is_fatal() => return Err(err),
            Err(_) => continue,
        }
    }
    Ok(Value::Time(None))
}

/// `earlier_of`/`later_of`: pick one of two times. A single undefined
/// operand falls back to the defined one.
fn earlier_or_later(eval: &mut Evaluator, args: &[Expression], earlier: bool) -> ZmanResult<Value> {
    let a = expect_time(eval, &args[0], "earlier_of()/later_of()")?;
    let b = expect_time(eval, &args[1], "earlier_of()/later_of()")?;
    let time = match (a, b) {
        (Some(a), Some(b)) => {
            if earlier == (a <= b) {
                Some(a)
            } else {
                Some(b)
            }
        }
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    };
    Ok(Value::Time(time))
}

fn pick(crossings: astro::HorizonCrossings, direction: Direction) -> TimeValue {
    if direction.is_morning() {
        crossings.dawn
    } else {
        crossings.dusk
    }
}

fn expect_number(eval: &mut Evaluator, expr: &Expression, what: &str) -> ZmanResult<f64> {
    match eval.evaluate(expr)? {
        Value::Number(n) => Ok(n),
        other => Err(ZmanError::engine(format!(
            "{what} must be a number, got {}",
            other.type_name()
        ))),
    }
}

fn expect_time(eval: &mut Evaluator, expr: &Expression, what: &str) -> ZmanResult<TimeValue> {
    match eval.evaluate(expr)? {
        Value::Time(time) => Ok(time),
        other => Err(ZmanError::engine(format!(
            "{what} arguments must be times, got {}",
            other.type_name()
        ))),
    }
}

fn expect_direction(expr: &Expression, function: &str) -> ZmanResult<Direction> {
    match &expr.kind {
        ExpressionKind::Direction(direction) => Ok(*direction),
        other => Err(ZmanError::UnknownKeyword {
            keyword: keyword_text(other),
            expected: format!("a direction keyword for {function}()"),
            span: expr.span,
        }),
    }
}

fn expect_base<'e>(expr: &'e Expression, function: &str) -> ZmanResult<&'e BaseExpr> {
    match &expr.kind {
        ExpressionKind::Base(base) => Ok(base),
        other => Err(ZmanError::UnknownKeyword {
            keyword: keyword_text(other),
            expected: format!("a day base keyword for {function}()"),
            span: expr.span,
        }),
    }
}

fn keyword_text(kind: &ExpressionKind) -> String {
    Expression::unspanned(kind.clone()).to_source()
}
