//! Formula evaluation
//!
//! Walks an [`Expression`] tree for one date and location and produces a
//! [`Value`]. Times are `Option`-valued throughout: an instant the sun never
//! reaches is `None`, not an error, and combinators decide how `None`
//! propagates. Errors are reserved for misconfiguration (unknown references,
//! cycles) and type misuse inside the formula.

pub mod context;
mod day_boundary;
mod functions;

pub use context::EvaluationContext;

use crate::ast::{BinaryOperator, ComparisonOperator, Expression, ExpressionKind};
use crate::astro::{self, GEOMETRIC_ZENITH};
use crate::error::{ZmanError, ZmanResult};
use crate::keywords::{ConditionVar, Primitive};
use crate::parser;
use crate::resolver::{ReferenceResolver, ResolutionState};
use crate::TimeValue;
use chrono::{Datelike, NaiveDate, TimeDelta};

/// Result of evaluating a (sub)expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Time(TimeValue),
    Duration(TimeDelta),
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Time(_) => "time",
            Value::Duration(_) => "duration",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
        }
    }
}

/// Tree-walking evaluator for one formula against one context.
pub struct Evaluator<'a> {
    ctx: &'a EvaluationContext,
    resolver: &'a dyn ReferenceResolver,
    state: ResolutionState,
}

impl<'a> Evaluator<'a> {
    pub fn new(ctx: &'a EvaluationContext, resolver: &'a dyn ReferenceResolver) -> Self {
        Evaluator {
            ctx,
            resolver,
            state: ResolutionState::new(),
        }
    }

    pub(crate) fn with_state(
        ctx: &'a EvaluationContext,
        resolver: &'a dyn ReferenceResolver,
        state: ResolutionState,
    ) -> Self {
        Evaluator {
            ctx,
            resolver,
            state,
        }
    }

    pub(crate) fn context(&self) -> &'a EvaluationContext {
        self.ctx
    }

    pub fn evaluate(&mut self, expr: &Expression) -> ZmanResult<Value> {
        match &expr.kind {
            ExpressionKind::Number(n) => Ok(Value::Number(*n)),
            ExpressionKind::Duration(seconds) => Ok(Value::Duration(TimeDelta::seconds(*seconds))),
            ExpressionKind::Text(s) => Ok(Value::Text(s.clone())),
            ExpressionKind::DateLiteral { day, month } => self.date_ordinal(*day, *month),
            ExpressionKind::Primitive(p) => Ok(Value::Time(self.primitive(*p))),
            ExpressionKind::ConditionVar(var) => self.condition_var(*var),
            ExpressionKind::Direction(d) => Err(ZmanError::engine(format!(
                "direction '{d}' is only meaningful as a function argument"
            ))),
            ExpressionKind::Base(base) => Err(ZmanError::engine(format!(
                "day base '{}' is only meaningful as a function argument",
                base.name
            ))),
            ExpressionKind::Reference(key) => self.reference(key),
            ExpressionKind::FunctionCall { name, args } => {
                functions::call(self, name, args, expr.span)
            }
            ExpressionKind::BinaryOp { op, left, right } => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                binary_op(*op, l, r)
            }
            ExpressionKind::Comparison { op, left, right } => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                compare(*op, l, r)
            }
            ExpressionKind::LogicalAnd(a, b) => {
                if !self.boolean(a)? {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(self.boolean(b)?))
            }
            ExpressionKind::LogicalOr(a, b) => {
                if self.boolean(a)? {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.boolean(b)?))
            }
            ExpressionKind::Not(inner) => Ok(Value::Boolean(!self.boolean(inner)?)),
            ExpressionKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.boolean(condition)? {
                    self.evaluate(then_branch)
                } else if let Some(alt) = else_branch {
                    self.evaluate(alt)
                } else {
                    // No else branch: the zman does not apply under this
                    // condition, same as an unreachable sun angle.
                    Ok(Value::Time(None))
                }
            }
        }
    }

    fn boolean(&mut self, expr: &Expression) -> ZmanResult<bool> {
        match self.evaluate(expr)? {
            Value::Boolean(b) => Ok(b),
            other => Err(ZmanError::engine(format!(
                "condition must be a boolean, got {}",
                other.type_name()
            ))),
        }
    }

    fn primitive(&self, p: Primitive) -> TimeValue {
        let ctx = self.ctx;
        let times = ctx.sun_times();
        match p {
            Primitive::VisibleSunrise => times.sunrise,
            Primitive::VisibleSunset => times.sunset,
            Primitive::GeometricSunrise => {
                astro::crossings_at_zenith(ctx.date, &ctx.location, GEOMETRIC_ZENITH).dawn
            }
            Primitive::GeometricSunset => {
                astro::crossings_at_zenith(ctx.date, &ctx.location, GEOMETRIC_ZENITH).dusk
            }
            Primitive::SolarNoon => Some(times.solar_noon),
            Primitive::SolarMidnight => Some(times.solar_noon + TimeDelta::hours(12)),
            Primitive::CivilDawn => self.depression(96.0).dawn,
            Primitive::CivilDusk => self.depression(96.0).dusk,
            Primitive::NauticalDawn => self.depression(102.0).dawn,
            Primitive::NauticalDusk => self.depression(102.0).dusk,
            Primitive::AstronomicalDawn => self.depression(108.0).dawn,
            Primitive::AstronomicalDusk => self.depression(108.0).dusk,
        }
    }

    fn depression(&self, zenith: f64) -> astro::HorizonCrossings {
        astro::crossings_at_zenith(self.ctx.date, &self.ctx.location, zenith)
    }

    fn condition_var(&self, var: ConditionVar) -> ZmanResult<Value> {
        let ctx = self.ctx;
        Ok(match var {
            ConditionVar::Latitude => Value::Number(ctx.location.latitude),
            ConditionVar::Longitude => Value::Number(ctx.location.longitude),
            ConditionVar::Elevation => Value::Number(ctx.location.elevation),
            ConditionVar::DayLength => match ctx.sun_times().day_length() {
                Some(len) => Value::Duration(len),
                None => {
                    return Err(ZmanError::engine(
                        "day_length is not calculable at this location and date",
                    ))
                }
            },
            ConditionVar::Month => Value::Number(ctx.date.month() as f64),
            ConditionVar::Day => Value::Number(ctx.date.day() as f64),
            ConditionVar::DayOfYear | ConditionVar::Date => {
                Value::Number(ctx.date.ordinal() as f64)
            }
            ConditionVar::Season => Value::Text(ctx.season().to_string()),
        })
    }

    fn date_ordinal(&self, day: u32, month: u32) -> ZmanResult<Value> {
        NaiveDate::from_ymd_opt(self.ctx.date.year(), month, day)
            .map(|d| Value::Number(d.ordinal() as f64))
            .ok_or_else(|| {
                ZmanError::engine(format!("date {day}-{month} does not exist this year"))
            })
    }

    fn reference(&mut self, key: &str) -> ZmanResult<Value> {
        if let Some(cached) = self.state.cached(key) {
            return Ok(Value::Time(cached));
        }
        let source = self
            .resolver
            .formula(key)
            .ok_or_else(|| ZmanError::UnknownReference {
                key: key.to_string(),
            })?
            .to_string();
        self.state.enter(key)?;
        let result = parser::parse(&source).and_then(|expr| self.evaluate(&expr));
        self.state.leave();
        match result? {
            Value::Time(time) => {
                self.state.cache(key, time);
                Ok(Value::Time(time))
            }
            other => Err(ZmanError::engine(format!(
                "reference @{key} produced a {} instead of a time",
                other.type_name()
            ))),
        }
    }
}

fn binary_op(op: BinaryOperator, left: Value, right: Value) -> ZmanResult<Value> {
    use BinaryOperator::*;
    use Value::*;
    match (op, left, right) {
        (Add, Time(t), Duration(d)) | (Add, Duration(d), Time(t)) => Ok(Time(t.map(|t| t + d))),
        (Subtract, Time(t), Duration(d)) => Ok(Time(t.map(|t| t - d))),
        (Subtract, Time(Some(a)), Time(Some(b))) => Ok(Duration(a - b)),
        (Subtract, Time(_), Time(_)) => Err(ZmanError::engine(
            "cannot take the difference of a time that is not calculable",
        )),
        (Add, Duration(a), Duration(b)) => Ok(Duration(a + b)),
        (Subtract, Duration(a), Duration(b)) => Ok(Duration(a - b)),
        (Multiply, Duration(d), Number(n)) | (Multiply, Number(n), Duration(d)) => {
            Ok(Duration(scale_delta(d, n)))
        }
        (Divide, Duration(d), Number(n)) => {
            if n == 0.0 {
                return Err(ZmanError::engine("division by zero"));
            }
            Ok(Duration(scale_delta(d, 1.0 / n)))
        }
        (Add, Number(a), Number(b)) => Ok(Number(a + b)),
        (Subtract, Number(a), Number(b)) => Ok(Number(a - b)),
        (Multiply, Number(a), Number(b)) => Ok(Number(a * b)),
        (Divide, Number(a), Number(b)) => {
            if b == 0.0 {
                return Err(ZmanError::engine("division by zero"));
            }
            Ok(Number(a / b))
        }
        (op, left, right) => Err(ZmanError::engine(format!(
            "cannot apply '{}' to {} and {}",
            op.as_str(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn compare(op: ComparisonOperator, left: Value, right: Value) -> ZmanResult<Value> {
    use ComparisonOperator::*;
    let result = match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => numeric_compare(op, *a, *b),
        (Value::Duration(a), Value::Duration(b)) => {
            numeric_compare(op, a.num_seconds() as f64, b.num_seconds() as f64)
        }
        (Value::Time(Some(a)), Value::Time(Some(b))) => {
            numeric_compare(op, a.timestamp() as f64, b.timestamp() as f64)
        }
        (Value::Time(None), Value::Time(_)) | (Value::Time(_), Value::Time(None)) => {
            return Err(ZmanError::engine(
                "cannot compare a time that is not calculable",
            ))
        }
        (Value::Text(a), Value::Text(b)) => match op {
            Equal => a == b,
            NotEqual => a != b,
            _ => {
                return Err(ZmanError::engine(
                    "text values only support == and != comparisons",
                ))
            }
        },
        (Value::Boolean(a), Value::Boolean(b)) => match op {
            Equal => a == b,
            NotEqual => a != b,
            _ => {
                return Err(ZmanError::engine(
                    "boolean values only support == and != comparisons",
                ))
            }
        },
        _ => {
            return Err(ZmanError::engine(format!(
                "cannot compare {} with {}",
                left.type_name(),
                right.type_name()
            )))
        }
    };
    Ok(Value::Boolean(result))
}

fn numeric_compare(op: ComparisonOperator, a: f64, b: f64) -> bool {
    use ComparisonOperator::*;
    match op {
        Greater => a > b,
        Less => a < b,
        GreaterEq => a >= b,
        LessEq => a <= b,
        Equal => a == b,
        NotEqual => a != b,
    }
}

pub(crate) fn scale_delta(delta: TimeDelta, factor: f64) -> TimeDelta {
    TimeDelta::seconds((delta.num_seconds() as f64 * factor).round() as i64)
}

/// Evaluate a parsed expression.
pub fn evaluate(
    expr: &Expression,
    ctx: &EvaluationContext,
    resolver: &dyn ReferenceResolver,
) -> ZmanResult<Value> {
    Evaluator::new(ctx, resolver).evaluate(expr)
}

/// Parse and evaluate a formula expected to produce a time.
pub fn evaluate_formula(
    source: &str,
    ctx: &EvaluationContext,
    resolver: &dyn ReferenceResolver,
) -> ZmanResult<TimeValue> {
    let expr = parser::parse(source)?;
    match evaluate(&expr, ctx, resolver)? {
        Value::Time(time) => Ok(time),
        other => Err(ZmanError::engine(format!(
            "formula produced a {} instead of a time",
            other.type_name()
        ))),
    }
}
