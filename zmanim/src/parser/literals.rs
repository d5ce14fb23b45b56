//! Literal decoding: numbers, duration chains, date literals.

use crate::ast::Span;
use crate::error::{ZmanError, ZmanResult};
use crate::keywords::month_number;

pub(super) fn parse_number(text: &str, span: Option<Span>) -> ZmanResult<f64> {
    text.parse::<f64>()
        .map_err(|_| ZmanError::syntax(format!("invalid number '{text}'"), span))
}

/// Decode a duration chain like `72min`, `1.5h`, `1h 30min`, or `1h30min`
/// into whole seconds. Parts may run together, so the token is scanned as
/// alternating value and unit runs; values round to the nearest second.
pub(super) fn parse_duration(text: &str, span: Option<Span>) -> ZmanResult<i64> {
    let mut total_seconds = 0.0;
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        let value_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if value_len == 0 {
            return Err(ZmanError::syntax(format!("invalid duration '{text}'"), span));
        }
        let (value_text, after_value) = rest.split_at(value_len);
        let value = value_text
            .parse::<f64>()
            .map_err(|_| ZmanError::syntax(format!("invalid duration '{value_text}'"), span))?;
        let unit_len = after_value
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(after_value.len());
        let (unit, after_unit) = after_value.split_at(unit_len);
        let per_unit = match unit {
            "h" | "hr" => 3600.0,
            "m" | "min" => 60.0,
            "s" | "sec" => 1.0,
            "" => {
                return Err(ZmanError::syntax(
                    format!("duration '{value_text}' has no unit"),
                    span,
                ))
            }
            other => {
                return Err(ZmanError::syntax(
                    format!("unknown duration unit '{other}'"),
                    span,
                ))
            }
        };
        total_seconds += value * per_unit;
        rest = after_unit.trim_start();
    }
    Ok(total_seconds.round() as i64)
}

pub(super) fn parse_date_literal(text: &str, span: Option<Span>) -> ZmanResult<(u32, u32)> {
    let (day_text, month_text) = text
        .split_once('-')
        .ok_or_else(|| ZmanError::syntax(format!("invalid date literal '{text}'"), span))?;
    let day = day_text
        .parse::<u32>()
        .map_err(|_| ZmanError::syntax(format!("invalid day in '{text}'"), span))?;
    let month = month_number(month_text)
        .ok_or_else(|| ZmanError::syntax(format!("unknown month in '{text}'"), span))?;
    if day == 0 || day > 31 {
        return Err(ZmanError::syntax(
            format!("day {day} is out of range in '{text}'"),
            span,
        ));
    }
    Ok((day, month))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_part_durations() {
        assert_eq!(parse_duration("72min", None).unwrap(), 72 * 60);
        assert_eq!(parse_duration("2h", None).unwrap(), 7200);
        assert_eq!(parse_duration("90s", None).unwrap(), 90);
        assert_eq!(parse_duration("1.5h", None).unwrap(), 5400);
    }

    #[test]
    fn chained_durations() {
        assert_eq!(parse_duration("1h 30min", None).unwrap(), 5400);
        assert_eq!(parse_duration("2min 15s", None).unwrap(), 135);
    }

    #[test]
    fn chained_durations_without_spaces() {
        assert_eq!(parse_duration("1h30min", None).unwrap(), 5400);
        assert_eq!(parse_duration("2min15s", None).unwrap(), 135);
        assert_eq!(parse_duration("1h30min15s", None).unwrap(), 5415);
        assert!(parse_duration("1h30", None).is_err());
        assert!(parse_duration("1x30min", None).is_err());
    }

    #[test]
    fn date_literals() {
        assert_eq!(parse_date_literal("21-May", None).unwrap(), (21, 5));
        assert_eq!(parse_date_literal("1-Jan", None).unwrap(), (1, 1));
        assert!(parse_date_literal("32-May", None).is_err());
    }
}
