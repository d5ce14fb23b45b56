//! Static validation of formulas.
//!
//! Everything here works without a date or location: syntax, known names,
//! arities, literal argument ranges, rough type agreement, and the shape of
//! the reference graph. A formula that validates cleanly can still come out
//! `None` at runtime; validation only rules out formulas that can never
//! work.

use crate::ast::{Expression, ExpressionKind};
use crate::error::{Diagnostic, ZmanError};
use crate::keywords::{
    self, function_arity, BaseName, ConditionVar, BASE_NAMES, CONDITION_VAR_NAMES,
    DIRECTION_NAMES, FUNCTION_NAMES, PRIMITIVE_NAMES,
};
use crate::parser;
use crate::resolver;
use serde::Serialize;
use std::collections::HashMap;

/// Accepted literal range for `solar()` and `seasonal_solar()` angles.
const ANGLE_RANGE: (f64, f64) = (0.0, 90.0);
/// Accepted literal range for `proportional_hours()`.
const HOURS_RANGE: (f64, f64) = (0.5, 12.0);
/// Accepted literal range for `proportional_minutes()`.
const MINUTES_RANGE: (f64, f64) = (1.0, 200.0);

#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Coarse value categories for static type agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    Time,
    Duration,
    Number,
    Text,
    Boolean,
}

impl ValueType {
    fn name(&self) -> &'static str {
        match self {
            ValueType::Time => "time",
            ValueType::Duration => "duration",
            ValueType::Number => "number",
            ValueType::Text => "text",
            ValueType::Boolean => "boolean",
        }
    }
}

/// Configurable validator. `references` enables undefined-reference and
/// cycle checks; `current_key` is the key the formula under validation will
/// be stored as, so self-reference counts as a cycle.
#[derive(Default)]
pub struct Validator<'a> {
    references: Option<&'a HashMap<String, String>>,
    current_key: Option<&'a str>,
}

impl<'a> Validator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_references(mut self, references: &'a HashMap<String, String>) -> Self {
        self.references = Some(references);
        self
    }

    pub fn with_current_key(mut self, key: &'a str) -> Self {
        self.current_key = Some(key);
        self
    }

    pub fn validate(&self, source: &str) -> ValidationOutcome {
        let mut diagnostics = Vec::new();
        let expr = match parser::parse(source) {
            Ok(expr) => expr,
            Err(err) => {
                diagnostics.push(parse_diagnostic(err));
                return ValidationOutcome {
                    valid: false,
                    diagnostics,
                };
            }
        };

        check_expression(&expr, &mut diagnostics);
        if let Some(kind) = infer_type(&expr) {
            if kind != ValueType::Time {
                diagnostics.push(
                    Diagnostic::new(format!(
                        "formula produces a {} instead of a time",
                        kind.name()
                    ))
                    .with_span(expr.span),
                );
            }
        }
        self.check_references(&expr, source, &mut diagnostics);

        ValidationOutcome {
            valid: diagnostics.is_empty(),
            diagnostics,
        }
    }

    fn check_references(
        &self,
        expr: &Expression,
        source: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let Some(references) = self.references else {
            return;
        };
        for key in expr.references() {
            if Some(key.as_str()) == self.current_key {
                diagnostics.push(Diagnostic::new(format!(
                    "formula may not reference itself as @{key}"
                )));
            } else if !references.contains_key(&key) {
                let mut diag = Diagnostic::new(format!("undefined reference @{key}"));
                let known: Vec<&str> = references.keys().map(String::as_str).collect();
                if let Some(best) = closest(&key, &known) {
                    diag = diag.with_suggestion(format!("did you mean @{best}?"));
                }
                diagnostics.push(diag);
            }
        }

        // Cycle check over the map as it would look with this formula saved.
        let mut graph = references.clone();
        if let Some(key) = self.current_key {
            graph.insert(key.to_string(), source.to_string());
        }
        let (_, cyclic) = resolver::calculation_order(&graph);
        if !cyclic.is_empty() {
            let involved = self
                .current_key
                .map_or(true, |key| cyclic.iter().any(|k| k == key));
            if involved {
                diagnostics.push(Diagnostic::new(format!(
                    "circular reference involving: {}",
                    cyclic.join(", ")
                )));
            }
        }
    }
}

/// Validate a standalone formula.
pub fn validate(source: &str) -> ValidationOutcome {
    Validator::new().validate(source)
}

/// Validate a formula against the reference map it will live in.
pub fn validate_with_references(
    source: &str,
    references: &HashMap<String, String>,
) -> ValidationOutcome {
    Validator::new().with_references(references).validate(source)
}

fn parse_diagnostic(err: ZmanError) -> Diagnostic {
    let span = err.span();
    match err {
        ZmanError::UnknownKeyword { keyword, .. } => {
            let mut candidates: Vec<&str> = Vec::new();
            candidates.extend_from_slice(PRIMITIVE_NAMES);
            candidates.extend_from_slice(DIRECTION_NAMES);
            candidates.extend_from_slice(BASE_NAMES);
            candidates.extend_from_slice(CONDITION_VAR_NAMES);
            candidates.extend_from_slice(FUNCTION_NAMES);
            let mut diag =
                Diagnostic::new(format!("unknown keyword '{keyword}'")).with_span(span);
            if let Some(best) = closest(&keyword, &candidates) {
                diag = diag.with_suggestion(format!("did you mean '{best}'?"));
            }
            diag
        }
        other => Diagnostic::new(other.to_string()).with_span(span),
    }
}

fn check_expression(expr: &Expression, diagnostics: &mut Vec<Diagnostic>) {
    expr.walk(&mut |node| match &node.kind {
        ExpressionKind::FunctionCall { name, args } => {
            check_call(node, name, args, diagnostics)
        }
        ExpressionKind::Base(base) => {
            if base.name == BaseName::Custom && base.custom_args.len() != 2 {
                diagnostics.push(
                    Diagnostic::new(format!(
                        "custom() expects exactly 2 boundaries, got {}",
                        base.custom_args.len()
                    ))
                    .with_span(node.span),
                );
            }
            for arg in &base.custom_args {
                if let Some(kind) = infer_type(arg) {
                    if kind != ValueType::Time {
                        diagnostics.push(
                            Diagnostic::new(format!(
                                "custom() boundaries must be times, got {}",
                                kind.name()
                            ))
                            .with_span(arg.span),
                        );
                    }
                }
            }
        }
        ExpressionKind::Conditional { condition, .. } => {
            if let Some(kind) = infer_type(condition) {
                if kind != ValueType::Boolean {
                    diagnostics.push(
                        Diagnostic::new(format!(
                            "condition must be a boolean, got {}",
                            kind.name()
                        ))
                        .with_span(condition.span),
                    );
                }
            }
        }
        ExpressionKind::BinaryOp { op, left, right } => {
            if let (Some(l), Some(r)) = (infer_type(left), infer_type(right)) {
                if binary_result(*op, l, r).is_none() {
                    diagnostics.push(
                        Diagnostic::new(format!(
                            "cannot apply '{}' to {} and {}",
                            op.as_str(),
                            l.name(),
                            r.name()
                        ))
                        .with_span(node.span),
                    );
                }
            }
        }
        _ => {}
    });
}

fn check_call(
    node: &Expression,
    name: &str,
    args: &[Expression],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some((min, max)) = function_arity(name) else {
        let mut diag = Diagnostic::new(format!("unknown function '{name}'")).with_span(node.span);
        if let Some(best) = closest(name, FUNCTION_NAMES) {
            diag = diag.with_suggestion(format!("did you mean '{best}'?"));
        }
        diagnostics.push(diag);
        return;
    };
    let ok = args.len() >= min && max.map_or(true, |max| args.len() <= max);
    if !ok {
        let expected = match max {
            Some(max) if max == min => format!("exactly {min}"),
            Some(max) => format!("{min} to {max}"),
            None => format!("at least {min}"),
        };
        diagnostics.push(
            Diagnostic::new(format!(
                "{name}() expects {expected} argument(s), got {}",
                args.len()
            ))
            .with_span(node.span),
        );
        return;
    }

    match name {
        "solar" => {
            check_literal_range(name, "angle", &args[0], ANGLE_RANGE, diagnostics);
            check_direction(name, &args[1], false, diagnostics);
        }
        "seasonal_solar" => {
            check_literal_range(name, "angle", &args[0], ANGLE_RANGE, diagnostics);
            check_direction(name, &args[1], true, diagnostics);
        }
        "proportional_hours" => {
            check_literal_range(name, "hour count", &args[0], HOURS_RANGE, diagnostics);
            check_base(name, &args[1], diagnostics);
        }
        "proportional_minutes" => {
            check_literal_range(name, "minute count", &args[0], MINUTES_RANGE, diagnostics);
            check_direction(name, &args[1], true, diagnostics);
            check_base(name, &args[2], diagnostics);
        }
        "midpoint" | "first_valid" | "earlier_of" | "later_of" => {
            for arg in args {
                if let Some(kind) = infer_type(arg) {
                    if kind != ValueType::Time {
                        diagnostics.push(
                            Diagnostic::new(format!(
                                "{name}() arguments must be times, got {}",
                                kind.name()
                            ))
                            .with_span(arg.span),
                        );
                    }
                }
            }
        }
        _ => {}
    }
}

fn check_literal_range(
    function: &str,
    what: &str,
    arg: &Expression,
    (lo, hi): (f64, f64),
    diagnostics: &mut Vec<Diagnostic>,
) {
    match &arg.kind {
        ExpressionKind::Number(n) => {
            if *n < lo || *n > hi {
                diagnostics.push(
                    Diagnostic::new(format!(
                        "{function}() {what} {n} is outside the accepted range {lo} to {hi}"
                    ))
                    .with_span(arg.span),
                );
            }
        }
        other => {
            if let Some(kind) = infer_type(&Expression::unspanned(other.clone())) {
                if kind != ValueType::Number {
                    diagnostics.push(
                        Diagnostic::new(format!(
                            "{function}() {what} must be a number, got {}",
                            kind.name()
                        ))
                        .with_span(arg.span),
                    );
                }
            }
        }
    }
}

fn check_direction(
    function: &str,
    arg: &Expression,
    day_edge_only: bool,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match &arg.kind {
        ExpressionKind::Direction(direction) => {
            if day_edge_only && !direction.is_day_edge() {
                diagnostics.push(
                    Diagnostic::new(format!(
                        "{function}() direction must be before sunrise or after sunset, \
                         got '{direction}'"
                    ))
                    .with_span(arg.span)
                    .with_suggestion(
                        "use before_visible_sunrise or after_visible_sunset".to_string(),
                    ),
                );
            }
        }
        _ => diagnostics.push(
            Diagnostic::new(format!("{function}() expects a direction keyword"))
                .with_span(arg.span)
                .with_suggestion(format!("one of: {}", DIRECTION_NAMES.join(", "))),
        ),
    }
}

fn check_base(function: &str, arg: &Expression, diagnostics: &mut Vec<Diagnostic>) {
    if !matches!(arg.kind, ExpressionKind::Base(_)) {
        diagnostics.push(
            Diagnostic::new(format!("{function}() expects a day base keyword"))
                .with_span(arg.span)
                .with_suggestion(format!("one of: {}", BASE_NAMES.join(", "))),
        );
    }
}

fn infer_type(expr: &Expression) -> Option<ValueType> {
    match &expr.kind {
        ExpressionKind::Number(_) | ExpressionKind::DateLiteral { .. } => Some(ValueType::Number),
        ExpressionKind::Duration(_) => Some(ValueType::Duration),
        ExpressionKind::Text(_) => Some(ValueType::Text),
        ExpressionKind::Primitive(_) | ExpressionKind::Reference(_) => Some(ValueType::Time),
        ExpressionKind::ConditionVar(var) => Some(match var {
            ConditionVar::DayLength => ValueType::Duration,
            ConditionVar::Season => ValueType::Text,
            _ => ValueType::Number,
        }),
        ExpressionKind::Direction(_) | ExpressionKind::Base(_) => None,
        ExpressionKind::FunctionCall { name, .. } => {
            if keywords::is_function(name) {
                Some(ValueType::Time)
            } else {
                None
            }
        }
        ExpressionKind::BinaryOp { op, left, right } => {
            binary_result(*op, infer_type(left)?, infer_type(right)?)
        }
        ExpressionKind::Comparison { .. }
        | ExpressionKind::LogicalAnd(..)
        | ExpressionKind::LogicalOr(..)
        | ExpressionKind::Not(_) => Some(ValueType::Boolean),
        ExpressionKind::Conditional {
            then_branch,
            else_branch,
            ..
        } => infer_type(then_branch).or_else(|| else_branch.as_deref().and_then(infer_type)),
    }
}

fn binary_result(
    op: crate::ast::BinaryOperator,
    left: ValueType,
    right: ValueType,
) -> Option<ValueType> {
    use crate::ast::BinaryOperator::*;
    use ValueType::*;
    match (op, left, right) {
        (Add, Time, Duration) | (Add, Duration, Time) | (Subtract, Time, Duration) => Some(Time),
        (Subtract, Time, Time) => Some(Duration),
        (Add | Subtract, Duration, Duration) => Some(Duration),
        (Multiply, Duration, Number) | (Multiply, Number, Duration) | (Divide, Duration, Number) => {
            Some(Duration)
        }
        (Add | Subtract | Multiply | Divide, Number, Number) => Some(Number),
        _ => None,
    }
}

/// Bounded edit distance for suggestions: the closest candidate within two
/// edits, or none.
fn closest<'c>(input: &str, candidates: &[&'c str]) -> Option<&'c str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(input, c)))
        .filter(|(_, d)| *d <= 2)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { prev } else { prev + 1 };
            prev = row[j + 1];
            row[j + 1] = cost.min(row[j] + 1).min(prev + 1);
        }
    }
    row[b.len()]
}
