//! Formula complexity classification.
//!
//! Visual editors can round-trip a restricted shape of formula: one
//! function call (or bare primitive or reference) plus at most one trailing
//! duration offset, with literal or keyword arguments. Everything else is
//! editable only as text, and the classifier says why.

use crate::ast::{BaseExpr, BinaryOperator, Expression, ExpressionKind};
use crate::keywords;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "complexity", rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Complex { reason: String },
}

impl Complexity {
    pub fn is_simple(&self) -> bool {
        matches!(self, Complexity::Simple)
    }

    fn complex(reason: impl Into<String>) -> Self {
        Complexity::Complex {
            reason: reason.into(),
        }
    }
}

/// Classify a parsed formula.
pub fn classify(expr: &Expression) -> Complexity {
    // Peel at most one trailing `+ duration` / `- duration` offset.
    let core = match &expr.kind {
        ExpressionKind::BinaryOp {
            op: BinaryOperator::Add | BinaryOperator::Subtract,
            left,
            right,
        } => {
            if !matches!(right.kind, ExpressionKind::Duration(_)) {
                return Complexity::complex("offset is not a duration literal");
            }
            left.as_ref()
        }
        _ => expr,
    };
    classify_core(core)
}

fn classify_core(expr: &Expression) -> Complexity {
    match &expr.kind {
        ExpressionKind::Primitive(_) | ExpressionKind::Reference(_) => Complexity::Simple,
        ExpressionKind::FunctionCall { name, args } => {
            if !keywords::is_function(name) {
                return Complexity::complex(format!("unknown function '{name}'"));
            }
            if matches!(
                name.as_str(),
                "midpoint" | "first_valid" | "earlier_of" | "later_of"
            ) {
                return Complexity::complex(format!("uses the combinator {name}()"));
            }
            for arg in args {
                if let Some(reason) = argument_reason(arg) {
                    return Complexity::complex(reason);
                }
            }
            Complexity::Simple
        }
        ExpressionKind::Conditional { .. } => Complexity::complex("contains a conditional"),
        ExpressionKind::BinaryOp { op, .. } => match op {
            BinaryOperator::Multiply | BinaryOperator::Divide => {
                Complexity::complex("contains multiplication or division")
            }
            _ => Complexity::complex("contains more than one offset term"),
        },
        _ => Complexity::complex("does not start from a time"),
    }
}

/// A reason the argument disqualifies the formula, if any.
fn argument_reason(arg: &Expression) -> Option<String> {
    match &arg.kind {
        ExpressionKind::Number(_)
        | ExpressionKind::Duration(_)
        | ExpressionKind::Direction(_)
        | ExpressionKind::Primitive(_)
        | ExpressionKind::Reference(_) => None,
        ExpressionKind::Base(BaseExpr { custom_args, .. }) => {
            if custom_args.is_empty() {
                None
            } else {
                Some("uses custom day boundaries".to_string())
            }
        }
        ExpressionKind::FunctionCall { name, .. } => Some(format!("nests a call to {name}()")),
        _ => Some("argument is not a literal, keyword, or reference".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn classify_source(source: &str) -> Complexity {
        classify(&parse(source).unwrap())
    }

    #[test]
    fn plain_calls_are_simple() {
        assert!(classify_source("solar(16.1, before_visible_sunrise)").is_simple());
        assert!(classify_source("proportional_hours(3, gra)").is_simple());
        assert!(classify_source("proportional_minutes(72, before_visible_sunrise, mga_72)")
            .is_simple());
        assert!(classify_source("visible_sunset").is_simple());
        assert!(classify_source("@candle_lighting").is_simple());
    }

    #[test]
    fn one_duration_offset_is_simple() {
        assert!(classify_source("visible_sunset + 18min").is_simple());
        assert!(classify_source("solar(8.5, after_visible_sunset) - 2min").is_simple());
    }

    #[test]
    fn combinators_are_complex() {
        let c = classify_source("midpoint(visible_sunset, visible_sunrise)");
        assert!(matches!(c, Complexity::Complex { reason } if reason.contains("midpoint")));
    }

    #[test]
    fn stacked_offsets_are_complex() {
        assert!(!classify_source("visible_sunset + 18min + 2min").is_simple());
    }

    #[test]
    fn conditionals_are_complex() {
        let c = classify_source(
            "if (latitude > 50) { seasonal_solar(16.1, before_visible_sunrise) } \
             else { solar(16.1, before_visible_sunrise) }",
        );
        assert!(!c.is_simple());
    }

    #[test]
    fn custom_bases_are_complex() {
        let c = classify_source(
            "proportional_hours(3, custom(visible_sunrise - 72min, visible_sunset))",
        );
        assert!(matches!(c, Complexity::Complex { reason } if reason.contains("custom")));
    }

    #[test]
    fn nested_calls_are_complex() {
        let c = classify_source(
            "proportional_hours(3, custom(solar(16.1, before_visible_sunrise), visible_sunset))",
        );
        assert!(!c.is_simple());
    }
}
