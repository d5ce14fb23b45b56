//! Formula parsing
//!
//! The grammar lives in `zmanim.pest`; [`parse`] turns a formula string into
//! an [`Expression`] tree or a syntax diagnostic with line/column position.

mod expressions;
mod literals;

use crate::ast::{Expression, Span};
use crate::error::{ZmanError, ZmanResult};
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "src/parser/zmanim.pest"]
struct FormulaParser;

/// Parse a formula into its syntax tree.
pub fn parse(source: &str) -> ZmanResult<Expression> {
    if source.trim().is_empty() {
        return Err(ZmanError::syntax("empty formula", None));
    }
    let mut pairs = FormulaParser::parse(Rule::formula, source).map_err(from_pest_error)?;
    let formula = pairs
        .next()
        .ok_or_else(|| ZmanError::engine("parser produced no output"))?;
    let expr = formula
        .into_inner()
        .find(|pair| pair.as_rule() == Rule::expression)
        .ok_or_else(|| ZmanError::engine("formula has no expression"))?;
    expressions::build_expression(expr)
}

fn from_pest_error(err: pest::error::Error<Rule>) -> ZmanError {
    let (line, column) = match err.line_col {
        pest::error::LineColLocation::Pos((line, col)) => (line, col),
        pest::error::LineColLocation::Span((line, col), _) => (line, col),
    };
    let (start, end) = match err.location {
        pest::error::InputLocation::Pos(pos) => (pos, pos),
        pest::error::InputLocation::Span((start, end)) => (start, end),
    };
    ZmanError::syntax(
        "unexpected token",
        Some(Span {
            start,
            end,
            line,
            column,
        }),
    )
}
