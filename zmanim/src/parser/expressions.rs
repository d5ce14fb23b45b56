//! Conversion from pest parse pairs to the [`Expression`] tree.

use super::{literals, Rule};
use crate::ast::{
    BaseExpr, BinaryOperator, ComparisonOperator, Expression, ExpressionKind, Span,
};
use crate::error::{ZmanError, ZmanResult};
use crate::keywords::{BaseName, ConditionVar, Direction, Primitive};
use pest::iterators::Pair;

pub(super) fn build_expression(pair: Pair<Rule>) -> ZmanResult<Expression> {
    let inner = only_child(pair)?;
    match inner.as_rule() {
        Rule::conditional => build_conditional(inner),
        Rule::arithmetic => build_arithmetic(inner),
        rule => Err(internal(rule)),
    }
}

fn build_arithmetic(pair: Pair<Rule>) -> ZmanResult<Expression> {
    let span = Some(Span::from_pest(pair.as_span()));
    let mut pairs = pair.into_inner();
    let first = pairs
        .next()
        .ok_or_else(|| ZmanError::engine("arithmetic without operands"))?;
    let mut expr = build_term(first)?;
    while let Some(op_pair) = pairs.next() {
        let op = match op_pair.as_str() {
            "+" => BinaryOperator::Add,
            _ => BinaryOperator::Subtract,
        };
        let right = pairs
            .next()
            .map(build_term)
            .transpose()?
            .ok_or_else(|| ZmanError::engine("operator without right operand"))?;
        expr = Expression::new(
            ExpressionKind::BinaryOp {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            },
            span,
        );
    }
    Ok(expr)
}

fn build_term(pair: Pair<Rule>) -> ZmanResult<Expression> {
    let span = Some(Span::from_pest(pair.as_span()));
    let mut pairs = pair.into_inner();
    let first = pairs
        .next()
        .ok_or_else(|| ZmanError::engine("term without operands"))?;
    let mut expr = build_factor(first)?;
    while let Some(op_pair) = pairs.next() {
        let op = match op_pair.as_str() {
            "*" => BinaryOperator::Multiply,
            _ => BinaryOperator::Divide,
        };
        let right = pairs
            .next()
            .map(build_factor)
            .transpose()?
            .ok_or_else(|| ZmanError::engine("operator without right operand"))?;
        expr = Expression::new(
            ExpressionKind::BinaryOp {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            },
            span,
        );
    }
    Ok(expr)
}

fn build_factor(pair: Pair<Rule>) -> ZmanResult<Expression> {
    let span = Some(Span::from_pest(pair.as_span()));
    let mut negated = false;
    let mut primary = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::neg => negated = true,
            Rule::primary => primary = Some(build_primary(inner)?),
            rule => return Err(internal(rule)),
        }
    }
    let expr = primary.ok_or_else(|| ZmanError::engine("factor without a primary"))?;
    if !negated {
        return Ok(expr);
    }
    // Unary minus folds into the literal; anything else is a user error.
    match expr.kind {
        ExpressionKind::Number(n) => Ok(Expression::new(ExpressionKind::Number(-n), span)),
        ExpressionKind::Duration(s) => Ok(Expression::new(ExpressionKind::Duration(-s), span)),
        _ => Err(ZmanError::syntax(
            "unary minus can only be applied to numbers and durations",
            span,
        )),
    }
}

fn build_primary(pair: Pair<Rule>) -> ZmanResult<Expression> {
    let inner = only_child(pair)?;
    let span = Some(Span::from_pest(inner.as_span()));
    match inner.as_rule() {
        Rule::function_call => build_function_call(inner),
        Rule::duration => Ok(Expression::new(
            ExpressionKind::Duration(literals::parse_duration(inner.as_str(), span)?),
            span,
        )),
        Rule::date_literal => {
            let (day, month) = literals::parse_date_literal(inner.as_str(), span)?;
            Ok(Expression::new(
                ExpressionKind::DateLiteral { day, month },
                span,
            ))
        }
        Rule::number => Ok(Expression::new(
            ExpressionKind::Number(literals::parse_number(inner.as_str(), span)?),
            span,
        )),
        Rule::reference => {
            let key = inner.as_str().trim_start_matches('@').to_string();
            Ok(Expression::new(ExpressionKind::Reference(key), span))
        }
        Rule::string_literal => {
            let text = inner.as_str().trim_matches('"').to_string();
            Ok(Expression::new(ExpressionKind::Text(text), span))
        }
        Rule::expression => build_expression(inner),
        Rule::identifier => classify_identifier(inner.as_str(), span),
        rule => Err(internal(rule)),
    }
}

fn build_function_call(pair: Pair<Rule>) -> ZmanResult<Expression> {
    let span = Some(Span::from_pest(pair.as_span()));
    let mut pairs = pair.into_inner();
    let name = pairs
        .next()
        .ok_or_else(|| ZmanError::engine("call without a name"))?
        .as_str()
        .to_string();
    let mut args = Vec::new();
    for arg in pairs {
        args.push(build_expression(arg)?);
    }
    // `custom(start, end)` is a day boundary, not a function.
    if name == "custom" {
        return Ok(Expression::new(
            ExpressionKind::Base(BaseExpr {
                name: BaseName::Custom,
                custom_args: args,
            }),
            span,
        ));
    }
    Ok(Expression::new(
        ExpressionKind::FunctionCall { name, args },
        span,
    ))
}

/// A bare identifier must be a known keyword; unknown names only survive in
/// call position, where the validator reports them with a suggestion.
fn classify_identifier(name: &str, span: Option<Span>) -> ZmanResult<Expression> {
    if let Some(primitive) = Primitive::from_keyword(name) {
        return Ok(Expression::new(ExpressionKind::Primitive(primitive), span));
    }
    if let Some(var) = ConditionVar::from_keyword(name) {
        return Ok(Expression::new(ExpressionKind::ConditionVar(var), span));
    }
    if let Some(direction) = Direction::from_keyword(name) {
        return Ok(Expression::new(ExpressionKind::Direction(direction), span));
    }
    if let Some(base) = BaseName::from_keyword(name) {
        return Ok(Expression::new(
            ExpressionKind::Base(BaseExpr {
                name: base,
                custom_args: Vec::new(),
            }),
            span,
        ));
    }
    Err(ZmanError::UnknownKeyword {
        keyword: name.to_string(),
        expected: "a time primitive, direction, day base, or condition variable".to_string(),
        span,
    })
}

fn build_conditional(pair: Pair<Rule>) -> ZmanResult<Expression> {
    let span = Some(Span::from_pest(pair.as_span()));
    let mut pairs = pair.into_inner();
    let condition = pairs
        .next()
        .ok_or_else(|| ZmanError::engine("conditional without a condition"))
        .and_then(build_condition)?;
    let then_branch = pairs
        .next()
        .ok_or_else(|| ZmanError::engine("conditional without a body"))
        .and_then(build_expression)?;
    let else_branch = pairs.next().map(build_else).transpose()?;
    Ok(Expression::new(
        ExpressionKind::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        },
        span,
    ))
}

fn build_else(pair: Pair<Rule>) -> ZmanResult<Expression> {
    let inner = only_child(pair)?;
    match inner.as_rule() {
        Rule::conditional => build_conditional(inner),
        Rule::expression => build_expression(inner),
        rule => Err(internal(rule)),
    }
}

fn build_condition(pair: Pair<Rule>) -> ZmanResult<Expression> {
    build_or(only_child(pair)?)
}

fn build_or(pair: Pair<Rule>) -> ZmanResult<Expression> {
    let span = Some(Span::from_pest(pair.as_span()));
    let mut pairs = pair.into_inner();
    let first = pairs
        .next()
        .ok_or_else(|| ZmanError::engine("empty condition"))?;
    let mut expr = build_and(first)?;
    for next in pairs {
        let right = build_and(next)?;
        expr = Expression::new(
            ExpressionKind::LogicalOr(Box::new(expr), Box::new(right)),
            span,
        );
    }
    Ok(expr)
}

fn build_and(pair: Pair<Rule>) -> ZmanResult<Expression> {
    let span = Some(Span::from_pest(pair.as_span()));
    let mut pairs = pair.into_inner();
    let first = pairs
        .next()
        .ok_or_else(|| ZmanError::engine("empty condition"))?;
    let mut expr = build_not(first)?;
    for next in pairs {
        let right = build_not(next)?;
        expr = Expression::new(
            ExpressionKind::LogicalAnd(Box::new(expr), Box::new(right)),
            span,
        );
    }
    Ok(expr)
}

fn build_not(pair: Pair<Rule>) -> ZmanResult<Expression> {
    let span = Some(Span::from_pest(pair.as_span()));
    let mut pairs = pair.into_inner();
    let first = pairs
        .next()
        .ok_or_else(|| ZmanError::engine("empty condition"))?;
    match first.as_rule() {
        Rule::bang => {
            let inner = pairs
                .next()
                .ok_or_else(|| ZmanError::engine("'!' without an operand"))
                .and_then(build_not)?;
            Ok(Expression::new(
                ExpressionKind::Not(Box::new(inner)),
                span,
            ))
        }
        Rule::comparison => build_comparison(first),
        rule => Err(internal(rule)),
    }
}

fn build_comparison(pair: Pair<Rule>) -> ZmanResult<Expression> {
    let span = Some(Span::from_pest(pair.as_span()));
    let mut pairs = pair.into_inner();
    let first = pairs
        .next()
        .ok_or_else(|| ZmanError::engine("empty comparison"))?;
    let left = match first.as_rule() {
        Rule::paren_condition => return build_paren_condition(first),
        Rule::arithmetic => build_arithmetic(first)?,
        rule => return Err(internal(rule)),
    };
    match pairs.next() {
        None => Ok(left),
        Some(op_pair) => {
            let op = comparison_op(op_pair.as_str());
            let right = pairs
                .next()
                .ok_or_else(|| ZmanError::engine("comparison without right operand"))
                .and_then(build_arithmetic)?;
            Ok(Expression::new(
                ExpressionKind::Comparison {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            ))
        }
    }
}

fn build_paren_condition(pair: Pair<Rule>) -> ZmanResult<Expression> {
    let span = Some(Span::from_pest(pair.as_span()));
    let mut pairs = pair.into_inner();
    let inner = pairs
        .next()
        .ok_or_else(|| ZmanError::engine("empty parenthesized condition"))
        .and_then(build_condition)?;
    match pairs.next() {
        None => Ok(inner),
        Some(op_pair) => {
            let op = comparison_op(op_pair.as_str());
            let right = pairs
                .next()
                .ok_or_else(|| ZmanError::engine("comparison without right operand"))
                .and_then(build_arithmetic)?;
            Ok(Expression::new(
                ExpressionKind::Comparison {
                    op,
                    left: Box::new(inner),
                    right: Box::new(right),
                },
                span,
            ))
        }
    }
}

fn comparison_op(text: &str) -> ComparisonOperator {
    match text {
        ">=" => ComparisonOperator::GreaterEq,
        "<=" => ComparisonOperator::LessEq,
        "==" => ComparisonOperator::Equal,
        "!=" => ComparisonOperator::NotEqual,
        ">" => ComparisonOperator::Greater,
        _ => ComparisonOperator::Less,
    }
}

fn only_child(pair: Pair<Rule>) -> ZmanResult<Pair<Rule>> {
    let rule = pair.as_rule();
    pair.into_inner()
        .next()
        .ok_or_else(|| ZmanError::engine(format!("{rule:?} has no children")))
}

fn internal(rule: Rule) -> ZmanError {
    ZmanError::engine(format!("unexpected {rule:?} in parse tree"))
}
