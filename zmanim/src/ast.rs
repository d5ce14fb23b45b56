//! Abstract syntax tree for zmanim formulas
//!
//! Every node carries an optional source [`Span`] so evaluation and
//! validation errors can point back at the offending text. The tree
//! re-serializes to source through [`Expression::to_source`]; the output is
//! canonical (aliases normalized, durations reprinted) but evaluates
//! identically to the input.

use crate::keywords::{month_abbrev, BaseName, ConditionVar, Direction, Primitive};
use serde::Serialize;
use std::fmt;

/// Byte offsets plus the line/column of the start, taken from the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn from_pest(span: pest::Span<'_>) -> Self {
        let (line, column) = span.start_pos().line_col();
        Span {
            start: span.start(),
            end: span.end(),
            line,
            column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComparisonOperator {
    Greater,
    Less,
    GreaterEq,
    LessEq,
    Equal,
    NotEqual,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterEq => ">=",
            Self::LessEq => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

/// A parsed formula node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

/// Day-boundary argument of the proportional-time functions. `custom_args`
/// is non-empty only for `custom(start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseExpr {
    pub name: BaseName,
    pub custom_args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionKind {
    Number(f64),
    /// Duration literal in whole seconds; negative after unary minus.
    Duration(i64),
    Text(String),
    /// `21-May`: compared as day-of-year against the `date` variable.
    DateLiteral { day: u32, month: u32 },
    Primitive(Primitive),
    ConditionVar(ConditionVar),
    Direction(Direction),
    Base(BaseExpr),
    /// `@key`, resolved against the caller-supplied reference map.
    Reference(String),
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Comparison {
        op: ComparisonOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    LogicalAnd(Box<Expression>, Box<Expression>),
    LogicalOr(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    Conditional {
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Option<Box<Expression>>,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Option<Span>) -> Self {
        Expression { kind, span }
    }

    /// Bare node without source position, for programmatic construction.
    pub fn unspanned(kind: ExpressionKind) -> Self {
        Expression { kind, span: None }
    }

    /// Re-serialize to formula source. Parsing the output yields a tree that
    /// evaluates identically to this one.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    /// Every `@reference` key in the tree, in source order, deduplicated.
    pub fn references(&self) -> Vec<String> {
        let mut keys = Vec::new();
        self.walk(&mut |expr| {
            if let ExpressionKind::Reference(key) = &expr.kind {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        });
        keys
    }

    /// Depth-first visit of this node and all children.
    pub fn walk(&self, visit: &mut impl FnMut(&Expression)) {
        visit(self);
        match &self.kind {
            ExpressionKind::Number(_)
            | ExpressionKind::Duration(_)
            | ExpressionKind::Text(_)
            | ExpressionKind::DateLiteral { .. }
            | ExpressionKind::Primitive(_)
            | ExpressionKind::ConditionVar(_)
            | ExpressionKind::Direction(_)
            | ExpressionKind::Reference(_) => {}
            ExpressionKind::Base(base) => {
                for arg in &base.custom_args {
                    arg.walk(visit);
                }
            }
            ExpressionKind::FunctionCall { args, .. } => {
                for arg in args {
                    arg.walk(visit);
                }
            }
            ExpressionKind::BinaryOp { left, right, .. }
            | ExpressionKind::Comparison { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
            ExpressionKind::LogicalAnd(a, b) | ExpressionKind::LogicalOr(a, b) => {
                a.walk(visit);
                b.walk(visit);
            }
            ExpressionKind::Not(inner) => inner.walk(visit),
            ExpressionKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.walk(visit);
                then_branch.walk(visit);
                if let Some(alt) = else_branch {
                    alt.walk(visit);
                }
            }
        }
    }

    fn write_source(&self, out: &mut String) {
        match &self.kind {
            ExpressionKind::Number(n) => {
                out.push_str(&format_number(*n));
            }
            ExpressionKind::Duration(seconds) => {
                out.push_str(&format_duration(*seconds));
            }
            ExpressionKind::Text(s) => {
                out.push('"');
                out.push_str(s);
                out.push('"');
            }
            ExpressionKind::DateLiteral { day, month } => {
                out.push_str(&format!("{}-{}", day, month_abbrev(*month)));
            }
            ExpressionKind::Primitive(p) => out.push_str(p.as_str()),
            ExpressionKind::ConditionVar(v) => out.push_str(v.as_str()),
            ExpressionKind::Direction(d) => out.push_str(d.as_str()),
            ExpressionKind::Base(base) => {
                out.push_str(base.name.as_str());
                if !base.custom_args.is_empty() {
                    out.push('(');
                    for (i, arg) in base.custom_args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        arg.write_source(out);
                    }
                    out.push(')');
                }
            }
            ExpressionKind::Reference(key) => {
                out.push('@');
                out.push_str(key);
            }
            ExpressionKind::FunctionCall { name, args } => {
                out.push_str(name);
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    arg.write_source(out);
                }
                out.push(')');
            }
            ExpressionKind::BinaryOp { op, left, right } => {
                left.write_grouped(out, precedence(&left.kind) < binary_precedence(*op));
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                right.write_grouped(out, precedence(&right.kind) <= binary_precedence(*op));
            }
            ExpressionKind::Comparison { op, left, right } => {
                left.write_source(out);
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                right.write_source(out);
            }
            ExpressionKind::LogicalAnd(a, b) => {
                a.write_grouped(out, matches!(a.kind, ExpressionKind::LogicalOr(..)));
                out.push_str(" && ");
                b.write_grouped(
                    out,
                    matches!(
                        b.kind,
                        ExpressionKind::LogicalOr(..) | ExpressionKind::LogicalAnd(..)
                    ),
                );
            }
            ExpressionKind::LogicalOr(a, b) => {
                a.write_source(out);
                out.push_str(" || ");
                b.write_grouped(out, matches!(b.kind, ExpressionKind::LogicalOr(..)));
            }
            ExpressionKind::Not(inner) => {
                out.push_str("!(");
                inner.write_source(out);
                out.push(')');
            }
            ExpressionKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                out.push_str("if (");
                condition.write_source(out);
                out.push_str(") { ");
                then_branch.write_source(out);
                out.push_str(" }");
                if let Some(alt) = else_branch {
                    if matches!(alt.kind, ExpressionKind::Conditional { .. }) {
                        out.push_str(" else ");
                        alt.write_source(out);
                    } else {
                        out.push_str(" else { ");
                        alt.write_source(out);
                        out.push_str(" }");
                    }
                }
            }
        }
    }

    fn write_grouped(&self, out: &mut String, grouped: bool) {
        if grouped {
            out.push('(');
            self.write_source(out);
            out.push(')');
        } else {
            self.write_source(out);
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

fn binary_precedence(op: BinaryOperator) -> u8 {
    match op {
        BinaryOperator::Add | BinaryOperator::Subtract => 1,
        BinaryOperator::Multiply | BinaryOperator::Divide => 2,
    }
}

fn precedence(kind: &ExpressionKind) -> u8 {
    match kind {
        ExpressionKind::BinaryOp { op, .. } => binary_precedence(*op),
        // A conditional cannot stand bare inside arithmetic.
        ExpressionKind::Conditional { .. } => 0,
        _ => 3,
    }
}

fn format_number(n: f64) -> String {
    // Negative numbers only arise from unary minus; reprint the sign.
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Print seconds back as a duration literal (`90` -> `1min 30s`).
pub fn format_duration(seconds: i64) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }
    let sign = if seconds < 0 { "-" } else { "" };
    let mut rest = seconds.abs();
    let hours = rest / 3600;
    rest %= 3600;
    let minutes = rest / 60;
    rest %= 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}min"));
    }
    if rest > 0 {
        parts.push(format!("{rest}s"));
    }
    format!("{sign}{}", parts.join(" "))
}
