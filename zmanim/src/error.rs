//! Error types shared by the parser, validator, and evaluator.

use crate::ast::Span;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A user-facing problem with a formula: what went wrong, where, and when
/// possible what to try instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            span: None,
            suggestion: None,
        }
    }

    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(span) = &self.span {
            write!(f, " at line {}, column {}", span.line, span.column)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

/// Everything that can go wrong while parsing or evaluating a formula.
///
/// `Cycle`, `DepthLimit`, and `UnknownReference` are configuration problems
/// and always abort evaluation; the rest may be swallowed by `first_valid`
/// when a later alternative succeeds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZmanError {
    #[error("{0}")]
    Syntax(Diagnostic),

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String, span: Option<Span> },

    #[error("{function}() expects {expected}, got {got} argument(s)")]
    Arity {
        function: String,
        expected: String,
        got: usize,
        span: Option<Span>,
    },

    #[error("unknown keyword '{keyword}': expected {expected}")]
    UnknownKeyword {
        keyword: String,
        expected: String,
        span: Option<Span>,
    },

    #[error("undefined reference @{key}")]
    UnknownReference { key: String },

    #[error("circular reference: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("reference chain exceeds the maximum depth of {limit}")]
    DepthLimit { limit: usize },

    #[error("{0}")]
    Engine(String),
}

impl ZmanError {
    pub fn syntax(message: impl Into<String>, span: Option<Span>) -> Self {
        ZmanError::Syntax(Diagnostic::new(message).with_span(span))
    }

    pub fn engine(message: impl Into<String>) -> Self {
        ZmanError::Engine(message.into())
    }

    /// Fatal errors abort the whole evaluation even inside `first_valid`.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ZmanError::Cycle { .. }
                | ZmanError::DepthLimit { .. }
                | ZmanError::UnknownReference { .. }
        )
    }

    /// Best-effort source position for reporting.
    pub fn span(&self) -> Option<Span> {
        match self {
            ZmanError::Syntax(diag) => diag.span,
            ZmanError::UnknownFunction { span, .. }
            | ZmanError::Arity { span, .. }
            | ZmanError::UnknownKeyword { span, .. } => *span,
            _ => None,
        }
    }
}

pub type ZmanResult<T> = Result<T, ZmanError>;
