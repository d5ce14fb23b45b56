//! Batch evaluation of many formulas for one date and location.
//!
//! References are resolved once in dependency order, requests with the same
//! normalized source are computed once, and the independent formulas fan
//! out across a rayon thread pool. The outcome always covers every request:
//! each key lands in `times` or in `errors`, never neither.

use crate::error::ZmanError;
use crate::evaluator::{self, EvaluationContext};
use crate::location::GeoLocation;
use crate::parser;
use crate::resolver::{calculation_order, ResolutionState};
use crate::{Evaluator, TimeValue, Value};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// One named formula to evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub key: String,
    pub formula: String,
}

impl BatchRequest {
    pub fn new(key: impl Into<String>, formula: impl Into<String>) -> Self {
        BatchRequest {
            key: key.into(),
            formula: formula.into(),
        }
    }
}

/// Per-key results of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub times: HashMap<String, TimeValue>,
    pub errors: HashMap<String, String>,
}

/// Evaluate every request against one (date, location) pair.
pub fn evaluate_batch(
    requests: &[BatchRequest],
    date: NaiveDate,
    location: GeoLocation,
    references: &HashMap<String, String>,
) -> BatchOutcome {
    let ctx = EvaluationContext::new(date, location);
    let resolved = resolve_references(&ctx, references);

    // Dedupe by normalized source so aliased requests evaluate once.
    let mut normalized: HashMap<&str, String> = HashMap::new();
    for request in requests {
        normalized
            .entry(request.formula.as_str())
            .or_insert_with(|| normalize(&request.formula));
    }
    let mut unique: Vec<(&str, &str)> = Vec::new();
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for request in requests {
        let norm = normalized[request.formula.as_str()].as_str();
        if !seen.contains_key(norm) {
            seen.insert(norm, request.formula.as_str());
            unique.push((norm, request.formula.as_str()));
        }
    }

    let computed: HashMap<&str, Result<TimeValue, ZmanError>> = unique
        .par_iter()
        .map(|(norm, source)| {
            let ctx = EvaluationContext::new(date, location);
            let mut evaluator = Evaluator::with_state(
                &ctx,
                references,
                ResolutionState::with_resolved(resolved.clone()),
            );
            let result = parser::parse(source)
                .and_then(|expr| evaluator.evaluate(&expr))
                .and_then(|value| match value {
                    Value::Time(time) => Ok(time),
                    other => Err(ZmanError::engine(format!(
                        "formula produced a {} instead of a time",
                        other.type_name()
                    ))),
                });
            (*norm, result)
        })
        .collect();

    let mut outcome = BatchOutcome::default();
    for request in requests {
        let norm = normalized[request.formula.as_str()].as_str();
        match &computed[norm] {
            Ok(time) => {
                outcome.times.insert(request.key.clone(), *time);
            }
            Err(err) => {
                warn!(key = %request.key, error = %err, "batch formula failed");
                outcome.errors.insert(request.key.clone(), err.to_string());
            }
        }
    }
    outcome
}

/// Evaluate the reference map once, dependencies first, so every batch
/// worker starts from the same resolved times. Keys trapped in a cycle or
/// failing to evaluate are simply absent; a request that needs them will
/// surface the error itself.
fn resolve_references(
    ctx: &EvaluationContext,
    references: &HashMap<String, String>,
) -> HashMap<String, TimeValue> {
    let (ordered, cyclic) = calculation_order(references);
    for key in &cyclic {
        warn!(key = %key, "reference is part of a cycle, skipping pre-resolution");
    }

    let mut resolved: HashMap<String, TimeValue> = HashMap::new();
    for key in ordered {
        let Some(source) = references.get(&key) else {
            continue;
        };
        let mut evaluator = Evaluator::with_state(
            ctx,
            references,
            ResolutionState::with_resolved(resolved.clone()),
        );
        match parser::parse(source).and_then(|expr| evaluator.evaluate(&expr)) {
            Ok(Value::Time(time)) => {
                resolved.insert(key, time);
            }
            Ok(other) => {
                warn!(key = %key, kind = other.type_name(), "reference is not a time");
            }
            Err(err) => {
                warn!(key = %key, error = %err, "reference failed to resolve");
            }
        }
    }
    resolved
}

/// Canonical form of a formula for deduplication: the re-serialized tree,
/// or the raw source when it does not parse.
fn normalize(source: &str) -> String {
    match parser::parse(source) {
        Ok(expr) => expr.to_source(),
        Err(_) => source.to_string(),
    }
}

/// Convenience wrapper: evaluate the reference map itself, one result per
/// key.
pub fn evaluate_reference_map(
    references: &HashMap<String, String>,
    date: NaiveDate,
    location: GeoLocation,
) -> BatchOutcome {
    let requests: Vec<BatchRequest> = references
        .iter()
        .map(|(key, formula)| BatchRequest::new(key.clone(), formula.clone()))
        .collect();
    evaluate_batch(&requests, date, location, references)
}

// Single-formula convenience used by callers that do not need batching.
pub fn evaluate_one(
    source: &str,
    date: NaiveDate,
    location: GeoLocation,
    references: &HashMap<String, String>,
) -> Result<TimeValue, ZmanError> {
    let ctx = EvaluationContext::new(date, location);
    evaluator::evaluate_formula(source, &ctx, references)
}
