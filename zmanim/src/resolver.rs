//! Reference resolution for `@key` expressions.
//!
//! Formulas never see each other directly; a [`ReferenceResolver`] maps a
//! key to the formula source it names. The evaluator tracks the chain of
//! keys currently being resolved to reject cycles and runaway depth, and
//! memoizes resolved times so diamond-shaped dependency graphs evaluate
//! each key once.

use crate::ast::Expression;
use crate::error::{ZmanError, ZmanResult};
use crate::parser;
use crate::TimeValue;
use std::collections::HashMap;

/// How deep a chain of `@references` may go before evaluation gives up.
pub const MAX_REFERENCE_DEPTH: usize = 32;

/// Source of formulas for `@key` references.
pub trait ReferenceResolver {
    fn formula(&self, key: &str) -> Option<&str>;
}

impl ReferenceResolver for HashMap<String, String> {
    fn formula(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Resolver with no formulas; any `@reference` fails as undefined.
pub struct NoReferences;

impl ReferenceResolver for NoReferences {
    fn formula(&self, _key: &str) -> Option<&str> {
        None
    }
}

/// Per-evaluation bookkeeping: the stack of keys being resolved and the
/// times already computed.
#[derive(Default)]
pub(crate) struct ResolutionState {
    visiting: Vec<String>,
    resolved: HashMap<String, TimeValue>,
}

impl ResolutionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed already-known times, as the batch evaluator does after its
    /// topological pre-pass.
    pub fn with_resolved(resolved: HashMap<String, TimeValue>) -> Self {
        ResolutionState {
            visiting: Vec::new(),
            resolved,
        }
    }

    pub fn cached(&self, key: &str) -> Option<TimeValue> {
        self.resolved.get(key).copied()
    }

    pub fn cache(&mut self, key: &str, value: TimeValue) {
        self.resolved.insert(key.to_string(), value);
    }

    pub fn enter(&mut self, key: &str) -> ZmanResult<()> {
        if self.visiting.iter().any(|k| k == key) {
            let mut path = self.visiting.clone();
            path.push(key.to_string());
            return Err(ZmanError::Cycle { path });
        }
        if self.visiting.len() >= MAX_REFERENCE_DEPTH {
            return Err(ZmanError::DepthLimit {
                limit: MAX_REFERENCE_DEPTH,
            });
        }
        self.visiting.push(key.to_string());
        Ok(())
    }

    pub fn leave(&mut self) {
        self.visiting.pop();
    }
}

/// Order in which the keys of a reference map can be evaluated so that
/// every `@reference` points at an already-computed key. The second element
/// lists keys trapped in cycles, which cannot be ordered.
///
/// Formulas that fail to parse participate with no dependencies; the
/// evaluation of that key will surface the parse error itself.
pub fn calculation_order(references: &HashMap<String, String>) -> (Vec<String>, Vec<String>) {
    let mut deps: HashMap<&str, Vec<String>> = HashMap::new();
    for (key, source) in references {
        let targets = match parser::parse(source) {
            Ok(expr) => in_map_references(&expr, references),
            Err(_) => Vec::new(),
        };
        deps.insert(key, targets);
    }

    // Kahn's algorithm over in-map dependencies.
    let mut in_degree: HashMap<&str, usize> = references.keys().map(|k| (k.as_str(), 0)).collect();
    for targets in deps.values() {
        for target in targets {
            if let Some(count) = in_degree.get_mut(target.as_str()) {
                *count += 1;
            }
        }
    }
    // Dependencies point from dependent to dependency, so seed with keys
    // nothing depends on and reverse at the end.
    let mut queue: Vec<&str> = in_degree
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(key, _)| *key)
        .collect();
    queue.sort_unstable();

    let mut ordered = Vec::new();
    while let Some(key) = queue.pop() {
        ordered.push(key.to_string());
        if let Some(targets) = deps.get(key) {
            for target in targets {
                if let Some(count) = in_degree.get_mut(target.as_str()) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push(target.as_str());
                    }
                }
            }
        }
    }
    ordered.reverse();

    let mut cyclic: Vec<String> = references
        .keys()
        .filter(|key| !ordered.contains(key))
        .cloned()
        .collect();
    cyclic.sort_unstable();
    (ordered, cyclic)
}

fn in_map_references(expr: &Expression, references: &HashMap<String, String>) -> Vec<String> {
    expr.references()
        .into_iter()
        .filter(|key| references.contains_key(key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn orders_chain_dependency_first() {
        let refs = map(&[
            ("tzeis", "@shkia + 40min"),
            ("shkia", "visible_sunset"),
            ("alos", "visible_sunrise - 72min"),
        ]);
        let (ordered, cyclic) = calculation_order(&refs);
        assert!(cyclic.is_empty());
        let shkia = ordered.iter().position(|k| k == "shkia").unwrap();
        let tzeis = ordered.iter().position(|k| k == "tzeis").unwrap();
        assert!(shkia < tzeis);
        assert_eq!(ordered.len(), 3);
    }

    #[test]
    fn reports_cyclic_keys() {
        let refs = map(&[
            ("a", "@b + 5min"),
            ("b", "@a - 5min"),
            ("c", "visible_sunrise"),
        ]);
        let (ordered, cyclic) = calculation_order(&refs);
        assert_eq!(ordered, vec!["c".to_string()]);
        assert_eq!(cyclic, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let refs = map(&[
            ("base", "visible_sunrise"),
            ("left", "@base + 10min"),
            ("right", "@base + 20min"),
            ("top", "midpoint(@left, @right)"),
        ]);
        let (ordered, cyclic) = calculation_order(&refs);
        assert!(cyclic.is_empty());
        assert_eq!(ordered.len(), 4);
        let base = ordered.iter().position(|k| k == "base").unwrap();
        let top = ordered.iter().position(|k| k == "top").unwrap();
        assert!(base < top);
    }

    #[test]
    fn depth_limit_trips() {
        let mut state = ResolutionState::new();
        for i in 0..MAX_REFERENCE_DEPTH {
            state.enter(&format!("k{i}")).unwrap();
        }
        assert!(matches!(
            state.enter("one_more"),
            Err(ZmanError::DepthLimit { .. })
        ));
    }

    #[test]
    fn revisiting_a_key_is_a_cycle() {
        let mut state = ResolutionState::new();
        state.enter("a").unwrap();
        state.enter("b").unwrap();
        let err = state.enter("a").unwrap_err();
        match err {
            ZmanError::Cycle { path } => assert_eq!(path, vec!["a", "b", "a"]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }
}
