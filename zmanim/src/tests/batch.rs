use super::*;
use crate::batch::{evaluate_batch, evaluate_reference_map, BatchRequest};
use chrono::TimeDelta;

fn requests(entries: &[(&str, &str)]) -> Vec<BatchRequest> {
    entries
        .iter()
        .map(|(k, f)| BatchRequest::new(*k, *f))
        .collect()
}

#[test]
fn every_request_lands_in_times_or_errors() {
    let reqs = requests(&[
        ("alos", "solar(16.1, before_visible_sunrise)"),
        ("sof_zman_shema", "proportional_hours(3, gra)"),
        ("broken", "solar(16.1,"),
        ("unknown", "no_such_thing(1)"),
    ]);
    let outcome = evaluate_batch(&reqs, equinox(), jerusalem(), &refs(&[]));
    for req in &reqs {
        let in_times = outcome.times.contains_key(&req.key);
        let in_errors = outcome.errors.contains_key(&req.key);
        assert!(
            in_times != in_errors,
            "{} must be in exactly one map",
            req.key
        );
    }
    assert!(outcome.times.contains_key("alos"));
    assert!(outcome.errors.contains_key("broken"));
    assert!(outcome.errors.contains_key("unknown"));
}

#[test]
fn duplicate_formulas_agree() {
    let reqs = requests(&[
        ("a", "visible_sunset + 18min"),
        ("b", "visible_sunset + 18min"),
        ("c", "visible_sunset+18min"),
    ]);
    let outcome = evaluate_batch(&reqs, equinox(), jerusalem(), &refs(&[]));
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.times["a"], outcome.times["b"]);
    assert_eq!(outcome.times["a"], outcome.times["c"]);
}

#[test]
fn shared_references_resolve_once_and_for_all() {
    let references = refs(&[
        ("shkia", "visible_sunset"),
        ("tzeis", "@shkia + 40min"),
    ]);
    let reqs = requests(&[
        ("candles", "@shkia - 18min"),
        ("motzei", "@tzeis + 10min"),
    ]);
    let outcome = evaluate_batch(&reqs, equinox(), jerusalem(), &references);
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    let sunset = eval_time("visible_sunset", &ctx(equinox(), jerusalem())).unwrap();
    assert_eq!(
        outcome.times["candles"].unwrap(),
        sunset - TimeDelta::minutes(18)
    );
    assert_eq!(
        outcome.times["motzei"].unwrap(),
        sunset + TimeDelta::minutes(50)
    );
}

#[test]
fn cyclic_references_fail_only_their_dependents() {
    let references = refs(&[("a", "@b + 5min"), ("b", "@a - 5min")]);
    let reqs = requests(&[
        ("uses_cycle", "@a + 1min"),
        ("independent", "visible_sunset"),
    ]);
    let outcome = evaluate_batch(&reqs, equinox(), jerusalem(), &references);
    assert!(outcome.errors.contains_key("uses_cycle"));
    assert!(outcome.times.contains_key("independent"));
}

#[test]
fn polar_none_is_a_result_not_an_error() {
    let reqs = requests(&[("sunrise", "visible_sunrise"), ("noon", "solar_noon")]);
    let outcome = evaluate_batch(&reqs, winter_solstice(), tromso(), &refs(&[]));
    assert!(outcome.errors.is_empty());
    assert!(outcome.times["sunrise"].is_none());
    assert!(outcome.times["noon"].is_some());
}

#[test]
fn reference_map_evaluates_wholesale() {
    let references = refs(&[
        ("shkia", "visible_sunset"),
        ("tzeis", "@shkia + 40min"),
        ("alos", "solar(16.1, before_visible_sunrise)"),
    ]);
    let outcome = evaluate_reference_map(&references, equinox(), jerusalem());
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.times.len(), 3);
    assert!(outcome.times["tzeis"].unwrap() > outcome.times["shkia"].unwrap());
}

#[test]
fn batch_matches_single_evaluation() {
    let reqs = requests(&[("three", "proportional_hours(3, gra)")]);
    let outcome = evaluate_batch(&reqs, equinox(), jerusalem(), &refs(&[]));
    let single = eval_time("proportional_hours(3, gra)", &ctx(equinox(), jerusalem()));
    assert_eq!(outcome.times["three"], single);
}
