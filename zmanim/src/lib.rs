//! A small formula language for zmanim (halachic times).
//!
//! Publishers describe each zman as a formula over astronomical primitives:
//!
//! ```text
//! solar(16.1, before_visible_sunrise)
//! proportional_hours(3, gra)
//! visible_sunset + 18min
//! first_valid(solar(16.1, before_visible_sunrise), @fallback_alos)
//! ```
//!
//! The crate parses formulas to an AST, validates them statically, and
//! evaluates them for a date and [`GeoLocation`]. A time the sun never
//! reaches at that latitude comes back as `None`, not an error.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use std::collections::HashMap;
//! use zmanim::{evaluate_one, GeoLocation};
//!
//! let location = GeoLocation::new(31.7683, 35.2137, chrono_tz::Asia::Jerusalem);
//! let date = NaiveDate::from_ymd_opt(2024, 3, 21).unwrap();
//! let refs = HashMap::new();
//! let alos = evaluate_one("solar(16.1, before_visible_sunrise)", date, location, &refs)?;
//! # Ok::<(), zmanim::ZmanError>(())
//! ```
//!
//! Formulas can name each other with `@key` through a
//! [`ReferenceResolver`]; cycles and undefined keys are rejected.
//! [`batch::evaluate_batch`] computes many formulas for one day in
//! parallel, resolving shared references once.

pub mod ast;
pub mod astro;
pub mod batch;
pub mod complexity;
pub mod error;
pub mod evaluator;
pub mod keywords;
pub mod location;
pub mod parser;
pub mod reference;
pub mod resolver;
pub mod validator;

#[cfg(test)]
mod tests;

pub use ast::Expression;
pub use batch::{evaluate_batch, evaluate_one, BatchOutcome, BatchRequest};
pub use complexity::{classify, Complexity};
pub use error::{Diagnostic, ZmanError, ZmanResult};
pub use evaluator::{evaluate, evaluate_formula, EvaluationContext, Evaluator, Value};
pub use location::GeoLocation;
pub use parser::parse;
pub use resolver::{NoReferences, ReferenceResolver, MAX_REFERENCE_DEPTH};
pub use validator::{validate, validate_with_references, ValidationOutcome, Validator};

use chrono::DateTime;
use chrono_tz::Tz;

/// The result of a time-valued formula: a zoned instant, or `None` when the
/// requested configuration of the sun does not occur on that day.
pub type TimeValue = Option<DateTime<Tz>>;
