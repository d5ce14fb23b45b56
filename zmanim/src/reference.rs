//! Machine-readable catalog of the formula language.
//!
//! Editors and documentation render this instead of hard-coding the
//! language surface; it stays next to the keyword tables so the two cannot
//! drift apart.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FunctionDoc {
    pub name: &'static str,
    pub signature: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct KeywordDoc {
    pub name: &'static str,
    pub description: &'static str,
}

pub const FUNCTIONS: &[FunctionDoc] = &[
    FunctionDoc {
        name: "solar",
        signature: "solar(angle, direction)",
        description: "Instant the sun is `angle` degrees below the horizon, \
                      on the side of the day named by `direction`.",
    },
    FunctionDoc {
        name: "seasonal_solar",
        signature: "seasonal_solar(angle, direction)",
        description: "Like solar(), but the equinox-day offset is scaled by \
                      the length of today's half-day, so the result exists \
                      even when the angle is never reached.",
    },
    FunctionDoc {
        name: "proportional_hours",
        signature: "proportional_hours(hours, base)",
        description: "`hours` twelfths of the base day after its start. \
                      Accepts 0.5 to 12 hours.",
    },
    FunctionDoc {
        name: "proportional_minutes",
        signature: "proportional_minutes(minutes, direction, base)",
        description: "`minutes` scaled by the base day against a 720-minute \
                      standard day, applied before sunrise or after sunset. \
                      Accepts 1 to 200 minutes.",
    },
    FunctionDoc {
        name: "midpoint",
        signature: "midpoint(a, b)",
        description: "Halfway between two times. Undefined if either is.",
    },
    FunctionDoc {
        name: "first_valid",
        signature: "first_valid(a, b, ...)",
        description: "The first argument that yields a defined time; later \
                      arguments are untouched once one succeeds.",
    },
    FunctionDoc {
        name: "earlier_of",
        signature: "earlier_of(a, b)",
        description: "The earlier of two times; falls back to whichever is \
                      defined when only one is.",
    },
    FunctionDoc {
        name: "later_of",
        signature: "later_of(a, b)",
        description: "The later of two times; falls back to whichever is \
                      defined when only one is.",
    },
];

pub const PRIMITIVES: &[KeywordDoc] = &[
    KeywordDoc {
        name: "visible_sunrise",
        description: "Upper limb at the visible horizon, with refraction \
                      and elevation dip.",
    },
    KeywordDoc {
        name: "visible_sunset",
        description: "Evening counterpart of visible_sunrise.",
    },
    KeywordDoc {
        name: "geometric_sunrise",
        description: "Sun center at the geometric horizon, no corrections.",
    },
    KeywordDoc {
        name: "geometric_sunset",
        description: "Evening counterpart of geometric_sunrise.",
    },
    KeywordDoc {
        name: "solar_noon",
        description: "Solar transit. Defined at every latitude.",
    },
    KeywordDoc {
        name: "solar_midnight",
        description: "Twelve hours after solar noon.",
    },
    KeywordDoc {
        name: "civil_dawn",
        description: "Sun 6 degrees below the horizon, morning.",
    },
    KeywordDoc {
        name: "civil_dusk",
        description: "Sun 6 degrees below the horizon, evening.",
    },
    KeywordDoc {
        name: "nautical_dawn",
        description: "Sun 12 degrees below the horizon, morning.",
    },
    KeywordDoc {
        name: "nautical_dusk",
        description: "Sun 12 degrees below the horizon, evening.",
    },
    KeywordDoc {
        name: "astronomical_dawn",
        description: "Sun 18 degrees below the horizon, morning.",
    },
    KeywordDoc {
        name: "astronomical_dusk",
        description: "Sun 18 degrees below the horizon, evening.",
    },
];

pub const BASES: &[KeywordDoc] = &[
    KeywordDoc {
        name: "gra",
        description: "Visible sunrise to visible sunset.",
    },
    KeywordDoc {
        name: "mga_60",
        description: "60 clock minutes before sunrise to 60 after sunset.",
    },
    KeywordDoc {
        name: "mga_72",
        description: "72 clock minutes before sunrise to 72 after sunset. \
                      `mga` is an alias.",
    },
    KeywordDoc {
        name: "mga_90",
        description: "90 clock minutes around the visible day.",
    },
    KeywordDoc {
        name: "mga_96",
        description: "96 clock minutes around the visible day.",
    },
    KeywordDoc {
        name: "mga_120",
        description: "120 clock minutes around the visible day.",
    },
    KeywordDoc {
        name: "mga_72_zmanis",
        description: "One tenth of the visible day before sunrise and after \
                      sunset.",
    },
    KeywordDoc {
        name: "mga_90_zmanis",
        description: "One eighth of the visible day on each side.",
    },
    KeywordDoc {
        name: "mga_96_zmanis",
        description: "One seven-and-a-halfth of the visible day on each side.",
    },
    KeywordDoc {
        name: "mga_16_1",
        description: "16.1 degree dawn to 16.1 degree dusk.",
    },
    KeywordDoc {
        name: "mga_18",
        description: "18 degree dawn to 18 degree dusk.",
    },
    KeywordDoc {
        name: "mga_19_8",
        description: "19.8 degree dawn to 19.8 degree dusk.",
    },
    KeywordDoc {
        name: "mga_26",
        description: "26 degree dawn to 26 degree dusk.",
    },
    KeywordDoc {
        name: "baal_hatanya",
        description: "1.583 degree crossings on both sides.",
    },
    KeywordDoc {
        name: "ateret_torah",
        description: "Visible sunrise to 40 clock minutes after sunset.",
    },
    KeywordDoc {
        name: "custom",
        description: "custom(start, end): any two time expressions as the \
                      day boundaries.",
    },
];

pub const CONDITION_VARS: &[KeywordDoc] = &[
    KeywordDoc {
        name: "latitude",
        description: "Observer latitude, degrees north-positive.",
    },
    KeywordDoc {
        name: "longitude",
        description: "Observer longitude, degrees east-positive.",
    },
    KeywordDoc {
        name: "elevation",
        description: "Observer elevation in meters.",
    },
    KeywordDoc {
        name: "day_length",
        description: "Visible sunrise to sunset, as a duration.",
    },
    KeywordDoc {
        name: "month",
        description: "Calendar month, 1 to 12.",
    },
    KeywordDoc {
        name: "day",
        description: "Day of month.",
    },
    KeywordDoc {
        name: "day_of_year",
        description: "Ordinal day, 1 to 366.",
    },
    KeywordDoc {
        name: "date",
        description: "Ordinal day for comparison with a date literal like \
                      21-May.",
    },
    KeywordDoc {
        name: "season",
        description: "\"spring\", \"summer\", \"autumn\", or \"winter\", \
                      hemisphere-aware.",
    },
];

pub fn function_doc(name: &str) -> Option<&'static FunctionDoc> {
    FUNCTIONS.iter().find(|doc| doc.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords;

    #[test]
    fn catalog_matches_keyword_tables() {
        for doc in FUNCTIONS {
            assert!(
                keywords::is_function(doc.name),
                "documented function {} is not dispatchable",
                doc.name
            );
        }
        assert_eq!(FUNCTIONS.len(), keywords::FUNCTION_NAMES.len());

        for doc in PRIMITIVES {
            assert!(keywords::Primitive::from_keyword(doc.name).is_some());
        }
        for doc in BASES {
            assert!(keywords::BaseName::from_keyword(doc.name).is_some());
        }
        for doc in CONDITION_VARS {
            assert!(keywords::ConditionVar::from_keyword(doc.name).is_some());
        }
    }
}
