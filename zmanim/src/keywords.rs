//! Keyword tables for the formula language
//!
//! Identifiers in a formula are classified against these tables while the
//! AST is built: astronomical primitives, direction keywords, day-boundary
//! bases, and condition variables. Unknown identifiers in call position stay
//! plain function names so the validator can report them.

use serde::Serialize;
use std::fmt;

/// Built-in astronomical time primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    VisibleSunrise,
    VisibleSunset,
    GeometricSunrise,
    GeometricSunset,
    SolarNoon,
    SolarMidnight,
    CivilDawn,
    CivilDusk,
    NauticalDawn,
    NauticalDusk,
    AstronomicalDawn,
    AstronomicalDusk,
}

impl Primitive {
    pub fn from_keyword(name: &str) -> Option<Self> {
        Some(match name {
            "visible_sunrise" => Self::VisibleSunrise,
            "visible_sunset" => Self::VisibleSunset,
            // Legacy aliases from before the visible/geometric split
            "sunrise" => Self::VisibleSunrise,
            "sunset" => Self::VisibleSunset,
            "geometric_sunrise" => Self::GeometricSunrise,
            "geometric_sunset" => Self::GeometricSunset,
            "solar_noon" => Self::SolarNoon,
            "solar_midnight" => Self::SolarMidnight,
            "civil_dawn" => Self::CivilDawn,
            "civil_dusk" => Self::CivilDusk,
            "nautical_dawn" => Self::NauticalDawn,
            "nautical_dusk" => Self::NauticalDusk,
            "astronomical_dawn" => Self::AstronomicalDawn,
            "astronomical_dusk" => Self::AstronomicalDusk,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VisibleSunrise => "visible_sunrise",
            Self::VisibleSunset => "visible_sunset",
            Self::GeometricSunrise => "geometric_sunrise",
            Self::GeometricSunset => "geometric_sunset",
            Self::SolarNoon => "solar_noon",
            Self::SolarMidnight => "solar_midnight",
            Self::CivilDawn => "civil_dawn",
            Self::CivilDusk => "civil_dusk",
            Self::NauticalDawn => "nautical_dawn",
            Self::NauticalDusk => "nautical_dusk",
            Self::AstronomicalDawn => "astronomical_dawn",
            Self::AstronomicalDusk => "astronomical_dusk",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction keywords selecting the morning or evening crossing, and the
/// visible (refracted) or geometric horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    BeforeVisibleSunrise,
    AfterVisibleSunrise,
    BeforeVisibleSunset,
    AfterVisibleSunset,
    BeforeGeometricSunrise,
    AfterGeometricSunrise,
    BeforeGeometricSunset,
    AfterGeometricSunset,
    BeforeNoon,
    AfterNoon,
}

impl Direction {
    pub fn from_keyword(name: &str) -> Option<Self> {
        Some(match name {
            "before_visible_sunrise" => Self::BeforeVisibleSunrise,
            "after_visible_sunrise" => Self::AfterVisibleSunrise,
            "before_visible_sunset" => Self::BeforeVisibleSunset,
            "after_visible_sunset" => Self::AfterVisibleSunset,
            "before_geometric_sunrise" => Self::BeforeGeometricSunrise,
            "after_geometric_sunrise" => Self::AfterGeometricSunrise,
            "before_geometric_sunset" => Self::BeforeGeometricSunset,
            "after_geometric_sunset" => Self::AfterGeometricSunset,
            "before_noon" => Self::BeforeNoon,
            "after_noon" => Self::AfterNoon,
            // Legacy aliases default to the visible horizon
            "before_sunrise" => Self::BeforeVisibleSunrise,
            "after_sunrise" => Self::AfterVisibleSunrise,
            "after_sunset" => Self::AfterVisibleSunset,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeVisibleSunrise => "before_visible_sunrise",
            Self::AfterVisibleSunrise => "after_visible_sunrise",
            Self::BeforeVisibleSunset => "before_visible_sunset",
            Self::AfterVisibleSunset => "after_visible_sunset",
            Self::BeforeGeometricSunrise => "before_geometric_sunrise",
            Self::AfterGeometricSunrise => "after_geometric_sunrise",
            Self::BeforeGeometricSunset => "before_geometric_sunset",
            Self::AfterGeometricSunset => "after_geometric_sunset",
            Self::BeforeNoon => "before_noon",
            Self::AfterNoon => "after_noon",
        }
    }

    /// True when the direction names the morning crossing (sunrise side).
    pub fn is_morning(&self) -> bool {
        matches!(
            self,
            Self::BeforeVisibleSunrise
                | Self::AfterVisibleSunrise
                | Self::BeforeGeometricSunrise
                | Self::AfterGeometricSunrise
                | Self::BeforeNoon
        )
    }

    /// True when the direction references the visible (refracted) horizon.
    pub fn is_visible(&self) -> bool {
        matches!(
            self,
            Self::BeforeVisibleSunrise
                | Self::AfterVisibleSunrise
                | Self::BeforeVisibleSunset
                | Self::AfterVisibleSunset
        )
    }

    /// Directions accepted by `seasonal_solar` and `proportional_minutes`:
    /// dawn before sunrise or dusk after sunset, visible or geometric.
    pub fn is_day_edge(&self) -> bool {
        matches!(
            self,
            Self::BeforeVisibleSunrise
                | Self::AfterVisibleSunset
                | Self::BeforeGeometricSunrise
                | Self::AfterGeometricSunset
        )
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day-boundary conventions for proportional time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseName {
    /// GRA: visible sunrise to visible sunset.
    Gra,
    Mga60,
    /// MGA: 72 clock minutes before sunrise to 72 after sunset.
    Mga72,
    Mga90,
    Mga96,
    Mga120,
    /// 1/10 of the day before sunrise to 1/10 after sunset.
    Mga72Zmanis,
    /// 1/8 of the day.
    Mga90Zmanis,
    /// 1/7.5 of the day.
    Mga96Zmanis,
    /// 16.1 degree dawn to 16.1 degree dusk.
    Mga16_1,
    Mga18,
    Mga19_8,
    Mga26,
    /// Netz amiti to shkiah amiti, 1.583 degrees below the horizon.
    BaalHatanya,
    /// Sunrise to 40 clock minutes after sunset.
    AteretTorah,
    /// User-supplied `custom(start, end)` boundaries.
    Custom,
}

impl BaseName {
    pub fn from_keyword(name: &str) -> Option<Self> {
        Some(match name {
            "gra" => Self::Gra,
            "mga" | "mga_72" => Self::Mga72,
            "mga_60" => Self::Mga60,
            "mga_90" => Self::Mga90,
            "mga_96" => Self::Mga96,
            "mga_120" => Self::Mga120,
            "mga_72_zmanis" => Self::Mga72Zmanis,
            "mga_90_zmanis" => Self::Mga90Zmanis,
            "mga_96_zmanis" => Self::Mga96Zmanis,
            "mga_16_1" => Self::Mga16_1,
            "mga_18" => Self::Mga18,
            "mga_19_8" => Self::Mga19_8,
            "mga_26" => Self::Mga26,
            "baal_hatanya" => Self::BaalHatanya,
            "ateret_torah" => Self::AteretTorah,
            "custom" => Self::Custom,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gra => "gra",
            Self::Mga60 => "mga_60",
            Self::Mga72 => "mga_72",
            Self::Mga90 => "mga_90",
            Self::Mga96 => "mga_96",
            Self::Mga120 => "mga_120",
            Self::Mga72Zmanis => "mga_72_zmanis",
            Self::Mga90Zmanis => "mga_90_zmanis",
            Self::Mga96Zmanis => "mga_96_zmanis",
            Self::Mga16_1 => "mga_16_1",
            Self::Mga18 => "mga_18",
            Self::Mga19_8 => "mga_19_8",
            Self::Mga26 => "mga_26",
            Self::BaalHatanya => "baal_hatanya",
            Self::AteretTorah => "ateret_torah",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for BaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variables usable inside `if (...)` conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionVar {
    Latitude,
    Longitude,
    Elevation,
    DayLength,
    Month,
    Day,
    DayOfYear,
    /// Day of year, for comparison against date literals like `21-May`.
    Date,
    Season,
}

impl ConditionVar {
    pub fn from_keyword(name: &str) -> Option<Self> {
        Some(match name {
            "latitude" => Self::Latitude,
            "longitude" => Self::Longitude,
            "elevation" => Self::Elevation,
            "day_length" => Self::DayLength,
            "month" => Self::Month,
            "day" => Self::Day,
            "day_of_year" => Self::DayOfYear,
            "date" => Self::Date,
            "season" => Self::Season,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Elevation => "elevation",
            Self::DayLength => "day_length",
            Self::Month => "month",
            Self::Day => "day",
            Self::DayOfYear => "day_of_year",
            Self::Date => "date",
            Self::Season => "season",
        }
    }
}

impl fmt::Display for ConditionVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed positional arity of a built-in function: `(min, max)`,
/// `max == None` for variadic tails.
pub fn function_arity(name: &str) -> Option<(usize, Option<usize>)> {
    Some(match name {
        "solar" => (2, Some(2)),
        "seasonal_solar" => (2, Some(2)),
        "proportional_hours" => (2, Some(2)),
        "proportional_minutes" => (3, Some(3)),
        "midpoint" => (2, Some(2)),
        "first_valid" => (1, None),
        "earlier_of" => (2, Some(2)),
        "later_of" => (2, Some(2)),
        _ => return None,
    })
}

pub fn is_function(name: &str) -> bool {
    function_arity(name).is_some()
}

pub const FUNCTION_NAMES: &[&str] = &[
    "solar",
    "seasonal_solar",
    "proportional_hours",
    "proportional_minutes",
    "midpoint",
    "first_valid",
    "earlier_of",
    "later_of",
];

pub const PRIMITIVE_NAMES: &[&str] = &[
    "visible_sunrise",
    "visible_sunset",
    "geometric_sunrise",
    "geometric_sunset",
    "solar_noon",
    "solar_midnight",
    "civil_dawn",
    "civil_dusk",
    "nautical_dawn",
    "nautical_dusk",
    "astronomical_dawn",
    "astronomical_dusk",
];

pub const DIRECTION_NAMES: &[&str] = &[
    "before_visible_sunrise",
    "after_visible_sunrise",
    "before_visible_sunset",
    "after_visible_sunset",
    "before_geometric_sunrise",
    "after_geometric_sunrise",
    "before_geometric_sunset",
    "after_geometric_sunset",
    "before_noon",
    "after_noon",
];

pub const BASE_NAMES: &[&str] = &[
    "gra",
    "mga",
    "mga_60",
    "mga_72",
    "mga_90",
    "mga_96",
    "mga_120",
    "mga_72_zmanis",
    "mga_90_zmanis",
    "mga_96_zmanis",
    "mga_16_1",
    "mga_18",
    "mga_19_8",
    "mga_26",
    "baal_hatanya",
    "ateret_torah",
    "custom",
];

pub const CONDITION_VAR_NAMES: &[&str] = &[
    "latitude",
    "longitude",
    "elevation",
    "day_length",
    "month",
    "day",
    "day_of_year",
    "date",
    "season",
];

/// Month abbreviation used by date literals (`21-May`).
pub fn month_number(abbrev: &str) -> Option<u32> {
    Some(match abbrev {
        "Jan" => 1,
        "Feb" => 2,
        "Mar" => 3,
        "Apr" => 4,
        "May" => 5,
        "Jun" => 6,
        "Jul" => 7,
        "Aug" => 8,
        "Sep" => 9,
        "Oct" => 10,
        "Nov" => 11,
        "Dec" => 12,
        _ => return None,
    })
}

pub fn month_abbrev(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        _ => "Dec",
    }
}
