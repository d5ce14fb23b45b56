use super::*;
use crate::ZmanError;
use chrono::TimeDelta;

#[test]
fn offset_shifts_the_primitive() {
    let context = ctx(equinox(), jerusalem());
    let sunset = eval_time("visible_sunset", &context).unwrap();
    let later = eval_time("visible_sunset + 18min", &context).unwrap();
    assert_eq!(later - sunset, TimeDelta::minutes(18));
}

#[test]
fn duration_arithmetic_inside_offset() {
    let context = ctx(equinox(), jerusalem());
    let base = eval_time("visible_sunrise", &context).unwrap();
    let shifted = eval_time("visible_sunrise + 18min * 2", &context).unwrap();
    assert_eq!(shifted - base, TimeDelta::minutes(36));
    let halved = eval_time("visible_sunrise - 72min / 2", &context).unwrap();
    assert_eq!(base - halved, TimeDelta::minutes(36));
}

#[test]
fn solar_zero_visible_is_visible_sunrise() {
    let context = ctx(equinox(), jerusalem());
    let sunrise = eval_time("visible_sunrise", &context).unwrap();
    let zero = eval_time("solar(0, before_visible_sunrise)", &context).unwrap();
    assert_eq!(sunrise, zero);
}

#[test]
fn solar_dawn_precedes_sunrise() {
    let context = ctx(equinox(), jerusalem());
    let sunrise = eval_time("visible_sunrise", &context).unwrap();
    let alos = eval_time("solar(16.1, before_visible_sunrise)", &context).unwrap();
    assert!(alos < sunrise);
    let gap = (sunrise - alos).num_minutes();
    assert!((70..=90).contains(&gap), "gap was {gap} minutes");
}

#[test]
fn solar_dusk_follows_sunset() {
    let context = ctx(equinox(), jerusalem());
    let sunset = eval_time("visible_sunset", &context).unwrap();
    let tzeis = eval_time("solar(8.5, after_visible_sunset)", &context).unwrap();
    assert!(tzeis > sunset);
}

#[test]
fn geometric_sunrise_precedes_visible() {
    // Visible sunrise corrects for refraction, which lifts the sun's image
    // above the geometric horizon, so the visible event is earlier.
    let context = ctx(equinox(), jerusalem());
    let geometric = eval_time("geometric_sunrise", &context).unwrap();
    let visible = eval_time("visible_sunrise", &context).unwrap();
    assert!(visible < geometric);
}

#[test]
fn proportional_hours_against_day_length() {
    let context = ctx(equinox(), jerusalem());
    let sunrise = eval_time("visible_sunrise", &context).unwrap();
    let sunset = eval_time("visible_sunset", &context).unwrap();
    let third_hour = eval_time("proportional_hours(3, gra)", &context).unwrap();
    let expected = sunrise + TimeDelta::seconds((sunset - sunrise).num_seconds() / 4);
    assert!((third_hour - expected).num_seconds().abs() <= 1);
}

#[test]
fn mga_sof_zman_is_earlier_than_gra() {
    let context = ctx(equinox(), jerusalem());
    let gra = eval_time("proportional_hours(3, gra)", &context).unwrap();
    let mga = eval_time("proportional_hours(3, mga_72)", &context).unwrap();
    assert!(mga < gra);
}

#[test]
fn zmanis_base_tracks_the_day_length() {
    let summer = ctx(summer_solstice(), jerusalem());
    let fixed = eval_time("proportional_hours(3, mga_72)", &summer).unwrap();
    let zmanis = eval_time("proportional_hours(3, mga_72_zmanis)", &summer).unwrap();
    // In summer a tenth of the day is more than 72 clock minutes, so the
    // zmanis day starts earlier.
    assert!(zmanis < fixed);
}

#[test]
fn custom_base_matches_equivalent_fixed_base() {
    let context = ctx(equinox(), jerusalem());
    let fixed = eval_time("proportional_hours(3, mga_72)", &context).unwrap();
    let custom = eval_time(
        "proportional_hours(3, custom(visible_sunrise - 72min, visible_sunset + 72min))",
        &context,
    )
    .unwrap();
    assert_eq!(fixed, custom);
}

#[test]
fn proportional_minutes_scales_with_the_day() {
    let context = ctx(summer_solstice(), jerusalem());
    let sunrise = eval_time("visible_sunrise", &context).unwrap();
    let alos = eval_time(
        "proportional_minutes(72, before_visible_sunrise, gra)",
        &context,
    )
    .unwrap();
    // The summer day is longer than 12 hours, so 72 proportional minutes
    // are more than 72 clock minutes.
    assert!((sunrise - alos) > TimeDelta::minutes(72));
}

#[test]
fn midpoint_of_sunset_and_sunrise() {
    let context = ctx(equinox(), jerusalem());
    let sunrise = eval_time("visible_sunrise", &context).unwrap();
    let sunset = eval_time("visible_sunset", &context).unwrap();
    let mid = eval_time("midpoint(visible_sunrise, visible_sunset)", &context).unwrap();
    assert!((mid - sunrise).num_seconds().abs_diff((sunset - mid).num_seconds()) <= 1);
}

#[test]
fn earlier_and_later_pick_correctly() {
    let context = ctx(equinox(), jerusalem());
    let sunrise = eval_time("visible_sunrise", &context).unwrap();
    let sunset = eval_time("visible_sunset", &context).unwrap();
    assert_eq!(
        eval_time("earlier_of(visible_sunset, visible_sunrise)", &context).unwrap(),
        sunrise
    );
    assert_eq!(
        eval_time("later_of(visible_sunset, visible_sunrise)", &context).unwrap(),
        sunset
    );
}

#[test]
fn polar_night_yields_none_not_error() {
    let context = ctx(winter_solstice(), tromso());
    assert!(eval_time("visible_sunrise", &context).is_none());
    assert!(eval_time("visible_sunrise + 72min", &context).is_none());
    assert!(eval_time("proportional_hours(3, gra)", &context).is_none());
    assert!(eval_time("midpoint(visible_sunrise, visible_sunset)", &context).is_none());
    // Noon survives everywhere.
    assert!(eval_time("solar_noon", &context).is_some());
}

#[test]
fn earlier_of_falls_back_to_the_defined_operand() {
    let context = ctx(winter_solstice(), tromso());
    let noon = eval_time("solar_noon", &context).unwrap();
    assert_eq!(
        eval_time("earlier_of(visible_sunrise, solar_noon)", &context).unwrap(),
        noon
    );
    assert_eq!(
        eval_time("later_of(solar_noon, visible_sunset)", &context).unwrap(),
        noon
    );
}

#[test]
fn first_valid_skips_undefined_alternatives() {
    // 16.1 degrees is never reached in a Manchester midsummer; the fixed
    // 72-minute fallback still works.
    let context = ctx(summer_solstice(), manchester());
    let fallback = eval_time("visible_sunrise - 72min", &context).unwrap();
    let picked = eval_time(
        "first_valid(solar(16.1, before_visible_sunrise), visible_sunrise - 72min)",
        &context,
    )
    .unwrap();
    assert_eq!(picked, fallback);
}

#[test]
fn first_valid_short_circuits_on_success() {
    let context = ctx(equinox(), jerusalem());
    let direct = eval_time("solar(16.1, before_visible_sunrise)", &context).unwrap();
    let picked = eval_time(
        "first_valid(solar(16.1, before_visible_sunrise), visible_sunrise - 72min)",
        &context,
    )
    .unwrap();
    assert_eq!(picked, direct);
}

#[test]
fn first_valid_of_all_undefined_is_none() {
    let context = ctx(winter_solstice(), tromso());
    let picked = eval_time(
        "first_valid(visible_sunrise, visible_sunset)",
        &context,
    );
    assert!(picked.is_none());
}

#[test]
fn seasonal_solar_defined_in_high_latitude_summer() {
    let context = ctx(summer_solstice(), manchester());
    assert!(eval_time("solar(16.1, before_visible_sunrise)", &context).is_none());
    let seasonal = eval_time("seasonal_solar(16.1, before_visible_sunrise)", &context).unwrap();
    let sunrise = eval_time("visible_sunrise", &context).unwrap();
    assert!(seasonal < sunrise);
}

#[test]
fn conditional_picks_branch_by_latitude() {
    let source = "if (latitude > 50) { visible_sunset + 30min } else { visible_sunset + 18min }";
    let north = ctx(equinox(), manchester());
    let south = ctx(equinox(), jerusalem());
    let north_gap =
        eval_time(source, &north).unwrap() - eval_time("visible_sunset", &north).unwrap();
    let south_gap =
        eval_time(source, &south).unwrap() - eval_time("visible_sunset", &south).unwrap();
    assert_eq!(north_gap, TimeDelta::minutes(30));
    assert_eq!(south_gap, TimeDelta::minutes(18));
}

#[test]
fn conditional_on_date_range() {
    let source = "if (date > 21-May && date < 21-Sep) { visible_sunset + 30min } \
                  else { visible_sunset + 18min }";
    let summer = ctx(summer_solstice(), lakewood());
    let winter = ctx(winter_solstice(), lakewood());
    let summer_gap =
        eval_time(source, &summer).unwrap() - eval_time("visible_sunset", &summer).unwrap();
    let winter_gap =
        eval_time(source, &winter).unwrap() - eval_time("visible_sunset", &winter).unwrap();
    assert_eq!(summer_gap, TimeDelta::minutes(30));
    assert_eq!(winter_gap, TimeDelta::minutes(18));
}

#[test]
fn conditional_on_day_length() {
    let source = "if (day_length > 13h) { visible_sunset + 30min } else { visible_sunset }";
    let summer = ctx(summer_solstice(), jerusalem());
    let gap = eval_time(source, &summer).unwrap() - eval_time("visible_sunset", &summer).unwrap();
    assert_eq!(gap, TimeDelta::minutes(30));
}

#[test]
fn conditional_on_season_string() {
    let source = "if (season == \"summer\") { visible_sunset + 30min } else { visible_sunset }";
    let north = ctx(summer_solstice(), lakewood());
    let gap = eval_time(source, &north).unwrap() - eval_time("visible_sunset", &north).unwrap();
    assert_eq!(gap, TimeDelta::minutes(30));
}

#[test]
fn conditional_without_else_is_none_when_false() {
    let source = "if (latitude > 60) { visible_sunset + 30min }";
    let context = ctx(equinox(), jerusalem());
    assert!(eval_time(source, &context).is_none());
}

#[test]
fn division_by_zero_is_an_error() {
    let context = ctx(equinox(), jerusalem());
    let err = eval("visible_sunrise + 18min / 0", &context).unwrap_err();
    assert!(matches!(err, ZmanError::Engine(_)));
}

#[test]
fn type_mismatch_is_an_error() {
    let context = ctx(equinox(), jerusalem());
    assert!(eval("visible_sunrise + visible_sunset", &context).is_err());
    assert!(eval("visible_sunrise * 2", &context).is_err());
}

#[test]
fn time_difference_is_a_duration() {
    let context = ctx(equinox(), jerusalem());
    let source = "if ((visible_sunset - visible_sunrise) > 11h) \
                  { visible_sunset + 30min } else { visible_sunset }";
    let value = eval_time(source, &context).unwrap();
    let sunset = eval_time("visible_sunset", &context).unwrap();
    // Day length at the equinox is just over 12 hours.
    assert_eq!(value - sunset, TimeDelta::minutes(30));
}

#[test]
fn unknown_function_is_reported() {
    let context = ctx(equinox(), jerusalem());
    let err = eval("solr(16.1, before_visible_sunrise)", &context).unwrap_err();
    assert!(matches!(err, ZmanError::UnknownFunction { .. }));
}

#[test]
fn wrong_arity_is_reported() {
    let context = ctx(equinox(), jerusalem());
    let err = eval("midpoint(visible_sunrise)", &context).unwrap_err();
    assert!(matches!(err, ZmanError::Arity { .. }));
}

#[test]
fn solar_midnight_is_opposite_noon() {
    let context = ctx(equinox(), jerusalem());
    let noon = eval_time("solar_noon", &context).unwrap();
    let midnight = eval_time("solar_midnight", &context).unwrap();
    assert_eq!(midnight - noon, TimeDelta::hours(12));
}

#[test]
fn evaluation_is_deterministic() {
    let context = ctx(summer_solstice(), jerusalem());
    let source = "seasonal_solar(16.1, before_visible_sunrise)";
    assert_eq!(eval_time(source, &context), eval_time(source, &context));
}

#[test]
fn summer_alos_is_before_geometric_sunrise() {
    let context = ctx(summer_solstice(), jerusalem());
    let alos = eval_time("solar(16.1, before_visible_sunrise)", &context).unwrap();
    let geometric = eval_time("geometric_sunrise", &context).unwrap();
    assert!(alos < geometric);
}

#[test]
fn proportional_hours_of_a_twelve_hour_day_are_clock_hours() {
    let context = ctx(equinox(), jerusalem());
    let sunrise = eval_time("visible_sunrise", &context).unwrap();
    let third = eval_time(
        "proportional_hours(3, custom(visible_sunrise, visible_sunrise + 12h))",
        &context,
    )
    .unwrap();
    assert_eq!(third - sunrise, TimeDelta::hours(3));
}

#[test]
fn twilight_ladder_is_ordered() {
    let context = ctx(equinox(), jerusalem());
    let astronomical = eval_time("astronomical_dawn", &context).unwrap();
    let nautical = eval_time("nautical_dawn", &context).unwrap();
    let civil = eval_time("civil_dawn", &context).unwrap();
    let sunrise = eval_time("visible_sunrise", &context).unwrap();
    assert!(astronomical < nautical);
    assert!(nautical < civil);
    assert!(civil < sunrise);
}
