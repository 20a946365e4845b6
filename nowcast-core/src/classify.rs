//! WMO condition code classification.
//!
//! Codes are looked up in [`RULES`], an ordered table of disjoint code ranges.
//! The first row containing the code wins. Codes the provider leaves unused
//! (4..=44, 100 and above, ...) have no row and classify to `None`, which
//! callers treat as "no illustration".

use std::ops::RangeInclusive;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConditionCategory {
    pub label: &'static str,
    pub illustration_key: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionRule {
    pub codes: RangeInclusive<i32>,
    pub label: &'static str,
    pub day_key: &'static str,
    /// Equal to `day_key` when the category has no separate night artwork.
    pub night_key: &'static str,
}

impl ConditionRule {
    const fn new(
        codes: RangeInclusive<i32>,
        label: &'static str,
        day_key: &'static str,
        night_key: &'static str,
    ) -> Self {
        Self { codes, label, day_key, night_key }
    }

    fn category(&self, is_day: bool) -> ConditionCategory {
        ConditionCategory {
            label: self.label,
            illustration_key: if is_day { self.day_key } else { self.night_key },
        }
    }
}

pub const RULES: &[ConditionRule] = &[
    ConditionRule::new(0..=0, "Clear Sky", "clear-day", "clear-night"),
    ConditionRule::new(1..=1, "Mainly Clear", "mostly-clear-day", "mostly-clear-night"),
    ConditionRule::new(2..=2, "Partly Cloudy", "partly-cloudy-day", "partly-cloudy-night"),
    ConditionRule::new(3..=3, "Overcast", "overcast-day", "overcast-night"),
    ConditionRule::new(45..=45, "Fog", "fog", "fog"),
    ConditionRule::new(48..=48, "Rime Fog", "rime-fog", "rime-fog"),
    ConditionRule::new(51..=55, "Drizzle", "drizzle-day", "drizzle-night"),
    ConditionRule::new(56..=57, "Freezing Drizzle", "freezing-drizzle", "freezing-drizzle"),
    ConditionRule::new(61..=61, "Partial Rain", "partial-rain-day", "partial-rain-night"),
    ConditionRule::new(62..=65, "Rain", "rain-day", "rain-night"),
    ConditionRule::new(66..=67, "Freezing Rain", "freezing-rain", "freezing-rain"),
    ConditionRule::new(71..=75, "Snow", "snow-day", "snow-night"),
    ConditionRule::new(76..=77, "Snow Grains", "snow-grains", "snow-grains"),
    ConditionRule::new(80..=82, "Rain Showers", "rain-showers-day", "rain-showers-night"),
    ConditionRule::new(85..=86, "Snow Showers", "snow-showers-day", "snow-showers-night"),
    ConditionRule::new(95..=95, "Thunderstorm", "thunderstorm", "thunderstorm"),
    ConditionRule::new(96..=99, "Thunderstorm with Hail", "thunderstorm-hail", "thunderstorm-hail"),
];

pub fn rules() -> &'static [ConditionRule] {
    RULES
}

pub fn classify(code: i32, is_day: bool) -> Option<ConditionCategory> {
    RULES
        .iter()
        .find(|rule| rule.codes.contains(&code))
        .map(|rule| rule.category(is_day))
}

/// [`classify`] with the daytime variant, used for daily entries which carry
/// no day/night flag.
pub fn classify_day(code: i32) -> Option<ConditionCategory> {
    classify(code, true)
}
