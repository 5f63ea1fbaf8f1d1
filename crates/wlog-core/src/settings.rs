//! Accounting rule configuration.
//!
//! [`Settings`] is always fully populated. Foreign or partial input goes
//! through [`Settings::normalize`], which starts from the defaults and copies
//! each recognised field only if it passes that field's validator in
//! [`FIELD_RULES`]. Invalid fields keep their default; nothing here fails.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::time::{ClockTime, hours_to_ms, parse_clock};

static REGION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}$").unwrap());

/// Failures when editing a single settings field interactively.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("unknown settings field: {0}")]
    UnknownField(String),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Process-wide accounting rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct Settings {
    /// Free-text label, only carried into CSV exports.
    pub location: String,
    /// Two-letter region code selecting the regional holiday set.
    pub state_code: String,
    /// Target hours per workday (0 to 24), also the credit for a day marker.
    pub hours_per_day: f64,
    pub default_pause_minutes: u32,
    pub dienstbeginn_enabled: bool,
    pub dienstbeginn_time: ClockTime,
    pub dienstbeginn_early_minutes: u32,
    pub surcharge_enabled: bool,
    pub surcharge_night_from: ClockTime,
    pub surcharge_night_to: ClockTime,
    /// Sundays and holidays earn the whole day instead of the night window.
    pub surcharge_sunday_holiday: bool,
    pub exclude_public_holidays_from_expected: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            location: String::new(),
            state_code: "BY".to_string(),
            hours_per_day: 8.5,
            default_pause_minutes: 30,
            dienstbeginn_enabled: false,
            dienstbeginn_time: clock(8, 0),
            dienstbeginn_early_minutes: 15,
            surcharge_enabled: true,
            surcharge_night_from: clock(22, 0),
            surcharge_night_to: clock(5, 0),
            surcharge_sunday_holiday: true,
            exclude_public_holidays_from_expected: true,
        }
    }
}

fn clock(hour: u32, minute: u32) -> ClockTime {
    ClockTime::new(hour, minute).unwrap_or_else(|| unreachable!("constant clock time"))
}

impl Settings {
    /// Builds settings from arbitrary JSON, keeping defaults for anything
    /// missing or invalid.
    pub fn normalize(candidate: &Value) -> Self {
        let mut settings = Self::default();
        let Some(map) = candidate.as_object() else {
            tracing::debug!("settings candidate is not an object, using defaults");
            return settings;
        };
        for rule in FIELD_RULES {
            let Some(value) = map.get(rule.name) else {
                continue;
            };
            if !(rule.apply)(&mut settings, value) {
                tracing::debug!(field = rule.name, %value, "ignoring invalid settings field");
            }
        }
        settings
    }

    /// Parses and normalizes a JSON document; unparseable text yields defaults.
    pub fn from_json_str(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::normalize(&value),
            Err(err) => {
                tracing::warn!(error = %err, "stored settings are not valid JSON, using defaults");
                Self::default()
            }
        }
    }

    /// Returns a copy with one field replaced, rejecting invalid values.
    pub fn with_field(&self, name: &str, value: &Value) -> Result<Self, SettingsError> {
        let rule = FIELD_RULES
            .iter()
            .find(|rule| rule.name == name)
            .ok_or_else(|| SettingsError::UnknownField(name.to_string()))?;
        let mut updated = self.clone();
        if (rule.apply)(&mut updated, value) {
            Ok(updated)
        } else {
            Err(SettingsError::InvalidValue {
                field: rule.name,
                value: value.to_string(),
            })
        }
    }

    /// Names of all recognised fields, in serialization order.
    pub fn field_names() -> impl Iterator<Item = &'static str> {
        FIELD_RULES.iter().map(|rule| rule.name)
    }

    /// Flat credit for a whole-day marker, and the per-weekday target.
    pub fn day_target_ms(&self) -> i64 {
        hours_to_ms(self.hours_per_day)
    }
}

impl From<Value> for Settings {
    fn from(value: Value) -> Self {
        Self::normalize(&value)
    }
}

/// One recognised field: its wire name and a validating setter.
///
/// `apply` returns `false` and leaves the settings untouched when the value
/// fails validation.
struct FieldRule {
    name: &'static str,
    apply: fn(&mut Settings, &Value) -> bool,
}

const MAX_HOURS_PER_DAY: f64 = 24.0;
const MAX_MINUTES: u32 = 24 * 60;

const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        name: "location",
        apply: |s, v| assign(&mut s.location, text(v)),
    },
    FieldRule {
        name: "stateCode",
        apply: |s, v| assign(&mut s.state_code, region(v)),
    },
    FieldRule {
        name: "hoursPerDay",
        apply: |s, v| assign(&mut s.hours_per_day, hours_per_day(v)),
    },
    FieldRule {
        name: "defaultPauseMinutes",
        apply: |s, v| assign(&mut s.default_pause_minutes, minutes(v)),
    },
    FieldRule {
        name: "dienstbeginnEnabled",
        apply: |s, v| assign(&mut s.dienstbeginn_enabled, v.as_bool()),
    },
    FieldRule {
        name: "dienstbeginnTime",
        apply: |s, v| assign(&mut s.dienstbeginn_time, clock_time(v)),
    },
    FieldRule {
        name: "dienstbeginnEarlyMinutes",
        apply: |s, v| assign(&mut s.dienstbeginn_early_minutes, minutes(v)),
    },
    FieldRule {
        name: "surchargeEnabled",
        apply: |s, v| assign(&mut s.surcharge_enabled, v.as_bool()),
    },
    FieldRule {
        name: "surchargeNightFrom",
        apply: |s, v| assign(&mut s.surcharge_night_from, clock_time(v)),
    },
    FieldRule {
        name: "surchargeNightTo",
        apply: |s, v| assign(&mut s.surcharge_night_to, clock_time(v)),
    },
    FieldRule {
        name: "surchargeSundayHoliday",
        apply: |s, v| assign(&mut s.surcharge_sunday_holiday, v.as_bool()),
    },
    FieldRule {
        name: "excludePublicHolidaysFromExpected",
        apply: |s, v| assign(&mut s.exclude_public_holidays_from_expected, v.as_bool()),
    },
];

fn assign<T>(slot: &mut T, value: Option<T>) -> bool {
    value.map(|value| *slot = value).is_some()
}

fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn region(value: &Value) -> Option<String> {
    let code = value.as_str()?.trim();
    REGION_RE.is_match(code).then(|| code.to_uppercase())
}

/// Finite, non-negative number; numeric strings are accepted.
fn non_negative(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (number.is_finite() && number >= 0.0).then_some(number)
}

/// At most one full day.
fn hours_per_day(value: &Value) -> Option<f64> {
    non_negative(value).filter(|hours| *hours <= MAX_HOURS_PER_DAY)
}

/// Whole minutes, at most one full day.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn minutes(value: &Value) -> Option<u32> {
    non_negative(value)
        .map(f64::round)
        .filter(|m| *m <= f64::from(MAX_MINUTES))
        .map(|m| m as u32)
}

fn clock_time(value: &Value) -> Option<ClockTime> {
    value.as_str().and_then(parse_clock)
}
