//! Remote scroll-hint timing configuration.
//!
//! The configuration arrives as an untrusted partial JSON object from remote
//! config; every field falls back independently to its documented default, so
//! a malformed or missing field can never break the hint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Timing of the scroll-hint state machine, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollHintConfig {
    /// Inactivity before the hint first appears.
    pub first_appear_after_inactivity_ms: u64,
    /// Visible time with no interaction before the first appearance hides.
    pub first_disappear_after_inactivity_ms: u64,
    /// Further inactivity before the second appearance.
    pub second_appear_after_inactivity_ms: u64,
    /// Visible time with no interaction before the second appearance hides.
    pub second_disappear_after_inactivity_ms: u64,
}

impl Default for ScrollHintConfig {
    fn default() -> Self {
        Self {
            first_appear_after_inactivity_ms: 7_000,
            first_disappear_after_inactivity_ms: 4_000,
            second_appear_after_inactivity_ms: 10_000,
            second_disappear_after_inactivity_ms: 4_000,
        }
    }
}

impl ScrollHintConfig {
    /// Build a config from a raw remote-config JSON string. Never fails.
    pub fn from_json(raw: &str) -> Self {
        let value: Value = serde_json::from_str(raw).unwrap_or(Value::Null);
        Self::from_value(&value)
    }

    /// Build a config from an already-parsed JSON value, field by field.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        Self {
            first_appear_after_inactivity_ms: field_ms(value, "firstAppearAfterInactivityMs")
                .unwrap_or(defaults.first_appear_after_inactivity_ms),
            first_disappear_after_inactivity_ms: field_ms(value, "firstDisappearAfterInactivityMs")
                .unwrap_or(defaults.first_disappear_after_inactivity_ms),
            second_appear_after_inactivity_ms: field_ms(value, "secondAppearAfterInactivityMs")
                .unwrap_or(defaults.second_appear_after_inactivity_ms),
            second_disappear_after_inactivity_ms: field_ms(
                value,
                "secondDisappearAfterInactivityMs",
            )
            .unwrap_or(defaults.second_disappear_after_inactivity_ms),
        }
    }
}

/// Read one millisecond field leniently: a JSON number or a numeric string.
fn field_ms(value: &Value, key: &str) -> Option<u64> {
    let field = value.get(key)?;
    field
        .as_u64()
        .or_else(|| field.as_str().and_then(|s| s.trim().parse().ok()))
}
