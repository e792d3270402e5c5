// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted user profile record.
//!
//! The profile lives as one JSON blob under a single store key. Only the
//! weights and unit flag are canonical for the calorie math; any calorie
//! numbers are recomputed on read.
//!
//! Older app versions wrote the side fields (daily progress, questionnaire
//! answers) with looser types, so those are read leniently: a field of an
//! unexpected shape never makes the whole record unreadable.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::models::weight_config::{
    WeightConfig, WeightUpdate, DEFAULT_CURRENT_WEIGHT_KG, DEFAULT_GOAL_WEIGHT_KG,
    DEFAULT_USE_METRIC,
};

/// Most progress photos kept; older ones are dropped first.
pub const MAX_PROGRESS_PHOTOS: usize = 10;

const DERIVED_FIELDS: [&str; 3] = ["dailyTarget", "maintenanceCalories", "weightGainCalories"];

/// The stored profile blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Kilograms
    #[serde(default, deserialize_with = "lenient::number")]
    pub current_weight: Option<f64>,
    /// Kilograms
    #[serde(default, deserialize_with = "lenient::number")]
    pub goal_weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub use_metric: Option<bool>,

    // ─── Daily Progress ──────────────────────────────────────────
    /// Calories logged from completed meals
    #[serde(default, deserialize_with = "lenient::calories")]
    pub daily_calories: u32,
    /// Completed meals keyed by meal ID. Entries written here are
    /// `{"calories": n}`; older entries are kept as found.
    #[serde(default, deserialize_with = "lenient::object")]
    pub completed_meals: Map<String, Value>,

    // ─── Onboarding Answers ──────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_frequency: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meals_per_day: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_preference: Option<Value>,
    /// Months
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<Value>,

    /// Last write timestamp (RFC3339)
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<String>,

    /// Fields this version does not know about, kept across rewrites.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deserializers that accept whatever shape an earlier writer left behind.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::{Map, Value};

    /// A number, or a numeric string. Anything else reads as absent.
    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Value::deserialize(deserializer)?.as_bool())
    }

    /// Any non-negative number, rounded. Anything else reads as 0.
    pub fn calories<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = number(deserializer)?.filter(|n| n.is_finite());
        // `as` saturates negatives to 0.
        Ok(value.map_or(0, |n| n.round() as u32))
    }

    pub fn object<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(map) => map,
            _ => Map::new(),
        })
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }
}

/// A stored weight counts unless it is missing, zero or NaN.
fn usable_weight(weight: Option<f64>) -> Option<f64> {
    weight.filter(|w| !w.is_nan() && *w != 0.0)
}

impl UserProfile {
    /// Whether both stored weights are usable (present and non-zero).
    pub fn has_weights(&self) -> bool {
        usable_weight(self.current_weight).is_some() && usable_weight(self.goal_weight).is_some()
    }

    /// Project the stored weights into a config with fresh calorie targets.
    ///
    /// Falls back to the default config when the weights are missing or zero.
    pub fn weight_config(&self) -> WeightConfig {
        match (self.current_weight, self.goal_weight) {
            (Some(current), Some(goal)) if self.has_weights() => WeightConfig::from_weights(
                current,
                goal,
                self.use_metric.unwrap_or(DEFAULT_USE_METRIC),
            ),
            _ => WeightConfig::default(),
        }
    }

    /// Merge a weight update over this profile and return the config for
    /// exactly the merged values.
    ///
    /// Each field falls back to the stored value, then to the default. The
    /// update itself is taken as given. Daily progress is wiped on every
    /// update.
    pub fn apply_weight_update(&mut self, update: &WeightUpdate) -> WeightConfig {
        let current_weight = update
            .current_weight
            .or(usable_weight(self.current_weight))
            .unwrap_or(DEFAULT_CURRENT_WEIGHT_KG);
        let goal_weight = update
            .goal_weight
            .or(usable_weight(self.goal_weight))
            .unwrap_or(DEFAULT_GOAL_WEIGHT_KG);
        let use_metric = update
            .use_metric
            .or(self.use_metric)
            .unwrap_or(DEFAULT_USE_METRIC);

        self.current_weight = Some(current_weight);
        self.goal_weight = Some(goal_weight);
        self.use_metric = Some(use_metric);
        self.reset_daily_progress();

        WeightConfig::from_weights(current_weight, goal_weight, use_metric)
    }

    /// Drop calorie fields an older writer may have stored; they are derived.
    pub fn strip_derived_fields(&mut self) {
        self.extra
            .retain(|key, _| !DERIVED_FIELDS.contains(&key.as_str()));
    }

    pub fn reset_daily_progress(&mut self) {
        self.daily_calories = 0;
        self.completed_meals.clear();
    }

    /// Record a completed meal. Returns false if it was already completed.
    pub fn complete_meal(&mut self, meal_id: &str, calories: u32) -> bool {
        if self.completed_meals.contains_key(meal_id) {
            return false;
        }
        self.completed_meals
            .insert(meal_id.to_string(), json!({ "calories": calories }));
        self.daily_calories = self.daily_calories.saturating_add(calories);
        true
    }
}

/// Append `id` to a progress photo index, returning the IDs evicted by the cap.
pub fn push_progress_photo(index: &mut Vec<u64>, id: u64) -> Vec<u64> {
    index.push(id);
    let excess = index.len().saturating_sub(MAX_PROGRESS_PHOTOS);
    index.drain(..excess).collect()
}
