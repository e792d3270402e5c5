// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weight configuration and calorie target math.
//!
//! Weights are always carried in kilograms. The metric/imperial flag only
//! affects how a weight is parsed from or rendered for the user.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Kilograms in one stone (the imperial display unit).
pub const KG_PER_STONE: f64 = 6.35029318;
/// Maintenance estimate: calories per kilogram of body weight.
pub const CALORIES_PER_KG: f64 = 30.0;
/// Daily surplus on top of maintenance (~0.5 kg/week gain).
pub const SURPLUS_CALORIES: u32 = 500;

pub const DEFAULT_CURRENT_WEIGHT_KG: f64 = 70.0;
pub const DEFAULT_GOAL_WEIGHT_KG: f64 = 75.0;
pub const DEFAULT_USE_METRIC: bool = true;

/// Calorie targets derived from a body weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalorieTargets {
    pub maintenance_calories: u32,
    pub weight_gain_calories: u32,
    pub daily_target: u32,
}

/// Compute calorie targets for a weight.
///
/// When `use_metric` is false the weights are in stone and are converted to
/// kilograms first. The goal weight does not enter the formula.
///
/// There are no error conditions: a NaN weight saturates to a maintenance of
/// 0, which callers are expected to have rejected before getting here.
pub fn calculate_calories(
    current_weight: f64,
    _goal_weight: f64,
    use_metric: bool,
) -> CalorieTargets {
    let weight_kg = display_to_kg(current_weight, use_metric);
    // `as` saturates: NaN -> 0, negative -> 0, huge -> u32::MAX.
    let maintenance_calories = (weight_kg * CALORIES_PER_KG).round() as u32;
    let weight_gain_calories = maintenance_calories.saturating_add(SURPLUS_CALORIES);

    CalorieTargets {
        maintenance_calories,
        weight_gain_calories,
        daily_target: weight_gain_calories,
    }
}

/// Convert a kilogram weight to the user's display unit.
pub fn kg_to_display(weight_kg: f64, use_metric: bool) -> f64 {
    if use_metric {
        weight_kg
    } else {
        weight_kg / KG_PER_STONE
    }
}

/// Convert a weight entered in the user's display unit to kilograms.
pub fn display_to_kg(value: f64, use_metric: bool) -> f64 {
    if use_metric {
        value
    } else {
        value * KG_PER_STONE
    }
}

/// Render a kilogram weight for display, e.g. `"70.0 kg"` or `"11.0 st"`.
pub fn format_weight(weight_kg: f64, use_metric: bool) -> String {
    let unit = if use_metric { "kg" } else { "st" };
    format!("{:.1} {}", kg_to_display(weight_kg, use_metric), unit)
}

/// The user's weight-gain parameters with derived calorie targets.
///
/// The calorie fields are a projection of `current_weight`; build values
/// through [`WeightConfig::from_weights`] so they cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeightConfig {
    /// Current weight in kilograms
    pub current_weight: f64,
    /// Goal weight in kilograms
    pub goal_weight: f64,
    /// Display weights in kilograms (true) or stone (false)
    pub use_metric: bool,
    pub daily_target: u32,
    pub maintenance_calories: u32,
    pub weight_gain_calories: u32,
}

impl WeightConfig {
    /// Build a config from kilogram weights, deriving the calorie targets.
    pub fn from_weights(current_weight: f64, goal_weight: f64, use_metric: bool) -> Self {
        // Stored weights are kilograms whatever the display flag says.
        let targets = calculate_calories(current_weight, goal_weight, true);
        Self {
            current_weight,
            goal_weight,
            use_metric,
            daily_target: targets.daily_target,
            maintenance_calories: targets.maintenance_calories,
            weight_gain_calories: targets.weight_gain_calories,
        }
    }

    pub fn targets(&self) -> CalorieTargets {
        CalorieTargets {
            maintenance_calories: self.maintenance_calories,
            weight_gain_calories: self.weight_gain_calories,
            daily_target: self.daily_target,
        }
    }

    /// Kilograms still to gain before reaching the goal (never negative).
    pub fn remaining_gain_kg(&self) -> f64 {
        (self.goal_weight - self.current_weight).max(0.0)
    }
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self::from_weights(
            DEFAULT_CURRENT_WEIGHT_KG,
            DEFAULT_GOAL_WEIGHT_KG,
            DEFAULT_USE_METRIC,
        )
    }
}

/// Partial update of the weight parameters. `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightUpdate {
    /// Kilograms
    pub current_weight: Option<f64>,
    /// Kilograms
    pub goal_weight: Option<f64>,
    pub use_metric: Option<bool>,
}
