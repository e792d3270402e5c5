// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weight configuration and calorie routes.

use crate::error::{AppError, Result};
use crate::models::weight_config::{display_to_kg, format_weight};
use crate::models::{CalorieTargets, WeightConfig, WeightUpdate};
use crate::services::WeightConfigStore;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/weight-config",
            get(get_weight_config).put(update_weight_config),
        )
        .route("/api/calories", get(get_calories))
}

// ─── Weight Config ───────────────────────────────────────────

/// Weight config with display strings in the user's unit.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeightConfigResponse {
    #[serde(flatten)]
    pub config: WeightConfig,
    pub current_weight_display: String,
    pub goal_weight_display: String,
    pub remaining_gain_display: String,
}

impl From<WeightConfig> for WeightConfigResponse {
    fn from(config: WeightConfig) -> Self {
        Self {
            current_weight_display: format_weight(config.current_weight, config.use_metric),
            goal_weight_display: format_weight(config.goal_weight, config.use_metric),
            remaining_gain_display: format_weight(config.remaining_gain_kg(), config.use_metric),
            config,
        }
    }
}

/// Get the current weight config.
async fn get_weight_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WeightConfigResponse>> {
    let config = state.weight_config.try_load_weight_config().await?;
    Ok(Json(config.into()))
}

/// Partial weight update. Weights are kilograms.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWeightRequest {
    #[validate(range(exclusive_min = 0.0, max = 500.0))]
    pub current_weight: Option<f64>,
    #[validate(range(exclusive_min = 0.0, max = 500.0))]
    pub goal_weight: Option<f64>,
    pub use_metric: Option<bool>,
}

impl UpdateWeightRequest {
    pub(crate) fn into_update(self) -> WeightUpdate {
        WeightUpdate {
            current_weight: self.current_weight,
            goal_weight: self.goal_weight,
            use_metric: self.use_metric,
        }
    }
}

/// Reject a goal that is not above the current weight.
///
/// Only checked when both weights arrive in the same request; a lone goal or
/// current weight is stored as given.
pub(crate) fn check_goal_above_current(current: Option<f64>, goal: Option<f64>) -> Result<()> {
    if let (Some(current), Some(goal)) = (current, goal) {
        if goal <= current {
            return Err(AppError::BadRequest(
                "Goal weight must be greater than current weight".to_string(),
            ));
        }
    }
    Ok(())
}

/// Update weights and/or the display unit.
///
/// Note: this also clears today's completed meals.
async fn update_weight_config(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateWeightRequest>,
) -> Result<Json<WeightConfigResponse>> {
    body.validate()?;
    check_goal_above_current(body.current_weight, body.goal_weight)?;

    tracing::debug!(
        current_weight = ?body.current_weight,
        goal_weight = ?body.goal_weight,
        use_metric = ?body.use_metric,
        "Updating weight config"
    );

    let config = state
        .weight_config
        .try_update_weight_config(body.into_update())
        .await?;
    Ok(Json(config.into()))
}

// ─── Calories ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
struct CaloriesQuery {
    /// In the unit selected by `use_metric`
    #[validate(range(exclusive_min = 0.0))]
    current_weight: f64,
    #[validate(range(exclusive_min = 0.0))]
    goal_weight: f64,
    #[serde(default = "default_use_metric")]
    use_metric: bool,
}

fn default_use_metric() -> bool {
    true
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CaloriesResponse {
    #[serde(flatten)]
    pub targets: CalorieTargets,
    pub current_weight_kg: f64,
}

/// Preview calorie targets without saving anything.
async fn get_calories(Query(params): Query<CaloriesQuery>) -> Result<Json<CaloriesResponse>> {
    params.validate()?;

    let targets = WeightConfigStore::calculate_calories(
        params.current_weight,
        params.goal_weight,
        params.use_metric,
    );
    Ok(Json(CaloriesResponse {
        targets,
        current_weight_kg: display_to_kg(params.current_weight, params.use_metric),
    }))
}
