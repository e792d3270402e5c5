// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Onboarding questionnaire routes.

use crate::error::Result;
use crate::routes::api::{check_goal_above_current, UpdateWeightRequest, WeightConfigResponse};
use crate::services::OnboardingAnswers;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/onboarding",
        get(get_onboarding_status).put(complete_onboarding),
    )
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OnboardingStatusResponse {
    pub complete: bool,
}

/// Whether the questionnaire has been completed.
async fn get_onboarding_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OnboardingStatusResponse>> {
    let complete = state.weight_config.is_onboarding_complete().await?;
    Ok(Json(OnboardingStatusResponse { complete }))
}

/// Questionnaire answers. Weights are kilograms.
#[derive(Debug, Deserialize, Validate)]
struct OnboardingRequest {
    #[validate(length(min = 1, max = 64))]
    exercise_frequency: String,
    #[validate(length(min = 1, max = 64))]
    meals_per_day: String,
    #[validate(length(min = 1, max = 64))]
    food_preference: String,
    /// Months
    #[validate(range(min = 1, max = 60))]
    timeframe: u32,
    #[serde(flatten)]
    #[validate(nested)]
    weights: UpdateWeightRequest,
}

/// Save questionnaire answers and mark onboarding complete.
async fn complete_onboarding(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OnboardingRequest>,
) -> Result<Json<WeightConfigResponse>> {
    body.validate()?;
    check_goal_above_current(body.weights.current_weight, body.weights.goal_weight)?;

    let answers = OnboardingAnswers {
        exercise_frequency: body.exercise_frequency,
        meals_per_day: body.meals_per_day,
        food_preference: body.food_preference,
        timeframe: body.timeframe,
        weights: body.weights.into_update(),
    };

    let config = state.weight_config.save_onboarding(answers).await?;
    Ok(Json(config.into()))
}
