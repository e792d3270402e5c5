// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily meal progress and reset routes.

use crate::error::{AppError, Result};
use crate::services::DailyProgress;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/progress", get(get_progress))
        .route("/api/meals/{meal_id}/complete", post(complete_meal))
        .route("/api/reset", post(reset))
}

/// Today's calories against the target.
async fn get_progress(State(state): State<Arc<AppState>>) -> Result<Json<DailyProgress>> {
    Ok(Json(state.weight_config.daily_progress().await?))
}

#[derive(Debug, Deserialize, Validate)]
struct CompleteMealRequest {
    #[validate(range(max = 10000))]
    calories: u32,
}

const MAX_MEAL_ID_LEN: usize = 100;

/// Mark a meal as eaten.
async fn complete_meal(
    State(state): State<Arc<AppState>>,
    Path(meal_id): Path<String>,
    Json(body): Json<CompleteMealRequest>,
) -> Result<Json<DailyProgress>> {
    if meal_id.is_empty() || meal_id.len() > MAX_MEAL_ID_LEN {
        return Err(AppError::BadRequest(format!(
            "Meal ID must be 1-{} characters",
            MAX_MEAL_ID_LEN
        )));
    }
    body.validate()?;

    let progress = state
        .weight_config
        .complete_meal(&meal_id, body.calories)
        .await?;
    Ok(Json(progress))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
}

/// Delete all stored data and the onboarding flag.
async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<ResetResponse>> {
    tracing::info!("User-initiated reset");
    state.weight_config.reset().await?;

    Ok(Json(ResetResponse {
        success: true,
        message: "All data removed. Onboarding will start again.".to_string(),
    }))
}
