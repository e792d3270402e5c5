// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Progress photo routes.
//!
//! Photos arrive already base64-encoded from the device's image picker and
//! are stored as-is.

use crate::error::{AppError, Result};
use crate::services::{PhotoSlot, Photos};
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Path, State},
    routing::{get, post, put},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Largest encoded photo accepted (about 560 KiB of image).
///
/// Each photo is stored as one value, so this must still fit a single
/// Firestore document after encryption grows it by a third.
pub const MAX_PHOTO_BASE64_LEN: usize = 750 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/photos", get(get_photos))
        .route("/api/photos/progress", post(add_progress_photo))
        .route("/api/photos/{slot}", put(set_photo))
        // Leave headroom for the JSON wrapper and a data URI prefix.
        .layer(DefaultBodyLimit::max(MAX_PHOTO_BASE64_LEN + 1024))
}

#[derive(Debug, Deserialize, Validate)]
struct PhotoRequest {
    #[validate(length(min = 1, max = 768000))]
    image: String,
}

impl PhotoRequest {
    /// Validate and hand back the encoded image.
    fn into_image(self) -> Result<String> {
        self.validate()?;
        let image = strip_data_uri(&self.image);
        BASE64
            .decode(image)
            .map_err(|_| AppError::BadRequest("Image must be base64-encoded".to_string()))?;
        Ok(image.to_string())
    }
}

/// Accept both bare base64 and `data:image/...;base64,` URIs.
fn strip_data_uri(image: &str) -> &str {
    match image.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => image,
    }
}

fn parse_slot(slot: &str) -> Result<PhotoSlot> {
    match slot {
        "before" => Ok(PhotoSlot::Before),
        "after" => Ok(PhotoSlot::After),
        other => Err(AppError::NotFound(format!("Photo slot {}", other))),
    }
}

/// Get all stored photos.
async fn get_photos(State(state): State<Arc<AppState>>) -> Result<Json<Photos>> {
    Ok(Json(state.weight_config.photos().await?))
}

/// Replace the before or after photo.
async fn set_photo(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
    Json(body): Json<PhotoRequest>,
) -> Result<Json<Photos>> {
    let slot = parse_slot(&slot)?;
    let image = body.into_image()?;
    state.weight_config.set_photo(slot, image).await?;
    Ok(Json(state.weight_config.photos().await?))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressPhotoResponse {
    pub progress_photo_count: usize,
}

/// Append a progress photo (oldest dropped past the cap).
async fn add_progress_photo(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PhotoRequest>,
) -> Result<Json<ProgressPhotoResponse>> {
    let image = body.into_image()?;
    let count = state.weight_config.add_progress_photo(image).await?;
    Ok(Json(ProgressPhotoResponse {
        progress_photo_count: count,
    }))
}
