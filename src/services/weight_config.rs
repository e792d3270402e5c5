// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weight configuration store.
//!
//! Single source of truth for the user's weight-gain parameters. Bridges the
//! untyped profile blob in the key-value store and the typed
//! [`WeightConfig`]:
//! 1. Read the profile blob (absent → empty profile)
//! 2. Merge changes over it
//! 3. Write it back
//! 4. Project the weights into calorie targets
//!
//! There is no locking around the read-modify-write; concurrent writers are
//! last-writer-wins.
//!
//! Photos are kept out of the profile blob, each under its own key, with a
//! small index key listing the progress photos in order.

use crate::db::{keys, KeyValueStore, StoreError};
use crate::models::profile::push_progress_photo;
use crate::models::weight_config::{self, CalorieTargets, WeightConfig, WeightUpdate};
use crate::models::UserProfile;
use crate::time_utils::now_rfc3339;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const ONBOARDING_COMPLETE_VALUE: &str = "true";
const MAX_CONCURRENT_PHOTO_READS: usize = 4;

/// Answers from the onboarding questionnaire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnboardingAnswers {
    pub exercise_frequency: String,
    pub meals_per_day: String,
    pub food_preference: String,
    /// Months
    pub timeframe: u32,
    pub weights: WeightUpdate,
}

/// Before/after photo slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSlot {
    Before,
    After,
}

/// All stored photos (base64).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Photos {
    pub before_photo: Option<String>,
    pub after_photo: Option<String>,
    pub progress_photos: Vec<String>,
}

/// Calories eaten today against the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyProgress {
    pub consumed_calories: u32,
    pub daily_target: u32,
    pub remaining_calories: u32,
    pub completed_meals: Vec<String>,
}

impl DailyProgress {
    fn from_profile(profile: &UserProfile) -> Self {
        let daily_target = profile.weight_config().daily_target;
        Self {
            consumed_calories: profile.daily_calories,
            daily_target,
            remaining_calories: daily_target.saturating_sub(profile.daily_calories),
            completed_meals: profile.completed_meals.keys().cloned().collect(),
        }
    }
}

/// Reads and writes the user's weight configuration through a key-value
/// store. Cheap to clone.
#[derive(Clone)]
pub struct WeightConfigStore {
    store: Arc<dyn KeyValueStore>,
}

impl WeightConfigStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Pure calorie calculation; see [`weight_config::calculate_calories`].
    pub fn calculate_calories(
        current_weight: f64,
        goal_weight: f64,
        use_metric: bool,
    ) -> CalorieTargets {
        weight_config::calculate_calories(current_weight, goal_weight, use_metric)
    }

    // ─── Profile Blob ────────────────────────────────────────────

    async fn read_profile(&self) -> Result<Option<UserProfile>, StoreError> {
        let Some(raw) = self.store.get_item(keys::USER_PROFILE).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<Value>(&raw)? {
            Value::Null => Ok(None),
            value => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    async fn write_profile(&self, profile: &mut UserProfile) -> Result<(), StoreError> {
        profile.strip_derived_fields();
        profile.updated_at = Some(now_rfc3339());
        let raw = serde_json::to_string(profile)?;
        self.store.set_item(keys::USER_PROFILE, &raw).await
    }

    /// Read-modify-write of the profile blob. Returns what `change` returned.
    async fn modify_profile<F, R>(&self, change: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut UserProfile) -> R,
    {
        let mut profile = self.read_profile().await?.unwrap_or_default();
        let result = change(&mut profile);
        self.write_profile(&mut profile).await?;
        Ok(result)
    }

    // ─── Weight Config ───────────────────────────────────────────

    /// Load the weight config, surfacing store failures.
    ///
    /// Missing profile or missing/zero weights yield the default config.
    /// Calorie fields are always recomputed from the stored weights.
    pub async fn try_load_weight_config(&self) -> Result<WeightConfig, StoreError> {
        let config = match self.read_profile().await? {
            Some(profile) => profile.weight_config(),
            None => WeightConfig::default(),
        };
        Ok(config)
    }

    /// Load the weight config. Store failures are logged and the default
    /// config is returned in their place.
    pub async fn load_weight_config(&self) -> WeightConfig {
        match self.try_load_weight_config().await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load weight config, using defaults");
                WeightConfig::default()
            }
        }
    }

    /// Merge `update` over the stored profile and persist it, surfacing
    /// store failures.
    ///
    /// The returned config is computed from exactly the values saved, even
    /// when those are not usable weights. Today's meal progress is wiped as
    /// part of every update.
    pub async fn try_update_weight_config(
        &self,
        update: WeightUpdate,
    ) -> Result<WeightConfig, StoreError> {
        let config = self
            .modify_profile(|profile| profile.apply_weight_update(&update))
            .await?;

        tracing::info!(
            current_weight = config.current_weight,
            goal_weight = config.goal_weight,
            use_metric = config.use_metric,
            daily_target = config.daily_target,
            "Weight config updated"
        );

        Ok(config)
    }

    /// Update the weight config. On any store failure the error is logged
    /// and the default config is returned; nothing distinguishes that from
    /// a successful save. Use [`Self::try_update_weight_config`] when the
    /// caller needs to know.
    pub async fn update_weight_config(&self, update: WeightUpdate) -> WeightConfig {
        match self.try_update_weight_config(update).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save weight config, returning defaults");
                WeightConfig::default()
            }
        }
    }

    // ─── Onboarding ──────────────────────────────────────────────

    /// Store the questionnaire answers and mark onboarding complete.
    pub async fn save_onboarding(
        &self,
        answers: OnboardingAnswers,
    ) -> Result<WeightConfig, StoreError> {
        let config = self
            .modify_profile(|profile| {
                profile.exercise_frequency = Some(answers.exercise_frequency.into());
                profile.meals_per_day = Some(answers.meals_per_day.into());
                profile.food_preference = Some(answers.food_preference.into());
                profile.timeframe = Some(answers.timeframe.into());
                profile.apply_weight_update(&answers.weights)
            })
            .await?;

        self.store
            .set_item(keys::ONBOARDING_COMPLETE, ONBOARDING_COMPLETE_VALUE)
            .await?;

        tracing::info!("Onboarding completed");
        Ok(config)
    }

    pub async fn is_onboarding_complete(&self) -> Result<bool, StoreError> {
        let flag = self.store.get_item(keys::ONBOARDING_COMPLETE).await?;
        Ok(flag.as_deref() == Some(ONBOARDING_COMPLETE_VALUE))
    }

    // ─── Photos ──────────────────────────────────────────────────

    async fn read_photo_index(&self) -> Result<Vec<u64>, StoreError> {
        match self.store.get_item(keys::PROGRESS_PHOTO_INDEX).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn photos(&self) -> Result<Photos, StoreError> {
        let before_photo = self.store.get_item(keys::PHOTO_BEFORE).await?;
        let after_photo = self.store.get_item(keys::PHOTO_AFTER).await?;

        let store = &self.store;
        let fetched = stream::iter(self.read_photo_index().await?)
            .map(|id| async move { (id, store.get_item(&keys::progress_photo(id)).await) })
            .buffered(MAX_CONCURRENT_PHOTO_READS)
            .collect::<Vec<_>>()
            .await;

        let mut progress_photos = Vec::with_capacity(fetched.len());
        for (id, photo) in fetched {
            match photo? {
                Some(photo) => progress_photos.push(photo),
                None => tracing::warn!(id, "Indexed progress photo is missing"),
            }
        }

        Ok(Photos {
            before_photo,
            after_photo,
            progress_photos,
        })
    }

    /// Replace the before or after photo.
    pub async fn set_photo(&self, slot: PhotoSlot, photo: String) -> Result<(), StoreError> {
        let key = match slot {
            PhotoSlot::Before => keys::PHOTO_BEFORE,
            PhotoSlot::After => keys::PHOTO_AFTER,
        };
        self.store.set_item(key, &photo).await?;
        tracing::debug!(?slot, len = photo.len(), "Photo stored");
        Ok(())
    }

    /// Append a progress photo. Returns the number of progress photos kept.
    pub async fn add_progress_photo(&self, photo: String) -> Result<usize, StoreError> {
        let mut index = self.read_photo_index().await?;
        let id = index.iter().max().map_or(0, |last| last.saturating_add(1));

        // Photo before index, so the index never names an unwritten photo.
        self.store
            .set_item(&keys::progress_photo(id), &photo)
            .await?;
        let evicted = push_progress_photo(&mut index, id);
        self.store
            .set_item(keys::PROGRESS_PHOTO_INDEX, &serde_json::to_string(&index)?)
            .await?;

        for old in evicted {
            self.store.delete_item(&keys::progress_photo(old)).await?;
            tracing::debug!(id = old, "Oldest progress photo dropped");
        }
        Ok(index.len())
    }

    // ─── Daily Meals ─────────────────────────────────────────────

    pub async fn daily_progress(&self) -> Result<DailyProgress, StoreError> {
        let profile = self.read_profile().await?.unwrap_or_default();
        Ok(DailyProgress::from_profile(&profile))
    }

    /// Mark a meal eaten and add its calories. Completing the same meal
    /// twice counts it once.
    pub async fn complete_meal(
        &self,
        meal_id: &str,
        calories: u32,
    ) -> Result<DailyProgress, StoreError> {
        let mut profile = self.read_profile().await?.unwrap_or_default();
        if profile.complete_meal(meal_id, calories) {
            self.write_profile(&mut profile).await?;
            tracing::debug!(meal_id, calories, total = profile.daily_calories, "Meal completed");
        } else {
            tracing::debug!(meal_id, "Meal already completed (idempotent skip)");
        }
        Ok(DailyProgress::from_profile(&profile))
    }

    // ─── Reset ───────────────────────────────────────────────────

    /// Delete the onboarding flag, the profile and all photos.
    ///
    /// Deletes run one at a time in a fixed order. The onboarding flag goes
    /// first, so a reset that stops part-way leaves the app back at
    /// onboarding. The photo index goes last, so retrying still finds every
    /// photo.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.store.delete_item(keys::ONBOARDING_COMPLETE).await?;
        self.store.delete_item(keys::USER_PROFILE).await?;
        self.store.delete_item(keys::PHOTO_BEFORE).await?;
        self.store.delete_item(keys::PHOTO_AFTER).await?;

        let index = match self.read_photo_index().await {
            Ok(index) => index,
            Err(StoreError::Malformed(e)) => {
                tracing::warn!(error = %e, "Progress photo index unreadable, dropping it");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        for id in index {
            self.store.delete_item(&keys::progress_photo(id)).await?;
        }
        self.store.delete_item(keys::PROGRESS_PHOTO_INDEX).await?;

        tracing::info!("User data reset");
        Ok(())
    }
}
