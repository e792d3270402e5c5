// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod profile;
pub mod weight_config;

pub use profile::{UserProfile, MAX_PROGRESS_PHOTOS};
pub use weight_config::{calculate_calories, CalorieTargets, WeightConfig, WeightUpdate};
