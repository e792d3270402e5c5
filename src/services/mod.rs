// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod weight_config;

pub use weight_config::{DailyProgress, OnboardingAnswers, PhotoSlot, Photos, WeightConfigStore};
