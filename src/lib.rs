// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Bulk-Tracker: weight-gain companion backend
//!
//! This crate keeps a user's weight-gain parameters, derives daily calorie
//! targets from them, and stores onboarding answers, progress photos and
//! daily meal progress in a pluggable key-value store.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::WeightConfigStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub weight_config: WeightConfigStore,
}
