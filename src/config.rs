// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Which key-value backend holds the user's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File,
    Firestore,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "file" => Ok(StoreBackend::File),
            "firestore" => Ok(StoreBackend::Firestore),
            other => Err(ConfigError::Invalid {
                var: "STORE_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Storage backend
    pub store_backend: StoreBackend,
    /// Path of the JSON file for the file backend
    pub store_path: PathBuf,
    /// GCP project ID (Firestore backend)
    pub gcp_project_id: String,
    /// Secret for encrypting stored values; no encryption if unset
    pub store_encryption_key: Option<Vec<u8>>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:8081".to_string(),
            store_backend: StoreBackend::Memory,
            store_path: PathBuf::from("data/store.json"),
            gcp_project_id: "test-project".to_string(),
            store_encryption_key: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => StoreBackend::File,
        };

        let gcp_project_id = match (store_backend, env::var("GCP_PROJECT_ID")) {
            (_, Ok(id)) => id,
            (StoreBackend::Firestore, Err(_)) => {
                return Err(ConfigError::Missing("GCP_PROJECT_ID"));
            }
            (_, Err(_)) => "local-dev".to_string(),
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            store_backend,
            store_path: env::var("STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/store.json")),
            gcp_project_id,
            store_encryption_key: env::var("STORE_ENCRYPTION_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(String::into_bytes),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}
