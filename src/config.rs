// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Read once at startup; a `.env` file is honoured for local development.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Which storage backend holds users and todos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Volatile in-process store (lost on restart).
    Memory,
    /// Persistent Firestore document store.
    Firestore,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "firestore" => Ok(StorageBackend::Firestore),
            _ => Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Storage backend selected at process start
    pub storage_backend: StorageBackend,
    /// GCP project ID (persistent backend only)
    pub gcp_project_id: Option<String>,
    /// Directory holding uploaded images
    pub upload_dir: PathBuf,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
}

impl Config {
    /// Config for tests: memory backend, uploads under `upload_dir`.
    pub fn test_default() -> Self {
        Self {
            port: 5001,
            storage_backend: StorageBackend::Memory,
            gcp_project_id: Some("test-project".to_string()),
            upload_dir: PathBuf::from("uploads"),
            frontend_url: "http://localhost:3000".to_string(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        // USE_MEMORY_DB=true wins over STORAGE_BACKEND
        let force_memory = env::var("USE_MEMORY_DB")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let storage_backend = if force_memory {
            StorageBackend::Memory
        } else {
            env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "memory".to_string())
                .parse()?
        };

        let gcp_project_id = env::var("GCP_PROJECT_ID")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        if storage_backend == StorageBackend::Firestore && gcp_project_id.is_none() {
            return Err(ConfigError::Missing("GCP_PROJECT_ID"));
        }

        let port = match env::var("PORT") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            Err(_) => 5001,
        };

        Ok(Self {
            port,
            storage_backend,
            gcp_project_id,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(
            "memory".parse::<StorageBackend>().unwrap(),
            StorageBackend::Memory
        );
        assert_eq!(
            " Firestore ".parse::<StorageBackend>().unwrap(),
            StorageBackend::Firestore
        );
        assert!(matches!(
            "mongodb".parse::<StorageBackend>(),
            Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND",
                ..
            })
        ));
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the process environment to avoid races.
        env::set_var("USE_MEMORY_DB", "true");
        env::set_var("STORAGE_BACKEND", "firestore");
        env::set_var("PORT", "6001");
        env::set_var("UPLOAD_DIR", "/tmp/todo-board-uploads");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.port, 6001);
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/todo-board-uploads"));

        env::set_var("PORT", "not-a-port");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));

        env::remove_var("USE_MEMORY_DB");
        env::remove_var("STORAGE_BACKEND");
        env::remove_var("PORT");
        env::remove_var("UPLOAD_DIR");
    }
}
