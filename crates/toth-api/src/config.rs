//! Server configuration from the environment.
//!
//! Environment variables:
//!   DATABASE_URL               - PostgreSQL connection string
//!   HOST                       - bind address (default: 0.0.0.0)
//!   PORT                       - bind port (default: 8080)
//!   FILE_STORAGE_PATH          - upload directory (default: ./uploads)
//!   TOTH_MAX_UPLOAD_SIZE_BYTES - largest accepted upload (default: 50 MiB)
//!   ALLOWED_ORIGINS            - comma-separated CORS origins

use std::path::PathBuf;

use axum::http::HeaderValue;
use tracing::warn;

use toth_core::defaults;
use toth_core::{Error, Result};

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/toth";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:9000,http://localhost:8080";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub file_storage_path: PathBuf,
    pub max_upload_bytes: usize,
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset and empty values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("PORT={}: {}", raw, e)))?,
            None => defaults::SERVER_PORT,
        };

        let max_upload_bytes = match get("TOTH_MAX_UPLOAD_SIZE_BYTES") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                Error::Config(format!("TOTH_MAX_UPLOAD_SIZE_BYTES={}: {}", raw, e))
            })?,
            None => defaults::MAX_UPLOAD_SIZE_BYTES,
        };
        if max_upload_bytes == 0 {
            return Err(Error::Config(
                "TOTH_MAX_UPLOAD_SIZE_BYTES must be greater than zero".to_string(),
            ));
        }

        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: get("HOST").unwrap_or_else(|| defaults::SERVER_HOST.to_string()),
            port,
            file_storage_path: get("FILE_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(defaults::FILE_STORAGE_PATH)),
            max_upload_bytes,
            allowed_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// CORS origins as header values; invalid entries are logged and skipped.
    pub fn cors_origins(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", origin, e);
                    None
                }
            })
            .collect()
    }
}
