//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Directory holding uploaded datasets
    pub upload_dir: PathBuf,

    /// Serialized classifier (ONNX)
    pub model_path: PathBuf,

    /// Secret used to sign the session cookie
    pub session_secret: Option<String>,

    /// Upload body limit in megabytes
    pub max_upload_mb: usize,

    /// Rows shown in a dataset preview
    pub preview_rows: usize,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            upload_dir: PathBuf::from("uploads"),
            model_path: PathBuf::from("model/random_forest_anomaly_model.onnx"),
            session_secret: None,
            max_upload_mb: 16,
            preview_rows: 10,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            session_secret: env::var("SESSION_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),

            max_upload_mb: env::var("MAX_UPLOAD_MB")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(defaults.max_upload_mb),

            preview_rows: env::var("PREVIEW_ROWS")
                .ok()
                .and_then(|r| r.parse().ok())
                .filter(|r: &usize| *r > 0)
                .unwrap_or(defaults.preview_rows),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Upload limit in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}
