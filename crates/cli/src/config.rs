//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `POCKET_CART_DATA_DIR` - Directory for the file-backed storage
//!   (default: `.pocket-cart`)
//! - `POCKET_CART_KEY` - Storage key for the cart snapshot (default:
//!   `cart`). Keys become file stems under the data directory, so only
//!   ASCII letters, digits, `-` and `_` are accepted.
//! - `RUST_LOG` - Tracing filter (default: `warn`)

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory the file storage writes under.
    pub data_dir: PathBuf,
    /// Storage key for the cart snapshot.
    pub key: String,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `POCKET_CART_KEY` is not a plain key
    /// name.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let key = get_env_or_default("POCKET_CART_KEY", pocket_cart_store::CART_KEY);
        validate_storage_key(&key, "POCKET_CART_KEY")?;

        Ok(Self {
            data_dir: PathBuf::from(get_env_or_default("POCKET_CART_DATA_DIR", ".pocket-cart")),
            key,
        })
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a storage key is a plain name.
///
/// The file backend turns keys into file stems under the data directory,
/// so anything path-like (separators, `..`, leading dots) must be
/// rejected before it reaches storage.
fn validate_storage_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    if key.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "storage key must not be empty".to_string(),
        ));
    }

    let plain = key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !plain {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!(
                "storage key {key:?} must contain only ASCII letters, digits, '-' or '_'"
            ),
        ));
    }

    Ok(())
}
