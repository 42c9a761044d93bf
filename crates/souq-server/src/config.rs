//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR` (or just `PORT` to keep the default interface)
    /// Default: `0.0.0.0:3000`
    pub http_addr: SocketAddr,

    /// Path of the JSON document holding all offers.
    /// Env: `DATA_FILE`
    /// Default: `./offers.json`
    pub data_file: PathBuf,

    /// Content directory where uploaded images are stored and served from.
    /// Env: `UPLOAD_DIR`
    /// Default: `./uploads`
    pub upload_dir: PathBuf,

    /// Maximum size of a single uploaded image (5 MiB).
    pub max_image_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 3000).into(),
            data_file: PathBuf::from("./offers.json"),
            upload_dir: PathBuf::from("./uploads"),
            max_image_size: 5 * 1024 * 1024, // 5 MiB
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(
                    value = %addr,
                    "Invalid HTTP_ADDR, using default"
                );
            }
        } else if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.http_addr = ([0, 0, 0, 0], port).into();
            } else {
                tracing::warn!(
                    value = %port,
                    "Invalid PORT, using default"
                );
            }
        }

        if let Ok(path) = std::env::var("DATA_FILE") {
            config.data_file = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(path);
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 3000).into());
        assert_eq!(config.data_file, PathBuf::from("./offers.json"));
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.max_image_size, 5 * 1024 * 1024);
    }
}
