use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Runtime configuration.
///
/// Sources, later ones overriding earlier ones:
/// 1. the built-in defaults of [`AppConfig::default`]
/// 2. an optional `talebook.toml` in the working directory
/// 3. `TALEBOOK__*` environment variables (e.g. `TALEBOOK__MONGODB_URI`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    /// Directory served as static assets at `/`.
    pub public_dir: PathBuf,
    /// Directory uploaded fiction images are written to.
    pub uploads_dir: PathBuf,
    /// Public URL prefix under which `uploads_dir` is reachable.
    pub uploads_url_prefix: String,
    /// Image path used when a fiction is created without an upload.
    pub default_image: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub max_upload_bytes: usize,
    /// Upper bound applied to the `limit` query parameter.
    pub max_list_limit: u32,
    /// Seed the demo users and enable `POST /api/users/login`.
    pub demo_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_database: "talebook".to_string(),
            public_dir: PathBuf::from("public"),
            uploads_dir: PathBuf::from("public/uploads"),
            uploads_url_prefix: "/uploads".to_string(),
            default_image: "/images/default-fiction-image.svg".to_string(),
            jwt_secret: "dev-secret".to_string(),
            jwt_ttl_hours: 24 * 7,
            max_upload_bytes: 5 * 1024 * 1024,
            max_list_limit: 100,
            demo_mode: false,
        }
    }
}

impl AppConfig {
    /// Load the layered configuration.
    pub fn load() -> Result<Self, AppError> {
        let defaults = config::Config::try_from(&AppConfig::default())
            .map_err(|e| AppError::Internal(format!("Invalid default configuration: {e}")))?;

        config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("talebook").required(false))
            .add_source(
                config::Environment::with_prefix("TALEBOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize::<AppConfig>())
            .map_err(|e| AppError::Internal(format!("Failed to load configuration: {e}")))
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid bind address: {e}")))
    }

    /// The MongoDB URI with any password replaced, safe to log.
    pub fn redacted_mongodb_uri(&self) -> String {
        match url::Url::parse(&self.mongodb_uri) {
            Ok(mut parsed) if parsed.password().is_some() => {
                let _ = parsed.set_password(Some("****"));
                parsed.to_string()
            }
            _ => self.mongodb_uri.clone(),
        }
    }
}
