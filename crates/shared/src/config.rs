//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Object storage configuration.
    pub storage: StorageSettings,
    /// Inbound upload handling.
    #[serde(default)]
    pub uploads: UploadSettings,
    /// Remote base image generation.
    pub generation: GenerationSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration as read from config sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
}

fn default_token_expiry() -> u64 {
    86_400 // 1 day
}

/// Object storage configuration.
///
/// When `local_root` is set the service writes to the local filesystem
/// instead of S3. The bucket and region still shape the public URLs unless
/// `public_base_url` overrides them.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Bucket name.
    pub bucket: String,
    /// Bucket region, e.g. `ap-south-1`.
    pub region: String,
    /// Custom S3 endpoint (S3-compatible providers).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key ID.
    #[serde(default)]
    pub access_key_id: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_access_key: String,
    /// Overrides the base of public object URLs.
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Root directory for filesystem storage (development only).
    #[serde(default)]
    pub local_root: Option<String>,
}

impl StorageSettings {
    /// Filesystem root when local storage is selected.
    ///
    /// A blank `local_root` selects S3, so an environment variable can
    /// switch off a root set by a config file.
    #[must_use]
    pub fn filesystem_root(&self) -> Option<&str> {
        self.local_root
            .as_deref()
            .map(str::trim)
            .filter(|root| !root.is_empty())
    }
}

/// Inbound upload handling.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    /// Directory where inbound files are staged before storage. Created by
    /// the server at startup.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_temp_dir() -> String {
    "./tmp/uploads".to_string()
}

fn default_max_file_size() -> usize {
    10 * 1024 * 1024
}

/// Remote base image generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSettings {
    /// Endpoint of the generation capability. Unset disables generation.
    #[serde(default)]
    pub url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
    /// Base image URL used when nothing else can be obtained.
    pub fallback_base_image_url: String,
}

fn default_generation_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("ATELIER").separator("__"))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that deserialize but cannot run the service.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` naming the offending key.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.generation.fallback_base_image_url.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "generation.fallback_base_image_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
