use std::env;
use anyhow::{Result, Context};
use tracing::{info, warn};

/// Default Gemini API origin. Overridable so tests can point the relay
/// at a mock upstream.
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_image_size_mb: usize,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| {
                info!("SERVER_HOST not set, using default: 0.0.0.0");
                "0.0.0.0".to_string()
            }),
            server_port: Self::parse_env_var("SERVER_PORT", 5001)
                .context("Failed to parse SERVER_PORT")?,
            max_image_size_mb: Self::parse_env_var("MAX_IMAGE_SIZE_MB", 10)
                .context("Failed to parse MAX_IMAGE_SIZE_MB")?,
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        config.validate()?;

        // An absent key is not a startup error; the first extraction will
        // surface it as an upstream authentication failure.
        if config.gemini_api_key.is_empty() {
            warn!("GEMINI_API_KEY not set. Extraction requests will fail upstream.");
        }

        info!(
            host = %config.server_host,
            port = config.server_port,
            model = %config.gemini_model,
            max_image_size_mb = config.max_image_size_mb,
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_image_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_SIZE_MB must be greater than 0"));
        }
        if self.gemini_base_url.is_empty() {
            return Err(anyhow::anyhow!("GEMINI_BASE_URL must not be empty"));
        }
        Ok(())
    }
}
