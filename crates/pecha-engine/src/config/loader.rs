use super::schema::PechaConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./pecha.yaml
    /// 2. ~/.pecha/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<PechaConfig, ConfigError> {
        let local_config = PathBuf::from("./pecha.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".pecha").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(PechaConfig::default())
    }

    /// Load an explicit file when given, otherwise fall back to the
    /// default locations.
    pub async fn load(path: Option<&Path>) -> Result<PechaConfig, ConfigError> {
        match path {
            Some(path) => Self::load_from(path).await,
            None => Self::load_default().await,
        }
    }

    pub async fn load_from(path: &Path) -> Result<PechaConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::parse(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<PechaConfig, ConfigError> {
        let config: PechaConfig = serde_yaml::from_str(content)?;
        validate(&config)?;
        Ok(config)
    }
}

pub fn validate(config: &PechaConfig) -> Result<(), ConfigError> {
    if !(1..=100).contains(&config.output.jpeg_quality) {
        return Err(ConfigError::Invalid(format!(
            "output.jpeg_quality must be between 1 and 100, got {}",
            config.output.jpeg_quality
        )));
    }
    if config.retry.max_attempts == 0 {
        return Err(ConfigError::Invalid(
            "retry.max_attempts must be at least 1".into(),
        ));
    }
    if config.site.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("site.base_url must not be empty".into()));
    }
    Ok(())
}
