use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

/// Origins the original deployment served; overridable via ALLOWED_ORIGINS.
const DEFAULT_ALLOWED_ORIGINS: &str = "https://boardshare.vercel.app,http://localhost:3000";

/// Default timeout for the vision provider call, in seconds.
const DEFAULT_PROVIDER_TIMEOUT_SECONDS: u64 = 120;

#[derive(Debug, Clone, Deserialize)]
pub struct CommonConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone)]
pub struct CalculatorConfig {
    pub common: CommonConfig,
    pub log_level: String,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Vision-capable model for expression interpretation (e.g., gemini-1.5-flash)
    pub vision_model: String,
    /// Upper bound on one provider round-trip, in seconds
    pub provider_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

impl CalculatorConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let common: CommonConfig = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(CalculatorConfig {
            common,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            google: GoogleConfig {
                api_key: get_env("GOOGLE_API_KEY", None, is_prod)?,
            },
            models: ModelConfig {
                vision_model: get_env("CALCULATOR_MODEL", Some("gemini-1.5-flash"), is_prod)?,
                provider_timeout_seconds: get_env(
                    "PROVIDER_TIMEOUT_SECONDS",
                    Some(&DEFAULT_PROVIDER_TIMEOUT_SECONDS.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECONDS),
            },
            security: SecurityConfig {
                allowed_origins: get_env("ALLOWED_ORIGINS", Some(DEFAULT_ALLOWED_ORIGINS), is_prod)?
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect(),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
