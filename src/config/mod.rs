use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;
use crate::services::pipeline::{DiscoveryStrategy, PipelineOptions};

pub const DEFAULT_API_BASE_URL: &str = "https://api.veracode.com";
pub const DEFAULT_WEB_BASE_URL: &str = "https://web.analysiscenter.veracode.com";
pub const DEFAULT_OUTPUT_PATH: &str = "invalid_scan_occurrences.csv";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key_id: String,
    pub api_key_secret: String,
    pub api_base_url: String,
    pub web_base_url: String,
    pub output_path: PathBuf,
    pub page_size: u32,
    pub rate_limit_calls: usize,
    pub rate_limit_period: Duration,
    pub discovery: DiscoveryStrategy,
    pub user_agent: String,
    pub http_timeout: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let config = Self {
            api_key_id: required("VERACODE_API_KEY_ID")?,
            api_key_secret: required("VERACODE_API_KEY_SECRET")?,
            api_base_url: env::var("VERACODE_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            web_base_url: env::var("VERACODE_WEB_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_WEB_BASE_URL.to_string()),
            output_path: env::var("SCRIPTAUDIT_OUTPUT_PATH")
                .unwrap_or_else(|_| DEFAULT_OUTPUT_PATH.to_string())
                .into(),
            page_size: env::var("SCRIPTAUDIT_PAGE_SIZE")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),
            rate_limit_calls: env::var("SCRIPTAUDIT_RATE_LIMIT_CALLS")
                .unwrap_or_else(|_| "250".to_string())
                .parse()
                .unwrap_or(250),
            rate_limit_period: Duration::from_secs(
                env::var("SCRIPTAUDIT_RATE_LIMIT_PERIOD_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .unwrap_or(60),
            ),
            discovery: match env::var("SCRIPTAUDIT_DISCOVERY") {
                Ok(value) => value.parse()?,
                Err(_) => DiscoveryStrategy::default(),
            },
            user_agent: env::var("SCRIPTAUDIT_USER_AGENT")
                .unwrap_or_else(|_| format!("scriptaudit/{}", env!("CARGO_PKG_VERSION"))),
            http_timeout: env::var("SCRIPTAUDIT_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            discovery: self.discovery,
            page_size: self.page_size,
            web_base_url: self.web_base_url.clone(),
            output_path: self.output_path.clone(),
        }
    }

    /// Reject settings that would stall or break the run before any request is made.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.rate_limit_calls == 0 {
            return Err(AppError::Config(
                "SCRIPTAUDIT_RATE_LIMIT_CALLS must be greater than zero".to_string(),
            ));
        }
        if self.rate_limit_period.is_zero() {
            return Err(AppError::Config(
                "SCRIPTAUDIT_RATE_LIMIT_PERIOD_SECS must be greater than zero".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(AppError::Config(
                "SCRIPTAUDIT_PAGE_SIZE must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn required(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Config(format!("{name} must be set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            api_key_id: "id".to_string(),
            api_key_secret: "00ff".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            web_base_url: DEFAULT_WEB_BASE_URL.to_string(),
            output_path: DEFAULT_OUTPUT_PATH.into(),
            page_size: 500,
            rate_limit_calls: 250,
            rate_limit_period: Duration::from_secs(60),
            discovery: DiscoveryStrategy::Analyses,
            user_agent: "scriptaudit/test".to_string(),
            http_timeout: None,
        }
    }

    #[test]
    fn sample_config_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn pipeline_options_carry_run_settings() {
        let options = sample().pipeline_options();
        assert_eq!(options.page_size, 500);
        assert_eq!(options.discovery, DiscoveryStrategy::Analyses);
        assert_eq!(options.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
    }

    #[test]
    fn zero_rate_limit_rejected() {
        let mut config = sample();
        config.rate_limit_calls = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn zero_period_rejected() {
        let mut config = sample();
        config.rate_limit_period = Duration::ZERO;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn zero_page_size_rejected() {
        let mut config = sample();
        config.page_size = 0;
        assert!(config.validate().is_err());
    }
}
